//! Utilities for converting our HYB format to external libraries

use ndarray::Array2;
use sprs::{CsMat, TriMat};

use crate::device::Scalar;
use crate::matrix::hyb::ell_column;
use crate::matrix::{HybMatrix, IndexBase};

/// Collects the stored entries of both parts as 0-based (row, col, value)
///
/// ELL padding is skipped. Duplicate coordinates are kept as separate
/// entries.
fn triplets<T: Scalar>(matrix: &HybMatrix<T>, base: IndexBase) -> Vec<(usize, usize, T)> {
    let m = matrix.m.max(0) as usize;
    let n = matrix.n.max(0);
    let offset = base.offset();
    let mut entries = Vec::new();

    if matrix.ell_nnz > 0 {
        if let (Some(col_ind), Some(val)) = (&matrix.ell_col_ind, &matrix.ell_val) {
            let width = matrix.ell_width.max(0) as usize;
            let cols = col_ind.to_vec();
            let vals = val.to_vec();
            for row in 0..m {
                for p in 0..width {
                    let idx = row * width + p;
                    if let Some(col) = ell_column(cols[idx], offset, n) {
                        entries.push((row, col, vals[idx]));
                    }
                }
            }
        }
    }

    if matrix.coo_nnz > 0 {
        if let (Some(row_ind), Some(col_ind), Some(val)) =
            (&matrix.coo_row_ind, &matrix.coo_col_ind, &matrix.coo_val)
        {
            let rows = row_ind.to_vec();
            let cols = col_ind.to_vec();
            let vals = val.to_vec();
            for k in 0..matrix.coo_nnz as usize {
                entries.push((
                    (rows[k] - offset) as usize,
                    (cols[k] - offset) as usize,
                    vals[k],
                ));
            }
        }
    }

    entries
}

/// Converts a HYB matrix to sprs CsMat in CSR format
///
/// Duplicate coordinates are summed.
pub fn to_sprs_csr<T>(matrix: &HybMatrix<T>, base: IndexBase) -> CsMat<T>
where
    T: Scalar + Default,
{
    let shape = (matrix.m.max(0) as usize, matrix.n.max(0) as usize);
    let mut trip = TriMat::new(shape);
    for (row, col, val) in triplets(matrix, base) {
        trip.add_triplet(row, col, val);
    }
    trip.to_csr()
}

/// Expands a HYB matrix to a dense ndarray
pub fn to_dense<T: Scalar>(matrix: &HybMatrix<T>, base: IndexBase) -> Array2<T> {
    let shape = (matrix.m.max(0) as usize, matrix.n.max(0) as usize);
    let mut dense = Array2::from_elem(shape, T::zero());
    for (row, col, val) in triplets(matrix, base) {
        dense[[row, col]] = dense[[row, col]] + val;
    }
    dense
}
