//! Reference implementation of HYB matrix-vector multiplication
//!
//! This provides a baseline for correctness testing and performance comparison.
//! It walks both parts of the matrix sequentially on the host.

use crate::device::Scalar;
use crate::matrix::descriptor::IndexBase;
use crate::matrix::hyb::{ell_column, SparseMatrixHYB};

/// Computes `y = alpha * A * x + beta * y` sequentially
///
/// ELL slots whose column falls outside `[0, n)` are treated as padding.
/// Degenerate matrices (no rows, no columns or no entries) leave `y`
/// untouched, as does a structurally incomplete matrix.
///
/// # Panics
///
/// Panics if `x` or `y` is shorter than the matrix dimensions, or a COO entry
/// indexes outside the matrix.
pub fn reference_hybmv<T: Scalar>(
    alpha: T,
    base: IndexBase,
    a: &SparseMatrixHYB<T>,
    x: &[T],
    beta: T,
    y: &mut [T],
) {
    if a.m <= 0 || a.n <= 0 || a.nnz() <= 0 {
        return;
    }

    let m = a.m as usize;
    let n = a.n;
    let offset = base.offset();
    let mut sums = vec![T::zero(); m];

    // ELL part
    if a.ell_nnz > 0 {
        if let (Some(col_ind), Some(val)) = (&a.ell_col_ind, &a.ell_val) {
            let width = a.ell_width.max(0) as usize;
            let cols = col_ind.to_vec();
            let vals = val.to_vec();
            for (i, sum) in sums.iter_mut().enumerate() {
                for p in 0..width {
                    let idx = i * width + p;
                    if let Some(col) = ell_column(cols[idx], offset, n) {
                        *sum = *sum + vals[idx] * x[col];
                    }
                }
            }
        }
    }

    // COO part
    if a.coo_nnz > 0 {
        if let (Some(row_ind), Some(col_ind), Some(val)) = (&a.coo_row_ind, &a.coo_col_ind, &a.coo_val) {
            let rows = row_ind.to_vec();
            let cols = col_ind.to_vec();
            let vals = val.to_vec();
            for k in 0..a.coo_nnz as usize {
                let row = (rows[k] - offset) as usize;
                let col = (cols[k] - offset) as usize;
                sums[row] = sums[row] + vals[k] * x[col];
            }
        }
    }

    for (yi, sum) in y.iter_mut().zip(sums) {
        *yi = if beta.is_zero() {
            alpha * sum
        } else {
            alpha * sum + beta * *yi
        };
    }
}
