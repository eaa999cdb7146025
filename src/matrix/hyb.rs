//! Hybrid (HYB) matrix format: an ELL block plus a COO overflow block

use std::fmt;

use crate::device::{DeviceBuffer, DeviceRepr};

/// How rows were split between the ELL and COO parts when the matrix was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HybPartition {
    /// Width chosen by the builder's heuristic
    #[default]
    Auto,
    /// Width supplied by the user
    User,
    /// Width equal to the longest row, leaving the COO part empty
    Max,
}

/// A sparse matrix in hybrid ELL + COO format, resident on the device
///
/// The ELL part stores `ell_width` (column, value) slots per row in row-major
/// order: slot `p` of row `i` is at `i * ell_width + p`. Short rows are padded
/// with columns outside `[0, n)`. The COO part holds the remaining entries as
/// unsorted (row, column, value) triples.
///
/// Sizes are signed and arrays optional so the structure can describe
/// whatever the caller handed over; consistency is checked by the operation
/// that consumes it, not here.
#[derive(Clone)]
pub struct SparseMatrixHYB<T: DeviceRepr> {
    /// Number of rows
    pub m: i32,

    /// Number of columns
    pub n: i32,

    pub partition: HybPartition,

    /// Slots per row in the ELL part
    pub ell_width: i32,

    /// Stored ELL entries including padding (m * ell_width)
    pub ell_nnz: i32,

    /// ELL column indices (size: m * ell_width)
    pub ell_col_ind: Option<DeviceBuffer<i32>>,

    /// ELL values (size: m * ell_width)
    pub ell_val: Option<DeviceBuffer<T>>,

    /// Entries in the COO part
    pub coo_nnz: i32,

    /// COO row indices (size: coo_nnz)
    pub coo_row_ind: Option<DeviceBuffer<i32>>,

    /// COO column indices (size: coo_nnz)
    pub coo_col_ind: Option<DeviceBuffer<i32>>,

    /// COO values (size: coo_nnz)
    pub coo_val: Option<DeviceBuffer<T>>,
}

/// Short alias used throughout the crate
pub type HybMatrix<T> = SparseMatrixHYB<T>;

/// Converts a host slice length to a stored size
///
/// Lengths that do not fit in `i32` become -1, which validation reports as
/// an invalid size instead of silently truncating the part.
fn len_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(-1)
}

/// Resolves a stored ELL column to a 0-based column of an `n`-column matrix
///
/// Returns None for padding: any column that falls outside `[0, n)` once the
/// index base is removed, including sentinels near the `i32` limits.
pub(crate) fn ell_column(raw: i32, base: i32, n: i32) -> Option<usize> {
    match raw.checked_sub(base) {
        Some(col) if col >= 0 && col < n => Some(col as usize),
        _ => None,
    }
}

impl<T: DeviceRepr> SparseMatrixHYB<T> {
    /// Creates an `m × n` matrix with empty ELL and COO parts
    pub fn new(m: i32, n: i32) -> Self {
        Self {
            m,
            n,
            partition: HybPartition::Auto,
            ell_width: 0,
            ell_nnz: 0,
            ell_col_ind: None,
            ell_val: None,
            coo_nnz: 0,
            coo_row_ind: None,
            coo_col_ind: None,
            coo_val: None,
        }
    }

    /// Uploads an ELL part of the given width
    ///
    /// `col_ind` and `val` are row-major with `width` slots per row. If
    /// `m * width` overflows `i32`, `ell_nnz` is stored as -1.
    pub fn with_ell(mut self, width: i32, col_ind: &[i32], val: &[T]) -> Self {
        self.ell_width = width;
        self.ell_nnz = self.m.checked_mul(width).unwrap_or(-1);
        self.ell_col_ind = Some(DeviceBuffer::from_slice(col_ind));
        self.ell_val = Some(DeviceBuffer::from_slice(val));
        self
    }

    /// Uploads a COO part
    ///
    /// The entry count is taken from `val`. A part with more than `i32::MAX`
    /// entries is stored with `coo_nnz == -1` and rejected by validation.
    pub fn with_coo(mut self, row_ind: &[i32], col_ind: &[i32], val: &[T]) -> Self {
        self.coo_nnz = len_i32(val.len());
        self.coo_row_ind = Some(DeviceBuffer::from_slice(row_ind));
        self.coo_col_ind = Some(DeviceBuffer::from_slice(col_ind));
        self.coo_val = Some(DeviceBuffer::from_slice(val));
        self
    }

    pub fn with_partition(mut self, partition: HybPartition) -> Self {
        self.partition = partition;
        self
    }

    /// Total stored entries across both parts
    pub fn nnz(&self) -> i64 {
        self.ell_nnz as i64 + self.coo_nnz as i64
    }

    pub fn shape(&self) -> (i32, i32) {
        (self.m, self.n)
    }

    /// Whether the operation on this matrix is a no-op
    pub fn is_degenerate(&self) -> bool {
        self.m == 0 || self.n == 0 || self.nnz() == 0
    }
}

impl<T: DeviceRepr> fmt::Debug for SparseMatrixHYB<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixHYB {{")?;
        writeln!(f, "  dimensions: {} × {}", self.m, self.n)?;
        writeln!(f, "  partition: {:?}", self.partition)?;
        writeln!(f, "  ell: width {}, nnz {}", self.ell_width, self.ell_nnz)?;
        writeln!(f, "  coo: nnz {}", self.coo_nnz)?;
        write!(f, "}}")
    }
}
