//! Matrix descriptor: index base and matrix type

use crate::error::{Result, SparseError};

/// Base of the stored row and column indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    #[default]
    Zero,
    One,
}

impl IndexBase {
    /// Value subtracted from a stored index to get a 0-based index
    pub fn offset(&self) -> i32 {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(IndexBase::Zero),
            1 => Some(IndexBase::One),
            _ => None,
        }
    }
}

/// Structural class of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixType {
    #[default]
    General,
    Symmetric,
    Hermitian,
    Triangular,
}

/// Describes how a sparse matrix's indices and structure are to be read
///
/// The index base is kept as its raw code, as received from the caller, so
/// an illegal base is representable and rejected when the descriptor is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatDescr {
    index_base: i32,
    matrix_type: MatrixType,
}

impl Default for MatDescr {
    fn default() -> Self {
        Self {
            index_base: IndexBase::Zero.offset(),
            matrix_type: MatrixType::General,
        }
    }
}

impl MatDescr {
    /// A general, zero-based descriptor
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_base(mut self, base: IndexBase) -> Self {
        self.set_index_base(base);
        self
    }

    pub fn with_matrix_type(mut self, matrix_type: MatrixType) -> Self {
        self.matrix_type = matrix_type;
        self
    }

    pub fn set_index_base(&mut self, base: IndexBase) {
        self.index_base = base.offset();
    }

    /// Stores a raw index-base code without checking it
    pub fn set_raw_index_base(&mut self, raw: i32) {
        self.index_base = raw;
    }

    pub fn raw_index_base(&self) -> i32 {
        self.index_base
    }

    /// The index base, or invalid-value if the stored code is illegal
    pub fn index_base(&self) -> Result<IndexBase> {
        IndexBase::from_raw(self.index_base).ok_or(SparseError::InvalidValue {
            arg: "index_base",
            value: self.index_base as i64,
        })
    }

    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    pub fn set_matrix_type(&mut self, matrix_type: MatrixType) {
        self.matrix_type = matrix_type;
    }
}
