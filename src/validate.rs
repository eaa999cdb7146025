//! Argument validation for hybmv
//!
//! All checks run on the host before any device work is queued, so a
//! rejected call never touches `y`. When several conditions are violated
//! the first one in this order is reported: handle, descriptor and matrix
//! presence, index base and matrix type, sizes, sub-format structure,
//! operand pointers. Degenerate matrices then short-circuit to success.

use crate::device::{DeviceBuffer, DeviceRepr, Handle, Scalar, ScalarArg};
use crate::error::{Result, SparseError};
use crate::matrix::{HybMatrix, IndexBase, MatDescr, MatrixType};

/// The ELL arrays of a matrix that passed validation
#[derive(Debug, Clone, Copy)]
pub struct EllPart<'a, T: DeviceRepr> {
    pub width: usize,
    pub col_ind: &'a DeviceBuffer<i32>,
    pub val: &'a DeviceBuffer<T>,
}

/// The COO arrays of a matrix that passed validation
#[derive(Debug, Clone, Copy)]
pub struct CooPart<'a, T: DeviceRepr> {
    pub nnz: usize,
    pub row_ind: &'a DeviceBuffer<i32>,
    pub col_ind: &'a DeviceBuffer<i32>,
    pub val: &'a DeviceBuffer<T>,
}

/// Arguments resolved by a successful validation
#[derive(Debug)]
pub struct ValidatedArgs<'a, T: Scalar> {
    pub handle: &'a Handle,
    pub base: IndexBase,
    pub m: usize,
    pub n: usize,
    pub ell: Option<EllPart<'a, T>>,
    pub coo: Option<CooPart<'a, T>>,
    pub alpha: &'a ScalarArg<T>,
    pub beta: &'a ScalarArg<T>,
    pub x: &'a DeviceBuffer<T>,
    pub y: &'a DeviceBuffer<T>,
}

/// Outcome of a successful validation
#[derive(Debug)]
pub enum Validation<'a, T: Scalar> {
    /// The operation is a no-op; report success without touching memory
    QuickReturn,
    /// Work must be queued
    Proceed(ValidatedArgs<'a, T>),
}

fn check_len(arg: &'static str, len: usize, required: usize) -> Result<()> {
    if len < required {
        return Err(SparseError::InvalidSize {
            arg,
            value: len as i64,
        });
    }
    Ok(())
}

fn require<'a, U>(arg: &'static str, value: Option<&'a U>) -> Result<&'a U> {
    value.ok_or(SparseError::InvalidPointer { arg })
}

/// Validates the arguments of a hybmv call
#[allow(clippy::too_many_arguments)]
pub fn validate_hybmv<'a, T: Scalar>(
    handle: Option<&'a Handle>,
    alpha: Option<&'a ScalarArg<T>>,
    descr: Option<&'a MatDescr>,
    hyb: Option<&'a HybMatrix<T>>,
    x: Option<&'a DeviceBuffer<T>>,
    beta: Option<&'a ScalarArg<T>>,
    y: Option<&'a DeviceBuffer<T>>,
) -> Result<Validation<'a, T>> {
    let handle = handle.ok_or(SparseError::InvalidHandle)?;
    let descr = require("descr", descr)?;
    let hyb = require("hyb", hyb)?;

    let base = descr.index_base()?;
    if descr.matrix_type() != MatrixType::General {
        return Err(SparseError::NotImplemented {
            feature: "non-general matrix type",
        });
    }

    // Sizes
    if hyb.m < 0 {
        return Err(SparseError::InvalidSize {
            arg: "m",
            value: hyb.m as i64,
        });
    }
    if hyb.n < 0 {
        return Err(SparseError::InvalidSize {
            arg: "n",
            value: hyb.n as i64,
        });
    }
    if hyb.nnz() < 0 {
        return Err(SparseError::InvalidSize {
            arg: "nnz",
            value: hyb.nnz(),
        });
    }
    if hyb.ell_nnz < 0 {
        return Err(SparseError::InvalidSize {
            arg: "ell_nnz",
            value: hyb.ell_nnz as i64,
        });
    }
    if hyb.coo_nnz < 0 {
        return Err(SparseError::InvalidSize {
            arg: "coo_nnz",
            value: hyb.coo_nnz as i64,
        });
    }

    // ELL structure
    let ell = if hyb.ell_nnz > 0 {
        if hyb.ell_width < 0 {
            return Err(SparseError::InvalidSize {
                arg: "ell_width",
                value: hyb.ell_width as i64,
            });
        }
        let col_ind = require("ell_col_ind", hyb.ell_col_ind.as_ref())?;
        let val = require("ell_val", hyb.ell_val.as_ref())?;

        let width = hyb.ell_width as usize;
        let required = hyb.m as usize * width;
        check_len("ell_col_ind", col_ind.len(), required)?;
        check_len("ell_val", val.len(), required)?;
        Some(EllPart {
            width,
            col_ind,
            val,
        })
    } else {
        None
    };

    // COO structure
    let coo = if hyb.coo_nnz > 0 {
        let row_ind = require("coo_row_ind", hyb.coo_row_ind.as_ref())?;
        let col_ind = require("coo_col_ind", hyb.coo_col_ind.as_ref())?;
        let val = require("coo_val", hyb.coo_val.as_ref())?;

        let nnz = hyb.coo_nnz as usize;
        check_len("coo_row_ind", row_ind.len(), nnz)?;
        check_len("coo_col_ind", col_ind.len(), nnz)?;
        check_len("coo_val", val.len(), nnz)?;
        Some(CooPart {
            nnz,
            row_ind,
            col_ind,
            val,
        })
    } else {
        None
    };

    // Operand pointers
    let x = require("x", x)?;
    let y = require("y", y)?;
    let alpha = require("alpha", alpha)?;
    let beta = require("beta", beta)?;

    let mode = handle.pointer_mode();
    if !alpha.usable_in(mode) {
        return Err(SparseError::InvalidPointer { arg: "alpha" });
    }
    if !beta.usable_in(mode) {
        return Err(SparseError::InvalidPointer { arg: "beta" });
    }

    if hyb.is_degenerate() {
        return Ok(Validation::QuickReturn);
    }

    let m = hyb.m as usize;
    let n = hyb.n as usize;
    check_len("x", x.len(), n)?;
    check_len("y", y.len(), m)?;

    Ok(Validation::Proceed(ValidatedArgs {
        handle,
        base,
        m,
        n,
        ell,
        coo,
        alpha,
        beta,
        x,
        y,
    }))
}
