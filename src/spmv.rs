//! # Hybrid sparse matrix-vector multiplication
//!
//! Computes `y = alpha * op(A) * x + beta * y` for a matrix in HYB format.
//!
//! The ELL and COO parts are handled by different kernels, queued in order on
//! the handle's stream:
//!
//! 1. ELL rows, one thread each, which also applies `beta` to `y`
//!    (or a plain `y = beta * y` pass when there is no ELL part)
//! 2. COO warp-reduce, adding `alpha`-scaled completed row segments to `y`
//!    and leaving one open segment per warp in scratch buffers
//! 3. COO block-reduce, folding the per-warp segments into `y`
//!
//! Stream order is the only barrier between the stages.

use crate::constants::COOMV_BLOCK_SIZE;
use crate::device::{DeviceBuffer, Handle, PointerMode, Scalar, ScalarArg};
use crate::error::{Result, SparseError, Status};
use crate::kernels::block_reduce::CooBlockReduceKernel;
use crate::kernels::coomv::{CooLaunchPlan, CooWarpReduceKernel};
use crate::kernels::ellmv::{ellmv_launch_config, EllmvKernel};
use crate::kernels::scale::{scale_launch_config, ScaleKernel};
use crate::matrix::{HybMatrix, MatDescr};
use crate::validate::{validate_hybmv, CooPart, ValidatedArgs, Validation};

/// Operation applied to the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    NoTranspose,
    Transpose,
    ConjugateTranspose,
}

/// Performs `y = alpha * op(A) * x + beta * y` with `A` in HYB format
///
/// Work is queued on the handle's stream and this function returns without
/// waiting for it; call [`Handle::synchronize`] before reading `y` on the
/// host. Validation errors are returned before anything is queued.
///
/// Only [`Operation::NoTranspose`] is supported.
///
/// # Examples
///
/// ```
/// use hybmv::{hybmv, Handle, HybMatrix, MatDescr, Operation, DeviceBuffer, ScalarArg};
///
/// let handle = Handle::new().unwrap();
/// // [2 0 0]
/// // [0 0 0]
/// // [0 0 3]
/// let a = HybMatrix::new(3, 3).with_ell(1, &[0, -1, 2], &[2.0f64, 0.0, 3.0]);
/// let x = DeviceBuffer::from_slice(&[1.0, 1.0, 1.0]);
/// let y = DeviceBuffer::filled(3, 0.0);
///
/// hybmv(
///     Some(&handle),
///     Operation::NoTranspose,
///     Some(&ScalarArg::Host(1.0)),
///     Some(&MatDescr::new()),
///     Some(&a),
///     Some(&x),
///     Some(&ScalarArg::Host(0.0)),
///     Some(&y),
/// )
/// .unwrap();
/// handle.synchronize().unwrap();
///
/// assert_eq!(y.to_vec(), vec![2.0, 0.0, 3.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn hybmv<T: Scalar>(
    handle: Option<&Handle>,
    trans: Operation,
    alpha: Option<&ScalarArg<T>>,
    descr: Option<&MatDescr>,
    hyb: Option<&HybMatrix<T>>,
    x: Option<&DeviceBuffer<T>>,
    beta: Option<&ScalarArg<T>>,
    y: Option<&DeviceBuffer<T>>,
) -> Result<()> {
    tracing::trace!(
        routine = T::ROUTINE,
        ?trans,
        ?alpha,
        ?descr,
        hyb = ?hyb.map(|a| (a.m, a.n, a.ell_width, a.ell_nnz, a.coo_nnz)),
        x = ?x.map(DeviceBuffer::as_ptr),
        ?beta,
        y = ?y.map(DeviceBuffer::as_ptr),
        "hybmv"
    );

    let args = match validate_hybmv(handle, alpha, descr, hyb, x, beta, y)? {
        Validation::QuickReturn => {
            tracing::debug!(routine = T::ROUTINE, "degenerate matrix, nothing to do");
            return Ok(());
        }
        Validation::Proceed(args) => args,
    };

    match trans {
        Operation::NoTranspose => hybmv_no_transpose(&args),
        Operation::Transpose | Operation::ConjugateTranspose => Err(SparseError::NotImplemented {
            feature: "transposed hybmv",
        }),
    }
}

fn hybmv_no_transpose<T: Scalar>(args: &ValidatedArgs<'_, T>) -> Result<()> {
    let handle = args.handle;
    let base = args.base.offset();

    // Host scalars can be inspected; device scalars cannot without a round trip.
    let host_beta = match handle.pointer_mode() {
        PointerMode::Host => {
            if let (Some(alpha), Some(beta)) = (args.alpha.host_value(), args.beta.host_value()) {
                if alpha.is_zero() && beta == T::one() {
                    tracing::debug!(routine = T::ROUTINE, "alpha == 0 and beta == 1, y unchanged");
                    return Ok(());
                }
            }
            args.beta.host_value()
        }
        PointerMode::Device => None,
    };

    // Scratch is reserved before anything is queued so that a failed
    // allocation leaves y untouched.
    let coo_stage = match args.coo {
        Some(coo) => Some(CooStage::allocate(handle, coo)?),
        None => None,
    };

    if let Some(ell) = args.ell {
        let config = ellmv_launch_config(handle.properties(), args.m);
        let kernel = EllmvKernel {
            m: args.m,
            n: args.n as i32,
            width: ell.width,
            base,
            alpha: args.alpha.clone(),
            beta: args.beta.clone(),
            col_ind: ell.col_ind.clone(),
            val: ell.val.clone(),
            x: args.x.clone(),
            y: args.y.clone(),
        };
        handle.launch("ellmvn", config, move || kernel.execute(config))?;
    } else if coo_stage.is_some() && host_beta != Some(T::one()) {
        let config = scale_launch_config(handle.properties(), args.m);
        let kernel = ScaleKernel {
            m: args.m,
            beta: args.beta.clone(),
            y: args.y.clone(),
        };
        handle.launch("scale_y", config, move || kernel.execute(config))?;
    }

    if let Some(stage) = coo_stage {
        stage.launch(args)?;
    }

    Ok(())
}

/// The COO kernels of one call together with their scratch buffers
struct CooStage<'a, T: Scalar> {
    coo: CooPart<'a, T>,
    plan: CooLaunchPlan,
    row_block_red: DeviceBuffer<i32>,
    val_block_red: DeviceBuffer<T>,
}

impl<'a, T: Scalar> CooStage<'a, T> {
    fn allocate(handle: &Handle, coo: CooPart<'a, T>) -> Result<Self> {
        let plan = CooLaunchPlan::new(handle.properties(), coo.nnz, COOMV_BLOCK_SIZE);
        tracing::debug!(
            nnz = coo.nnz,
            blocks = plan.blocks,
            warps = plan.warps,
            loops = plan.loops,
            "coo launch plan"
        );

        let row_block_red = handle.malloc::<i32>(plan.warps)?;
        let val_block_red = handle.malloc::<T>(plan.warps)?;
        Ok(Self {
            coo,
            plan,
            row_block_red,
            val_block_red,
        })
    }

    /// Queues the warp-reduce and block-reduce kernels
    ///
    /// The scratch buffers move into the queued kernels and are released
    /// once the block-reduce kernel has run.
    fn launch(self, args: &ValidatedArgs<'_, T>) -> Result<()> {
        let handle = args.handle;
        let plan = self.plan;

        let warp_kernel = CooWarpReduceKernel {
            plan,
            nnz: self.coo.nnz,
            base: args.base.offset(),
            alpha: args.alpha.clone(),
            row_ind: self.coo.row_ind.clone(),
            col_ind: self.coo.col_ind.clone(),
            val: self.coo.val.clone(),
            x: args.x.clone(),
            y: args.y.clone(),
            row_block_red: self.row_block_red.clone(),
            val_block_red: self.val_block_red.clone(),
        };
        handle.launch("coomvn_warp_reduce", plan.launch_config(), move || {
            warp_kernel.execute()
        })?;

        let block_kernel = CooBlockReduceKernel {
            warps: plan.warps,
            block_dim: plan.block_dim,
            row_block_red: self.row_block_red,
            val_block_red: self.val_block_red,
            y: args.y.clone(),
        };
        handle.launch("coomvn_block_reduce", block_kernel.launch_config(), move || {
            block_kernel.execute()
        })
    }
}

/// Single-precision hybmv, reporting a status code
#[allow(clippy::too_many_arguments)]
pub fn shybmv(
    handle: Option<&Handle>,
    trans: Operation,
    alpha: Option<&ScalarArg<f32>>,
    descr: Option<&MatDescr>,
    hyb: Option<&HybMatrix<f32>>,
    x: Option<&DeviceBuffer<f32>>,
    beta: Option<&ScalarArg<f32>>,
    y: Option<&DeviceBuffer<f32>>,
) -> Status {
    Status::from_result(hybmv(handle, trans, alpha, descr, hyb, x, beta, y))
}

/// Double-precision hybmv, reporting a status code
#[allow(clippy::too_many_arguments)]
pub fn dhybmv(
    handle: Option<&Handle>,
    trans: Operation,
    alpha: Option<&ScalarArg<f64>>,
    descr: Option<&MatDescr>,
    hyb: Option<&HybMatrix<f64>>,
    x: Option<&DeviceBuffer<f64>>,
    beta: Option<&ScalarArg<f64>>,
    y: Option<&DeviceBuffer<f64>>,
) -> Status {
    Status::from_result(hybmv(handle, trans, alpha, descr, hyb, x, beta, y))
}
