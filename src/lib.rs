//! # HYBMV: Hybrid sparse matrix-vector multiplication
//!
//! HYBMV computes `y = alpha * A * x + beta * y` for a sparse matrix `A`
//! stored in hybrid (HYB) format: a fixed-width ELL block for the regular
//! part of each row plus a COO block for the overflow.
//!
//! ## Overview
//!
//! The operation runs on a simulated massively parallel accelerator:
//!
//! - A `Handle` carries the device properties, the scalar pointer mode and
//!   one ordered, asynchronous stream
//! - Device memory is shared buffers of atomic cells
//! - Kernels execute across blocks and warps with Rayon
//!
//! ## Algorithm Components
//!
//! 1. **Validation**: handle, descriptor, matrix structure and operand
//!    checks, plus the degenerate-size quick return.
//!
//! 2. **ELL kernel**: one thread per row, fused with the `beta` scaling.
//!
//! 3. **COO reduction**:
//!    - **Warp-reduce**: lock-step segmented reduction over each warp's slice
//!    - **Block-reduce**: single-block merge of the per-warp carries
//!
//! ## Usage
//!
//! ```
//! use hybmv::{dhybmv, Handle, HybMatrix, MatDescr, Operation, DeviceBuffer, ScalarArg, Status};
//!
//! let handle = Handle::new().unwrap();
//! // [1 2]
//! // [0 3]
//! let a = HybMatrix::new(2, 2)
//!     .with_ell(1, &[0, 1], &[1.0, 3.0])
//!     .with_coo(&[0], &[1], &[2.0]);
//! let x = DeviceBuffer::from_slice(&[1.0, 1.0]);
//! let y = DeviceBuffer::filled(2, 0.0);
//!
//! let status = dhybmv(
//!     Some(&handle),
//!     Operation::NoTranspose,
//!     Some(&ScalarArg::Host(1.0)),
//!     Some(&MatDescr::new()),
//!     Some(&a),
//!     Some(&x),
//!     Some(&ScalarArg::Host(0.0)),
//!     Some(&y),
//! );
//! assert_eq!(status, Status::Success);
//!
//! handle.synchronize().unwrap();
//! assert_eq!(y.to_vec(), vec![3.0, 3.0]);
//! ```

pub mod constants;
pub mod device;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod spmv;
pub mod utils;
pub mod validate;

// Re-export primary components
pub use device::{DeviceArchitecture, DeviceBuffer, DeviceProperties, Handle, PointerMode};
pub use device::{LaunchConfig, Scalar, ScalarArg};
pub use error::{Result, SparseError, Status};
pub use spmv::{dhybmv, hybmv, shybmv, Operation};
pub use kernels::CooLaunchPlan;
pub use matrix::{reference_hybmv, HybMatrix, HybPartition, IndexBase, MatDescr, MatrixType, SparseMatrixHYB};
pub use utils::{to_dense, to_sprs_csr};
pub use validate::{validate_hybmv, Validation};

/// Version information for the HYBMV library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
