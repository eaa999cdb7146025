//! Device kernels for hybrid matrix-vector multiplication
//!
//! - `ellmv`: row-parallel ELL kernel, also applies beta
//! - `scale`: standalone beta pass when there is no ELL part
//! - `coomv`: warp-level segmented reduction over the COO entries
//! - `block_reduce`: single-block merge of the per-warp carries
//!
//! Kernels are plain structs holding their arguments (device buffers are
//! cheap to clone) and are moved into the stream closure at launch.

pub(crate) mod block_reduce;
pub mod coomv;
pub mod ellmv;
pub(crate) mod scale;
pub(crate) mod segmented;

pub use coomv::CooLaunchPlan;
pub use ellmv::ellmv_launch_config;

/// Removes the index base from a stored index, faulting when the result is
/// negative or not representable
pub(crate) fn device_index(raw: i32, base: i32) -> usize {
    match raw.checked_sub(base).map(usize::try_from) {
        Some(Ok(i)) => i,
        _ => panic!("device memory access at invalid index {} (base {})", raw, base),
    }
}
