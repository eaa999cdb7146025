//! COO part, stage two: single-block merge of the per-warp carries
//!
//! Runs as its own launch, so every warp of stage one has finished writing
//! the scratch buffers before any carry is read. The carries are already
//! scaled by alpha.

use crate::device::{DeviceBuffer, LaunchConfig, Scalar};
use crate::kernels::segmented::SegmentedReducer;

pub(crate) struct CooBlockReduceKernel<T: Scalar> {
    pub warps: usize,
    pub block_dim: usize,
    pub row_block_red: DeviceBuffer<i32>,
    pub val_block_red: DeviceBuffer<T>,
    pub y: DeviceBuffer<T>,
}

impl<T: Scalar> CooBlockReduceKernel<T> {
    pub(crate) fn launch_config(&self) -> LaunchConfig {
        LaunchConfig::new(1, self.block_dim)
    }

    pub(crate) fn execute(&self) {
        if self.warps == 0 {
            return;
        }

        let mut reducer = SegmentedReducer::new(self.block_dim);
        for start in (0..self.warps).step_by(self.block_dim) {
            reducer.pass(
                |tid| self.load_carry(start + tid),
                |row, val| self.y.atomic_add(row, val),
            );
        }

        if let Some((row, val)) = reducer.finish() {
            self.y.atomic_add(row, val);
        }
    }

    fn load_carry(&self, slot: usize) -> (Option<usize>, T) {
        if slot >= self.warps {
            return (None, T::zero());
        }
        // Empty slots hold a negative row.
        let row = usize::try_from(self.row_block_red.get(slot)).ok();
        (row, self.val_block_red.get(slot))
    }
}
