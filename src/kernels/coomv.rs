//! COO part, stage one: warp-level segmented reduction
//!
//! The COO entries are split into contiguous slices, one per warp. A warp
//! walks its slice `loops` passes at a time, `warp_size` entries per pass,
//! reducing runs of equal rows in lock-step. Completed runs are added to `y`
//! atomically; the run still open when the warp finishes is written to the
//! warp's slot in the scratch buffers for the block-reduce stage.

use rayon::prelude::*;

use crate::constants::EMPTY_ROW;
use crate::device::{DeviceBuffer, DeviceProperties, LaunchConfig, Scalar, ScalarArg};
use crate::kernels::device_index;
use crate::kernels::segmented::SegmentedReducer;

/// Grid geometry for the COO warp-reduce stage
///
/// A pure function of the device properties, the entry count and the
/// requested block size, so it can be tested without launching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooLaunchPlan {
    /// Lanes per warp
    pub warp_size: usize,
    /// Threads per block, a multiple of `warp_size`
    pub block_dim: usize,
    /// Blocks in the grid
    pub blocks: usize,
    /// Warps in the grid, and slots in each scratch buffer
    pub warps: usize,
    /// Passes each warp makes over its slice
    pub loops: usize,
}

impl CooLaunchPlan {
    /// Sizes the grid for `nnz` entries
    ///
    /// The grid is capped at what the device can keep resident
    /// (`multiprocessor_count * max_threads_per_block` threads) and at what
    /// `nnz` needs; the pass count then stretches the warps over all entries.
    pub fn new(props: &DeviceProperties, nnz: usize, block_size: usize) -> Self {
        let warp_size = props.warp_size;
        let limit = block_size.min(props.max_threads_per_block);
        let block_dim = (limit / warp_size).max(1) * warp_size;

        let max_blocks =
            (props.multiprocessor_count * props.max_threads_per_block - 1) / block_dim + 1;
        let min_blocks = nnz.saturating_sub(1) / block_dim + 1;

        let blocks = max_blocks.min(min_blocks);
        let warps = blocks * (block_dim / warp_size);
        let loops = (nnz / warp_size + 1) / warps + 1;

        Self {
            warp_size,
            block_dim,
            blocks,
            warps,
            loops,
        }
    }

    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig::new(self.blocks, self.block_dim)
    }

    /// Entries the grid can visit across all passes
    pub fn capacity(&self) -> usize {
        self.warps * self.loops * self.warp_size
    }
}

pub(crate) struct CooWarpReduceKernel<T: Scalar> {
    pub plan: CooLaunchPlan,
    pub nnz: usize,
    pub base: i32,
    pub alpha: ScalarArg<T>,
    pub row_ind: DeviceBuffer<i32>,
    pub col_ind: DeviceBuffer<i32>,
    pub val: DeviceBuffer<T>,
    pub x: DeviceBuffer<T>,
    pub y: DeviceBuffer<T>,
    pub row_block_red: DeviceBuffer<i32>,
    pub val_block_red: DeviceBuffer<T>,
}

impl<T: Scalar> CooWarpReduceKernel<T> {
    pub(crate) fn execute(&self) {
        let alpha = self.alpha.load();
        (0..self.plan.warps)
            .into_par_iter()
            .for_each(|wid| self.run_warp(wid, alpha));
    }

    fn run_warp(&self, wid: usize, alpha: T) {
        let warp_size = self.plan.warp_size;
        self.row_block_red.set(wid, EMPTY_ROW);
        self.val_block_red.set(wid, T::zero());

        let offset = wid * self.plan.loops * warp_size;
        if offset >= self.nnz {
            return;
        }

        let mut reducer = SegmentedReducer::new(warp_size);
        for pass in 0..self.plan.loops {
            let start = offset + pass * warp_size;
            reducer.pass(
                |lane| self.load_entry(start + lane, alpha),
                |row, val| self.y.atomic_add(row, val),
            );
        }

        if let Some((row, val)) = reducer.finish() {
            self.row_block_red.set(wid, row as i32);
            self.val_block_red.set(wid, val);
        }
    }

    fn load_entry(&self, idx: usize, alpha: T) -> (Option<usize>, T) {
        if idx >= self.nnz {
            return (None, T::zero());
        }
        let row = device_index(self.row_ind.get(idx), self.base);
        let col = device_index(self.col_ind.get(idx), self.base);
        (Some(row), alpha * self.val.get(idx) * self.x.get(col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(warp_size: usize, max_threads: usize, mps: usize) -> DeviceProperties {
        DeviceProperties {
            warp_size,
            max_threads_per_block: max_threads,
            multiprocessor_count: mps,
            memory_capacity: None,
        }
    }

    #[test]
    fn test_plan_small_nnz_uses_one_block() {
        let plan = CooLaunchPlan::new(&props(64, 1024, 60), 100, 128);
        assert_eq!(plan.block_dim, 128);
        assert_eq!(plan.blocks, 1);
        assert_eq!(plan.warps, 2);
        // (100/64 + 1) / 2 + 1
        assert_eq!(plan.loops, 2);
        assert!(plan.capacity() >= 100);
    }

    #[test]
    fn test_plan_capped_by_occupancy() {
        let device = props(32, 128, 1);
        let plan = CooLaunchPlan::new(&device, 10_000, 128);
        assert_eq!(plan.blocks, 1);
        assert_eq!(plan.warps, 4);
        assert_eq!(plan.loops, (10_000 / 32 + 1) / 4 + 1);
        assert!(plan.capacity() >= 10_000);
    }

    #[test]
    fn test_plan_always_covers_nnz() {
        for &(ws, mt, mp) in &[(32, 1024, 80), (64, 1024, 60), (32, 64, 2), (64, 64, 1)] {
            let device = props(ws, mt, mp);
            for nnz in [1, 31, 32, 33, 127, 128, 129, 4095, 65_537, 1_000_003] {
                let plan = CooLaunchPlan::new(&device, nnz, 128);
                assert_eq!(plan.block_dim % ws, 0);
                assert!(plan.block_dim <= mt);
                assert!(plan.capacity() >= nnz, "plan {:?} misses entries for nnz {}", plan, nnz);
            }
        }
    }

    #[test]
    fn test_block_dim_never_below_warp() {
        let plan = CooLaunchPlan::new(&props(64, 1024, 4), 10, 16);
        assert_eq!(plan.block_dim, 64);
    }
}
