//! ELL part: one thread per output row

use rayon::prelude::*;

use crate::constants::ELLMV_BLOCK_SIZE;
use crate::device::{DeviceBuffer, DeviceProperties, LaunchConfig, Scalar, ScalarArg};
use crate::matrix::hyb::ell_column;

/// Launch geometry covering `m` rows with one thread each
pub fn ellmv_launch_config(props: &DeviceProperties, m: usize) -> LaunchConfig {
    LaunchConfig::for_items(m, ELLMV_BLOCK_SIZE.min(props.max_threads_per_block))
}

/// `y[i] = alpha * sum_p(val[i][p] * x[col[i][p]]) + beta * y[i]`
///
/// Each row is written by exactly one thread, so no synchronization is
/// needed. Slots whose column lies outside `[0, n)` are padding.
pub(crate) struct EllmvKernel<T: Scalar> {
    pub m: usize,
    pub n: i32,
    pub width: usize,
    pub base: i32,
    pub alpha: ScalarArg<T>,
    pub beta: ScalarArg<T>,
    pub col_ind: DeviceBuffer<i32>,
    pub val: DeviceBuffer<T>,
    pub x: DeviceBuffer<T>,
    pub y: DeviceBuffer<T>,
}

impl<T: Scalar> EllmvKernel<T> {
    pub(crate) fn execute(&self, config: LaunchConfig) {
        let alpha = self.alpha.load();
        let beta = self.beta.load();

        (0..config.grid_dim).into_par_iter().for_each(|block| {
            for tid in 0..config.block_dim {
                let row = block * config.block_dim + tid;
                if row >= self.m {
                    break;
                }
                self.row(row, alpha, beta);
            }
        });
    }

    fn row(&self, row: usize, alpha: T, beta: T) {
        let mut sum = T::zero();
        for p in 0..self.width {
            let idx = row * self.width + p;
            if let Some(col) = ell_column(self.col_ind.get(idx), self.base, self.n) {
                sum = sum + self.val.get(idx) * self.x.get(col);
            }
        }

        // beta == 0 overwrites so stale NaNs in y do not survive
        let result = if beta.is_zero() {
            alpha * sum
        } else {
            beta * self.y.get(row) + alpha * sum
        };
        self.y.set(row, result);
    }
}
