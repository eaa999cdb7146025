//! `y = beta * y`, for matrices without an ELL part

use rayon::prelude::*;

use crate::constants::SCALE_BLOCK_SIZE;
use crate::device::{DeviceBuffer, DeviceProperties, LaunchConfig, Scalar, ScalarArg};

pub(crate) fn scale_launch_config(props: &DeviceProperties, m: usize) -> LaunchConfig {
    LaunchConfig::for_items(m, SCALE_BLOCK_SIZE.min(props.max_threads_per_block))
}

pub(crate) struct ScaleKernel<T: Scalar> {
    pub m: usize,
    pub beta: ScalarArg<T>,
    pub y: DeviceBuffer<T>,
}

impl<T: Scalar> ScaleKernel<T> {
    pub(crate) fn execute(&self, config: LaunchConfig) {
        let beta = self.beta.load();
        (0..config.grid_dim).into_par_iter().for_each(|block| {
            let start = block * config.block_dim;
            let end = (start + config.block_dim).min(self.m);
            for row in start..end {
                let scaled = if beta.is_zero() {
                    T::zero()
                } else {
                    beta * self.y.get(row)
                };
                self.y.set(row, scaled);
            }
        });
    }
}
