//! Shared helpers for the integration tests

#![allow(dead_code)]

use hybmv::{
    hybmv, DeviceBuffer, DeviceProperties, Handle, HybMatrix, IndexBase, MatDescr, Operation,
    ScalarArg,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A HYB matrix kept on the host with 0-based indices
#[derive(Clone, Debug)]
pub struct HostHyb {
    pub m: usize,
    pub n: usize,
    pub width: usize,
    /// Row-major ELL columns; None marks padding
    pub ell_col: Vec<Option<usize>>,
    pub ell_val: Vec<f64>,
    pub coo: Vec<(usize, usize, f64)>,
}

impl HostHyb {
    /// Uploads the matrix with the given index base
    ///
    /// Padding alternates between a negative column and a column past the
    /// end so both kinds of out-of-range slot are exercised.
    pub fn to_device(&self, base: IndexBase) -> HybMatrix<f64> {
        let offset = base.offset();
        let mut a = HybMatrix::new(self.m as i32, self.n as i32);

        if self.width > 0 {
            let cols: Vec<i32> = self
                .ell_col
                .iter()
                .enumerate()
                .map(|(idx, col)| match col {
                    Some(c) => *c as i32 + offset,
                    None if idx % 2 == 0 => -1,
                    None => self.n as i32 + offset,
                })
                .collect();
            a = a.with_ell(self.width as i32, &cols, &self.ell_val);
        }

        if !self.coo.is_empty() {
            let rows: Vec<i32> = self.coo.iter().map(|e| e.0 as i32 + offset).collect();
            let cols: Vec<i32> = self.coo.iter().map(|e| e.1 as i32 + offset).collect();
            let vals: Vec<f64> = self.coo.iter().map(|e| e.2).collect();
            a = a.with_coo(&rows, &cols, &vals);
        }

        a
    }

    /// The same matrix with its COO triples in a different order
    pub fn shuffled(&self, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut out = self.clone();
        out.coo.shuffle(&mut rng);
        out
    }

    /// Sequential `alpha * A * x + beta * y`
    pub fn expected(&self, alpha: f64, x: &[f64], beta: f64, y: &[f64]) -> Vec<f64> {
        let mut sums = vec![0.0; self.m];
        for (row, sum) in sums.iter_mut().enumerate() {
            for p in 0..self.width {
                let idx = row * self.width + p;
                if let Some(col) = self.ell_col[idx] {
                    *sum += self.ell_val[idx] * x[col];
                }
            }
        }
        for &(row, col, val) in &self.coo {
            sums[row] += val * x[col];
        }
        sums.iter()
            .zip(y)
            .map(|(s, yi)| if beta == 0.0 { alpha * s } else { alpha * s + beta * yi })
            .collect()
    }
}

/// Generates a random HYB matrix with small integer values
///
/// Integer values keep every partial sum exact, so results can be compared
/// bit-for-bit regardless of summation order. The first `width` entries of
/// each row go to the ELL part, the rest to the COO part in random order.
pub fn generate_hyb(m: usize, n: usize, width: usize, max_row_nnz: usize, seed: u64) -> HostHyb {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ell_col = vec![None; m * width];
    let mut ell_val = vec![0.0; m * width];
    let mut coo = Vec::new();

    for row in 0..m {
        let row_nnz = rng.gen_range(0..=max_row_nnz);
        for k in 0..row_nnz {
            let col = rng.gen_range(0..n);
            let val = rng.gen_range(-4..=4) as f64;
            if k < width {
                ell_col[row * width + k] = Some(col);
                ell_val[row * width + k] = val;
            } else {
                coo.push((row, col, val));
            }
        }
    }
    coo.shuffle(&mut rng);

    HostHyb {
        m,
        n,
        width,
        ell_col,
        ell_val,
        coo,
    }
}

/// A COO-only matrix with the given triples
pub fn coo_only(m: usize, n: usize, coo: Vec<(usize, usize, f64)>) -> HostHyb {
    HostHyb {
        m,
        n,
        width: 0,
        ell_col: Vec::new(),
        ell_val: Vec::new(),
        coo,
    }
}

/// Random small-integer vector
pub fn generate_vector(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-3..=3) as f64).collect()
}

/// A device small enough that modest matrices need many passes per warp
pub fn tiny_device(warp_size: usize) -> Handle {
    Handle::with_properties(DeviceProperties {
        warp_size,
        max_threads_per_block: 2 * warp_size,
        multiprocessor_count: 1,
        memory_capacity: None,
    })
    .unwrap()
}

/// Runs host-mode hybmv to completion and downloads y
pub fn run_host(
    handle: &Handle,
    alpha: f64,
    a: &HybMatrix<f64>,
    descr: &MatDescr,
    x: &[f64],
    beta: f64,
    y: &[f64],
) -> Vec<f64> {
    let x = DeviceBuffer::from_slice(x);
    let y = DeviceBuffer::from_slice(y);
    hybmv(
        Some(handle),
        Operation::NoTranspose,
        Some(&ScalarArg::Host(alpha)),
        Some(descr),
        Some(a),
        Some(&x),
        Some(&ScalarArg::Host(beta)),
        Some(&y),
    )
    .unwrap();
    handle.synchronize().unwrap();
    y.to_vec()
}

pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol * (1.0 + e.abs()),
            "row {}: got {}, expected {}",
            i,
            a,
            e
        );
    }
}
