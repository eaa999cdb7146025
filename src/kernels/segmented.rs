//! Lock-step segmented reduction
//!
//! Both COO reduction stages run the same protocol over a group of lanes:
//! load one (row, value) per lane, fold in the carry from the previous pass,
//! run an inclusive segmented scan keyed on row, flush every segment that
//! closes inside the group, and carry the last lane's segment forward. A
//! warp uses it over its slice of COO entries, the merge block over the
//! per-warp carries.

use crate::device::Scalar;

/// Lane-sized buffers reused by every scan of a group
pub(crate) struct ScanScratch<T> {
    head: Vec<bool>,
    prev_head: Vec<bool>,
    prev_vals: Vec<T>,
}

impl<T: Scalar> ScanScratch<T> {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            head: vec![false; width],
            prev_head: vec![false; width],
            prev_vals: vec![T::zero(); width],
        }
    }
}

/// Inclusive segmented scan over lanes, in lock-step (Hillis-Steele) form
///
/// A segment is a maximal run of adjacent lanes with equal rows. After the
/// scan each lane holds the sum of its segment up to and including itself,
/// so the last lane of a segment holds the segment total. `scratch` must be
/// at least as wide as `rows`.
pub(crate) fn segmented_scan<T: Scalar>(
    rows: &[Option<usize>],
    vals: &mut [T],
    scratch: &mut ScanScratch<T>,
) {
    let width = rows.len();
    let head = &mut scratch.head[..width];
    let prev_head = &mut scratch.prev_head[..width];
    let prev_vals = &mut scratch.prev_vals[..width];

    for lane in 0..width {
        head[lane] = lane == 0 || rows[lane] != rows[lane - 1];
    }

    let mut stride = 1;
    while stride < width {
        // Every lane reads before any lane writes.
        prev_vals.copy_from_slice(vals);
        prev_head.copy_from_slice(head);
        for lane in stride..width {
            if !prev_head[lane] {
                vals[lane] = prev_vals[lane - stride] + prev_vals[lane];
            }
            head[lane] = prev_head[lane] || prev_head[lane - stride];
        }
        stride <<= 1;
    }
}

/// Per-group reduction state carried across passes
pub(crate) struct SegmentedReducer<T> {
    rows: Vec<Option<usize>>,
    vals: Vec<T>,
    scratch: ScanScratch<T>,
    carry: Option<(usize, T)>,
}

impl<T: Scalar> SegmentedReducer<T> {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            rows: vec![None; width],
            vals: vec![T::zero(); width],
            scratch: ScanScratch::new(width),
            carry: None,
        }
    }

    /// Runs one pass over all lanes
    ///
    /// `load(lane)` yields the lane's row (None for an idle lane) and value.
    /// `flush(row, value)` receives every completed segment.
    pub(crate) fn pass<L, F>(&mut self, load: L, flush: F)
    where
        L: Fn(usize) -> (Option<usize>, T),
        F: Fn(usize, T),
    {
        let width = self.rows.len();
        if width == 0 {
            return;
        }

        for lane in 0..width {
            let (row, val) = load(lane);
            self.rows[lane] = row;
            self.vals[lane] = val;
        }

        // Lane 0 continues or closes the segment left open by the previous pass.
        if let Some((row, val)) = self.carry.take() {
            if self.rows[0] == Some(row) {
                self.vals[0] = self.vals[0] + val;
            } else {
                flush(row, val);
            }
        }

        segmented_scan(&self.rows, &mut self.vals, &mut self.scratch);

        for lane in 0..width - 1 {
            if self.rows[lane] != self.rows[lane + 1] {
                if let Some(row) = self.rows[lane] {
                    flush(row, self.vals[lane]);
                }
            }
        }

        self.carry = self.rows[width - 1].map(|row| (row, self.vals[width - 1]));
    }

    /// The segment still open after the final pass
    pub(crate) fn finish(self) -> Option<(usize, T)> {
        self.carry
    }
}
