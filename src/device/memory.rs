//! Device memory: shared buffers of atomic cells
//!
//! Every device allocation is a reference-counted array of atomic cells, so
//! kernels running on many threads can read and update it through shared
//! references. Cloning a buffer copies the "pointer", not the data.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Result, SparseError};

/// Element types that can live in device memory
pub trait DeviceRepr: Copy + Default + Send + Sync + 'static {
    /// Atomic storage cell for one element
    type Cell: Send + Sync;

    fn new_cell(value: Self) -> Self::Cell;
    fn load(cell: &Self::Cell) -> Self;
    fn store(cell: &Self::Cell, value: Self);
}

/// Element types supporting device-side atomic accumulation
pub trait AtomicAdd: DeviceRepr {
    fn atomic_add(cell: &Self::Cell, value: Self);
}

impl DeviceRepr for i32 {
    type Cell = AtomicI32;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicI32::new(value)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed)
    }
}

impl AtomicAdd for i32 {
    fn atomic_add(cell: &Self::Cell, value: Self) {
        cell.fetch_add(value, Ordering::AcqRel);
    }
}

// Floats are stored as their bit patterns; addition is a CAS loop.
macro_rules! impl_float_repr {
    ($float:ty, $atomic:ty) => {
        impl DeviceRepr for $float {
            type Cell = $atomic;

            fn new_cell(value: Self) -> Self::Cell {
                <$atomic>::new(value.to_bits())
            }

            fn load(cell: &Self::Cell) -> Self {
                <$float>::from_bits(cell.load(Ordering::Relaxed))
            }

            fn store(cell: &Self::Cell, value: Self) {
                cell.store(value.to_bits(), Ordering::Relaxed)
            }
        }

        impl AtomicAdd for $float {
            fn atomic_add(cell: &Self::Cell, value: Self) {
                let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Relaxed, |bits| {
                    Some((<$float>::from_bits(bits) + value).to_bits())
                });
            }
        }
    };
}

impl_float_repr!(f32, AtomicU32);
impl_float_repr!(f64, AtomicU64);

/// Byte accounting for allocations made through a handle
#[derive(Debug)]
pub(crate) struct MemoryTracker {
    capacity: Option<usize>,
    in_use: AtomicUsize,
}

impl MemoryTracker {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            in_use: AtomicUsize::new(0),
        }
    }

    pub(crate) fn reserve(&self, bytes: usize) -> Result<()> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.checked_add(bytes)?;
                match self.capacity {
                    Some(capacity) if next > capacity => None,
                    _ => Some(next),
                }
            })
            .map(|_| ())
            .map_err(|_| SparseError::MemoryError { requested: bytes })
    }

    pub(crate) fn release(&self, bytes: usize) {
        self.in_use.fetch_sub(bytes, Ordering::AcqRel);
    }

    pub(crate) fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

struct Allocation<T: DeviceRepr> {
    cells: Box<[T::Cell]>,
    tracker: Option<Arc<MemoryTracker>>,
}

impl<T: DeviceRepr> Drop for Allocation<T> {
    fn drop(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.release(self.cells.len() * mem::size_of::<T>());
        }
    }
}

/// A buffer in (simulated) device memory
pub struct DeviceBuffer<T: DeviceRepr> {
    inner: Arc<Allocation<T>>,
}

impl<T: DeviceRepr> Clone for DeviceBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: DeviceRepr> DeviceBuffer<T> {
    /// Uploads host data into a new caller-owned buffer
    pub fn from_slice(data: &[T]) -> Self {
        Self::from_cells(data.iter().map(|&v| T::new_cell(v)).collect(), None)
    }

    /// Creates a caller-owned buffer of `len` copies of `value`
    pub fn filled(len: usize, value: T) -> Self {
        Self::from_cells((0..len).map(|_| T::new_cell(value)).collect(), None)
    }

    /// Creates a buffer whose bytes are charged to `tracker` until dropped
    pub(crate) fn tracked(len: usize, tracker: &Arc<MemoryTracker>) -> Result<Self> {
        let bytes = len
            .checked_mul(mem::size_of::<T>())
            .ok_or(SparseError::MemoryError { requested: usize::MAX })?;
        tracker.reserve(bytes)?;
        Ok(Self::from_cells(
            (0..len).map(|_| T::new_cell(T::default())).collect(),
            Some(Arc::clone(tracker)),
        ))
    }

    fn from_cells(cells: Box<[T::Cell]>, tracker: Option<Arc<MemoryTracker>>) -> Self {
        Self {
            inner: Arc::new(Allocation { cells, tracker }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.cells.is_empty()
    }

    /// Reads one element
    ///
    /// # Panics
    ///
    /// Panics on an out-of-bounds index. Inside a kernel this surfaces as a
    /// kernel fault on the next stream synchronization.
    pub fn get(&self, index: usize) -> T {
        T::load(self.cell(index))
    }

    /// Writes one element
    ///
    /// # Panics
    ///
    /// Panics on an out-of-bounds index.
    pub fn set(&self, index: usize, value: T) {
        T::store(self.cell(index), value)
    }

    /// Downloads the whole buffer to the host
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.cells.iter().map(T::load).collect()
    }

    /// Overwrites the buffer with host data of the same length
    pub fn copy_from_slice(&self, data: &[T]) -> Result<()> {
        if data.len() != self.len() {
            return Err(SparseError::InvalidSize {
                arg: "data",
                value: data.len() as i64,
            });
        }
        for (cell, &value) in self.inner.cells.iter().zip(data) {
            T::store(cell, value);
        }
        Ok(())
    }

    /// Address of the allocation, for tracing
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }

    /// Whether two buffers refer to the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn cell(&self, index: usize) -> &T::Cell {
        match self.inner.cells.get(index) {
            Some(cell) => cell,
            None => panic!(
                "device memory access out of bounds: index {} in buffer of length {}",
                index,
                self.len()
            ),
        }
    }
}

impl<T: AtomicAdd> DeviceBuffer<T> {
    /// Atomically adds `value` to one element
    ///
    /// # Panics
    ///
    /// Panics on an out-of-bounds index.
    pub fn atomic_add(&self, index: usize, value: T) {
        T::atomic_add(self.cell(index), value)
    }
}

impl<T: DeviceRepr> fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len", &self.len())
            .field("addr", &self.as_ptr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_round_trip() {
        let buf = DeviceBuffer::from_slice(&[1.5f32, -2.0, 3.25]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.get(1), -2.0);
        buf.set(1, 7.0);
        assert_eq!(buf.to_vec(), vec![1.5, 7.0, 3.25]);
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = DeviceBuffer::filled(4, 0i32);
        let b = a.clone();
        b.set(2, 9);
        assert_eq!(a.get(2), 9);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_concurrent_atomic_add() {
        let buf = DeviceBuffer::filled(1, 0.0f64);
        (0..10_000).into_par_iter().for_each(|_| buf.atomic_add(0, 0.5));
        assert_eq!(buf.get(0), 5_000.0);
    }

    #[test]
    #[should_panic(expected = "device memory access out of bounds")]
    fn test_out_of_bounds_read() {
        let buf = DeviceBuffer::filled(2, 0.0f32);
        buf.get(2);
    }

    #[test]
    fn test_tracker_capacity_and_release() {
        let tracker = Arc::new(MemoryTracker::new(Some(64)));
        let a = DeviceBuffer::<f64>::tracked(4, &tracker).unwrap();
        assert_eq!(tracker.in_use(), 32);
        assert_eq!(
            DeviceBuffer::<f64>::tracked(8, &tracker).unwrap_err(),
            SparseError::MemoryError { requested: 64 }
        );
        let alias = a.clone();
        drop(a);
        assert_eq!(tracker.in_use(), 32);
        drop(alias);
        assert_eq!(tracker.in_use(), 0);
    }

    #[test]
    fn test_copy_from_slice_length_mismatch() {
        let buf = DeviceBuffer::filled(3, 0.0f32);
        assert!(buf.copy_from_slice(&[1.0, 2.0]).is_err());
        buf.copy_from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(buf.to_vec(), vec![1.0, 2.0, 3.0]);
    }
}
