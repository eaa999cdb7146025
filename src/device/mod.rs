//! Simulated accelerator: execution handle, memory, and streams
//!
//! The device is modelled in-process. A `Handle` bundles the device
//! properties, the scalar pointer mode, an allocator with an optional byte
//! budget, and one ordered `Stream`. Kernels are closures queued on the
//! stream and executed with Rayon across blocks and warps.

pub mod config;
pub mod memory;
pub mod scalar;
pub mod stream;

use std::fmt;
use std::sync::Arc;

pub use config::{DeviceArchitecture, DeviceProperties, PointerMode};
pub use memory::{AtomicAdd, DeviceBuffer, DeviceRepr};
pub use scalar::{Scalar, ScalarArg};
pub use stream::{LaunchConfig, Stream};

use crate::error::{Result, SparseError};
use memory::MemoryTracker;

/// Execution context for sparse operations
pub struct Handle {
    properties: DeviceProperties,
    pointer_mode: PointerMode,
    memory: Arc<MemoryTracker>,
    stream: Stream,
}

impl Handle {
    /// Creates a handle for the default (host-sized) device
    pub fn new() -> Result<Self> {
        Self::with_properties(DeviceProperties::default())
    }

    /// Creates a handle for a device with the given properties
    pub fn with_properties(properties: DeviceProperties) -> Result<Self> {
        properties.validate()?;
        let memory = Arc::new(MemoryTracker::new(properties.memory_capacity));
        Ok(Self {
            properties,
            pointer_mode: PointerMode::default(),
            memory,
            stream: Stream::new()?,
        })
    }

    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    pub fn warp_size(&self) -> usize {
        self.properties.warp_size
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn set_pointer_mode(&mut self, mode: PointerMode) {
        self.pointer_mode = mode;
    }

    /// Allocates a zero-initialized device buffer charged to this handle
    pub fn malloc<T: DeviceRepr>(&self, len: usize) -> Result<DeviceBuffer<T>> {
        DeviceBuffer::tracked(len, &self.memory)
    }

    /// Bytes currently allocated through this handle
    pub fn memory_in_use(&self) -> usize {
        self.memory.in_use()
    }

    /// Queues a kernel on the handle's stream
    ///
    /// The launch geometry is checked immediately; the kernel itself runs
    /// later and any fault it raises is reported by `synchronize`.
    pub fn launch<F>(&self, kernel: &'static str, config: LaunchConfig, body: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if config.grid_dim == 0 {
            return Err(SparseError::LaunchFailure {
                kernel,
                reason: "empty grid".to_string(),
            });
        }
        if config.block_dim == 0 || config.block_dim > self.properties.max_threads_per_block {
            return Err(SparseError::LaunchFailure {
                kernel,
                reason: format!(
                    "block of {} threads outside 1..={}",
                    config.block_dim, self.properties.max_threads_per_block
                ),
            });
        }

        tracing::debug!(
            kernel,
            grid = config.grid_dim,
            block = config.block_dim,
            "queueing kernel"
        );
        self.stream.enqueue(kernel, body)
    }

    /// Waits for all queued work on the stream
    pub fn synchronize(&self) -> Result<()> {
        self.stream.synchronize()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("properties", &self.properties)
            .field("pointer_mode", &self.pointer_mode)
            .field("memory_in_use", &self.memory_in_use())
            .finish()
    }
}
