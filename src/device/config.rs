//! Device properties and execution-context configuration

use crate::constants::{
    AMD_MULTIPROCESSOR_COUNT, AMD_WARP_SIZE, DEFAULT_MAX_THREADS_PER_BLOCK,
    GENERIC_WARP_SIZE, NVIDIA_MULTIPROCESSOR_COUNT, NVIDIA_WARP_SIZE,
};
use crate::error::{Result, SparseError};

/// The accelerator family whose execution geometry is simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArchitecture {
    /// AMD GCN/CDNA with 64-wide wavefronts
    AmdGcn,
    /// NVIDIA with 32-wide warps
    Nvidia,
    /// Host simulation sized to the local CPU
    Generic,
}

impl DeviceArchitecture {
    /// Lanes per warp for this architecture
    pub fn warp_size(&self) -> usize {
        match self {
            DeviceArchitecture::AmdGcn => AMD_WARP_SIZE,
            DeviceArchitecture::Nvidia => NVIDIA_WARP_SIZE,
            DeviceArchitecture::Generic => GENERIC_WARP_SIZE,
        }
    }

    /// Maximum threads a single block may hold
    pub fn max_threads_per_block(&self) -> usize {
        DEFAULT_MAX_THREADS_PER_BLOCK
    }

    /// Number of multiprocessors (compute units) on the device
    pub fn multiprocessor_count(&self) -> usize {
        match self {
            DeviceArchitecture::AmdGcn => AMD_MULTIPROCESSOR_COUNT,
            DeviceArchitecture::Nvidia => NVIDIA_MULTIPROCESSOR_COUNT,
            DeviceArchitecture::Generic => num_cpus::get(),
        }
    }
}

/// Where scalar operands (alpha, beta) live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    /// Scalars are host values and may be inspected before launching
    #[default]
    Host,
    /// Scalars are device addresses and may only be read by kernels
    Device,
}

/// Device capabilities consulted when sizing kernel grids
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProperties {
    /// Lanes per warp
    pub warp_size: usize,

    /// Maximum threads per block
    pub max_threads_per_block: usize,

    /// Number of multiprocessors
    pub multiprocessor_count: usize,

    /// Device memory budget in bytes for allocations made through the handle
    /// If None, allocations never fail
    pub memory_capacity: Option<usize>,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self::for_architecture(DeviceArchitecture::Generic)
    }
}

impl DeviceProperties {
    /// Properties of a representative device of the given architecture
    pub fn for_architecture(arch: DeviceArchitecture) -> Self {
        Self {
            warp_size: arch.warp_size(),
            max_threads_per_block: arch.max_threads_per_block(),
            multiprocessor_count: arch.multiprocessor_count(),
            memory_capacity: None,
        }
    }

    /// Checks that the geometry can host the hybmv kernels
    ///
    /// The warp size must be a power of two and the block limit a positive
    /// multiple of it.
    pub fn validate(&self) -> Result<()> {
        if !self.warp_size.is_power_of_two() {
            return Err(SparseError::InvalidValue {
                arg: "warp_size",
                value: self.warp_size as i64,
            });
        }
        if self.max_threads_per_block < self.warp_size
            || self.max_threads_per_block % self.warp_size != 0
        {
            return Err(SparseError::InvalidValue {
                arg: "max_threads_per_block",
                value: self.max_threads_per_block as i64,
            });
        }
        if self.multiprocessor_count == 0 {
            return Err(SparseError::InvalidValue {
                arg: "multiprocessor_count",
                value: 0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for arch in [
            DeviceArchitecture::AmdGcn,
            DeviceArchitecture::Nvidia,
            DeviceArchitecture::Generic,
        ] {
            let props = DeviceProperties::for_architecture(arch);
            assert!(props.validate().is_ok(), "{:?} preset should be valid", arch);
            assert_eq!(props.warp_size, arch.warp_size());
        }
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut props = DeviceProperties::default();
        props.warp_size = 48;
        assert!(matches!(
            props.validate(),
            Err(SparseError::InvalidValue { arg: "warp_size", .. })
        ));

        let mut props = DeviceProperties::default();
        props.max_threads_per_block = props.warp_size + 1;
        assert!(matches!(
            props.validate(),
            Err(SparseError::InvalidValue { arg: "max_threads_per_block", .. })
        ));

        let mut props = DeviceProperties::default();
        props.multiprocessor_count = 0;
        assert!(props.validate().is_err());
    }

    #[test]
    fn test_default_pointer_mode() {
        assert_eq!(PointerMode::default(), PointerMode::Host);
    }
}
