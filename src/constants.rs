//! Centralized constants for the HYBMV library
//!
//! This module contains all hardcoded constants used throughout the codebase.
//! All new constants should be added here rather than scattered throughout the code.
//! Constants are organized by category for easy reference and maintenance.

// ============================================================================
// KERNEL LAUNCH CONSTANTS
// ============================================================================

/// Threads per block for the ELL row kernel
pub const ELLMV_BLOCK_SIZE: usize = 512;

/// Threads per block for the COO warp-reduce and block-reduce kernels
pub const COOMV_BLOCK_SIZE: usize = 128;

/// Threads per block for the standalone `y = beta * y` kernel
pub const SCALE_BLOCK_SIZE: usize = 512;

// ============================================================================
// DEVICE ARCHITECTURE CONSTANTS
// ============================================================================

/// Wavefront width on AMD GCN/CDNA devices
pub const AMD_WARP_SIZE: usize = 64;

/// Warp width on NVIDIA devices
pub const NVIDIA_WARP_SIZE: usize = 32;

/// Warp width used by the generic host simulation
pub const GENERIC_WARP_SIZE: usize = 32;

/// Maximum threads per block, shared by all presets
pub const DEFAULT_MAX_THREADS_PER_BLOCK: usize = 1024;

/// Compute units on a typical AMD datacenter part
pub const AMD_MULTIPROCESSOR_COUNT: usize = 60;

/// Streaming multiprocessors on a typical NVIDIA datacenter part
pub const NVIDIA_MULTIPROCESSOR_COUNT: usize = 80;

// ============================================================================
// INDEXING CONSTANTS
// ============================================================================

/// Row value marking an empty slot in the reduction scratch buffers
pub const EMPTY_ROW: i32 = -1;
