//! Error types for hybmv

use thiserror::Error;

/// Result type alias using hybmv's SparseError
pub type Result<T> = std::result::Result<T, SparseError>;

/// Errors that can occur while validating or executing a sparse operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseError {
    /// The execution handle is absent
    #[error("Invalid handle")]
    InvalidHandle,

    /// A required pointer argument is absent or unusable
    #[error("Invalid pointer: {arg}")]
    InvalidPointer {
        /// The argument name
        arg: &'static str,
    },

    /// An enumerated argument holds an illegal value
    #[error("Invalid value for '{arg}': {value}")]
    InvalidValue {
        /// The argument name
        arg: &'static str,
        /// The rejected raw value
        value: i64,
    },

    /// A size argument is negative or inconsistent with its array
    #[error("Invalid size for '{arg}': {value}")]
    InvalidSize {
        /// The argument name
        arg: &'static str,
        /// The rejected size
        value: i64,
    },

    /// Operation valid but not supported by this implementation
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unsupported feature
        feature: &'static str,
    },

    /// Device allocation failed
    #[error("Device memory error: failed to allocate {requested} bytes")]
    MemoryError {
        /// Requested size in bytes
        requested: usize,
    },

    /// A kernel could not be queued
    #[error("Launch of kernel '{kernel}' failed: {reason}")]
    LaunchFailure {
        /// The kernel name
        kernel: &'static str,
        /// Reason for the failure
        reason: String,
    },

    /// A queued kernel faulted while executing
    #[error("Kernel '{kernel}' faulted: {message}")]
    KernelFault {
        /// The kernel name
        kernel: &'static str,
        /// Fault message captured from the device
        message: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status codes reported by the precision-specific entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidHandle,
    NotImplemented,
    InvalidPointer,
    InvalidSize,
    MemoryError,
    InternalError,
    InvalidValue,
    LaunchFailure,
}

impl SparseError {
    /// Map this error onto its status code
    pub fn status(&self) -> Status {
        match self {
            SparseError::InvalidHandle => Status::InvalidHandle,
            SparseError::InvalidPointer { .. } => Status::InvalidPointer,
            SparseError::InvalidValue { .. } => Status::InvalidValue,
            SparseError::InvalidSize { .. } => Status::InvalidSize,
            SparseError::NotImplemented { .. } => Status::NotImplemented,
            SparseError::MemoryError { .. } => Status::MemoryError,
            SparseError::LaunchFailure { .. } => Status::LaunchFailure,
            SparseError::KernelFault { .. } | SparseError::Internal(_) => Status::InternalError,
        }
    }
}

impl Status {
    /// Collapse a result into a status code
    pub fn from_result<T>(result: Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl<T> From<Result<T>> for Status {
    fn from(result: Result<T>) -> Self {
        Status::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SparseError::InvalidHandle.status(), Status::InvalidHandle);
        assert_eq!(
            SparseError::InvalidPointer { arg: "x" }.status(),
            Status::InvalidPointer
        );
        assert_eq!(
            SparseError::KernelFault {
                kernel: "ellmvn",
                message: "oob".to_string()
            }
            .status(),
            Status::InternalError
        );
        assert_eq!(Status::from_result::<()>(Ok(())), Status::Success);
        assert!(!Status::from(Err::<(), _>(SparseError::MemoryError { requested: 8 })).is_success());
    }

    #[test]
    fn test_display() {
        let e = SparseError::InvalidSize { arg: "m", value: -1 };
        assert_eq!(e.to_string(), "Invalid size for 'm': -1");
    }
}
