//! Scalar precisions and the dual-mode scalar argument

use std::fmt;

use num_traits::Float;

use super::config::PointerMode;
use super::memory::{AtomicAdd, DeviceBuffer};

/// Floating-point precisions supported by the kernels
pub trait Scalar: Float + AtomicAdd + fmt::Debug + fmt::Display {
    /// Name of the precision-specific entry point, used in trace logs
    const ROUTINE: &'static str;
}

impl Scalar for f32 {
    const ROUTINE: &'static str = "shybmv";
}

impl Scalar for f64 {
    const ROUTINE: &'static str = "dhybmv";
}

/// A scalar operand (alpha or beta)
///
/// Host scalars are plain values the dispatcher may inspect. Device scalars
/// are addresses the host never dereferences; kernels read them at execution
/// time.
#[derive(Clone, Debug)]
pub enum ScalarArg<T: Scalar> {
    Host(T),
    Device(DeviceBuffer<T>),
}

impl<T: Scalar> ScalarArg<T> {
    /// The host value, if this scalar is host-resident
    pub fn host_value(&self) -> Option<T> {
        match self {
            ScalarArg::Host(value) => Some(*value),
            ScalarArg::Device(_) => None,
        }
    }

    /// Whether this argument can be interpreted under `mode`
    pub(crate) fn usable_in(&self, mode: PointerMode) -> bool {
        match (self, mode) {
            (ScalarArg::Host(_), PointerMode::Host) => true,
            (ScalarArg::Device(buf), PointerMode::Device) => !buf.is_empty(),
            _ => false,
        }
    }

    /// Reads the value from kernel code
    pub(crate) fn load(&self) -> T {
        match self {
            ScalarArg::Host(value) => *value,
            ScalarArg::Device(buf) => buf.get(0),
        }
    }
}

impl<T: Scalar> From<T> for ScalarArg<T> {
    fn from(value: T) -> Self {
        ScalarArg::Host(value)
    }
}

impl<T: Scalar> From<DeviceBuffer<T>> for ScalarArg<T> {
    fn from(buf: DeviceBuffer<T>) -> Self {
        ScalarArg::Device(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_in_pointer_mode() {
        let host = ScalarArg::Host(2.0f64);
        let device = ScalarArg::Device(DeviceBuffer::from_slice(&[3.0f64]));
        let dangling = ScalarArg::Device(DeviceBuffer::<f64>::from_slice(&[]));

        assert!(host.usable_in(PointerMode::Host));
        assert!(!host.usable_in(PointerMode::Device));
        assert!(device.usable_in(PointerMode::Device));
        assert!(!device.usable_in(PointerMode::Host));
        assert!(!dangling.usable_in(PointerMode::Device));
    }

    #[test]
    fn test_load() {
        assert_eq!(ScalarArg::from(1.5f32).load(), 1.5);
        let buf = DeviceBuffer::from_slice(&[4.0f32]);
        let arg = ScalarArg::from(buf.clone());
        assert_eq!(arg.host_value(), None);
        buf.set(0, 5.0);
        assert_eq!(arg.load(), 5.0);
    }
}
