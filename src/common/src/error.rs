//! System-wide error types for cgaterm.

use core::fmt;

/// Console subsystem error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConsoleError {
    /// The reading context was marked for termination while it waited.
    Killed,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Killed => write!(f, "reader killed while waiting for input"),
        }
    }
}

/// Character-device dispatch error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceError {
    /// No device is registered under the major number.
    NoSuchDevice(u16),
    /// The console device failed.
    Console(ConsoleError),
}

impl From<ConsoleError> for DeviceError {
    fn from(value: ConsoleError) -> Self {
        DeviceError::Console(value)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoSuchDevice(major) => write!(f, "no device with major {}", major),
            DeviceError::Console(e) => write!(f, "console error: {}", e),
        }
    }
}
