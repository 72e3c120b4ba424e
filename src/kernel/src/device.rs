//! Character device dispatch.
//!
//! Devices are picked by major number. The console is the only one.

use cgaterm_common::error::DeviceError;

use crate::console::{Console, ConsoleHardware, Platform};

/// Major number of the console device.
pub const CONSOLE_MAJOR: u16 = 1;

/// An opened character device.
pub enum Device<'a, H, P> {
    /// The keyboard and screen console.
    Console(&'a Console<H, P>),
}

impl<'a, H: ConsoleHardware, P: Platform> Device<'a, H, P> {
    /// Opens the device registered under `major`.
    pub fn open(major: u16, console: &'a Console<H, P>) -> Result<Self, DeviceError> {
        match major {
            CONSOLE_MAJOR => Ok(Device::Console(console)),
            _ => Err(DeviceError::NoSuchDevice(major)),
        }
    }

    /// Reads from the device into `dst`.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, DeviceError> {
        match self {
            Device::Console(console) => Ok(console.read(dst)?),
        }
    }

    /// Writes `src` to the device.
    pub fn write(&self, src: &[u8]) -> Result<usize, DeviceError> {
        match self {
            Device::Console(console) => Ok(console.write(src)),
        }
    }
}
