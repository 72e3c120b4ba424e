//! VGA text mode hardware for x86_64.
//!
//! Exposes the text buffer at 0xB8000, the CRT controller ports and COM1 to
//! the console through the HAL traits.

use core::ptr;

use cgaterm_hal::{PortIo, Serial, TextBuffer};
use x86_64::instructions::port::Port;

use crate::console::display::CELLS;

/// VGA text buffer memory-mapped I/O address.
const VGA_BUFFER_ADDR: usize = 0xB8000;

/// Console hardware of a PC: the color text buffer, its CRT controller and
/// the first serial port.
pub struct PcHardware {
    /// SAFETY: valid for the lifetime of the kernel. The VGA buffer at
    /// 0xB8000 is always mapped by the bootloader.
    buffer: *mut u16,
}

// SAFETY: PcHardware only accesses the VGA buffer through volatile operations.
// The buffer is memory-mapped hardware that exists for the kernel's lifetime.
// Access is synchronized through the console lock.
unsafe impl Send for PcHardware {}

impl PcHardware {
    /// Takes over the text buffer.
    ///
    /// # Safety
    ///
    /// At most one `PcHardware` may exist.
    pub unsafe fn new() -> Self {
        PcHardware {
            buffer: VGA_BUFFER_ADDR as *mut u16,
        }
    }
}

impl TextBuffer for PcHardware {
    fn read_cell(&self, offset: usize) -> u16 {
        debug_assert!(offset < CELLS, "cell offset out of bounds");
        // SAFETY: the renderer only addresses cells inside the grid, which
        // lies entirely inside the mapped buffer. Volatile because the buffer
        // is memory-mapped I/O.
        unsafe { ptr::read_volatile(self.buffer.add(offset)) }
    }

    fn write_cell(&mut self, offset: usize, cell: u16) {
        debug_assert!(offset < CELLS, "cell offset out of bounds");
        // SAFETY: see read_cell.
        unsafe { ptr::write_volatile(self.buffer.add(offset), cell) }
    }
}

impl PortIo for PcHardware {
    fn read_port(&mut self, port: u16) -> u8 {
        // SAFETY: the console only touches the CRT controller ports, whose
        // reads have no side effects beyond the selected register.
        unsafe { Port::<u8>::new(port).read() }
    }

    fn write_port(&mut self, port: u16, value: u8) {
        // SAFETY: see read_port.
        unsafe { Port::<u8>::new(port).write(value) }
    }
}

impl Serial for PcHardware {
    fn write_byte(&mut self, byte: u8) {
        super::serial::SerialWrapper.write_byte(byte);
    }
}
