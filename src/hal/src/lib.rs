//! cgaterm Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines the narrow interfaces the console core consumes so that
//! it can run against real x86 hardware or against in-memory fakes.

#![no_std]

/// Trait for a serial port or similar character-based communication channel.
pub trait Serial {
    /// Writes a single byte to the serial port.
    fn write_byte(&mut self, byte: u8);
}

/// Byte-granular access to I/O ports.
pub trait PortIo {
    /// Reads one byte from `port`.
    fn read_port(&mut self, port: u16) -> u8;
    /// Writes one byte to `port`.
    fn write_port(&mut self, port: u16, value: u8);
}

/// A memory-mapped text-mode character grid.
///
/// Cells are addressed by linear offset (`row * columns + column`) and hold
/// the character in the low byte and the attribute in the high byte.
pub trait TextBuffer {
    /// Reads the cell at `offset`.
    fn read_cell(&self, offset: usize) -> u16;
    /// Writes the cell at `offset`.
    fn write_cell(&mut self, offset: usize, cell: u16);
}

/// Trait for controlling interrupts.
pub trait InterruptController {
    /// Globally enables interrupts.
    fn enable(&mut self);
    /// Signals the end of an interrupt to the controller.
    fn end_of_interrupt(&mut self, irq: u8);
}

/// The processor executing the current context.
pub trait Cpu {
    /// Identifier of the current processor.
    fn id(&self) -> u32;
    /// Fills `pcs` with the return addresses of the calling frames, zeroing
    /// the entries past the end of the chain.
    fn caller_pcs(&self, pcs: &mut [usize]);
    /// Masks interrupts on the current processor.
    fn disable_interrupts(&self);
    /// Stops the current processor forever.
    fn halt(&self) -> !;
}

/// Identity of a condition a context can sleep on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitChannel(usize);

impl WaitChannel {
    /// Channel keyed by the address of `object`.
    pub fn of<T>(object: &T) -> Self {
        WaitChannel(object as *const T as usize)
    }

    /// Returns the raw token.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Blocking primitives supplied by the scheduler.
pub trait Scheduler {
    /// Parks the calling context on `channel`.
    ///
    /// The context must be registered as a waiter before `release` runs, so a
    /// `wakeup` issued after `release` returns is never lost. Returning does
    /// not imply the awaited condition holds; callers re-test it.
    fn sleep(&self, channel: WaitChannel, release: &mut dyn FnMut());
    /// Makes every context sleeping on `channel` runnable.
    fn wakeup(&self, channel: WaitChannel);
    /// Returns true once the calling context has been marked for termination.
    fn termination_requested(&self) -> bool;
    /// Prints a listing of the scheduler's contexts.
    fn dump(&self);
}
