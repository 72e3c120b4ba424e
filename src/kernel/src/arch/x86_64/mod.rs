//! x86_64 architecture support.
//!
//! Provides the text-mode console hardware, serial logging, keyboard
//! decoding and interrupt handling for PCs.

pub mod console;
pub mod interrupts;
pub mod keyboard;
pub mod pic;
pub mod sched;
pub mod serial;
pub mod vga;

pub use console::{console, with_console, PcConsole};
pub use serial::SERIAL;

/// Halts the CPU until the next interrupt.
///
/// Used in idle loops to reduce power consumption.
#[inline]
pub fn hlt() {
    x86_64::instructions::hlt();
}

/// Halts the CPU in an infinite loop.
///
/// Used after unrecoverable errors (panics).
pub fn halt_loop() -> ! {
    loop {
        hlt();
    }
}

/// Brings up logging, the heap, the console and interrupts, in that order.
pub fn init() {
    serial::init();
    serial::init_logger();
    crate::allocator::init_heap();
    keyboard::init();
    console::init();
    log::info!("console ready");
    interrupts::init_idt();
    log::info!("interrupts enabled");
}
