//! The kernel's console instance.
//!
//! Thread-context callers go through [`with_console`], which masks
//! interrupts for the duration so the keyboard handler never spins on a
//! lock held by the code it interrupted.

use core::fmt;
use core::panic::PanicInfo;

use spin::Once;
use x86_64::instructions::interrupts;

use super::sched::IdleScheduler;
use super::vga::PcHardware;
use crate::console::{Console, ConsoleConfig};

/// Console over the PC text screen.
pub type PcConsole = Console<PcHardware, IdleScheduler>;

static CONSOLE: Once<PcConsole> = Once::new();

/// Sets up the console. Idempotent.
pub fn init() {
    console();
}

/// Returns the console, creating it on first use.
pub fn console() -> &'static PcConsole {
    CONSOLE.call_once(|| {
        // SAFETY: guarded by the Once, this is the only PcHardware.
        let hw = unsafe { PcHardware::new() };
        Console::new(hw, IdleScheduler::new(), ConsoleConfig::default())
    })
}

/// Runs `f` on the console with interrupts masked.
pub fn with_console<R>(f: impl FnOnce(&'static PcConsole) -> R) -> R {
    interrupts::without_interrupts(|| f(console()))
}

/// Prints to the console without a newline.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the console with a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    with_console(|console| console.write_fmt(args));
}

/// Reports a Rust panic through the console's fatal path.
pub fn panic(info: &PanicInfo) -> ! {
    interrupts::disable();
    let console = console();
    // SAFETY: the panicking context may hold the lock and will never run
    // again. Interrupts are off from here on, so nothing else runs either.
    unsafe { console.break_lock() };
    console.panic(info)
}
