//! Single-context scheduler for the boot processor.
//!
//! There is exactly one thread of control besides interrupt handlers, so
//! sleeping means halting until an interrupt handler wakes the channel.

use core::arch::asm;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cgaterm_hal::{Cpu, Scheduler, WaitChannel};
use x86_64::instructions::interrupts;

/// Return addresses are only followed this far up the stack.
const STACK_LIMIT: usize = 0x0000_8000_0000_0000;

/// Scheduler and processor of the boot context.
pub struct IdleScheduler {
    /// channel the boot context sleeps on, 0 when running
    waiting: AtomicUsize,
    woken: AtomicBool,
}

impl IdleScheduler {
    /// Creates the scheduler for the boot context.
    pub const fn new() -> Self {
        Self {
            waiting: AtomicUsize::new(0),
            woken: AtomicBool::new(false),
        }
    }
}

impl Default for IdleScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for IdleScheduler {
    fn sleep(&self, channel: WaitChannel, release: &mut dyn FnMut()) {
        self.woken.store(false, Ordering::SeqCst);
        self.waiting.store(channel.as_usize(), Ordering::SeqCst);
        release();

        loop {
            interrupts::disable();
            if self.woken.load(Ordering::SeqCst) {
                break;
            }
            // Atomically re-enables interrupts and waits, so a wakeup cannot
            // slip in between the check and the halt.
            interrupts::enable_and_hlt();
        }
        self.waiting.store(0, Ordering::SeqCst);
    }

    fn wakeup(&self, channel: WaitChannel) {
        if self.waiting.load(Ordering::SeqCst) == channel.as_usize() {
            self.woken.store(true, Ordering::SeqCst);
        }
    }

    fn termination_requested(&self) -> bool {
        false
    }

    fn dump(&self) {
        let waiting = self.waiting.load(Ordering::SeqCst);
        if waiting == 0 {
            crate::serial_println!("0 boot run");
        } else {
            crate::serial_println!("0 boot sleep {:#x}", waiting);
        }
    }
}

impl Cpu for IdleScheduler {
    fn id(&self) -> u32 {
        0
    }

    fn caller_pcs(&self, pcs: &mut [usize]) {
        let mut frame: usize;
        // SAFETY: reading rbp has no side effects.
        unsafe { asm!("mov {}, rbp", out(reg) frame, options(nomem, nostack)) };

        for pc in pcs.iter_mut() {
            if frame == 0 || frame >= STACK_LIMIT || frame % 8 != 0 {
                *pc = 0;
                continue;
            }
            // SAFETY: the kernel is built with frame pointers, so rbp heads a
            // chain of (saved rbp, return address) pairs. The checks above
            // stop at the end of the chain.
            unsafe {
                let record = frame as *const usize;
                *pc = *record.add(1);
                frame = *record;
            }
        }
    }

    fn disable_interrupts(&self) {
        interrupts::disable();
    }

    fn halt(&self) -> ! {
        interrupts::disable();
        super::halt_loop()
    }
}
