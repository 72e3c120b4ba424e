//! Console device: keyboard line discipline and text-mode output.
//!
//! All mutable console state sits behind one spin lock. Keystrokes arrive
//! through [`Console::interrupt`], are edited into the input ring and echoed,
//! and committed lines wake readers blocked in [`Console::read`]. Output from
//! [`Console::write`] and the formatted-output entry points goes straight to
//! the renderer. A fatal error prints a trace through [`Console::panic`] and
//! leaves the console poisoned: every later use halts the calling processor.

mod chord;
pub mod display;
pub mod format;
mod overlay;
pub mod ring;

pub use display::{Glyph, COLS, ROWS};
pub use format::Arg;
pub use ring::INPUT_BUF_SIZE;

use core::fmt::{self, Write as _};
use core::sync::atomic::{AtomicBool, Ordering};

use cgaterm_common::attribute::Attribute;
use cgaterm_common::error::ConsoleError;
use cgaterm_common::keys::{self, Key};
use cgaterm_hal::{Cpu, PortIo, Scheduler, Serial, TextBuffer};
use spin::{Mutex, MutexGuard};

use chord::{ChordRecognizer, Step};
use overlay::Overlay;
use ring::InputRing;

/// Number of return addresses printed by a fatal error.
const PANIC_PCS: usize = 10;

/// Everything the console drives: the cell grid, the CRT controller ports and
/// the serial line output is mirrored to.
pub trait ConsoleHardware: TextBuffer + PortIo + Serial {}

impl<T: TextBuffer + PortIo + Serial> ConsoleHardware for T {}

/// The execution environment of the console: blocking primitives and the
/// processor that halts on a fatal error.
pub trait Platform: Scheduler + Cpu {}

impl<T: Scheduler + Cpu> Platform for T {}

/// Runtime console settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Attribute rendered characters start with.
    pub default_attribute: Attribute,
    /// Whether output and echo are copied to the serial line.
    pub mirror_serial: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_attribute: Attribute::DEFAULT,
            mirror_serial: true,
        }
    }
}

/// Unrecoverable internal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// The hardware cursor pointed outside the grid.
    CursorOutOfRange(usize),
    /// `printf` was handed no format string.
    NullFormat,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::CursorOutOfRange(_) => f.write_str("pos under/overflow"),
            Fault::NullFormat => f.write_str("null fmt"),
        }
    }
}

struct State<H> {
    hw: H,
    ring: InputRing,
    chord: ChordRecognizer,
    overlay: Overlay,
    attribute: Attribute,
    mirror_serial: bool,
}

impl<H: ConsoleHardware> State<H> {
    fn put(&mut self, glyph: Glyph) -> Result<(), Fault> {
        display::put(&mut self.hw, glyph, self.attribute)?;

        if self.mirror_serial {
            match glyph {
                Glyph::Byte(byte) => self.hw.write_byte(byte),
                Glyph::Backspace => {
                    for &byte in b"\x08 \x08" {
                        self.hw.write_byte(byte);
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs an output operation with the color picker out of the way.
    fn output<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, Fault>) -> Result<R, Fault> {
        if self.overlay.is_open() {
            self.overlay.lift(&mut self.hw);
        }
        let result = f(self);
        if self.overlay.is_open() {
            self.overlay.cover(&mut self.hw);
        }
        result
    }

    fn dispatch<S: Scheduler>(&mut self, key: Key, scheduler: &S) -> Result<(), Fault> {
        if key == keys::RESERVED {
            return Ok(());
        }

        let picked = self.overlay.is_open()
            && self
                .overlay
                .handle_key(key, &mut self.hw, &mut self.attribute);

        let step = self.chord.feed(key);
        if step == Step::Completed {
            self.toggle_overlay();
        }

        if picked || step.consumed() || self.overlay.is_open() {
            return Ok(());
        }
        self.edit(key, scheduler)
    }

    fn toggle_overlay(&mut self) {
        if self.overlay.is_open() {
            self.overlay.close(&mut self.hw, self.attribute);
            log::debug!(
                "color picker closed with attribute {:#04x}",
                self.attribute.bits()
            );
        } else {
            self.overlay.open(&mut self.hw);
            log::debug!("color picker opened");
        }
    }

    fn edit<S: Scheduler>(&mut self, key: Key, scheduler: &S) -> Result<(), Fault> {
        match key {
            keys::KILL_LINE => {
                while self.ring.kill_step() {
                    self.put(Glyph::Backspace)?;
                }
            }
            keys::BACKSPACE | keys::DELETE => {
                if self.ring.erase_last() {
                    self.put(Glyph::Backspace)?;
                }
            }
            0 => {}
            _ => {
                let Ok(mut byte) = u8::try_from(key) else {
                    log::trace!("key {:#x} has no byte form, ignored", key);
                    return Ok(());
                };
                if byte == b'\r' {
                    byte = b'\n';
                }

                if !self.ring.insert(byte) {
                    log::trace!("input ring full, dropped {:#04x}", byte);
                    return Ok(());
                }
                self.put(Glyph::Byte(byte))?;

                let full = self.ring.is_full();
                if byte == b'\n' || Key::from(byte) == keys::EOF || full {
                    if full {
                        log::debug!("input ring full, flushing partial line");
                    }
                    self.ring.commit();
                    scheduler.wakeup(self.ring.channel());
                }
            }
        }
        Ok(())
    }
}

/// Adapts the locked console state to `core::fmt::Write`, keeping the first
/// fault so the caller can act on it.
struct StateWriter<'a, H> {
    state: &'a mut State<H>,
    fault: Option<Fault>,
}

impl<H: ConsoleHardware> fmt::Write for StateWriter<'_, H> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if let Err(fault) = self.state.put(Glyph::Byte(byte)) {
                self.fault = Some(fault);
                return Err(fmt::Error);
            }
        }
        Ok(())
    }
}

/// The console context.
pub struct Console<H, P> {
    state: Mutex<State<H>>,
    platform: P,
    poisoned: AtomicBool,
}

impl<H: ConsoleHardware, P: Platform> Console<H, P> {
    /// Creates a console over `hw`. The screen is left as it is; output
    /// starts at the current hardware cursor.
    pub fn new(hw: H, platform: P, config: ConsoleConfig) -> Self {
        Self {
            state: Mutex::new(State {
                hw,
                ring: InputRing::new(),
                chord: ChordRecognizer::new(keys::COLOR_CHORD),
                overlay: Overlay::new(),
                attribute: config.default_attribute,
                mirror_serial: config.mirror_serial,
            }),
            platform,
            poisoned: AtomicBool::new(false),
        }
    }

    /// The platform the console blocks and halts through.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The attribute new output is rendered with.
    pub fn attribute(&self) -> Attribute {
        self.lock().attribute
    }

    /// True once a fatal error went through [`Console::panic`].
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::SeqCst)
    }

    fn halt_if_poisoned(&self) {
        if self.is_poisoned() {
            self.platform.disable_interrupts();
            self.platform.halt();
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<H>> {
        self.halt_if_poisoned();
        let guard = self.state.lock();
        // A panic may have poisoned the console while we spun.
        self.halt_if_poisoned();
        guard
    }

    fn render(&self, f: impl FnOnce(&mut State<H>) -> Result<(), Fault>) {
        let mut state = self.lock();
        if let Err(fault) = state.output(f) {
            drop(state);
            self.panic(fault);
        }
    }

    /// Reads up to one line into `dst`.
    ///
    /// Blocks until a line is committed. Stops after copying a newline, at
    /// an end-of-file marker, or when `dst` is full. An end-of-file marker
    /// met after some bytes were copied is left in place so the next read
    /// returns 0.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, ConsoleError> {
        let mut state = self.lock();
        let mut copied = 0;

        while copied < dst.len() {
            while !state.ring.has_input() {
                if self.platform.termination_requested() {
                    log::debug!("console read cancelled after {} bytes", copied);
                    return Err(ConsoleError::Killed);
                }

                let channel = state.ring.channel();
                let mut held = Some(state);
                self.platform.sleep(channel, &mut || drop(held.take()));
                drop(held);
                state = self.lock();
            }

            let Some(byte) = state.ring.pop() else {
                continue;
            };

            if Key::from(byte) == keys::EOF {
                if copied > 0 {
                    state.ring.unpop();
                }
                break;
            }

            dst[copied] = byte;
            copied += 1;
            if byte == b'\n' {
                break;
            }
        }

        Ok(copied)
    }

    /// Renders `buf` and returns its length.
    pub fn write(&self, buf: &[u8]) -> usize {
        self.render(|state| {
            buf.iter()
                .try_for_each(|&byte| state.put(Glyph::Byte(byte)))
        });
        buf.len()
    }

    /// Handles every key `pending` yields, then runs any process listing
    /// asked for once the console lock is released.
    pub fn interrupt<I: IntoIterator<Item = Key>>(&self, pending: I) {
        let mut list_processes = false;
        let mut state = self.lock();

        for key in pending {
            if key == keys::PROCESS_LIST {
                // Not a chord key, so this breaks any chord in progress.
                state.chord.feed(key);
                list_processes = true;
                continue;
            }
            if let Err(fault) = state.dispatch(key, &self.platform) {
                drop(state);
                self.panic(fault);
            }
        }

        drop(state);
        if list_processes {
            self.platform.dump();
        }
    }

    /// Prints `fmt` with `printf`-style directives filled from `args`.
    pub fn printf(&self, fmt: Option<&str>, args: &[Arg<'_>]) {
        self.render(|state| format::format(fmt, args, |byte| state.put(Glyph::Byte(byte))));
    }

    /// Prints Rust formatting arguments; makes `write!` work on a console.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) {
        self.render(|state| {
            let mut writer = StateWriter { state, fault: None };
            // Errors only come from the writer, which records them.
            let _ = writer.write_fmt(args);
            writer.fault.map_or(Ok(()), Err)
        });
    }

    /// Reports a fatal error and halts.
    ///
    /// Prints `cpu <id>: panic: <message>` followed by the calling frames,
    /// then poisons the console so every other context halts on its next
    /// console access.
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        self.platform.disable_interrupts();
        let mut state = self.lock();

        let id = self.platform.id();
        let mut pcs = [0usize; PANIC_PCS];
        self.platform.caller_pcs(&mut pcs);

        // A broken cursor cannot stop the halt below.
        let _ = state.output(|state| {
            let mut writer = StateWriter { state, fault: None };
            let _ = writeln!(writer, "cpu {}: panic: {}", id, message);
            for pc in pcs {
                let _ = write!(writer, " {:x}", pc);
            }
            writer.fault.map_or(Ok(()), Err)
        });

        self.poisoned.store(true, Ordering::SeqCst);
        drop(state);
        self.platform.halt()
    }

    /// Releases the console lock whoever holds it.
    ///
    /// # Safety
    ///
    /// Only for the fatal path, when the holder is known never to run again
    /// (it is the context that just faulted).
    pub unsafe fn break_lock(&self) {
        if self.state.is_locked() {
            // SAFETY: upheld by the caller.
            unsafe { self.state.force_unlock() };
        }
    }
}
