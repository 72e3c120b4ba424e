//! Host-side fakes for console tests.
//!
//! [`FakeHardware`] stands in for the text buffer, the CRT controller and
//! the serial line. [`ThreadScheduler`] implements wait channels on top of
//! std threads so blocking reads can be exercised with real concurrency.
//! Both are cheap handles: clones share state, so a test keeps one copy to
//! inspect while the console owns the other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cgaterm_hal::{Cpu, PortIo, Scheduler, Serial, TextBuffer, WaitChannel};

use crate::console::display::{CELLS, COLS, CRT_PORT};

struct Screen {
    cells: [u16; CELLS],
    crt_index: u8,
    crt: [u8; 256],
    serial: Vec<u8>,
}

/// In-memory grid, CRT controller and serial capture.
#[derive(Clone)]
pub struct FakeHardware {
    screen: Arc<Mutex<Screen>>,
}

impl FakeHardware {
    pub fn new() -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen {
                cells: [0; CELLS],
                crt_index: 0,
                crt: [0; 256],
                serial: Vec::new(),
            })),
        }
    }

    fn screen(&self) -> std::sync::MutexGuard<'_, Screen> {
        self.screen.lock().unwrap()
    }

    pub fn cell(&self, offset: usize) -> u16 {
        self.screen().cells[offset]
    }

    pub fn poke(&self, offset: usize, cell: u16) {
        self.screen().cells[offset] = cell;
    }

    pub fn crt_register(&self, index: u8) -> u8 {
        self.screen().crt[index as usize]
    }

    pub fn cursor(&self) -> usize {
        let screen = self.screen();
        (screen.crt[14] as usize) << 8 | screen.crt[15] as usize
    }

    pub fn set_cursor(&self, pos: usize) {
        let mut screen = self.screen();
        screen.crt[14] = (pos >> 8) as u8;
        screen.crt[15] = pos as u8;
    }

    /// Characters of `row`, with empty cells shown as spaces.
    pub fn row_text(&self, row: usize) -> String {
        let screen = self.screen();
        screen.cells[row * COLS..(row + 1) * COLS]
            .iter()
            .map(|&cell| match (cell & 0xff) as u8 {
                0 => ' ',
                byte => byte as char,
            })
            .collect()
    }

    pub fn serial(&self) -> Vec<u8> {
        self.screen().serial.clone()
    }
}

impl Default for FakeHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for FakeHardware {
    fn read_cell(&self, offset: usize) -> u16 {
        self.cell(offset)
    }

    fn write_cell(&mut self, offset: usize, cell: u16) {
        self.poke(offset, cell);
    }
}

impl PortIo for FakeHardware {
    fn read_port(&mut self, port: u16) -> u8 {
        let screen = self.screen();
        if port == CRT_PORT + 1 {
            screen.crt[screen.crt_index as usize]
        } else {
            0
        }
    }

    fn write_port(&mut self, port: u16, value: u8) {
        let mut screen = self.screen();
        if port == CRT_PORT {
            screen.crt_index = value;
        } else if port == CRT_PORT + 1 {
            let index = screen.crt_index as usize;
            screen.crt[index] = value;
        }
    }
}

impl Serial for FakeHardware {
    fn write_byte(&mut self, byte: u8) {
        self.screen().serial.push(byte);
    }
}

#[derive(Default)]
struct Waits {
    /// bumped by every wakeup on the channel
    generations: HashMap<usize, u64>,
    sleepers: usize,
}

#[derive(Default)]
struct SchedulerInner {
    waits: Mutex<Waits>,
    changed: Condvar,
    killed: AtomicBool,
    dumps: AtomicUsize,
    interrupts_disabled: AtomicBool,
}

/// Wait channels over std threads, plus a fake processor whose halt panics.
#[derive(Clone, Default)]
pub struct ThreadScheduler {
    inner: Arc<SchedulerInner>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every sleeper, present and future, for termination.
    pub fn kill(&self) {
        self.inner.killed.store(true, Ordering::SeqCst);
        let _waits = self.inner.waits.lock().unwrap();
        self.inner.changed.notify_all();
    }

    /// Blocks until at least `count` contexts are parked in `sleep`.
    pub fn wait_for_sleepers(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.inner.waits.lock().unwrap().sleepers < count {
            assert!(Instant::now() < deadline, "no context went to sleep");
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn dumps(&self) -> usize {
        self.inner.dumps.load(Ordering::SeqCst)
    }

    pub fn interrupts_disabled(&self) -> bool {
        self.inner.interrupts_disabled.load(Ordering::SeqCst)
    }
}

impl Scheduler for ThreadScheduler {
    fn sleep(&self, channel: WaitChannel, release: &mut dyn FnMut()) {
        let key = channel.as_usize();
        let mut waits = self.inner.waits.lock().unwrap();
        let seen = waits.generations.get(&key).copied().unwrap_or(0);
        waits.sleepers += 1;

        release();

        while waits.generations.get(&key).copied().unwrap_or(0) == seen
            && !self.inner.killed.load(Ordering::SeqCst)
        {
            waits = self.inner.changed.wait(waits).unwrap();
        }
        waits.sleepers -= 1;
    }

    fn wakeup(&self, channel: WaitChannel) {
        let mut waits = self.inner.waits.lock().unwrap();
        *waits.generations.entry(channel.as_usize()).or_insert(0) += 1;
        self.inner.changed.notify_all();
    }

    fn termination_requested(&self) -> bool {
        self.inner.killed.load(Ordering::SeqCst)
    }

    fn dump(&self) {
        self.inner.dumps.fetch_add(1, Ordering::SeqCst);
    }
}

impl Cpu for ThreadScheduler {
    fn id(&self) -> u32 {
        0
    }

    fn caller_pcs(&self, pcs: &mut [usize]) {
        for (i, pc) in pcs.iter_mut().enumerate() {
            *pc = 0x1000 + i * 0x10;
        }
    }

    fn disable_interrupts(&self) {
        self.inner.interrupts_disabled.store(true, Ordering::SeqCst);
    }

    fn halt(&self) -> ! {
        panic!("cpu halted");
    }
}
