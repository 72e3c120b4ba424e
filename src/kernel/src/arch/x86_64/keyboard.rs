//! PS/2 keyboard decoding.
//!
//! The IRQ handler queues raw scancodes; [`pending_keys`] drains the queue
//! through the `pc-keyboard` decoder and yields console key codes.

use core::iter;

use cgaterm_common::keys::{self, Key};
use crossbeam_queue::ArrayQueue;
use pc_keyboard::{
    layouts::Us104Key, DecodedKey, HandleControl, KeyCode, KeyState, Keyboard, ScancodeSet1,
};
use spin::{Mutex, Once};

const QUEUE_CAPACITY: usize = 100;

/// Scancodes read by the IRQ handler, not yet decoded.
pub static SCANCODE_QUEUE: Once<ArrayQueue<u8>> = Once::new();

struct Decoder {
    keyboard: Keyboard<Us104Key, ScancodeSet1>,
    alt_down: bool,
}

static DECODER: Mutex<Decoder> = Mutex::new(Decoder {
    keyboard: Keyboard::new(
        ScancodeSet1::new(),
        Us104Key,
        HandleControl::MapLettersToUnicode,
    ),
    alt_down: false,
});

/// Allocates the scancode queue. Needs the heap.
pub fn init() {
    SCANCODE_QUEUE.call_once(|| ArrayQueue::new(QUEUE_CAPACITY));
}

/// Called by the keyboard interrupt handler to add a scancode to the queue.
pub fn add_scancode(scancode: u8) {
    match SCANCODE_QUEUE.get() {
        Some(queue) => {
            if queue.push(scancode).is_err() {
                log::warn!("scancode queue full; dropping keyboard input");
            }
        }
        None => log::warn!("scancode queue not initialized"),
    }
}

/// Decodes queued scancodes until the queue is empty.
pub fn pending_keys() -> impl Iterator<Item = Key> {
    iter::from_fn(|| {
        let queue = SCANCODE_QUEUE.get()?;
        let mut decoder = DECODER.lock();
        while let Some(scancode) = queue.pop() {
            if let Some(key) = decoder.decode(scancode) {
                return Some(key);
            }
        }
        None
    })
}

impl Decoder {
    fn decode(&mut self, scancode: u8) -> Option<Key> {
        let event = self.keyboard.add_byte(scancode).ok()??;
        if matches!(event.code, KeyCode::LAlt | KeyCode::RAltGr) {
            self.alt_down = matches!(event.state, KeyState::Down | KeyState::SingleShot);
        }

        match self.keyboard.process_keyevent(event)? {
            DecodedKey::Unicode(c) if c.is_ascii() => {
                let byte = c as u8;
                if self.alt_down && byte.is_ascii_alphabetic() {
                    Some(keys::alt(byte.to_ascii_uppercase()))
                } else {
                    Some(Key::from(byte))
                }
            }
            DecodedKey::Unicode(_) => None,
            DecodedKey::RawKey(code) => {
                log::trace!("unmapped key {:?}", code);
                None
            }
        }
    }
}
