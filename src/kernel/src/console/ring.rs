//! Line-editing input ring.
//!
//! Three free-running counters index into a fixed buffer:
//! `read <= write <= edit <= read + INPUT_BUF_SIZE`. Bytes in
//! `read..write` are committed lines a reader may consume, bytes in
//! `write..edit` are the line still being typed. The counters are never
//! reset and wrap on overflow, so every comparison goes through
//! `wrapping_sub`.

use cgaterm_hal::WaitChannel;

/// Capacity of the input ring in bytes.
pub const INPUT_BUF_SIZE: usize = 128;

// Counter wrap-around only stays consistent with the modulo indexing when the
// capacity divides the counter range.
const _: () = assert!(INPUT_BUF_SIZE.is_power_of_two());

pub(crate) struct InputRing {
    buf: [u8; INPUT_BUF_SIZE],
    /// next byte a reader takes
    read: usize,
    /// end of the last committed line
    write: usize,
    /// end of the line being edited
    edit: usize,
}

impl InputRing {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; INPUT_BUF_SIZE],
            read: 0,
            write: 0,
            edit: 0,
        }
    }

    /// Channel readers sleep on while the ring has nothing committed.
    pub(crate) fn channel(&self) -> WaitChannel {
        WaitChannel::of(self)
    }

    /// Appends `byte` to the line being edited.
    ///
    /// Returns false and drops the byte when the ring is full.
    pub(crate) fn insert(&mut self, byte: u8) -> bool {
        if self.edit.wrapping_sub(self.read) >= INPUT_BUF_SIZE {
            return false;
        }

        self.buf[self.edit % INPUT_BUF_SIZE] = byte;
        self.edit = self.edit.wrapping_add(1);
        true
    }

    /// True when no further byte can be inserted before a reader drains.
    pub(crate) fn is_full(&self) -> bool {
        self.edit.wrapping_sub(self.read) == INPUT_BUF_SIZE
    }

    /// Removes the last edited byte, never crossing into committed input.
    pub(crate) fn erase_last(&mut self) -> bool {
        if self.edit == self.write {
            return false;
        }

        self.edit = self.edit.wrapping_sub(1);
        true
    }

    /// One step of a line kill: erases the last edited byte unless it is the
    /// start of the line.
    pub(crate) fn kill_step(&mut self) -> bool {
        if self.edit == self.write {
            return false;
        }

        let last = self.edit.wrapping_sub(1);
        if self.buf[last % INPUT_BUF_SIZE] == b'\n' {
            return false;
        }

        self.edit = last;
        true
    }

    /// Makes everything typed so far visible to readers.
    pub(crate) fn commit(&mut self) {
        self.write = self.edit;
    }

    /// True when committed bytes are waiting for a reader.
    pub(crate) fn has_input(&self) -> bool {
        self.read != self.write
    }

    /// Takes the next committed byte.
    pub(crate) fn pop(&mut self) -> Option<u8> {
        if !self.has_input() {
            return None;
        }

        let byte = self.buf[self.read % INPUT_BUF_SIZE];
        self.read = self.read.wrapping_add(1);
        Some(byte)
    }

    /// Puts the byte returned by the last `pop` back.
    pub(crate) fn unpop(&mut self) {
        self.read = self.read.wrapping_sub(1);
    }

    /// Length of the uncommitted line.
    #[cfg(test)]
    pub(crate) fn editing_len(&self) -> usize {
        self.edit.wrapping_sub(self.write)
    }

    #[cfg(test)]
    pub(crate) fn starting_at(counter: usize) -> Self {
        Self {
            buf: [0; INPUT_BUF_SIZE],
            read: counter,
            write: counter,
            edit: counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_line(ring: &mut InputRing, line: &[u8]) {
        for &b in line {
            assert!(ring.insert(b));
        }
    }

    #[test]
    fn test_erase_undoes_last_insert() {
        let mut ring = InputRing::new();
        type_line(&mut ring, b"abc");
        assert!(ring.erase_last());
        assert_eq!(ring.editing_len(), 2);
        ring.insert(b'x');
        ring.commit();

        assert_eq!(ring.pop(), Some(b'a'));
        assert_eq!(ring.pop(), Some(b'b'));
        assert_eq!(ring.pop(), Some(b'x'));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_erase_stops_at_commit() {
        let mut ring = InputRing::new();
        type_line(&mut ring, b"hi\n");
        ring.commit();

        assert!(!ring.erase_last());
        assert!(!ring.kill_step());
        assert!(ring.has_input());
    }

    #[test]
    fn test_kill_stops_at_newline() {
        let mut ring = InputRing::new();
        type_line(&mut ring, b"one\n");
        ring.commit();
        type_line(&mut ring, b"two");

        let mut erased = 0;
        while ring.kill_step() {
            erased += 1;
        }
        assert_eq!(erased, 3);
        assert_eq!(ring.editing_len(), 0);
    }

    #[test]
    fn test_full_ring_drops() {
        let mut ring = InputRing::new();
        for i in 0..INPUT_BUF_SIZE {
            assert!(ring.insert(i as u8));
        }
        assert!(ring.is_full());
        assert!(!ring.insert(b'z'));

        ring.commit();
        assert_eq!(ring.pop(), Some(0));
        assert!(!ring.is_full());
        assert!(ring.insert(b'z'));
    }

    #[test]
    fn test_counters_wrap() {
        let mut ring = InputRing::starting_at(usize::MAX - 2);
        type_line(&mut ring, b"wrap\n");
        ring.commit();

        let mut out = [0u8; 5];
        for slot in out.iter_mut() {
            *slot = ring.pop().unwrap();
        }
        assert_eq!(&out, b"wrap\n");
        assert!(!ring.has_input());
        assert!(!ring.is_full());
    }

    #[test]
    fn test_unpop_restores_byte() {
        let mut ring = InputRing::new();
        type_line(&mut ring, &[b'a', 0x04]);
        ring.commit();
        assert_eq!(ring.pop(), Some(b'a'));
        assert_eq!(ring.pop(), Some(0x04));
        ring.unpop();
        assert_eq!(ring.pop(), Some(0x04));
    }
}
