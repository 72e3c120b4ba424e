//! Text-mode renderer.
//!
//! The cursor lives in the CRT controller, not in memory: every glyph reads
//! it back from the register pair, moves it, and writes it again.

use cgaterm_common::attribute::Attribute;
use cgaterm_hal::{PortIo, TextBuffer};

use super::Fault;

/// Number of rows in text mode.
pub const ROWS: usize = 25;

/// Number of columns in text mode.
pub const COLS: usize = 80;

/// Number of cells in the grid.
pub const CELLS: usize = ROWS * COLS;

/// Output reaching this row scrolls the screen up by one row.
pub const SCROLL_ROW: usize = 24;

/// CRT controller index port. The data port is the next one.
pub const CRT_PORT: u16 = 0x3d4;

const CURSOR_HIGH: u8 = 14;
const CURSOR_LOW: u8 = 15;

/// Something the renderer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A character, or `'\n'` to move to the next row.
    Byte(u8),
    /// Move the cursor one cell back.
    Backspace,
}

/// Reads the hardware cursor position.
pub fn cursor<H: PortIo>(hw: &mut H) -> usize {
    hw.write_port(CRT_PORT, CURSOR_HIGH);
    let mut pos = (hw.read_port(CRT_PORT + 1) as usize) << 8;
    hw.write_port(CRT_PORT, CURSOR_LOW);
    pos |= hw.read_port(CRT_PORT + 1) as usize;
    pos
}

/// Moves the hardware cursor.
pub fn set_cursor<H: PortIo>(hw: &mut H, pos: usize) {
    hw.write_port(CRT_PORT, CURSOR_HIGH);
    hw.write_port(CRT_PORT + 1, (pos >> 8) as u8);
    hw.write_port(CRT_PORT, CURSOR_LOW);
    hw.write_port(CRT_PORT + 1, pos as u8);
}

/// Renders one glyph at the hardware cursor in `attribute`.
pub(crate) fn put<H>(hw: &mut H, glyph: Glyph, attribute: Attribute) -> Result<(), Fault>
where
    H: TextBuffer + PortIo,
{
    let mut pos = cursor(hw);
    if pos >= CELLS {
        return Err(Fault::CursorOutOfRange(pos));
    }

    match glyph {
        Glyph::Byte(b'\n') => pos += COLS - pos % COLS,
        Glyph::Backspace => pos = pos.saturating_sub(1),
        Glyph::Byte(byte) => {
            hw.write_cell(pos, attribute.cell(byte));
            pos += 1;
        }
    }

    if pos > CELLS {
        return Err(Fault::CursorOutOfRange(pos));
    }

    if pos / COLS >= SCROLL_ROW {
        pos = scroll(hw, pos, attribute);
    }

    set_cursor(hw, pos);
    hw.write_cell(pos, attribute.cell(b' '));
    Ok(())
}

/// Shifts rows up by one and blanks the rest of the last text row.
///
/// Returns the cursor moved up with the text.
fn scroll<H: TextBuffer>(hw: &mut H, pos: usize, attribute: Attribute) -> usize {
    for offset in 0..(SCROLL_ROW - 1) * COLS {
        let cell = hw.read_cell(offset + COLS);
        hw.write_cell(offset, cell);
    }

    let pos = pos - COLS;
    let blank = attribute.cell(b' ');
    for offset in pos..SCROLL_ROW * COLS {
        hw.write_cell(offset, blank);
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeHardware;

    fn put_all(hw: &mut FakeHardware, bytes: &[u8]) {
        for &b in bytes {
            put(hw, Glyph::Byte(b), Attribute::DEFAULT).unwrap();
        }
    }

    #[test]
    fn test_cursor_register_protocol() {
        let mut hw = FakeHardware::new();
        set_cursor(&mut hw, 0x0123);
        assert_eq!(hw.crt_register(14), 0x01);
        assert_eq!(hw.crt_register(15), 0x23);
        assert_eq!(cursor(&mut hw), 0x0123);
    }

    #[test]
    fn test_put_advances_and_places_cursor_cell() {
        let mut hw = FakeHardware::new();
        put_all(&mut hw, b"hi");
        assert_eq!(hw.cursor(), 2);
        assert_eq!(hw.cell(0), 0x0768);
        assert_eq!(hw.cell(1), 0x0769);
        assert_eq!(hw.cell(2), 0x0720);
    }

    #[test]
    fn test_newline_moves_to_next_row() {
        let mut hw = FakeHardware::new();
        put_all(&mut hw, b"abc\n");
        assert_eq!(hw.cursor(), COLS);
    }

    #[test]
    fn test_backspace_at_origin_is_noop() {
        let mut hw = FakeHardware::new();
        put(&mut hw, Glyph::Backspace, Attribute::DEFAULT).unwrap();
        assert_eq!(hw.cursor(), 0);

        put_all(&mut hw, b"x");
        put(&mut hw, Glyph::Backspace, Attribute::DEFAULT).unwrap();
        assert_eq!(hw.cursor(), 0);
        assert_eq!(hw.cell(0), 0x0720);
    }

    #[test]
    fn test_full_lines_scroll_once_each() {
        let mut hw = FakeHardware::new();
        for line in 0..=ROWS - 1 {
            let row = [b'A' + line as u8; COLS];
            put_all(&mut hw, &row);
        }

        // 25 full lines on 24 usable rows: lines 0 and 1 scrolled away.
        assert_eq!(hw.row_text(0), "C".repeat(COLS));
        assert_eq!(hw.row_text(SCROLL_ROW - 2), "Y".repeat(COLS));
        assert_eq!(hw.row_text(SCROLL_ROW - 1), " ".repeat(COLS));
        assert_eq!(hw.cursor(), (SCROLL_ROW - 1) * COLS);
    }

    #[test]
    fn test_scroll_blanks_bottom_row() {
        let mut hw = FakeHardware::new();
        hw.set_cursor((SCROLL_ROW - 1) * COLS);
        put_all(&mut hw, b"bottom\n");

        assert_eq!(hw.row_text(SCROLL_ROW - 2).trim_end(), "bottom");
        assert_eq!(hw.row_text(SCROLL_ROW - 1), " ".repeat(COLS));
        assert_eq!(hw.cursor(), (SCROLL_ROW - 1) * COLS);
    }

    #[test]
    fn test_cursor_outside_grid_faults() {
        let mut hw = FakeHardware::new();
        hw.set_cursor(CELLS);
        assert_eq!(
            put(&mut hw, Glyph::Byte(b'x'), Attribute::DEFAULT),
            Err(Fault::CursorOutOfRange(CELLS))
        );
    }
}
