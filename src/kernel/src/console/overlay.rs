//! Color picker overlay.
//!
//! A modal panel in the top-right corner listing the eight base colors in a
//! foreground and a background column. While it is open the navigation keys
//! move a highlight and apply the highlighted color to the console
//! attribute. Closing puts the covered cells back and repaints the whole grid
//! in the chosen attribute.

use cgaterm_common::attribute::{cell_char, AttrFlags, Attribute, Color};
use cgaterm_common::keys::Key;
use cgaterm_hal::TextBuffer;

use super::display::{CELLS, COLS};

/// Panel height: header, eight colors, footer.
pub const PANEL_ROWS: usize = 10;
/// Panel width: two eight-cell fields and three borders.
pub const PANEL_COLS: usize = 19;
/// Leftmost panel column.
pub const PANEL_LEFT: usize = COLS - PANEL_COLS;

const PANEL_CELLS: usize = PANEL_ROWS * PANEL_COLS;
const FIELD_WIDTH: usize = 8;

const PANEL_ATTR: Attribute = Attribute::new(Color::Black, Color::LightGray);
const HIGHLIGHT_ATTR: Attribute = Attribute::new(Color::Yellow, Color::Blue);

const HEADER: &[u8; PANEL_COLS] = b"+---FG---+---BG---+";
const FOOTER: &[u8; PANEL_COLS] = b"+--e:set r:bright-+";

/// Which nibble of the attribute the selection edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Foreground,
    Background,
}

impl Field {
    fn column(self) -> usize {
        match self {
            Field::Foreground => 1,
            Field::Background => 2 + FIELD_WIDTH,
        }
    }

    fn intensity(self) -> AttrFlags {
        match self {
            Field::Foreground => AttrFlags::FG_INTENSITY,
            Field::Background => AttrFlags::BG_INTENSITY,
        }
    }
}

pub(crate) struct Overlay {
    open: bool,
    row: usize,
    field: Field,
    saved: [u16; PANEL_CELLS],
}

impl Overlay {
    pub(crate) const fn new() -> Self {
        Self {
            open: false,
            row: 0,
            field: Field::Foreground,
            saved: [0; PANEL_CELLS],
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    /// Grid offset of panel cell `index`.
    fn grid_offset(index: usize) -> usize {
        (index / PANEL_COLS) * COLS + PANEL_LEFT + index % PANEL_COLS
    }

    fn in_footprint(offset: usize) -> bool {
        offset / COLS < PANEL_ROWS && offset % COLS >= PANEL_LEFT
    }

    /// Snapshots the covered cells and draws the panel.
    pub(crate) fn open<H: TextBuffer>(&mut self, hw: &mut H) {
        self.row = 0;
        self.field = Field::Foreground;
        self.cover(hw);
        self.open = true;
    }

    /// Restores the covered cells and repaints every cell in `attribute`.
    pub(crate) fn close<H: TextBuffer>(&mut self, hw: &mut H, attribute: Attribute) {
        for offset in 0..CELLS {
            let character = if Self::in_footprint(offset) {
                let row = offset / COLS;
                let col = offset % COLS - PANEL_LEFT;
                cell_char(self.saved[row * PANEL_COLS + col])
            } else {
                cell_char(hw.read_cell(offset))
            };
            hw.write_cell(offset, attribute.cell(character));
        }
        self.open = false;
    }

    /// Puts the covered cells back without closing.
    pub(crate) fn lift<H: TextBuffer>(&self, hw: &mut H) {
        for (index, cell) in self.saved.iter().enumerate() {
            hw.write_cell(Self::grid_offset(index), *cell);
        }
    }

    /// Snapshots whatever is under the panel now and draws it on top.
    pub(crate) fn cover<H: TextBuffer>(&mut self, hw: &mut H) {
        for (index, cell) in self.saved.iter_mut().enumerate() {
            *cell = hw.read_cell(Self::grid_offset(index));
        }
        self.draw(hw);
    }

    /// Handles a key while open. Returns false for keys the panel ignores.
    pub(crate) fn handle_key<H: TextBuffer>(
        &mut self,
        key: Key,
        hw: &mut H,
        attribute: &mut Attribute,
    ) -> bool {
        let Ok(byte) = u8::try_from(key) else {
            return false;
        };

        match byte.to_ascii_lowercase() {
            b'w' => self.row = (self.row + Color::BASE.len() - 1) % Color::BASE.len(),
            b's' => self.row = (self.row + 1) % Color::BASE.len(),
            b'a' => self.field = Field::Foreground,
            b'd' => self.field = Field::Background,
            b'e' => *attribute = self.apply(*attribute, false),
            b'r' => *attribute = self.apply(*attribute, true),
            _ => return false,
        }

        self.draw(hw);
        true
    }

    /// `attribute` with the selected color written into the selected nibble.
    pub(crate) fn apply(&self, attribute: Attribute, intensified: bool) -> Attribute {
        let color = Color::BASE[self.row];
        let mut attribute = match self.field {
            Field::Foreground => attribute.with_foreground(color),
            Field::Background => attribute.with_background(color),
        };
        if intensified {
            attribute = attribute.with_flags(self.field.intensity());
        }
        log::debug!("console attribute now {:#04x}", attribute.bits());
        attribute
    }

    fn draw<H: TextBuffer>(&self, hw: &mut H) {
        for row in 0..PANEL_ROWS {
            let text = Self::row_text(row);
            for (col, &character) in text.iter().enumerate() {
                let highlighted = row == self.row + 1
                    && (self.field.column()..self.field.column() + FIELD_WIDTH).contains(&col);
                let attribute = if highlighted {
                    HIGHLIGHT_ATTR
                } else {
                    PANEL_ATTR
                };
                hw.write_cell(row * COLS + PANEL_LEFT + col, attribute.cell(character));
            }
        }
    }

    fn row_text(row: usize) -> [u8; PANEL_COLS] {
        if row == 0 {
            return *HEADER;
        }
        if row == PANEL_ROWS - 1 {
            return *FOOTER;
        }

        let mut text = [b' '; PANEL_COLS];
        text[0] = b'|';
        text[1 + FIELD_WIDTH] = b'|';
        text[PANEL_COLS - 1] = b'|';

        let name = Color::BASE[row - 1].name().as_bytes();
        for field in [Field::Foreground, Field::Background] {
            let start = field.column() + 1;
            text[start..start + name.len()].copy_from_slice(name);
        }
        text
    }

    #[cfg(test)]
    pub(crate) fn selection(&self) -> (usize, Field) {
        (self.row, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeHardware;

    fn press(overlay: &mut Overlay, hw: &mut FakeHardware, attr: &mut Attribute, keys: &[u8]) {
        for &k in keys {
            assert!(overlay.handle_key(k as Key, hw, attr));
        }
    }

    #[test]
    fn test_panel_rows_fit() {
        for row in 0..PANEL_ROWS {
            assert_eq!(Overlay::row_text(row).len(), PANEL_COLS);
        }
        assert_eq!(&Overlay::row_text(4)[..9], b"| cyan   ");
    }

    #[test]
    fn test_navigation_wraps_rows() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);

        press(&mut overlay, &mut hw, &mut attr, b"w");
        assert_eq!(overlay.selection(), (7, Field::Foreground));
        press(&mut overlay, &mut hw, &mut attr, b"s");
        assert_eq!(overlay.selection(), (0, Field::Foreground));
    }

    #[test]
    fn test_field_switch_does_not_wrap() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);

        press(&mut overlay, &mut hw, &mut attr, b"dd");
        assert_eq!(overlay.selection().1, Field::Background);
        press(&mut overlay, &mut hw, &mut attr, b"aa");
        assert_eq!(overlay.selection().1, Field::Foreground);
    }

    #[test]
    fn test_highlight_follows_selection() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);
        press(&mut overlay, &mut hw, &mut attr, b"ssd");

        let selected = 3 * COLS + PANEL_LEFT + Field::Background.column();
        assert_eq!(Attribute::of_cell(hw.cell(selected)), HIGHLIGHT_ATTR);
        let unselected = 3 * COLS + PANEL_LEFT + Field::Foreground.column();
        assert_eq!(Attribute::of_cell(hw.cell(unselected)), PANEL_ATTR);
    }

    #[test]
    fn test_apply_masks_selected_nibble() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);

        press(&mut overlay, &mut hw, &mut attr, b"se");
        assert_eq!(attr.bits(), 0x01);
        press(&mut overlay, &mut hw, &mut attr, b"sdr");
        assert_eq!(attr.bits(), 0xa1);
    }

    #[test]
    fn test_intensified_apply_sets_field_flag() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);

        press(&mut overlay, &mut hw, &mut attr, b"dr");
        assert!(attr.flags().contains(AttrFlags::BG_INTENSITY));
        assert!(!attr.flags().contains(AttrFlags::FG_INTENSITY));
        assert_eq!(attr.background(), Color::DarkGray);

        press(&mut overlay, &mut hw, &mut attr, b"ar");
        assert_eq!(attr.flags(), AttrFlags::all());
        assert_eq!(attr.foreground(), Color::DarkGray);
    }

    #[test]
    fn test_close_restores_text_and_tints() {
        let mut hw = FakeHardware::new();
        for offset in 0..CELLS {
            hw.poke(offset, Attribute::DEFAULT.cell(b'a' + (offset % 26) as u8));
        }
        let before: Vec<u8> = (0..CELLS).map(|o| cell_char(hw.cell(o))).collect();

        let mut overlay = Overlay::new();
        overlay.open(&mut hw);
        let tint = Attribute::from_bits(0x3e);
        overlay.close(&mut hw, tint);

        for offset in 0..CELLS {
            assert_eq!(cell_char(hw.cell(offset)), before[offset]);
            assert_eq!(Attribute::of_cell(hw.cell(offset)), tint);
        }
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_unknown_keys_are_not_consumed() {
        let mut hw = FakeHardware::new();
        let mut attr = Attribute::DEFAULT;
        let mut overlay = Overlay::new();
        overlay.open(&mut hw);
        assert!(!overlay.handle_key(b'x' as Key, &mut hw, &mut attr));
        assert!(!overlay.handle_key(0x1ff, &mut hw, &mut attr));
    }
}
