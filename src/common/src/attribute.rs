//! Text-mode colors and cell attributes.

use bitflags::bitflags;

/// VGA color codes.
///
/// Standard 16-color palette for text mode. The upper eight are the
/// intensified versions of the lower eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    /// Black color.
    Black = 0,
    /// Blue color.
    Blue = 1,
    /// Green color.
    Green = 2,
    /// Cyan color.
    Cyan = 3,
    /// Red color.
    Red = 4,
    /// Magenta color.
    Magenta = 5,
    /// Brown color.
    Brown = 6,
    /// Light gray color.
    LightGray = 7,
    /// Dark gray color.
    DarkGray = 8,
    /// Light blue color.
    LightBlue = 9,
    /// Light green color.
    LightGreen = 10,
    /// Light cyan color.
    LightCyan = 11,
    /// Light red color.
    LightRed = 12,
    /// Pink color.
    Pink = 13,
    /// Yellow color.
    Yellow = 14,
    /// White color.
    White = 15,
}

impl Color {
    /// The eight non-intensified colors, in palette order.
    pub const BASE: [Color; 8] = [
        Color::Black,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Brown,
        Color::LightGray,
    ];

    /// Decodes the low four bits of `nibble`.
    pub const fn from_nibble(nibble: u8) -> Color {
        match nibble & 0x0f {
            0 => Color::Black,
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Cyan,
            4 => Color::Red,
            5 => Color::Magenta,
            6 => Color::Brown,
            7 => Color::LightGray,
            8 => Color::DarkGray,
            9 => Color::LightBlue,
            10 => Color::LightGreen,
            11 => Color::LightCyan,
            12 => Color::LightRed,
            13 => Color::Pink,
            14 => Color::Yellow,
            _ => Color::White,
        }
    }

    /// The same color with the intensity bit set.
    pub const fn intensified(self) -> Color {
        Color::from_nibble(self as u8 | AttrFlags::FG_INTENSITY.bits())
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Cyan => "cyan",
            Color::Red => "red",
            Color::Magenta => "magenta",
            Color::Brown => "brown",
            Color::LightGray => "gray",
            Color::DarkGray => "dark gray",
            Color::LightBlue => "light blue",
            Color::LightGreen => "light green",
            Color::LightCyan => "light cyan",
            Color::LightRed => "light red",
            Color::Pink => "pink",
            Color::Yellow => "yellow",
            Color::White => "white",
        }
    }
}

bitflags! {
    /// Single-bit modifiers inside an attribute byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttrFlags: u8 {
        /// Bright foreground.
        const FG_INTENSITY = 0x08;
        /// Bright background, or blink depending on the adapter mode.
        const BG_INTENSITY = 0x80;
    }
}

/// Attribute byte of a text cell: foreground in the low nibble, background in
/// the high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Attribute(u8);

impl Attribute {
    /// Light gray on black.
    pub const DEFAULT: Attribute = Attribute(0x07);

    /// Creates an attribute from foreground and background colors.
    pub const fn new(foreground: Color, background: Color) -> Attribute {
        Attribute((background as u8) << 4 | (foreground as u8))
    }

    /// Wraps a raw attribute byte.
    pub const fn from_bits(bits: u8) -> Attribute {
        Attribute(bits)
    }

    /// Returns the raw attribute byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Color in the low nibble.
    pub const fn foreground(self) -> Color {
        Color::from_nibble(self.0)
    }

    /// Color in the high nibble.
    pub const fn background(self) -> Color {
        Color::from_nibble(self.0 >> 4)
    }

    /// Intensity bits currently set.
    pub fn flags(self) -> AttrFlags {
        AttrFlags::from_bits_truncate(self.0)
    }

    /// Sets `flags` on top of the current colors.
    pub const fn with_flags(self, flags: AttrFlags) -> Attribute {
        Attribute(self.0 | flags.bits())
    }

    /// Replaces the foreground nibble, keeping the background.
    pub const fn with_foreground(self, color: Color) -> Attribute {
        Attribute((self.0 & 0xf0) | color as u8)
    }

    /// Replaces the background nibble, keeping the foreground.
    pub const fn with_background(self, color: Color) -> Attribute {
        Attribute((self.0 & 0x0f) | (color as u8) << 4)
    }

    /// Builds a grid cell holding `character` in this attribute.
    pub const fn cell(self, character: u8) -> u16 {
        (self.0 as u16) << 8 | character as u16
    }

    /// Attribute stored in the high byte of `cell`.
    pub const fn of_cell(cell: u16) -> Attribute {
        Attribute((cell >> 8) as u8)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::DEFAULT
    }
}

/// Character stored in the low byte of `cell`.
pub const fn cell_char(cell: u16) -> u8 {
    (cell & 0xff) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_nibbles() {
        let attr = Attribute::new(Color::Yellow, Color::Blue);
        assert_eq!(attr.bits(), 0x1e);
        assert_eq!(attr.foreground(), Color::Yellow);
        assert_eq!(attr.background(), Color::Blue);
    }

    #[test]
    fn test_with_background_keeps_foreground() {
        let attr = Attribute::DEFAULT.with_background(Color::Cyan.intensified());
        assert_eq!(attr.bits(), 0xb7);
        assert!(attr.flags().contains(AttrFlags::BG_INTENSITY));
        assert!(!attr.flags().contains(AttrFlags::FG_INTENSITY));
    }

    #[test]
    fn test_with_flags_brightens_nibble() {
        let attr = Attribute::new(Color::Red, Color::Blue);
        let bright = attr.with_flags(AttrFlags::FG_INTENSITY);
        assert_eq!(bright.foreground(), Color::LightRed);
        assert_eq!(bright.background(), Color::Blue);
        assert_eq!(bright.with_flags(AttrFlags::FG_INTENSITY), bright);
    }

    #[test]
    fn test_cell_packing() {
        let cell = Attribute::DEFAULT.cell(b'A');
        assert_eq!(cell, 0x0741);
        assert_eq!(cell_char(cell), b'A');
        assert_eq!(Attribute::of_cell(cell), Attribute::DEFAULT);
    }
}
