//! Decoded key codes delivered by the keyboard driver.
//!
//! Plain keys are their ASCII value. Control chords map onto the C0 control
//! range and Alt chords are shifted above the printable range, so every key
//! fits in a `u16`.

/// A decoded key code.
pub type Key = u16;

/// Control-`c` as produced by the keyboard driver.
pub const fn ctrl(c: u8) -> Key {
    c.wrapping_sub(b'@') as Key
}

/// Alt-`c` as produced by the keyboard driver.
pub const fn alt(c: u8) -> Key {
    c as Key + b'Z' as Key
}

/// End of file (Ctrl-D).
pub const EOF: Key = ctrl(b'D');
/// Kill the current line (Ctrl-U).
pub const KILL_LINE: Key = ctrl(b'U');
/// Backspace (Ctrl-H).
pub const BACKSPACE: Key = ctrl(b'H');
/// Delete, treated as backspace.
pub const DELETE: Key = 0x7f;
/// Process listing (Ctrl-P).
pub const PROCESS_LIST: Key = ctrl(b'P');

/// The ordered chord toggling the color picker.
pub const COLOR_CHORD: [Key; 3] = [alt(b'C'), alt(b'O'), alt(b'L')];
/// Reserved Alt key, swallowed without effect.
pub const RESERVED: Key = alt(b'E');
