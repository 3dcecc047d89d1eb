//! Special key code points for [`WebDriver::send_keys`](crate::WebDriver::send_keys)
//!
//! Modifier keys stay pressed until [`NULL`] is sent.

pub const NULL: char = '\u{E000}';
pub const ENTER: char = '\u{E007}';
pub const SHIFT: char = '\u{E008}';
pub const CONTROL: char = '\u{E009}';
pub const DELETE: char = '\u{E017}';

/// Shift+Enter: a line break inside a compose box
pub fn soft_newline() -> String {
    [SHIFT, ENTER, NULL].iter().collect()
}

/// Ctrl+`key`, releasing the modifier afterwards
pub fn chord_control(key: char) -> String {
    [CONTROL, key, NULL].iter().collect()
}
