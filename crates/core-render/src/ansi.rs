//! VT100 escape sequences used by the renderer.

pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
/// Erase from the cursor to the end of the line.
pub const CLEAR_LINE: &[u8] = b"\x1b[K";
/// Reset all SGR attributes.
pub const RESET_FMT: &[u8] = b"\x1b[m";
pub const REVERSE_VIDEO: &[u8] = b"\x1b[7m";
/// Reset the foreground to the terminal default.
pub const DEFAULT_FG: &[u8] = b"\x1b[39m";
