//! Raw ANSI escape sequences used by the terminal adapter and pager
//! (`spec.md` §6, "Terminal"). Kept as plain constants rather than routed
//! through `crossterm`'s higher-level `Command` types because several of
//! these (cursor-left-by-n, clear-to-eol, column-absolute) are emitted in
//! hot loops where a formatted literal is cheaper and clearer than building
//! a crossterm command struct just to immediately print it.

pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CURSOR_HOME: &str = "\x1b[H";
pub const CLEAR_LINE: &str = "\x1b[2K";
pub const CLEAR_TO_EOL: &str = "\x1b[K";
pub const CURSOR_UP_ONE: &str = "\x1b[1A";
pub const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
pub const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
pub const RESET_SGR: &str = "\x1b[0m";

pub fn cursor_left(n: u16) -> String {
    format!("\x1b[{n}D")
}

pub fn cursor_column(n: u16) -> String {
    format!("\x1b[{n}G")
}

/// Move to the start of the current line and clear it, ready for a fresh
/// prompt line to be drawn in its place (used when erasing a pagination
/// prompt before resuming output, `spec.md` §4.2).
pub fn erase_current_line() -> String {
    format!("\r{CLEAR_LINE}")
}
