//! Terminal Adapter (`spec.md` §4.1). Owns tty mode switching, size
//! queries, and key reads. Grounded on `codex-rs/tui/src/tui.rs`'s
//! init/restore pair and panic-hook pattern, but driven directly through
//! `crossterm` rather than through a `ratatui::Terminal` backend: the
//! pagination/streaming layers write plain ANSI text, not ratatui widgets.

use std::io::IsTerminal;
use std::io::Write;
use std::io::stdout;
use std::time::Duration;

use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::execute;

use crate::ansi;
use crate::error::Result;

/// A single logical keypress, decoded atomically — `crossterm`'s event
/// reader already buffers the `ESC [ A|B|C|D` sequence into one event
/// rather than three individual bytes, satisfying the "read atomically"
/// contract in `spec.md` §4.1 without hand-rolled byte parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A bare Escape not followed by a recognized `[` sequence.
    EscapePlain,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Line-buffered, echoing: normal shell-like input.
    Cooked,
    /// Single-key, no echo, no line buffering: pagination / hotkeys.
    Cbreak,
}

/// Handle to the process tty. Fails soft: on a non-tty stream (piped
/// stdin/stdout), mode switches and key reads become no-ops/`Eof` rather
/// than erroring, per `spec.md` §7 kind 4.
pub struct Terminal {
    is_tty: bool,
    mode: Mode,
    in_alt_screen: bool,
}

impl Terminal {
    pub fn new() -> Self {
        let is_tty = stdout().is_terminal() && std::io::stdin().is_terminal();
        if is_tty {
            install_panic_restore_hook();
        }
        Self {
            is_tty,
            mode: Mode::Cooked,
            in_alt_screen: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.is_tty
    }

    /// Current `(columns, rows)`, falling back to the `COLUMNS`/`LINES`
    /// environment variables and finally a conservative default
    /// (`spec.md` §4.1).
    pub fn size(&self) -> (u16, u16) {
        if let Ok((cols, rows)) = crossterm::terminal::size() {
            if cols > 0 && rows > 0 {
                return (cols, rows);
            }
        }
        let cols = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(80);
        let rows = std::env::var("LINES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);
        (cols, rows)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        if !self.is_tty || self.mode == mode {
            self.mode = mode;
            return Ok(());
        }
        match mode {
            Mode::Cbreak => enable_raw_mode()?,
            Mode::Cooked => disable_raw_mode()?,
        }
        self.mode = mode;
        Ok(())
    }

    pub fn enter_alt_screen(&mut self) -> Result<()> {
        if self.is_tty && !self.in_alt_screen {
            print!("{}", ansi::ENTER_ALT_SCREEN);
            stdout().flush()?;
            self.in_alt_screen = true;
        }
        Ok(())
    }

    pub fn leave_alt_screen(&mut self) -> Result<()> {
        if self.is_tty && self.in_alt_screen {
            print!("{}", ansi::LEAVE_ALT_SCREEN);
            stdout().flush()?;
            self.in_alt_screen = false;
        }
        Ok(())
    }

    pub fn clear_screen(&self) {
        if self.is_tty {
            print!("{}{}", ansi::CLEAR_SCREEN, ansi::CURSOR_HOME);
            let _ = stdout().flush();
        }
    }

    /// Block for exactly one keypress, already decoded. Returns `Eof` on a
    /// non-tty stream or on a real end-of-input condition — both are
    /// indistinguishable to callers, which treat `Eof` like a cancel
    /// (`spec.md` §5, "EOF (Ctrl-D) on an empty line is treated as
    /// `/exit`").
    pub fn read_key(&self) -> Result<Key> {
        if !self.is_tty {
            return Ok(Key::Eof);
        }
        loop {
            if crossterm::event::poll(Duration::from_millis(250))? {
                if let crossterm::event::Event::Key(event) = crossterm::event::read()? {
                    if event.kind == crossterm::event::KeyEventKind::Release {
                        continue;
                    }
                    return Ok(decode(event.code));
                }
            }
            // No event within the poll window: loop again. The caller's
            // SIGALRM (spec.md §5) relies on this not blocking forever so a
            // pending signal still gets a chance to be delivered.
        }
    }

    /// Restore cooked mode and leave the alternate screen, unconditionally.
    /// Safe to call redundantly (on drop, on signal, after `Q`).
    pub fn restore(&mut self) {
        if !self.is_tty {
            return;
        }
        let _ = disable_raw_mode();
        if self.in_alt_screen {
            print!("{}", ansi::LEAVE_ALT_SCREEN);
            let _ = stdout().flush();
            self.in_alt_screen = false;
        }
        self.mode = Mode::Cooked;
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.restore();
    }
}

fn decode(code: crossterm::event::KeyCode) -> Key {
    use crossterm::event::KeyCode;
    match code {
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::EscapePlain,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::EscapePlain,
    }
}

fn install_panic_restore_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_tty_size_falls_back_to_env_or_default() {
        let term = Terminal {
            is_tty: false,
            mode: Mode::Cooked,
            in_alt_screen: false,
        };
        let (cols, rows) = term.size();
        assert!(cols > 0 && rows > 0);
    }

    #[test]
    fn non_tty_read_key_is_eof() {
        let term = Terminal {
            is_tty: false,
            mode: Mode::Cooked,
            in_alt_screen: false,
        };
        assert_eq!(term.read_key().expect("non-tty read never errors"), Key::Eof);
    }

    #[test]
    fn non_tty_mode_switch_is_a_no_op() {
        let mut term = Terminal {
            is_tty: false,
            mode: Mode::Cooked,
            in_alt_screen: false,
        };
        assert!(term.set_mode(Mode::Cbreak).is_ok());
    }
}
