//! BBS Pagination Controller (`spec.md` §4.2). A cooperative, single-key
//! pager: the caller feeds it rendered lines one at a time (streaming mode)
//! or all at once (whole-content mode, e.g. `/help`), and it decides when
//! to pause and how to prompt.

use std::io::Write;
use std::io::stdout;

use crate::ansi;
use crate::terminal::Key;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Inactive,
    CollectingPage,
    Paused,
    NavigatingHistory,
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    Continue,
    Quit,
}

/// Abstraction over "read one decoded keypress", so the state machine is
/// testable without a real tty (`P5`, `P6`, `P12`).
pub trait KeySource {
    fn read_key(&mut self) -> Key;
}

impl KeySource for crate::terminal::Terminal {
    fn read_key(&mut self) -> Key {
        crate::terminal::Terminal::read_key(self).unwrap_or(Key::Eof)
    }
}

/// Drives the pause/prompt/resume cycle for both streaming and whole-content
/// pagination. One instance lives for the lifetime of the chat controller so
/// the "first pause of a session" hint (`spec.md` §4.2) is shown at most
/// once.
pub struct PaginationController {
    state: PaginationState,
    hint_shown: bool,
    /// Already-rendered lines, grouped into pages, kept for arrow-key
    /// back/forward navigation in whole-content mode (`spec.md` §3 "Page").
    pages: Vec<Vec<String>>,
    lines_since_pause: usize,
}

impl PaginationController {
    pub fn new() -> Self {
        Self {
            state: PaginationState::Inactive,
            hint_shown: false,
            pages: Vec::new(),
            lines_since_pause: 0,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// `spec.md` P5: pause is triggered exactly when `line_count >= rows-2`.
    pub fn threshold(rows: u16) -> usize {
        rows.saturating_sub(2) as usize
    }

    /// Feed one freshly-rendered line during streaming. Returns `true` when
    /// the pause threshold (`spec.md` §4.2) has just been reached and the
    /// caller should call [`Self::pause_streaming`].
    pub fn record_streaming_line(&mut self, rows: u16) -> bool {
        self.state = PaginationState::CollectingPage;
        self.lines_since_pause += 1;
        self.lines_since_pause >= Self::threshold(rows)
    }

    /// Height (in terminal rows) the prompt+hint will occupy, so the
    /// threshold calculation can measure it dynamically rather than assume
    /// one line (`spec.md` §9, pagination-hint-height open question).
    fn hint_height(&self, theme: &Theme) -> usize {
        if self.hint_shown {
            0
        } else {
            theme.pagination_hint.lines().count().max(1)
        }
    }

    /// Streaming-mode pause: `(Q)uit or any key`, no navigation
    /// (`spec.md` §4.2 "Prompt design"). Erases the prompt line (and hint,
    /// if shown) once resolved, per the invariant in §4.2.
    pub fn pause_streaming(
        &mut self,
        keys: &mut dyn KeySource,
        theme: &Theme,
    ) -> PauseOutcome {
        self.state = PaginationState::Paused;
        let hint_lines = self.hint_height(theme);
        if hint_lines > 0 {
            println!("{}", theme.resolve(&format!("@DIM@{}@RESET@", theme.pagination_hint)));
            self.hint_shown = true;
        }
        print!("{}", theme.resolve(&format!("@DIM@{}@RESET@", theme.pagination_prompt_streaming)));
        let _ = stdout().flush();

        let key = keys.read_key();
        self.erase_prompt(hint_lines);
        self.lines_since_pause = 0;

        match key {
            Key::Char('q') | Key::Char('Q') => {
                self.state = PaginationState::QuitRequested;
                PauseOutcome::Quit
            }
            _ => {
                self.state = PaginationState::CollectingPage;
                PauseOutcome::Continue
            }
        }
    }

    /// Whole-content pagination: splits `lines` into pages of `rows - 2`,
    /// enters the alternate screen (`spec.md` §4.2 "Alternate-screen is
    /// used for whole-content paginated views"), and allows up/down arrow
    /// navigation across already-rendered pages.
    pub fn paginate_whole_content(
        &mut self,
        lines: &[String],
        rows: u16,
        terminal: &mut crate::terminal::Terminal,
        theme: &Theme,
    ) -> PauseOutcome {
        let page_size = Self::threshold(rows).max(1);
        self.pages = lines
            .chunks(page_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let total = self.pages.len();
        let _ = terminal.enter_alt_screen();
        let mut index = 0usize;
        let outcome = loop {
            terminal.clear_screen();
            for line in &self.pages[index] {
                println!("{line}");
            }
            let hint_lines = self.hint_height(theme);
            if hint_lines > 0 {
                println!("{}", theme.resolve(&format!("@DIM@{}@RESET@", theme.pagination_hint)));
                self.hint_shown = true;
            }
            let prompt = theme
                .pagination_prompt_paged_template
                .replace("{n}", &(index + 1).to_string())
                .replace("{m}", &total.to_string());
            print!("{}", theme.resolve(&format!("@DIM@{prompt}@RESET@")));
            let _ = stdout().flush();

            self.state = PaginationState::NavigatingHistory;
            match keys_or_terminal(terminal) {
                Key::Char('q') | Key::Char('Q') => {
                    self.state = PaginationState::QuitRequested;
                    break PauseOutcome::Quit;
                }
                Key::ArrowDown if index + 1 < total => index += 1,
                Key::ArrowUp if index > 0 => index -= 1,
                Key::Eof => break PauseOutcome::Quit,
                _ if index + 1 < total => index += 1,
                _ => break PauseOutcome::Continue,
            }
        };
        let _ = terminal.leave_alt_screen();
        let _ = terminal.set_mode(crate::terminal::Mode::Cooked);
        self.state = PaginationState::Inactive;
        outcome
    }

    fn erase_prompt(&self, hint_lines: usize) {
        print!("{}", ansi::erase_current_line());
        for _ in 0..hint_lines {
            print!("{}{}", ansi::CURSOR_UP_ONE, ansi::erase_current_line());
        }
        let _ = stdout().flush();
    }
}

fn keys_or_terminal(terminal: &mut crate::terminal::Terminal) -> Key {
    terminal.read_key().unwrap_or(Key::Eof)
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedKeys {
        queue: Vec<Key>,
    }

    impl KeySource for ScriptedKeys {
        fn read_key(&mut self) -> Key {
            if self.queue.is_empty() {
                Key::Eof
            } else {
                self.queue.remove(0)
            }
        }
    }

    #[test]
    fn threshold_is_rows_minus_two() {
        assert_eq!(PaginationController::threshold(24), 22);
        assert_eq!(PaginationController::threshold(1), 0);
    }

    #[test]
    fn pause_triggers_exactly_at_threshold() {
        let mut controller = PaginationController::new();
        let rows = 5;
        let threshold = PaginationController::threshold(rows);
        let mut triggered_at = None;
        for i in 1..=threshold + 2 {
            if controller.record_streaming_line(rows) {
                triggered_at = Some(i);
                break;
            }
        }
        assert_eq!(triggered_at, Some(threshold));
    }

    #[test]
    fn q_propagates_as_quit() {
        let mut controller = PaginationController::new();
        let theme = Theme::by_name("bbs-classic").expect("built-in theme");
        let mut keys = ScriptedKeys {
            queue: vec![Key::Char('q')],
        };
        let outcome = controller.pause_streaming(&mut keys, &theme);
        assert_eq!(outcome, PauseOutcome::Quit);
        assert_eq!(controller.state(), PaginationState::QuitRequested);
    }

    #[test]
    fn any_other_key_continues() {
        let mut controller = PaginationController::new();
        let theme = Theme::by_name("bbs-classic").expect("built-in theme");
        let mut keys = ScriptedKeys {
            queue: vec![Key::Char('x')],
        };
        let outcome = controller.pause_streaming(&mut keys, &theme);
        assert_eq!(outcome, PauseOutcome::Continue);
    }

    #[test]
    fn hint_is_shown_only_on_first_pause() {
        let mut controller = PaginationController::new();
        let theme = Theme::by_name("bbs-classic").expect("built-in theme");
        assert_eq!(controller.hint_height(&theme), 1);
        controller.hint_shown = true;
        assert_eq!(controller.hint_height(&theme), 0);
    }
}
