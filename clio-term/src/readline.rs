//! Cooked-mode line input (`spec.md` §4.1, [`crate::terminal::Mode::Cooked`]).
//! The main chat prompt and the user-collaboration sub-protocol both read a
//! single line at a time; editing (backspace, arrows) is left to the tty's
//! own line discipline rather than hand-rolled here, matching cooked mode's
//! contract of "let the OS handle it".

use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use crate::terminal::Mode;
use crate::terminal::Terminal;
use crate::theme::Theme;

/// Print `prompt` (resolved through `theme`) and block for one line of
/// input. Returns `None` on EOF (Ctrl-D) or a blank line typed at a
/// collaboration prompt — callers distinguish those cases by context, this
/// function only reports "nothing was read".
pub fn read_line(terminal: &mut Terminal, prompt: &str, theme: &Theme) -> Option<String> {
    let _ = terminal.set_mode(Mode::Cooked);
    print!("{}", theme.resolve(prompt));
    let _ = stdout().flush();

    let mut buf = String::new();
    match stdin().read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim_end_matches(['\n', '\r']).to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_resolves_prompt_colors_before_printing() {
        let theme = Theme::by_name("bbs-classic").expect("built-in theme");
        let resolved = theme.resolve("@PROMPT@> @RESET@");
        assert!(resolved.starts_with("\x1b[1;32m"));
        assert!(resolved.contains('>'));
    }
}
