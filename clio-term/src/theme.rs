//! ANSI/Theme layer (`spec.md` §3 "Theme/Style", §4.3 token substitution).
//! Resolves the `@SEMANTIC_KEY@` tokens the markdown renderer emits to real
//! escape sequences, and carries the decorative bits (templates, spinner
//! frames, tool-display format) a theme switch needs to replace atomically.
//!
//! Grounded on `codex-rs/tui/src/colors.rs` + `theme.rs`'s pattern of a
//! single global "current theme" resolved through free functions, adapted
//! from ratatui's `Style`/`Color` to raw SGR strings since this crate does
//! not depend on ratatui.

use std::collections::HashMap;
use std::sync::RwLock;

use clio_core::config_types::ToolDisplayFormat;
use lazy_static::lazy_static;

/// An internal guard sequence that stands in for a literal `@` inside
/// inline code spans, re-exported from `clio_markdown` so this crate's
/// token substitution and the renderer's escaping stay in lockstep
/// (`spec.md` §6).
pub const AT_GUARD: &str = clio_markdown::AT_GUARD;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    tokens: HashMap<&'static str, &'static str>,
    pub spinner_frames: Vec<&'static str>,
    pub spinner_interval_ms: u64,
    pub pagination_hint: String,
    pub pagination_prompt_streaming: String,
    pub pagination_prompt_paged_template: &'static str,
    pub tool_display_format: ToolDisplayFormat,
}

impl Theme {
    fn bbs_classic() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert("AGENT_LABEL", "\x1b[1;36m");
        tokens.insert("HEADING", "\x1b[1;33m");
        tokens.insert("BOLD", "\x1b[1m");
        tokens.insert("ITALIC", "\x1b[3m");
        tokens.insert("DIM", "\x1b[2m");
        tokens.insert("CODE", "\x1b[32m");
        tokens.insert("CODE_BLOCK", "\x1b[32m");
        tokens.insert("QUOTE", "\x1b[2;37m");
        tokens.insert("LINK", "\x1b[4;34m");
        tokens.insert("DATA", "\x1b[37m");
        tokens.insert("ERROR", "\x1b[1;31m");
        tokens.insert("SYSTEM", "\x1b[35m");
        tokens.insert("PROMPT", "\x1b[1;32m");
        tokens.insert("COLLAB_PROMPT", "\x1b[1;35m");
        tokens.insert("RESET", "\x1b[0m");
        Self {
            name: "bbs-classic".to_string(),
            tokens,
            spinner_frames: vec!["|", "/", "-", "\\"],
            spinner_interval_ms: 120,
            pagination_hint: "Use \u{2191}/\u{2193} to scroll, Q to quit, any other key to continue".to_string(),
            pagination_prompt_streaming: "-- (Q)uit or any key to continue --".to_string(),
            pagination_prompt_paged_template: "-- [Page {n} of {m}] --",
            tool_display_format: ToolDisplayFormat::Box,
        }
    }

    fn midnight() -> Self {
        let mut theme = Self::bbs_classic();
        theme.name = "midnight".to_string();
        theme.tokens.insert("AGENT_LABEL", "\x1b[1;35m");
        theme.tokens.insert("HEADING", "\x1b[1;34m");
        theme.spinner_frames = vec!["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"];
        theme.tool_display_format = ToolDisplayFormat::Inline;
        theme
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "bbs-classic" => Some(Self::bbs_classic()),
            "midnight" => Some(Self::midnight()),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["bbs-classic", "midnight"]
    }

    /// Substitute every `@KEY@` token in `text` with its escape sequence,
    /// then restore [`AT_GUARD`] sequences (protecting literal `@` in
    /// inline code) back to a plain `@` (`spec.md` §6).
    pub fn resolve(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('@') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            if let Some(end) = after.find('@') {
                let key = &after[..end];
                match self.tokens.get(key) {
                    Some(seq) => {
                        out.push_str(seq);
                        rest = &after[end + 1..];
                        continue;
                    }
                    None => {
                        // Not a recognized token: keep the literal `@` and
                        // resume scanning right after it.
                        out.push('@');
                        rest = after;
                        continue;
                    }
                }
            } else {
                out.push('@');
                rest = after;
                break;
            }
        }
        out.push_str(rest);
        out.replace(AT_GUARD, "@")
    }
}

lazy_static! {
    static ref CURRENT_THEME: RwLock<Theme> = RwLock::new(Theme::bbs_classic());
}

pub fn current_theme() -> Theme {
    CURRENT_THEME
        .read()
        .map(|t| t.clone())
        .unwrap_or_else(|_| Theme::bbs_classic())
}

/// Switch the global theme. Callers that cache anything derived from the
/// theme (most notably the spinner, `spec.md` §9 "Spinner lifecycle across
/// themes") must recreate that state after calling this.
pub fn set_theme(name: &str) -> bool {
    let Some(theme) = Theme::by_name(name) else {
        return false;
    };
    if let Ok(mut guard) = CURRENT_THEME.write() {
        *guard = theme;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_token_to_escape_sequence() {
        let theme = Theme::bbs_classic();
        let resolved = theme.resolve("@BOLD@hi@RESET@");
        assert!(resolved.starts_with("\x1b[1m"));
        assert!(resolved.ends_with("\x1b[0m"));
        assert!(resolved.contains("hi"));
    }

    #[test]
    fn unknown_token_is_left_as_literal_text() {
        let theme = Theme::bbs_classic();
        let resolved = theme.resolve("user@example.com");
        assert_eq!(resolved, "user@example.com");
    }

    #[test]
    fn at_guard_is_restored_to_literal_at() {
        let theme = Theme::bbs_classic();
        let guarded = format!("a{AT_GUARD}b");
        assert_eq!(theme.resolve(&guarded), "a@b");
    }

    #[test]
    fn set_theme_swaps_spinner_frames() {
        assert!(set_theme("midnight"));
        assert_eq!(current_theme().name, "midnight");
        assert!(set_theme("bbs-classic"));
        assert_eq!(current_theme().name, "bbs-classic");
    }

    #[test]
    fn unknown_theme_name_is_rejected() {
        assert!(!set_theme("does-not-exist"));
    }
}
