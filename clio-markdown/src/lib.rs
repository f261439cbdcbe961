//! Markdown-to-semantic-token rendering (`spec.md` §6: "Markdown Renderer
//! (external): `render(text) -> text`. Pure function.").
//!
//! The renderer itself is an out-of-scope external collaborator per the
//! spec; this crate provides the trait seam plus one concrete, minimal
//! implementation so the rest of the workspace has something real to drive
//! against. It is not a general CommonMark renderer — it emits the
//! `@SEMANTIC_KEY@` token convention `spec.md` §6 describes, which the
//! caller's ANSI layer is responsible for resolving to escape sequences.

use pulldown_cmark::Event;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

/// Internal guard sequence used to protect literal `@` characters that
/// appear inside inline code spans from being mistaken for a semantic
/// token delimiter by the ANSI substitution pass (`spec.md` §6). Callers
/// restore this to a literal `@` after substituting tokens.
pub const AT_GUARD: &str = "\u{0}AT\u{0}";

pub trait MarkdownRenderer {
    fn render(&self, text: &str) -> String;
}

/// Default renderer: walks a CommonMark event stream and emits
/// `@KEY@ ... @RESET@`-delimited spans for the handful of constructs the
/// streaming pipeline and pager care about (headings, emphasis, inline
/// code, fenced code, block quotes, list items, tables).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMarkdownRenderer;

impl MarkdownRenderer for DefaultMarkdownRenderer {
    fn render(&self, text: &str) -> String {
        let parser = Parser::new(text);
        let mut out = String::with_capacity(text.len() + 32);
        let mut list_depth: Vec<Option<u64>> = Vec::new();

        for event in parser {
            match event {
                Event::Start(tag) => push_open(&mut out, &tag, &mut list_depth),
                Event::End(tag_end) => push_close(&mut out, tag_end, &mut list_depth),
                Event::Text(t) => out.push_str(&t),
                Event::Code(t) => {
                    out.push_str("@CODE@");
                    out.push_str(&guard_at(&t));
                    out.push_str("@RESET@");
                }
                Event::SoftBreak => out.push(' '),
                Event::HardBreak => out.push('\n'),
                Event::Rule => out.push_str("\n@DIM@---@RESET@\n"),
                Event::Html(t) | Event::InlineHtml(t) => out.push_str(&t),
                Event::FootnoteReference(_) | Event::TaskListMarker(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
            }
        }
        out
    }
}

fn guard_at(text: &str) -> String {
    text.replace('@', AT_GUARD)
}

fn push_open(out: &mut String, tag: &Tag, list_depth: &mut Vec<Option<u64>>) {
    match tag {
        Tag::Heading { level, .. } => {
            out.push_str("@HEADING@");
            out.push_str(&"#".repeat(*level as usize));
            out.push(' ');
        }
        Tag::Emphasis => out.push_str("@ITALIC@"),
        Tag::Strong => out.push_str("@BOLD@"),
        Tag::Strikethrough => out.push_str("@DIM@"),
        Tag::BlockQuote => out.push_str("@QUOTE@> "),
        Tag::CodeBlock(_) => out.push_str("@CODE_BLOCK@"),
        Tag::Link { dest_url, .. } => {
            out.push_str("@LINK@");
            out.push_str(dest_url.as_ref());
            out.push_str(" @RESET@");
        }
        Tag::List(start) => list_depth.push(*start),
        Tag::Item => {
            match list_depth.last_mut() {
                Some(Some(n)) => {
                    out.push_str(&format!("@DIM@{n}.@RESET@ "));
                    *n += 1;
                }
                _ => out.push_str("@DIM@-@RESET@ "),
            }
        }
        Tag::Paragraph | Tag::TableHead | Tag::TableRow => {}
        Tag::TableCell => out.push_str("@DATA@"),
        Tag::Table(_) => {}
        _ => {}
    }
}

fn push_close(out: &mut String, tag_end: TagEnd, list_depth: &mut Vec<Option<u64>>) {
    match tag_end {
        TagEnd::Heading(_) => out.push_str("@RESET@\n"),
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => out.push_str("@RESET@"),
        TagEnd::BlockQuote => out.push_str("@RESET@\n"),
        TagEnd::CodeBlock => out.push_str("@RESET@\n"),
        TagEnd::Link => {}
        TagEnd::List(_) => {
            list_depth.pop();
        }
        TagEnd::Item => out.push('\n'),
        TagEnd::Paragraph => out.push('\n'),
        TagEnd::TableCell => out.push_str("@RESET@\t"),
        TagEnd::TableRow => out.push('\n'),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_text_is_wrapped_in_bold_token() {
        let rendered = DefaultMarkdownRenderer.render("**hi**");
        assert_eq!(rendered, "@BOLD@hi@RESET@");
    }

    #[test]
    fn inline_code_at_sign_is_guarded() {
        let rendered = DefaultMarkdownRenderer.render("`a@b`");
        assert!(rendered.contains(AT_GUARD));
        assert!(!rendered.contains("a@b"));
    }

    #[test]
    fn heading_emits_heading_token() {
        let rendered = DefaultMarkdownRenderer.render("# Title");
        assert!(rendered.starts_with("@HEADING@#"));
    }

    #[test]
    fn plain_text_round_trips_unchanged() {
        let rendered = DefaultMarkdownRenderer.render("just text");
        assert_eq!(rendered.trim(), "just text");
    }
}
