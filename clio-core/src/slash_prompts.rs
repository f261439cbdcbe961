//! Prompt formatters for the slash commands that synthesize a follow-up
//! user message instead of acting locally (`spec.md` §4.4: `/explain`,
//! `/review`, `/test`, `/fix`, `/doc`, `/init`, `/design`).
//!
//! Each formatter takes whatever local context the router already has and
//! returns the string the chat loop should submit to the model in place of
//! the user's literal command.

pub fn format_explain_command(target: &str) -> String {
    format!(
        "Explain the following in clear terms, covering what it does, why it \
         is structured that way, and any non-obvious behavior a new \
         contributor would miss:\n\n{target}"
    )
}

pub fn format_review_command(target: &str) -> String {
    format!(
        "Review the following for correctness bugs, unclear naming, and \
         missed edge cases. List concrete findings, not general style \
         opinions:\n\n{target}"
    )
}

pub fn format_test_command(target: &str) -> String {
    format!(
        "Write tests for the following, covering the golden path and the \
         edge cases that are likely to break first. Match the existing test \
         style in this project:\n\n{target}"
    )
}

pub fn format_fix_command(target: &str) -> String {
    format!(
        "Diagnose and fix the following issue. Identify the root cause \
         before changing anything, then make the minimal change that \
         addresses it:\n\n{target}"
    )
}

pub fn format_doc_command(target: &str) -> String {
    format!("Write documentation for the following:\n\n{target}")
}

pub fn format_design_command(task: &str) -> String {
    format!(
        "Propose a design for the following task. Cover the main approach, \
         the key tradeoff, and what you'd need to confirm before \
         implementing:\n\n{task}"
    )
}

pub fn format_init_command(working_directory: &str) -> String {
    format!(
        "Look at the project rooted at `{working_directory}` and produce a \
         short onboarding summary: what it is, how it's laid out, and how to \
         run its tests."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_formatter_embeds_its_target() {
        assert!(format_explain_command("foo.rs").contains("foo.rs"));
        assert!(format_review_command("bar.rs").contains("bar.rs"));
        assert!(format_test_command("baz.rs").contains("baz.rs"));
        assert!(format_fix_command("panic in baz").contains("panic in baz"));
        assert!(format_doc_command("qux.rs").contains("qux.rs"));
        assert!(format_design_command("add caching").contains("add caching"));
        assert!(format_init_command("/repo").contains("/repo"));
    }
}
