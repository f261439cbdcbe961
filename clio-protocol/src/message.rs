use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Role of a single entry in a session's conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single historical record in a [`crate`] conversation.
///
/// Assistant and system content is stored in its sanitized form (emoji and
/// other characters that would break a provider's upstream encoding are
/// stripped before persistence) while the original, unsanitized text is what
/// gets displayed to the user. Keeping both copies explicit avoids a lossy
/// round trip if the session is ever replayed back through the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Present only for `role == Assistant`/`System` when sanitization
    /// changed the text; `None` means `content` is already display-ready.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_name: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            display_content: None,
            timestamp: Utc::now(),
            tool_call_name: None,
        }
    }

    /// Build an assistant message, sanitizing `raw` for storage while
    /// keeping `raw` itself as the display copy when the two differ.
    pub fn assistant(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sanitized = sanitize_for_upstream(&raw);
        let display_content = if sanitized == raw { None } else { Some(raw) };
        Self {
            role: Role::Assistant,
            content: sanitized,
            display_content,
            timestamp: Utc::now(),
            tool_call_name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        let raw = content.into();
        let sanitized = sanitize_for_upstream(&raw);
        let display_content = if sanitized == raw { None } else { Some(raw) };
        Self {
            role: Role::System,
            content: sanitized,
            display_content,
            timestamp: Utc::now(),
            tool_call_name: None,
        }
    }

    /// Text that should be shown to the user (original copy for
    /// assistant/system entries, straight content otherwise).
    pub fn display_text(&self) -> &str {
        self.display_content.as_deref().unwrap_or(&self.content)
    }
}

/// Strips characters (primarily emoji) that are known to break some
/// providers' upstream encodings when echoed back in a later request.
/// Pure ASCII/Latin text is returned unchanged.
pub fn sanitize_for_upstream(text: &str) -> String {
    text.chars()
        .filter(|c| !is_emoji(*c))
        .collect::<String>()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F1E6..=0x1F1FF | 0xFE0F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_sanitizes_emoji_but_keeps_display_copy() {
        let msg = Message::assistant("done \u{2705} great");
        assert_eq!(msg.content, "done  great");
        assert_eq!(msg.display_text(), "done \u{2705} great");
    }

    #[test]
    fn assistant_without_emoji_has_no_display_copy() {
        let msg = Message::assistant("plain text");
        assert!(msg.display_content.is_none());
        assert_eq!(msg.display_text(), "plain text");
    }
}
