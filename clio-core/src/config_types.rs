use serde::Deserialize;
use serde::Serialize;

/// Tool-call display format chosen by a theme (`spec.md` §3, Theme/Style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolDisplayFormat {
    #[default]
    Box,
    Inline,
}

/// Decorative-only theme/style selection. The actual color token tables and
/// templates live in `clio-term::theme` (out of this crate's concern; this
/// is the persisted *selection*, not the resolved palette).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSelection {
    pub name: String,
    #[serde(default)]
    pub tool_display_format: ToolDisplayFormat,
}

impl Default for ThemeSelection {
    fn default() -> Self {
        Self {
            name: "bbs-classic".to_string(),
            tool_display_format: ToolDisplayFormat::Box,
        }
    }
}

/// One provider entry from the provider catalog (`/api providers`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub id: String,
    pub base_url: String,
    #[serde(default)]
    pub requires_auth: bool,
}

/// Values mutated by `/api set` / `/config set` that affect which provider
/// path a request takes. See `spec.md` §4.7: changing any of these must
/// trigger a client rebuild and orchestrator rebind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Fixed catalog backing `/api providers` and `/models` (`spec.md` §6
/// slash-command surface). Not user-editable: swapping providers is a
/// `/api set provider <id>` away, this just lists what is known.
pub fn known_providers() -> Vec<ProviderEntry> {
    vec![
        ProviderEntry {
            id: "github_copilot".to_string(),
            base_url: "https://api.githubcopilot.com".to_string(),
            requires_auth: true,
        },
        ProviderEntry {
            id: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            requires_auth: true,
        },
        ProviderEntry {
            id: "local".to_string(),
            base_url: "http://localhost:11434".to_string(),
            requires_auth: false,
        },
    ]
}

/// Models offered per provider id, for `/models` (`spec.md` §6).
pub fn known_models(provider: &str) -> Vec<&'static str> {
    match provider {
        "github_copilot" => vec!["gpt-4o", "o3-mini", "claude-3.5-sonnet"],
        "openai" => vec!["gpt-4o", "gpt-4o-mini", "o3-mini"],
        "local" => vec!["llama3", "qwen2.5-coder"],
        _ => Vec::new(),
    }
}
