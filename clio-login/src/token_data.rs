use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Current on-disk credential schema (`spec.md` §6).
pub const CURRENT_SCHEME_VERSION: u32 = 2;

/// `~/.clio/github_tokens.json` (`spec.md` §6). `copilot_token` may be
/// absent, in which case requests fall back to the GitHub token directly
/// (`spec.md` §3, Auth Token invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub github_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_scheme_version")]
    pub scheme_version: u32,
}

fn default_scheme_version() -> u32 {
    // Absent entirely on schema v1 files, which predate this field.
    1
}

impl AuthToken {
    pub fn needs_migration(&self) -> bool {
        self.scheme_version < CURRENT_SCHEME_VERSION
    }

    /// True when `expires_at` is within the proactive-refresh safety window
    /// (`spec.md` §4.8 step 3).
    pub fn needs_refresh(&self, safety_window: chrono::Duration) -> bool {
        match self.expires_at {
            Some(expiry) => Utc::now() + safety_window >= expiry,
            None => false,
        }
    }
}
