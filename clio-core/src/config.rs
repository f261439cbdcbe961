use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::config_types::ProviderSelection;
use crate::config_types::ThemeSelection;
use crate::error::Result;

/// Keys that are always global regardless of `--session`, per `spec.md` §3
/// ("some keys session-scoped... some always global: api key").
const ALWAYS_GLOBAL_KEYS: &[&str] = &["api_key"];

fn default_pagination_enabled() -> bool {
    true
}

/// One on-disk layer of configuration (global file or session overrides).
/// Missing fields fall through to the next layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(flatten)]
    pub provider: ProviderSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_client_id: Option<String>,
}

/// Three-layer config lookup: immutable defaults < global file < session
/// overrides (`spec.md` §3). Each `get_*` accessor walks session, then
/// global, then the built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub codex_home: PathBuf,
    defaults: ConfigLayer,
    global: ConfigLayer,
    session: ConfigLayer,
}

impl Config {
    pub fn new(codex_home: PathBuf) -> Self {
        Self {
            codex_home,
            defaults: ConfigLayer {
                provider: ProviderSelection {
                    provider: Some("github_copilot".to_string()),
                    model: Some("gpt-4o".to_string()),
                    base_url: Some("https://api.githubcopilot.com".to_string()),
                    api_key: None,
                },
                theme: Some(ThemeSelection::default()),
                pagination_enabled: Some(default_pagination_enabled()),
                markdown_enabled: Some(true),
                log_level: Some("warn".to_string()),
                // A real deployment overrides this with its registered GitHub
                // OAuth App id via the global config file; there is no
                // working default because the id is issued per-deployment.
                github_client_id: Some("clio-cli-device-flow".to_string()),
            },
            global: ConfigLayer::default(),
            session: ConfigLayer::default(),
        }
    }

    fn global_path(&self) -> PathBuf {
        self.codex_home.join("config.toml")
    }

    /// Load the global layer from disk, leaving it at defaults if the file
    /// does not exist. A parse failure is propagated (unlike a session
    /// read failure, a broken global config is not silently ignored).
    pub fn load(codex_home: PathBuf) -> Result<Self> {
        let mut config = Self::new(codex_home);
        let path = config.global_path();
        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            config.global = toml::from_str(&text)?;
        }
        Ok(config)
    }

    pub fn save_global(&self) -> Result<()> {
        std::fs::create_dir_all(&self.codex_home)?;
        let text = toml::to_string_pretty(&self.global)?;
        std::fs::write(self.global_path(), text)?;
        Ok(())
    }

    /// Apply one `/api set key value`-style mutation. `session_scoped`
    /// mirrors the `--session` flag: when true (and `key` is not in
    /// [`ALWAYS_GLOBAL_KEYS`]), only the session layer is written.
    pub fn set(&mut self, key: &str, value: &str, session_scoped: bool) -> Result<()> {
        let target = if session_scoped && !ALWAYS_GLOBAL_KEYS.contains(&key) {
            &mut self.session
        } else {
            &mut self.global
        };
        match key {
            "provider" => target.provider.provider = Some(value.to_string()),
            "model" => target.provider.model = Some(value.to_string()),
            "base" | "base_url" => target.provider.base_url = Some(value.to_string()),
            "api_key" => target.provider.api_key = Some(value.to_string()),
            "log_level" => target.log_level = Some(value.to_string()),
            "markdown" => target.markdown_enabled = Some(value == "on" || value == "true"),
            "pagination" => target.pagination_enabled = Some(value == "on" || value == "true"),
            _ => {}
        }
        if !session_scoped || ALWAYS_GLOBAL_KEYS.contains(&key) {
            self.save_global()?;
        }
        Ok(())
    }

    pub fn session_override(&mut self, layer: ConfigLayer) {
        self.session = layer;
    }

    pub fn provider(&self) -> Option<&str> {
        self.session
            .provider
            .provider
            .as_deref()
            .or(self.global.provider.provider.as_deref())
            .or(self.defaults.provider.provider.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        self.session
            .provider
            .model
            .as_deref()
            .or(self.global.provider.model.as_deref())
            .or(self.defaults.provider.model.as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.session
            .provider
            .base_url
            .as_deref()
            .or(self.global.provider.base_url.as_deref())
            .or(self.defaults.provider.base_url.as_deref())
    }

    /// The API key is always-global: session overrides never apply to it.
    pub fn api_key(&self) -> Option<&str> {
        self.global
            .provider
            .api_key
            .as_deref()
            .or(self.defaults.provider.api_key.as_deref())
    }

    pub fn pagination_enabled(&self) -> bool {
        self.session
            .pagination_enabled
            .or(self.global.pagination_enabled)
            .or(self.defaults.pagination_enabled)
            .unwrap_or(true)
    }

    pub fn markdown_enabled(&self) -> bool {
        self.session
            .markdown_enabled
            .or(self.global.markdown_enabled)
            .or(self.defaults.markdown_enabled)
            .unwrap_or(true)
    }

    pub fn theme(&self) -> &ThemeSelection {
        self.session
            .theme
            .as_ref()
            .or(self.global.theme.as_ref())
            .or(self.defaults.theme.as_ref())
            .expect("defaults always set a theme")
    }

    pub fn github_client_id(&self) -> &str {
        self.session
            .github_client_id
            .as_deref()
            .or(self.global.github_client_id.as_deref())
            .or(self.defaults.github_client_id.as_deref())
            .unwrap_or("clio-cli-device-flow")
    }

    pub fn log_level(&self) -> &str {
        self.session
            .log_level
            .as_deref()
            .or(self.global.log_level.as_deref())
            .or(self.defaults.log_level.as_deref())
            .unwrap_or("warn")
    }
}

pub fn default_codex_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clio")
}

pub fn sessions_dir(codex_home: &Path) -> PathBuf {
    codex_home.join("sessions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_through_three_layers() {
        let mut config = Config::new(PathBuf::from("/tmp/clio-test-home"));
        assert_eq!(config.provider(), Some("github_copilot"));
        config
            .set("provider", "openai", false)
            .expect("in-memory set never fails to apply, only to persist");
        assert_eq!(config.provider(), Some("openai"));
    }

    #[test]
    fn session_scoped_set_does_not_touch_global() {
        let mut config = Config::new(PathBuf::from("/tmp/clio-test-home-2"));
        config.session_override(ConfigLayer::default());
        config
            .set("model", "o3", true)
            .expect("session-scoped set is in-memory only");
        assert_eq!(config.model(), Some("o3"));
        assert_ne!(config.global.provider.model.as_deref(), Some("o3"));
    }

    #[test]
    fn api_key_is_always_global_even_when_session_scoped() {
        let mut config = Config::new(PathBuf::from("/tmp/clio-test-home-3"));
        config.session.provider.api_key = None;
        // Pretend to request a session-scoped write; it must land in global.
        config.global.provider.api_key = Some("sk-abc".to_string());
        assert_eq!(config.api_key(), Some("sk-abc"));
    }
}
