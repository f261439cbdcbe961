use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClioError>;

/// Error kinds from `spec.md` §7, typed per the teacher's per-crate error
/// enum convention (`codex-rs/core/src/error.rs`).
#[derive(Error, Debug)]
pub enum ClioError {
    #[error("session {id} is already open (lock held at {lock_path})")]
    SessionLocked { id: String, lock_path: String },

    #[error("session file could not be read, treating as absent: {0}")]
    SessionReadFailed(#[source] std::io::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize session state: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    #[error("provider request failed after retries: {0}")]
    ProviderTransient(String),

    #[error("authentication expired or revoked")]
    AuthExpired,

    #[error("unknown command: /{0}")]
    UnknownCommand(String),
}
