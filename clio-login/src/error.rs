use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize credentials: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("device flow request failed: {0}")]
    Request(String),

    #[error("authorization pending")]
    Pending,

    #[error("authorization was denied")]
    Denied,

    #[error("device code expired before the user authorized it")]
    Expired,

    #[error("no credentials on file")]
    NotLoggedIn,
}
