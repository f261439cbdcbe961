use thiserror::Error;

pub type Result<T> = std::result::Result<T, TermError>;

/// Error kinds owned by the terminal-facing half of the core
/// (`spec.md` §7 kinds 3, 4, 6), typed per the teacher's per-crate error
/// enum convention.
#[derive(Error, Debug)]
pub enum TermError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] clio_core::ClioError),

    #[error(transparent)]
    Auth(#[from] clio_login::AuthError),
}
