//! Session, configuration, billing, and the `ModelAgent`/`Provider` seam.
//!
//! This crate owns everything in `spec.md` §4.7 (Session & Config Coupling)
//! and the data model in §3 except the terminal-facing pieces, which live
//! in `clio-term`.

pub mod billing;
pub mod config;
pub mod config_types;
pub mod error;
pub mod http_provider;
pub mod provider;
pub mod session;
pub mod slash_prompts;

pub use billing::Billing;
pub use config::Config;
pub use error::ClioError;
pub use error::Result;
pub use provider::AgentOutcome;
pub use provider::ModelAgent;
pub use provider::RequestOptions;
pub use provider::Ui;
pub use session::Session;
