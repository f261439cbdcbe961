//! GitHub OAuth device-flow authentication manager (`spec.md` §4.8).

pub mod copilot;
pub mod device_flow;
pub mod entrypoints;
pub mod error;
pub mod token_data;
pub mod token_store;

pub use device_flow::DeviceCode;
pub use entrypoints::LoginPrompt;
pub use entrypoints::ensure_fresh;
pub use entrypoints::logout;
pub use entrypoints::run_device_code_login;
pub use entrypoints::startup_check;
pub use error::AuthError;
pub use error::Result;
pub use token_data::AuthToken;
