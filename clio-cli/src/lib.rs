//! Binary entry point (`spec.md` §6 "CLI surface"): flag parsing, logging
//! init, the startup auth/migration sequence, and the background
//! update-check child process (`spec.md` §5 "Concurrency sources").

pub mod logging;
pub mod update_check;

pub use logging::init_tracing;
