//! Terminal-facing half of CLIO: everything in `spec.md` §4 that actually
//! touches a tty (the teacher's TUI crate forbids direct `print!`/`println!`
//! since it renders through `ratatui`'s screen buffer; this crate writes
//! plain ANSI text directly instead, so that restriction does not apply
//! here — see `DESIGN.md` for the full reasoning).

pub mod ansi;
pub mod chat_controller;
pub mod collab;
pub mod command_router;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod readline;
pub mod signal;
pub mod spinner;
pub mod streaming;
pub mod terminal;
pub mod theme;
pub mod turn_state;

pub use chat_controller::ChatController;
pub use error::Result;
pub use error::TermError;
