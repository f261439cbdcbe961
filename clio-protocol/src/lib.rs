//! Wire-agnostic types shared between the model agent, the streaming
//! pipeline and the session store.
//!
//! This crate intentionally knows nothing about any particular provider's
//! request/response shape (that is a non-goal of this core, see `spec.md`
//! §1); it only defines the event stream the streaming pipeline folds over
//! and the message/metrics types persisted to a session.

mod event;
mod message;
mod metrics;

pub use event::ModelEvent;
pub use event::ThinkingSignal;
pub use message::Message;
pub use message::Role;
pub use metrics::Metrics;
