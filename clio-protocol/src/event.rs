use serde::Deserialize;
use serde::Serialize;

use crate::Metrics;

/// Whether a `Thinking` chunk is part of a provider that emits explicit
/// start/end markers around its reasoning stream, or one that interleaves
/// reasoning content without any boundary signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThinkingSignal {
    Start,
    End,
}

/// A single event emitted by a model agent while it processes one user
/// request.
///
/// This is the redesign named in `spec.md` §9 ("Callbacks vs. iterators"):
/// rather than four separate callbacks (`on_chunk`, `on_tool_call`,
/// `on_thinking`, `on_system_message`), the wire protocol is a single enum
/// stream that the streaming pipeline folds over as a pure state
/// transition. The outer loop still drives it one event at a time so it
/// composes naturally with blocking I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelEvent {
    /// An incremental slice of the final answer.
    Chunk { delta: String, metrics: Option<Metrics> },
    /// An incremental slice of reasoning/chain-of-thought content.
    /// `signal` is `Some` only for providers with explicit boundaries.
    Thinking {
        delta: String,
        signal: Option<ThinkingSignal>,
    },
    /// The model requested execution of a named tool.
    ToolCall { name: String },
    /// A host-level notice to surface inline (not model content).
    SystemMessage { message: String },
    /// The turn is complete.
    Done { metrics: Metrics },
}
