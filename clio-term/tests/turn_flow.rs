//! Integration-style coverage of `spec.md` §8 scenarios 1 and 3, exercised
//! at the event-fold level (no real tty, matching the REDESIGN FLAG that
//! makes the streaming pipeline terminal-free testable).

use clio_protocol::Metrics;
use clio_protocol::ModelEvent;
use clio_term::streaming::StreamingPipeline;
use clio_term::turn_state::TurnState;

/// Scenario 1 ("Simple question, no tools"): a turn with content chunks and
/// no tool calls emits exactly one prefix, at the first chunk (P7).
#[test]
fn simple_answer_emits_exactly_one_prefix() {
    let mut turn = TurnState::new();
    let mut pipeline = StreamingPipeline::new();
    let mut prefixes_emitted = 0;

    for event in [
        ModelEvent::Chunk { delta: "4".to_string(), metrics: None },
        ModelEvent::Done {
            metrics: Metrics {
                prompt_tokens: 5,
                completion_tokens: 1,
                total_tokens: 6,
                multiplier: 1.0,
            },
        },
    ] {
        match event {
            ModelEvent::Chunk { delta, .. } => {
                if turn.needs_prefix() {
                    prefixes_emitted += 1;
                    turn.mark_prefix_emitted();
                }
                pipeline.ingest_chunk(&delta);
            }
            ModelEvent::Done { .. } => {
                pipeline.drain_remaining();
            }
            _ => unreachable!("scenario 1 has no tool/thinking/system events"),
        }
    }

    assert_eq!(prefixes_emitted, 1);
    assert_eq!(pipeline.accumulated_content, "4");
}

/// Scenario 3 ("Tool-calling turn"): a tool call between two chunk bursts
/// must force a second, fresh prefix on the post-tool continuation (P8),
/// and must not reset pagination eligibility for the continuation itself.
#[test]
fn tool_call_between_chunks_forces_a_second_prefix() {
    let mut turn = TurnState::new();
    let mut prefixes_emitted = 0;

    // First burst: agent starts listing files.
    if turn.needs_prefix() {
        prefixes_emitted += 1;
        turn.mark_prefix_emitted();
    }
    assert_eq!(prefixes_emitted, 1);
    assert!(!turn.needs_prefix(), "no second prefix until a tool runs");

    // Tool call fires mid-turn.
    turn.mark_tool_invoked();
    assert!(turn.tools_invoked_this_request);
    assert!(turn.needs_prefix(), "post-tool continuation must get a fresh prefix (P8)");

    // Continuation chunk.
    if turn.needs_prefix() {
        prefixes_emitted += 1;
        turn.mark_prefix_emitted();
    }

    assert_eq!(prefixes_emitted, 2, "exactly one fresh prefix per tool call, not per chunk");
}

/// A turn that only emits tool/system events (zero content chunks) must
/// never print a prefix at all (P7).
#[test]
fn tool_only_turn_never_emits_a_prefix() {
    let mut turn = TurnState::new();
    turn.mark_tool_invoked();
    // No Chunk event ever arrives this turn, so `needs_prefix` is simply
    // never consulted by the (absent) chunk handler; the invariant is that
    // nothing outside a Chunk arm ever calls `mark_prefix_emitted`.
    assert!(turn.needs_prefix());
    assert!(!turn.agent_prefix_emitted);
}
