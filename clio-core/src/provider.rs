use std::path::Path;

use clio_protocol::Message;
use clio_protocol::Metrics;
use clio_protocol::ModelEvent;

/// Host services a model agent needs while a turn is in flight: stopping
/// the spinner before it prints, and running the user-collaboration
/// sub-protocol (`spec.md` §6, "ui (self, for user-collaboration
/// callbacks)", "spinner (so interactive tools can stop it)").
///
/// This trait is the seam between `clio-core` (which knows nothing about
/// terminals) and `clio-term` (which implements it on `ChatController`).
pub trait Ui {
    fn stop_spinner(&mut self);
    fn start_spinner(&mut self);

    /// Run the user-collaboration sub-protocol (`spec.md` §4.6): display
    /// `question` (and optional `context`), read a reply. Returns `None` if
    /// the user cancelled (empty line or EOF) or the reply cancelled via a
    /// re-entrant `/exit`-like command.
    fn collaborate(&mut self, question: &str, context: Option<&str>) -> Option<String>;

    /// True if SIGINT has arrived since the last call (`spec.md` §4.3
    /// Cancellation, §7 kind 9). A model agent blocked in a streaming read
    /// polls this to break out and save-and-exit instead of finishing the
    /// turn.
    fn check_interrupted(&mut self) -> bool;

    /// Arm the per-turn SIGALRM (`spec.md` §5): fires once a second purely
    /// to interrupt a blocking socket read so a pending SIGINT can be
    /// delivered. Call once before a turn's blocking read loop starts.
    fn arm_turn_alarm(&mut self);

    /// Disarm the per-turn SIGALRM (`spec.md` §4.3 step 6, "disarm the
    /// per-cycle SIGALRM"). Call once the turn's read loop has ended, on
    /// every exit path.
    fn disarm_turn_alarm(&mut self);
}

/// Inputs to one `process_user_request` call (`spec.md` §6).
pub struct RequestOptions<'a> {
    pub conversation_history: &'a [Message],
    pub current_file: Option<&'a Path>,
    pub working_directory: &'a Path,
}

/// Result of one `process_user_request` call (`spec.md` §6).
#[derive(Debug, Clone, Default)]
pub struct AgentOutcome {
    pub success: bool,
    pub final_response: Option<String>,
    pub error: Option<String>,
    pub metrics: Option<Metrics>,
    /// When true, the chat controller must not write an assistant entry
    /// itself: the workflow already committed it (`spec.md` §9, Open
    /// Question — the workflow is the single source of truth for writes).
    pub messages_saved_during_workflow: bool,
    /// SIGINT broke the turn mid-stream (`spec.md` §7 kind 9). The caller
    /// saves whatever was accumulated and exits rather than continuing the
    /// loop.
    pub interrupted: bool,
}

/// The external collaborator that loops model <-> tools until a terminal
/// response is produced (`spec.md` §1 "Out of scope", §9 "Workflow
/// orchestrator"). Only the interface is in scope here; a concrete
/// tool-calling loop is provided by whatever wires a real provider and
/// tool catalog behind this trait.
pub trait ModelAgent {
    fn process_user_request(
        &mut self,
        input: &str,
        options: RequestOptions<'_>,
        ui: &mut dyn Ui,
        on_event: &mut dyn FnMut(ModelEvent),
    ) -> AgentOutcome;
}
