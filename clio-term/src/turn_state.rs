//! Consolidated per-turn flags (`spec.md` §9, REDESIGN FLAG "Global mutable
//! UI state"). The original design scatters `pagination_enabled`,
//! `tools_invoked_this_request`, `need_agent_prefix`,
//! `prepare_for_next_iteration` and `last_was_system_message` across the
//! controller as independent fields mutated from different callbacks. Here
//! they live in one value the controller owns and passes `&mut` into the
//! streaming fold, removing the action-at-a-distance the design note flags.

/// Flags that are meaningful for exactly one turn and are reset at the
/// start of the next (`spec.md` §4.3 step 1, "Preparation").
#[derive(Debug, Clone, Default)]
pub struct TurnState {
    /// Set once the first renderable chunk of this turn has printed a
    /// `CLIO: ` prefix; until then, no prefix has been emitted
    /// (`spec.md` §4.3 step 2, P7).
    pub agent_prefix_emitted: bool,
    /// A tool ran during this turn. Suppresses pagination for tool output
    /// only; agent text keeps paginating (`spec.md` §4.3 step 3).
    pub tools_invoked_this_request: bool,
    /// Set after a tool call completes; the next content chunk must emit a
    /// fresh prefix even though `agent_prefix_emitted` was already true
    /// earlier in the turn (`spec.md` §4.3 step 2, P8).
    pub prepare_for_next_iteration: bool,
    /// The most recent thing written to the terminal was a system message,
    /// so the next emission should consider adding separating space
    /// (`spec.md` §4.3 step 5).
    pub last_was_system_message: bool,
    /// Whether pagination is armed for this turn. Enabled the moment the
    /// first content chunk arrives (`spec.md` §4.3 step 2); stays off for a
    /// turn that only emits tool/system events (no agent text).
    pub pagination_enabled: bool,
    /// Set once the user has answered `Q` at a streaming pause (`spec.md`
    /// §4.2 P6). The wire stream keeps being drained so the turn can still
    /// commit, but no further bytes are rendered for the rest of the turn.
    pub stop_streaming: bool,
    /// Set while a "CLIO: ⚡ Reasoning..." header is showing, so interleaved
    /// thinking chunks without explicit start/end markers don't reprint it,
    /// and cleared on `ThinkingSignal::End` so the real answer gets a fresh
    /// `CLIO: ` prefix (`spec.md` §4.3 step 4).
    pub thinking_active: bool,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all flags for the start of a new turn (`spec.md` §4.3 step 1).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True exactly when a `CLIO: ` prefix must be printed before the next
    /// chunk of content is written: either nothing has been emitted yet
    /// this turn, or a tool just ran and a fresh continuation is starting
    /// (`spec.md` §4.3 step 2).
    pub fn needs_prefix(&self) -> bool {
        !self.agent_prefix_emitted || self.prepare_for_next_iteration
    }

    pub fn mark_prefix_emitted(&mut self) {
        self.agent_prefix_emitted = true;
        self.prepare_for_next_iteration = false;
    }

    pub fn mark_tool_invoked(&mut self) {
        self.tools_invoked_this_request = true;
        self.prepare_for_next_iteration = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_turn_needs_a_prefix() {
        let state = TurnState::new();
        assert!(state.needs_prefix());
    }

    #[test]
    fn prefix_not_needed_again_until_a_tool_runs() {
        let mut state = TurnState::new();
        state.mark_prefix_emitted();
        assert!(!state.needs_prefix());
    }

    #[test]
    fn tool_invocation_forces_a_fresh_prefix_next_time() {
        let mut state = TurnState::new();
        state.mark_prefix_emitted();
        state.mark_tool_invoked();
        assert!(state.needs_prefix());
        assert!(state.tools_invoked_this_request);
    }

    #[test]
    fn reset_clears_every_flag() {
        let mut state = TurnState::new();
        state.mark_prefix_emitted();
        state.mark_tool_invoked();
        state.pagination_enabled = true;
        state.reset();
        assert!(!state.agent_prefix_emitted);
        assert!(!state.tools_invoked_this_request);
        assert!(!state.pagination_enabled);
    }
}
