//! Chat Controller: the IO driver that wires [`Terminal`], [`Theme`],
//! [`Spinner`], [`PaginationController`], [`StreamingPipeline`],
//! [`TurnState`], the command router, [`Session`] and [`Config`] together
//! and drives one whole interactive session (`spec.md` §4, end to end).
//! Everything upstream of this file is pure and independently tested; this
//! is where the folds actually touch a terminal.

use std::cell::RefCell;
use std::path::PathBuf;

use clio_core::provider::AgentOutcome;
use clio_core::provider::RequestOptions;
use clio_core::provider::Ui;
use clio_core::Config;
use clio_core::ModelAgent;
use clio_core::Session;
use clio_login::AuthToken;
use clio_protocol::ModelEvent;
use clio_protocol::ThinkingSignal;

use crate::collab;
use crate::collab::RouterFeedback;
use crate::command_router;
use crate::command_router::RouterContext;
use crate::handlers;
use crate::handlers::HandlerResult;
use crate::handlers::ProviderRebind;
use crate::pagination::PaginationController;
use crate::pagination::PauseOutcome;
use crate::readline;
use crate::signal;
use crate::spinner::Spinner;
use crate::streaming::StreamingPipeline;
use crate::terminal::Mode;
use crate::terminal::Terminal;
use crate::theme;
use crate::theme::Theme;
use crate::turn_state::TurnState;

/// Rebuilds an [`HttpModelAgent`](clio_core::http_provider::HttpModelAgent)
/// from whatever `/api set`/`/config set` just changed (`spec.md` §4.7).
fn build_agent(config: &Config) -> clio_core::http_provider::HttpModelAgent {
    clio_core::http_provider::HttpModelAgent::new(
        config.base_url().unwrap_or_default().to_string(),
        config.model().unwrap_or_default().to_string(),
        config.api_key().map(|s| s.to_string()),
    )
}

/// `Terminal`/`PaginationController`/`Spinner` are all touched both from
/// inside [`Ui`] methods (`collaborate`, `start_spinner`/`stop_spinner`)
/// and from the streaming fold's `on_event` closure, which the underlying
/// `ModelAgent` trait passes as two independent `&mut` parameters. The two
/// never actually run concurrently (a workflow either streams output or
/// pauses for collaboration, never both at once) but the borrow checker
/// has no way to know that since they are separate arguments, so the
/// shared state lives behind a `RefCell` and each side borrows it only for
/// the duration of one call.
struct SharedTerm {
    terminal: Terminal,
    pagination: PaginationController,
    spinner: Spinner,
}

pub struct ChatController {
    shared: RefCell<SharedTerm>,
    turn_state: TurnState,
    config: Config,
    session: Session,
    codex_home: PathBuf,
    auth_token: Option<AuthToken>,
    session_scoped: bool,
    debug_enabled: bool,
    agent: Box<dyn ModelAgent>,
    /// Set by `submit_turn` when a turn was cut short by SIGINT; `run`
    /// checks it after every turn and exits the loop (`spec.md` §7 kind 9).
    interrupted_exit: bool,
}

impl ChatController {
    pub fn new(config: Config, session: Session, codex_home: PathBuf, auth_token: Option<AuthToken>, session_scoped: bool) -> Self {
        theme::set_theme(&config.theme().name);
        let agent = Box::new(build_agent(&config));
        Self {
            shared: RefCell::new(SharedTerm {
                terminal: Terminal::new(),
                pagination: PaginationController::new(),
                spinner: Spinner::new(),
            }),
            turn_state: TurnState::new(),
            config,
            session,
            codex_home,
            auth_token,
            session_scoped,
            debug_enabled: false,
            agent,
            interrupted_exit: false,
        }
    }

    /// Main REPL loop (`spec.md` §5 end-to-end flow). Returns when the user
    /// exits (`/exit`, `/quit`, EOF on an empty line, or SIGINT).
    pub fn run(&mut self) {
        loop {
            if signal::take_interrupted() {
                break;
            }

            let theme = theme::current_theme();
            let prompt = theme.resolve("@PROMPT@clio> @RESET@");
            let Some(input) = readline::read_line(&mut self.shared.borrow_mut().terminal, &prompt, &theme) else {
                break;
            };
            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }

            match self.dispatch_command(trimmed) {
                Some(result) => {
                    if !result.continue_loop {
                        break;
                    }
                    if let Some(ai_prompt) = result.ai_prompt {
                        self.submit_turn(&ai_prompt);
                    }
                }
                None => self.submit_turn(trimmed),
            }

            if self.interrupted_exit {
                break;
            }
        }
    }

    /// Non-interactive entry point (`spec.md` §6 `--input` flag): run
    /// exactly one turn for `input` (routed through the same command
    /// dispatch a REPL line would get, so `/explain foo` still works) and
    /// return without reading further stdin.
    pub fn run_single(&mut self, input: &str) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }
        match self.dispatch_command(trimmed) {
            Some(result) => {
                if let Some(ai_prompt) = result.ai_prompt {
                    self.submit_turn(&ai_prompt);
                }
            }
            None => self.submit_turn(trimmed),
        }
    }

    fn dispatch_command(&mut self, input: &str) -> Option<HandlerResult> {
        let mut rebind = AgentRebind { rebuilt: None };
        let mut shared = self.shared.borrow_mut();
        let result = {
            let mut ctx = RouterContext {
                session: &mut self.session,
                config: &mut self.config,
                terminal: &mut shared.terminal,
                pagination: &mut shared.pagination,
                codex_home: self.codex_home.clone(),
                auth_token: &mut self.auth_token,
                session_scoped: self.session_scoped,
                debug_enabled: &mut self.debug_enabled,
                rebind: &mut rebind,
            };
            command_router::route(input, &mut ctx)
        };
        drop(shared);
        if rebind.rebuilt.take().is_some() {
            self.agent = Box::new(build_agent(&self.config));
        }
        result
    }

    /// Run one full model turn: submit `input`, stream the response,
    /// record history and billing (`spec.md` §4.3, §4.7).
    fn submit_turn(&mut self, input: &str) {
        self.turn_state.reset();

        // `spec.md` §4.8 step 3: proactively refresh the Copilot token
        // before each request rather than waiting for a 401. Best-effort:
        // a refresh failure here just means the request goes out with
        // whatever credentials are already on file.
        if let Some(token) = self.auth_token.as_mut() {
            if let Err(err) = clio_login::ensure_fresh(&self.codex_home, token) {
                tracing::debug!("proactive token refresh failed, continuing with existing credentials: {err}");
            }
        }

        let mut pipeline = StreamingPipeline::new();
        // Snapshot rather than borrow: `host` below needs `&mut self.session`
        // for the re-entrant collaboration router, which would otherwise
        // conflict with `options` borrowing straight out of `self.session`
        // for the same call.
        let history_snapshot = self.session.history.clone();
        let current_file_snapshot = self.session.current_file.clone();
        let working_directory_snapshot = self.session.working_directory.clone();
        let options = RequestOptions {
            conversation_history: &history_snapshot,
            current_file: current_file_snapshot.as_deref(),
            working_directory: &working_directory_snapshot,
        };

        let model_id = self.config.model().unwrap_or("unknown").to_string();
        let turn_state = &mut self.turn_state;
        let shared = &self.shared;

        let mut host = TurnHost {
            shared,
            config: &mut self.config,
            session: &mut self.session,
            codex_home: &self.codex_home,
            auth_token: &mut self.auth_token,
            session_scoped: self.session_scoped,
            debug_enabled: &mut self.debug_enabled,
            rebind: AgentRebind { rebuilt: None },
        };
        let mut on_event = |event: ModelEvent| {
            handle_event(event, &mut pipeline, turn_state, shared);
        };

        let outcome: AgentOutcome = self.agent.process_user_request(input, options, &mut host, &mut on_event);

        let rebuild_agent = host.rebind.rebuilt.take().is_some();
        drop(host);
        if rebuild_agent {
            self.agent = Box::new(build_agent(&self.config));
        }

        if outcome.interrupted {
            self.interrupted_exit = true;
        }

        if outcome.messages_saved_during_workflow {
            self.session.history.push(clio_protocol::Message::user(input));
        } else {
            // `spec.md` §3/§4.3: if the workflow leaves no explicit final
            // response, the accumulated streamed content is the commit
            // fallback, not an empty/rolled-back turn.
            let final_response = outcome.final_response.as_deref().or_else(|| {
                if pipeline.accumulated_content.is_empty() {
                    None
                } else {
                    Some(pipeline.accumulated_content.as_str())
                }
            });
            self.session.commit_turn(input, final_response);
        }
        if let Some(metrics) = &outcome.metrics {
            self.session.billing.record_request(&model_id, metrics);
        }
        if let Some(error) = &outcome.error {
            self.session.record_system_error(error);
            handlers::print_line(&format!("@ERROR@{error}@RESET@"));
        }
        let _ = self.session.save(&self.codex_home);
    }
}

/// `ProviderRebind` cannot rebuild `self.agent` directly (the router only
/// has a `&Config`, not the controller), so it just records that a rebuild
/// is owed; `dispatch_command`/`submit_turn` perform the actual rebuild
/// once the router call returns and its borrows are released.
struct AgentRebind {
    rebuilt: Option<()>,
}

impl ProviderRebind for AgentRebind {
    fn rebind(&mut self, _config: &Config) {
        self.rebuilt = Some(());
    }
}

/// The pieces [`Ui`] needs for one turn: `SharedTerm` (shared with
/// `on_event` via the same `RefCell`) plus `Config`/`Session`/auth state so
/// `collaborate` can re-entrantly invoke the real command router
/// (`spec.md` §4.6) instead of only handling the top-level prompt loop.
struct TurnHost<'a> {
    shared: &'a RefCell<SharedTerm>,
    config: &'a mut Config,
    session: &'a mut Session,
    codex_home: &'a PathBuf,
    auth_token: &'a mut Option<AuthToken>,
    session_scoped: bool,
    debug_enabled: &'a mut bool,
    rebind: AgentRebind,
}

impl Ui for TurnHost<'_> {
    fn stop_spinner(&mut self) {
        self.shared.borrow_mut().spinner.stop();
    }

    fn start_spinner(&mut self) {
        let theme = theme::current_theme();
        self.shared.borrow_mut().spinner.start(&theme);
    }

    fn collaborate(&mut self, question: &str, context: Option<&str>) -> Option<String> {
        self.shared.borrow_mut().spinner.stop();
        let theme = theme::current_theme();

        let config = &mut *self.config;
        let session = &mut *self.session;
        let codex_home = self.codex_home;
        let auth_token = &mut *self.auth_token;
        let session_scoped = self.session_scoped;
        let debug_enabled = &mut *self.debug_enabled;
        let rebind = &mut self.rebind;

        let mut state = self.shared.borrow_mut();
        let SharedTerm { terminal, pagination, .. } = &mut *state;

        collab::run(question, context, terminal, pagination, &theme, |line, terminal, pagination| {
            let mut ctx = RouterContext {
                session: &mut *session,
                config: &mut *config,
                terminal,
                pagination,
                codex_home: codex_home.to_path_buf(),
                auth_token: &mut *auth_token,
                session_scoped,
                debug_enabled: &mut *debug_enabled,
                rebind: &mut *rebind,
            };
            match command_router::route(line, &mut ctx) {
                None => RouterFeedback::NotACommand,
                Some(result) => {
                    if result.continue_loop {
                        RouterFeedback::HandledKeepAsking
                    } else {
                        RouterFeedback::HandledStop
                    }
                }
            }
        })
    }

    fn check_interrupted(&mut self) -> bool {
        signal::take_interrupted()
    }

    fn arm_turn_alarm(&mut self) {
        signal::arm_pagination_timeout(1);
    }

    fn disarm_turn_alarm(&mut self) {
        signal::arm_pagination_timeout(0);
    }
}

/// Fold one [`ModelEvent`] into visible terminal output (`spec.md` §4.3
/// steps 2-5). This is the IO side of the pure [`StreamingPipeline`]: it
/// calls into the pipeline for buffering/flush-cadence decisions and does
/// the actual `println!`s. Once `turn_state.stop_streaming` is set (`Q` at
/// a pagination pause, `spec.md` §4.2 P6), the pipeline keeps folding so
/// `accumulated_content`/tool bookkeeping stay correct, but nothing more is
/// printed for the rest of the turn.
fn handle_event(event: ModelEvent, pipeline: &mut StreamingPipeline, turn_state: &mut TurnState, shared: &RefCell<SharedTerm>) {
    let theme = theme::current_theme();
    match event {
        ModelEvent::Chunk { delta, .. } => {
            let lines = pipeline.ingest_chunk(&delta);
            if turn_state.stop_streaming {
                return;
            }
            if turn_state.needs_prefix() {
                print!("{}", theme.resolve("@AGENT_LABEL@CLIO: @RESET@"));
                turn_state.mark_prefix_emitted();
                turn_state.pagination_enabled = true;
            }
            if let Some(lines) = lines {
                flush_lines(&lines, turn_state, shared, &theme);
            }
        }
        ModelEvent::Thinking { delta, signal } => {
            if turn_state.stop_streaming {
                return;
            }
            match signal {
                Some(ThinkingSignal::Start) => {
                    shared.borrow_mut().spinner.stop();
                    println!("{}", theme.resolve("@AGENT_LABEL@CLIO: @RESET@@DIM@\u{26a1} Reasoning...@RESET@"));
                    turn_state.thinking_active = true;
                    print!("{}", theme.resolve(&format!("@DIM@{delta}@RESET@")));
                }
                Some(ThinkingSignal::End) => {
                    println!();
                    println!("{}", theme.resolve("@DIM@---@RESET@"));
                    turn_state.thinking_active = false;
                    // Force a fresh `CLIO: ` prefix for the real answer
                    // that follows the reasoning block.
                    turn_state.agent_prefix_emitted = false;
                }
                None => {
                    if !turn_state.thinking_active {
                        shared.borrow_mut().spinner.stop();
                        println!("{}", theme.resolve("@AGENT_LABEL@CLIO: @RESET@@DIM@\u{26a1} Reasoning...@RESET@"));
                        turn_state.thinking_active = true;
                    }
                    print!("{}", theme.resolve(&format!("@DIM@{delta}@RESET@")));
                }
            }
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
        ModelEvent::ToolCall { name } => {
            turn_state.mark_tool_invoked();
            if turn_state.stop_streaming {
                return;
            }
            let rendered = match theme.tool_display_format {
                clio_core::config_types::ToolDisplayFormat::Box => {
                    format!("@SYSTEM@\u{250c}\u{2500} {name} \u{2500}\u{2500}\u{2500}\u{2500}\u{2500}@RESET@")
                }
                clio_core::config_types::ToolDisplayFormat::Inline => {
                    format!("@SYSTEM@[tool: {name}]@RESET@")
                }
            };
            println!("{}", theme.resolve(&rendered));
        }
        ModelEvent::SystemMessage { message } => {
            if turn_state.stop_streaming {
                return;
            }
            println!("{}", theme.resolve(&format!("@SYSTEM@{message}@RESET@")));
            turn_state.last_was_system_message = true;
        }
        ModelEvent::Done { .. } => {
            let lines = pipeline.drain_remaining();
            if turn_state.stop_streaming {
                return;
            }
            if let Some(lines) = lines {
                flush_lines(&lines, turn_state, shared, &theme);
            }
            println!();
        }
    }
}

fn flush_lines(lines: &[String], turn_state: &mut TurnState, shared: &RefCell<SharedTerm>, theme: &Theme) {
    use clio_markdown::MarkdownRenderer;
    let renderer = clio_markdown::DefaultMarkdownRenderer;
    let rows = shared.borrow().terminal.size().1;
    for line in lines {
        if turn_state.stop_streaming {
            break;
        }
        println!("{}", theme.resolve(&renderer.render(line)));
        if turn_state.pagination_enabled {
            let should_pause = shared.borrow_mut().pagination.record_streaming_line(rows);
            if should_pause {
                let mut state = shared.borrow_mut();
                let SharedTerm { terminal, pagination, .. } = &mut *state;
                let _ = terminal.set_mode(Mode::Cbreak);
                let outcome = pagination.pause_streaming(terminal, theme);
                let _ = terminal.set_mode(Mode::Cooked);
                if outcome == PauseOutcome::Quit {
                    turn_state.stop_streaming = true;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_state_starts_clean_before_any_event() {
        let state = TurnState::new();
        assert!(state.needs_prefix());
        assert!(!state.pagination_enabled);
        assert!(!state.stop_streaming);
    }
}
