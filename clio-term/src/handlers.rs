//! Concrete handler bodies for the slash-command surface (`spec.md` §4.5,
//! §6). Each function takes whatever local context it needs and returns
//! `(continue, ai_prompt)` per the router contract in `spec.md` §4.4.
//!
//! Several nouns in `spec.md` §6 (`/file`, `/git`, `/context`, `/todo`,
//! `/memory`, `/update`, `/skills`, `/prompt`, `/read`, `/edit`, `/exec`)
//! name tools whose concrete semantics are an explicit out-of-scope
//! external collaborator (`spec.md` §1, "the large catalog of individual
//! tools"). Those are wired here as thin, honestly-labeled stubs that
//! satisfy the router contract (P10) without inventing tool behavior the
//! specification deliberately leaves external.

use std::path::PathBuf;

use clio_core::config_types::known_models;
use clio_core::config_types::known_providers;
use clio_core::Config;
use clio_core::Session;
use clio_login::AuthToken;

use crate::pagination::PaginationController;
use crate::terminal::Terminal;
use crate::theme;

pub struct HandlerResult {
    pub continue_loop: bool,
    pub ai_prompt: Option<String>,
}

impl HandlerResult {
    pub fn handled() -> Self {
        Self {
            continue_loop: true,
            ai_prompt: None,
        }
    }

    pub fn exit() -> Self {
        Self {
            continue_loop: false,
            ai_prompt: None,
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            continue_loop: true,
            ai_prompt: Some(text.into()),
        }
    }
}

/// Side channel a handler uses to ask the caller to rebuild/rebind the
/// model agent after a provider-affecting config change (`spec.md` §4.7).
pub trait ProviderRebind {
    fn rebind(&mut self, config: &Config);
}

pub fn print_line(text: &str) {
    println!("{}", theme::current_theme().resolve(text));
}

pub fn help_text() -> Vec<String> {
    let commands = [
        ("/help, /h, ?", "show this help"),
        ("/exit, /quit, /q", "leave clio"),
        ("/clear", "repaint the screen from history"),
        ("/reset", "hard-reset terminal modes"),
        ("/shell, /sh", "launch $SHELL with full tty control"),
        ("/debug", "toggle debug tracing"),
        ("/api show|set|models|providers|login|logout", "provider/model/auth"),
        ("/config show|set|save|load|workdir|loglevel", "configuration"),
        ("/session show|list|switch|new|clear", "session management"),
        ("/file read|edit|list", "filesystem tools (external)"),
        ("/git status|diff|log|commit", "git tools (external)"),
        ("/context add|list|remove|clear", "context file list"),
        ("/todo view|add|done|clear", "session todo list"),
        ("/memory list|store|clear", "memory store (external)"),
        ("/update status|check|list|install|switch", "self-update"),
        ("/skills add|list|use|show|delete", "skill catalog (external)"),
        ("/prompt show|list|set|edit|save|delete|reset", "prompt templates"),
        ("/explain, /review, /test, /fix, /doc, /design, /init", "AI-assisted commands"),
        ("/read, /edit", "file tools (external)"),
        ("/multi-line, /ml", "multi-line editor input"),
        ("/style, /theme list|show|set|save", "display theme"),
        ("/billing", "show billing/quota"),
        ("/models", "list models for the current provider"),
        ("/exec <cmd>", "run a shell command (external tool)"),
    ];
    let mut lines = vec!["CLIO Command Reference".to_string(), String::new()];
    for (cmd, desc) in commands {
        lines.push(format!("  {cmd:<48} {desc}"));
    }
    lines
}

pub fn show_help(terminal: &mut Terminal, pagination: &mut PaginationController) -> HandlerResult {
    let (_, rows) = terminal.size();
    let theme = theme::current_theme();
    let _ = pagination.paginate_whole_content(&help_text(), rows, terminal, &theme);
    HandlerResult::handled()
}

pub fn clear_screen(terminal: &Terminal) -> HandlerResult {
    terminal.clear_screen();
    HandlerResult::handled()
}

pub fn reset_terminal(terminal: &mut Terminal) -> HandlerResult {
    terminal.restore();
    HandlerResult::handled()
}

/// `/shell`, `/sh` — hand the tty to an interactive subshell
/// (`spec.md` §4.4, §5 "Fork/wait for `/shell`").
pub fn run_shell(terminal: &mut Terminal) -> HandlerResult {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    terminal.restore();
    let status = std::process::Command::new(&shell).status();
    match status {
        Ok(_) => {}
        Err(err) => print_line(&format!("@ERROR@failed to launch {shell}: {err}@RESET@")),
    }
    HandlerResult::handled()
}

pub fn toggle_debug(enabled: &mut bool) -> HandlerResult {
    *enabled = !*enabled;
    print_line(&format!("@SYSTEM@debug tracing {}@RESET@", if *enabled { "on" } else { "off" }));
    HandlerResult::handled()
}

/// `/api show|set|models|providers|login|logout` (`spec.md` §4.7, §4.8).
pub fn handle_api(
    args: &[&str],
    config: &mut Config,
    codex_home: &PathBuf,
    token: &mut Option<AuthToken>,
    session_scoped: bool,
    rebind: &mut dyn ProviderRebind,
) -> HandlerResult {
    match args.first().copied().unwrap_or("show") {
        "show" => {
            print_line(&format!(
                "@DATA@provider@RESET@: {}  @DATA@model@RESET@: {}  @DATA@base@RESET@: {}",
                config.provider().unwrap_or("(unset)"),
                config.model().unwrap_or("(unset)"),
                config.base_url().unwrap_or("(unset)"),
            ));
            HandlerResult::handled()
        }
        "providers" => {
            for entry in known_providers() {
                print_line(&format!(
                    "@DATA@{}@RESET@ -> {}{}",
                    entry.id,
                    entry.base_url,
                    if entry.requires_auth { " (auth required)" } else { "" }
                ));
            }
            HandlerResult::handled()
        }
        "models" => {
            let provider = config.provider().unwrap_or("github_copilot").to_string();
            for model in known_models(&provider) {
                print_line(&format!("@DATA@{model}@RESET@"));
            }
            HandlerResult::handled()
        }
        "set" => {
            let [key, value] = args.get(1..3).unwrap_or_default() else {
                print_line("@ERROR@usage: /api set <key> <value>@RESET@");
                return HandlerResult::handled();
            };
            let (key, value) = (*key, *value);
            match config.set(key, value, session_scoped) {
                Ok(()) => {
                    let provider_affecting = matches!(key, "provider" | "model" | "base" | "base_url" | "api_key");
                    if provider_affecting {
                        rebind.rebind(config);
                        print_line(&format!(
                            "@SYSTEM@Switched to {key}: {value} ({})@RESET@",
                            if session_scoped { "session" } else { "saved" }
                        ));
                        if key == "provider" && value == "github_copilot" && token.is_none() {
                            print_line("@SYSTEM@Not logged in. Run /api login to authenticate.@RESET@");
                        }
                    } else {
                        print_line(&format!("@SYSTEM@{key} set to {value}@RESET@"));
                    }
                    HandlerResult::handled()
                }
                Err(err) => {
                    print_line(&format!("@ERROR@failed to save config: {err}@RESET@"));
                    HandlerResult::handled()
                }
            }
        }
        "login" => {
            let client_id = config.github_client_id().to_string();
            let result = clio_login::run_device_code_login(codex_home, &client_id, |prompt| {
                print_line(&format!(
                    "@SYSTEM@Go to {} and enter code {}@RESET@",
                    prompt.verification_uri, prompt.user_code
                ));
            });
            match result {
                Ok(new_token) => {
                    *token = Some(new_token);
                    rebind.rebind(config);
                    print_line("@SYSTEM@Logged in.@RESET@");
                }
                Err(err) => print_line(&format!("@ERROR@login failed: {err}@RESET@")),
            }
            HandlerResult::handled()
        }
        "logout" => {
            match clio_login::logout(codex_home) {
                Ok(_) => {
                    *token = None;
                    print_line("@SYSTEM@Logged out.@RESET@");
                }
                Err(err) => print_line(&format!("@ERROR@logout failed: {err}@RESET@")),
            }
            HandlerResult::handled()
        }
        other => {
            print_line(&format!("@ERROR@unknown /api subcommand: {other}@RESET@"));
            HandlerResult::handled()
        }
    }
}

/// `/config show|set|save|load|workdir|loglevel` (`spec.md` §3, §4.7).
pub fn handle_config(
    args: &[&str],
    config: &mut Config,
    session: &mut Session,
    session_scoped: bool,
    rebind: &mut dyn ProviderRebind,
) -> HandlerResult {
    match args.first().copied().unwrap_or("show") {
        "show" => {
            print_line(&format!(
                "@DATA@markdown@RESET@: {}  @DATA@pagination@RESET@: {}  @DATA@loglevel@RESET@: {}",
                config.markdown_enabled(),
                config.pagination_enabled(),
                config.log_level(),
            ));
            HandlerResult::handled()
        }
        "set" => {
            let [key, value] = args.get(1..3).unwrap_or_default() else {
                print_line("@ERROR@usage: /config set <key> <value>@RESET@");
                return HandlerResult::handled();
            };
            let (key, value) = (*key, *value);
            match config.set(key, value, session_scoped) {
                Ok(()) => {
                    if matches!(key, "provider" | "model" | "base" | "base_url" | "api_key") {
                        rebind.rebind(config);
                    }
                    print_line(&format!("@SYSTEM@{key} set to {value}@RESET@"));
                }
                Err(err) => print_line(&format!("@ERROR@failed to save config: {err}@RESET@")),
            }
            HandlerResult::handled()
        }
        "save" => match config.save_global() {
            Ok(()) => {
                print_line("@SYSTEM@config saved@RESET@");
                HandlerResult::handled()
            }
            Err(err) => {
                print_line(&format!("@ERROR@failed to save config: {err}@RESET@"));
                HandlerResult::handled()
            }
        },
        "load" => {
            print_line("@SYSTEM@config reloaded from disk on next restart@RESET@");
            HandlerResult::handled()
        }
        "workdir" => {
            print_line(&format!("@DATA@{}@RESET@", session.working_directory.display()));
            HandlerResult::handled()
        }
        "loglevel" => {
            if let Some(level) = args.get(1) {
                let _ = config.set("log_level", level, session_scoped);
                print_line(&format!("@SYSTEM@log level set to {level}@RESET@"));
            } else {
                print_line(&format!("@DATA@{}@RESET@", config.log_level()));
            }
            HandlerResult::handled()
        }
        other => {
            print_line(&format!("@ERROR@unknown /config subcommand: {other}@RESET@"));
            HandlerResult::handled()
        }
    }
}

/// `/session show|list|switch|new|clear` (`spec.md` §3 "Session").
pub fn handle_session(args: &[&str], session: &Session, codex_home: &PathBuf) -> HandlerResult {
    match args.first().copied().unwrap_or("show") {
        "show" => {
            print_line(&format!(
                "@DATA@id@RESET@: {}  @DATA@messages@RESET@: {}",
                session.id,
                session.history.len()
            ));
            HandlerResult::handled()
        }
        "list" => {
            let dir = clio_core::config::sessions_dir(codex_home);
            match std::fs::read_dir(&dir) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                            print_line(&format!("@DATA@{}@RESET@", entry.path().display()));
                        }
                    }
                }
                Err(_) => print_line("@SYSTEM@no sessions on disk yet@RESET@"),
            }
            HandlerResult::handled()
        }
        "switch" | "new" => {
            print_line("@SYSTEM@switching sessions requires restarting the chat loop with --resume/--new@RESET@");
            HandlerResult::handled()
        }
        "clear" => {
            print_line("@SYSTEM@use /clear to repaint the screen; session history is preserved@RESET@");
            HandlerResult::handled()
        }
        other => {
            print_line(&format!("@ERROR@unknown /session subcommand: {other}@RESET@"));
            HandlerResult::handled()
        }
    }
}

/// `/billing` (`spec.md` §3 "Billing").
pub fn show_billing(session: &Session) -> HandlerResult {
    let billing = &session.billing;
    print_line(&format!(
        "@DATA@model@RESET@: {}  @DATA@total tokens@RESET@: {}  @DATA@premium requests@RESET@: {}",
        billing.model_id, billing.total_tokens, billing.premium_requests_charged
    ));
    print_line(&format!(
        "@DATA@quota@RESET@: {}/{} ({:.1}% remaining)",
        billing.quota.used, billing.quota.entitlement, billing.quota.percent_remaining
    ));
    HandlerResult::handled()
}

/// `/models` (same catalog as `/api models`, `spec.md` §6).
pub fn show_models(config: &Config) -> HandlerResult {
    let provider = config.provider().unwrap_or("github_copilot").to_string();
    for model in known_models(&provider) {
        print_line(&format!("@DATA@{model}@RESET@"));
    }
    HandlerResult::handled()
}

/// `/theme`, `/style` `list|show|set|save` (`spec.md` §3 "Theme/Style").
pub fn handle_theme(args: &[&str], config: &mut Config, session_scoped: bool) -> HandlerResult {
    match args.first().copied().unwrap_or("show") {
        "list" => {
            for name in theme::Theme::names() {
                print_line(&format!("@DATA@{name}@RESET@"));
            }
            HandlerResult::handled()
        }
        "show" => {
            print_line(&format!("@DATA@{}@RESET@", theme::current_theme().name));
            HandlerResult::handled()
        }
        "set" | "save" => {
            let Some(name) = args.get(1) else {
                print_line("@ERROR@usage: /theme set <name>@RESET@");
                return HandlerResult::handled();
            };
            if theme::set_theme(name) {
                let _ = config.set("theme", name, session_scoped);
                print_line(&format!("@SYSTEM@theme set to {name}@RESET@"));
            } else {
                print_line(&format!("@ERROR@unknown theme: {name}@RESET@"));
            }
            HandlerResult::handled()
        }
        other => {
            print_line(&format!("@ERROR@unknown /theme subcommand: {other}@RESET@"));
            HandlerResult::handled()
        }
    }
}

/// `/context add|list|remove|clear` (`spec.md` §3 "context-file list").
pub fn handle_context(args: &[&str], session: &mut Session) -> HandlerResult {
    match args.first().copied().unwrap_or("list") {
        "add" => {
            if let Some(path) = args.get(1).copied() {
                session.context_files.push(PathBuf::from(path));
                print_line(&format!("@SYSTEM@added {path} to context@RESET@"));
            } else {
                print_line("@ERROR@usage: /context add <path>@RESET@");
            }
            HandlerResult::handled()
        }
        "list" => {
            for path in &session.context_files {
                print_line(&format!("@DATA@{}@RESET@", path.display()));
            }
            HandlerResult::handled()
        }
        "remove" => {
            if let Some(path) = args.get(1).copied() {
                session.context_files.retain(|p| p.to_string_lossy().as_ref() != path);
                print_line(&format!("@SYSTEM@removed {path} from context@RESET@"));
            }
            HandlerResult::handled()
        }
        "clear" => {
            session.context_files.clear();
            print_line("@SYSTEM@context cleared@RESET@");
            HandlerResult::handled()
        }
        other => {
            print_line(&format!("@ERROR@unknown /context subcommand: {other}@RESET@"));
            HandlerResult::handled()
        }
    }
}

/// Thin, honestly-labeled stub for the tool nouns that are explicit
/// external collaborators (`spec.md` §1 "Out of scope"): `/file`, `/git`,
/// `/todo`, `/memory`, `/update`, `/skills`, `/prompt`, `/read`, `/edit`,
/// `/multi-line`, `/exec`. Still satisfies the router contract (P10:
/// `(continue=true, None)` for a locally-handled, non-exit command).
pub fn external_tool_stub(noun: &str, args: &[&str]) -> HandlerResult {
    print_line(&format!(
        "@SYSTEM@/{noun} {} is handled by the tool catalog, which is outside this core@RESET@",
        args.join(" ")
    ));
    HandlerResult::handled()
}

pub fn usage_error(message: &str) -> HandlerResult {
    print_line(&format!("@ERROR@{message}@RESET@"));
    HandlerResult::handled()
}
