//! Binary entry point (`spec.md` §6 "CLI surface"). Wires [`clio_core`],
//! [`clio_login`] and [`clio_term`] together: parses flags, installs
//! signal handlers and logging, runs the startup auth sequence, spawns
//! the background update-check child, and hands off to
//! [`clio_term::ChatController`].

use std::path::PathBuf;

use clap::Parser;
use clio_core::Config;
use clio_core::Session;
use clio_term::ChatController;

/// CLIO: an interactive terminal-based AI coding assistant.
#[derive(Debug, Parser)]
#[command(name = "clio", version, about)]
struct Cli {
    /// Start a brand-new session instead of resuming the most recent one.
    #[arg(long)]
    new: bool,

    /// Resume a specific session by id instead of the most recent one.
    #[arg(long, value_name = "SESSION_ID", conflicts_with = "new")]
    resume: Option<String>,

    /// Run one turn non-interactively and exit (`spec.md` §6).
    #[arg(long, value_name = "TEXT")]
    input: Option<String>,

    /// Disable ANSI color output regardless of `NO_COLOR`.
    #[arg(long)]
    no_color: bool,

    /// Scope `/api set`/`/config set` mutations to this session only
    /// instead of the global config file (`spec.md` §3, §4.7).
    #[arg(long)]
    session: bool,

    /// Verbose `tracing` output on stderr.
    #[arg(long)]
    debug: bool,
}

fn main() {
    // The detached background update-check child takes this branch and
    // exits immediately; it never reaches `Cli::parse()` (`spec.md` §5).
    if std::env::var_os(clio_cli::update_check::INTERNAL_CHECK_ENV).is_some() {
        let codex_home = std::env::var_os("CLIO_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(clio_core::config::default_codex_home);
        clio_cli::update_check::run_internal_check(&codex_home);
        return;
    }

    let cli = Cli::parse();
    clio_cli::init_tracing(cli.debug);

    if cli.no_color {
        // SAFETY: single-threaded at this point, before any spawned
        // thread or child reads the environment.
        unsafe {
            std::env::set_var("NO_COLOR", "1");
        }
    }

    if let Err(err) = run(cli) {
        eprintln!("clio: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    clio_term::signal::install();

    let codex_home = clio_core::config::default_codex_home();
    std::fs::create_dir_all(&codex_home)?;

    clio_cli::update_check::maybe_spawn_background_check(&codex_home);

    let config = Config::load(codex_home.clone())?;

    let auth_token = startup_auth_check(&codex_home, config.github_client_id())?;

    let working_directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let session = match (&cli.new, &cli.resume) {
        (true, _) => Session::new(&codex_home, working_directory)?,
        (false, Some(id)) => match Session::resume(&codex_home, id)? {
            Some(session) => session,
            None => {
                eprintln!("clio: session {id} not found, starting a new one");
                Session::new(&codex_home, working_directory)?
            }
        },
        (false, None) => Session::new(&codex_home, working_directory)?,
    };

    let mut controller = ChatController::new(config, session, codex_home, auth_token, cli.session);

    match cli.input {
        Some(text) => controller.run_single(&text),
        None => controller.run(),
    }

    Ok(())
}

/// `spec.md` §4.8 startup sequence: migration notice, token validation,
/// auto-triggered device-flow login on 401/403. Network errors during
/// validation are swallowed per `spec.md` §7 kind 2 ("on network error,
/// silently proceed").
fn startup_auth_check(codex_home: &PathBuf, client_id: &str) -> anyhow::Result<Option<clio_login::AuthToken>> {
    match clio_login::startup_check(codex_home) {
        Ok(Some((token, migrated))) => {
            if migrated {
                println!("clio: your saved credentials were upgraded to the current format.");
            }
            Ok(Some(token))
        }
        Ok(None) => {
            println!("clio: not logged in. Use `/api login` to authenticate with GitHub, or continue unauthenticated.");
            Ok(None)
        }
        Err(clio_login::AuthError::NotLoggedIn) => {
            println!("clio: your GitHub session expired or was revoked. Starting device-flow login...");
            match clio_login::run_device_code_login(codex_home, client_id, |prompt| {
                println!("Go to {} and enter code {}", prompt.verification_uri, prompt.user_code);
            }) {
                Ok(token) => Ok(Some(token)),
                Err(err) => {
                    println!("clio: login failed ({err}); run `/api login` to try again.");
                    Ok(None)
                }
            }
        }
        Err(err) => {
            tracing::debug!("auth startup check failed, proceeding unauthenticated: {err}");
            Ok(None)
        }
    }
}
