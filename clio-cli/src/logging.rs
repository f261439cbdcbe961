//! `tracing` init (`SPEC_FULL.md` §3 "Logging"): stderr only, gated by
//! `--debug`/`RUST_LOG`, matching `spec.md` §5's "stderr carries DEBUG
//! traces" and the teacher's `EnvFilter`-from-env-or-default pattern
//! (`codex-rs/tui/src/lib.rs`).

use tracing_subscriber::EnvFilter;

/// Install a process-wide stderr subscriber. `debug` forces `debug`-level
/// output for every crate in this workspace when `RUST_LOG` is unset;
/// otherwise `RUST_LOG` (or `warn` by default) governs verbosity.
pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("clio_cli=debug,clio_term=debug,clio_core=debug,clio_login=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
