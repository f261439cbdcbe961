//! Background update-check child process (`spec.md` §5 "A background
//! update-check child process forked on startup; it closes all standard
//! descriptors before running network I/O and exits silently. The parent
//! tracks the update cache file's modification time and, on change, reads
//! the cached result and surfaces a notification on the next input
//! cycle."), and `spec.md` §6 "Update cache: `.clio/update_check_cache`
//! (mtime-polled)".
//!
//! Grounded on `codex-rs/tui/src/updates.rs`'s cache-file-plus-GitHub-tag
//! shape, but run from a detached *process* rather than a `tokio::spawn`
//! task, per `SPEC_FULL.md` §6 ("a real child process, not a thread").

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Env var the detached child checks for at startup to take the
/// "perform the check and exit" branch instead of the normal chat loop.
/// A hidden clap subcommand would work too, but this keeps the `Cli`
/// surface in `spec.md` §6 free of an internal-only flag.
pub const INTERNAL_CHECK_ENV: &str = "CLIO_INTERNAL_UPDATE_CHECK";

const CACHE_FILENAME: &str = "update_check_cache";
const RELEASES_URL: &str = "https://api.github.com/repos/clio-cli/clio/releases/latest";
const RECHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UpdateCache {
    latest_version: Option<String>,
    last_checked_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ReleaseInfo {
    tag_name: String,
}

fn cache_path(codex_home: &Path) -> PathBuf {
    codex_home.join(CACHE_FILENAME)
}

fn read_cache(codex_home: &Path) -> Option<UpdateCache> {
    let text = std::fs::read_to_string(cache_path(codex_home)).ok()?;
    serde_json::from_str(&text).ok()
}

fn cache_is_fresh(cache: &UpdateCache) -> bool {
    Utc::now().signed_duration_since(cache.last_checked_at).to_std().map(|d| d < RECHECK_INTERVAL).unwrap_or(false)
}

/// Called once at startup by the parent process. Spawns a detached child
/// running this same binary with [`INTERNAL_CHECK_ENV`] set, unless the
/// cache is still fresh. Never blocks and never fails loudly: a spawn
/// error is swallowed, matching "exits silently" for the would-be child.
pub fn maybe_spawn_background_check(codex_home: &Path) {
    if let Some(cache) = read_cache(codex_home) {
        if cache_is_fresh(&cache) {
            return;
        }
    }
    let Ok(exe) = std::env::current_exe() else {
        return;
    };
    let mut command = std::process::Command::new(exe);
    command
        .env(INTERNAL_CHECK_ENV, "1")
        .env("CLIO_HOME", codex_home)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: `setsid` has no preconditions; it only detaches the
        // child from the parent's controlling terminal so a later
        // terminal-mode reset in the parent cannot race the child.
        unsafe {
            command.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
    }
    let _ = command.spawn();
}

/// The child-process entry point: perform the network check, write the
/// cache, and return. The caller (`main`) exits the process immediately
/// after this returns, matching "closes all standard descriptors...and
/// exits silently" (descriptors are closed via `Stdio::null()` at spawn
/// time rather than inside the child, which is equivalent and avoids an
/// `unsafe` `close()` dance).
pub fn run_internal_check(codex_home: &Path) {
    let client = match reqwest::blocking::Client::builder().user_agent("clio-cli").build() {
        Ok(c) => c,
        Err(_) => return,
    };
    let Ok(response) = client.get(RELEASES_URL).send() else {
        return;
    };
    let Ok(release) = response.error_for_status().and_then(|r| r.json::<ReleaseInfo>()) else {
        return;
    };
    let latest_version = release.tag_name.strip_prefix('v').map(str::to_string).unwrap_or(release.tag_name);
    let cache = UpdateCache {
        latest_version: Some(latest_version),
        last_checked_at: Utc::now(),
    };
    let Ok(json) = serde_json::to_string_pretty(&cache) else {
        return;
    };
    let _ = std::fs::create_dir_all(codex_home);
    let _ = std::fs::write(cache_path(codex_home), json);
}

/// Polled once per input-loop iteration (`spec.md` §5). `last_seen_mtime`
/// is the mtime this caller observed last time; returns the new mtime
/// (unconditionally) and a notification string only when the mtime
/// changed *and* the cached version is newer than `current_version`.
pub fn poll(codex_home: &Path, current_version: &str, last_seen_mtime: Option<SystemTime>) -> (Option<SystemTime>, Option<String>) {
    let path = cache_path(codex_home);
    let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
    if mtime.is_none() || mtime == last_seen_mtime {
        return (mtime, None);
    }
    let Some(cache) = read_cache(codex_home) else {
        return (mtime, None);
    };
    let notice = cache
        .latest_version
        .filter(|latest| is_newer(latest, current_version))
        .map(|latest| format!("A newer version of clio is available: {latest} (you have {current_version})"));
    (mtime, notice)
}

fn is_newer(latest: &str, current: &str) -> bool {
    fn parse(v: &str) -> Option<(u64, u64, u64)> {
        let mut parts = v.trim().split('.');
        Some((parts.next()?.parse().ok()?, parts.next()?.parse().ok()?, parts.next()?.parse().ok()?))
    }
    match (parse(latest), parse(current)) {
        (Some(l), Some(c)) => l > c,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_newer_compares_semver_numerically() {
        assert!(is_newer("0.2.0", "0.1.9"));
        assert!(!is_newer("0.1.0", "0.1.0"));
        assert!(!is_newer("0.1.0", "0.2.0"));
    }

    #[test]
    fn cache_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = UpdateCache {
            latest_version: Some("1.2.3".to_string()),
            last_checked_at: Utc::now(),
        };
        std::fs::write(cache_path(dir.path()), serde_json::to_string(&cache).expect("serialize")).expect("write");
        let read = read_cache(dir.path()).expect("present");
        assert_eq!(read.latest_version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn poll_reports_no_notice_when_mtime_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mtime, notice) = poll(dir.path(), "0.1.0", None);
        assert!(mtime.is_none());
        assert!(notice.is_none());
    }
}
