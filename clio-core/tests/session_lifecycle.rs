//! Integration coverage of `spec.md` §8 scenario 4 ("Provider switch
//! mid-session") and P9 ("session commit"), exercised against the real
//! `Session`/`Config`/`Billing` types (no terminal, no network).

use std::path::PathBuf;

use clio_core::Config;
use clio_core::Session;
use clio_protocol::Metrics;

#[test]
fn provider_switch_updates_config_without_touching_session_history() {
    let home = tempfile::tempdir().expect("tempdir");
    let mut config = Config::load(home.path().to_path_buf()).expect("fresh config loads with defaults");
    assert_eq!(config.provider(), Some("github_copilot"));

    config.set("provider", "openai", false).expect("global set persists");
    assert_eq!(config.provider(), Some("openai"));

    let reloaded = Config::load(home.path().to_path_buf()).expect("reload after save");
    assert_eq!(reloaded.provider(), Some("openai"), "global write must survive a reload");
}

#[test]
fn successful_turn_grows_history_by_exactly_two_and_persists() {
    let home = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
    let before = session.history.len();

    session.commit_turn("what is 2+2?", Some("4"));
    session.billing.record_request(
        "gpt-4o",
        &Metrics {
            prompt_tokens: 8,
            completion_tokens: 1,
            total_tokens: 9,
            multiplier: 1.0,
        },
    );
    session.save(home.path()).expect("save after turn");

    assert_eq!(session.history.len(), before + 2);

    let id = session.id.clone();
    drop(session);
    let resumed = Session::resume(home.path(), &id).expect("resume").expect("present on disk");
    assert_eq!(resumed.history.len(), before + 2);
    assert_eq!(resumed.billing.total_tokens, 9);
    assert_eq!(resumed.billing.premium_requests_charged, 1);
}

#[test]
fn failed_turn_persists_a_system_error_without_losing_prior_history() {
    let home = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
    session.commit_turn("first question", Some("first answer"));
    let after_first_turn = session.history.len();

    // A failed turn does not commit a user+assistant pair...
    session.commit_turn("second question that fails", None);
    assert_eq!(session.history.len(), after_first_turn, "rolled back user message on failure");

    // ...but the error is still recorded and always persisted (`spec.md`
    // §7 kind 1/9).
    session.record_system_error("provider request failed after retries");
    assert_eq!(session.history.len(), after_first_turn + 1);
    session.save(home.path()).expect("best-effort save always happens");
}
