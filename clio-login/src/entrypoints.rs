use std::path::Path;

use chrono::Utc;

use crate::copilot;
use crate::device_flow;
use crate::error::AuthError;
use crate::error::Result;
use crate::token_data::AuthToken;
use crate::token_data::CURRENT_SCHEME_VERSION;
use crate::token_store;

/// What to print while a device-flow login is in progress. The caller (the
/// chat controller) owns actually rendering this; this module only
/// produces the data.
#[derive(Debug, Clone)]
pub struct LoginPrompt {
    pub verification_uri: String,
    pub user_code: String,
}

/// Run the full GitHub OAuth device flow end to end: request a code, hand
/// `on_prompt` the verification URL/code to display, poll until the user
/// authorizes, then persist credentials (`spec.md` §4.8).
pub fn run_device_code_login(
    codex_home: &Path,
    client_id: &str,
    mut on_prompt: impl FnMut(LoginPrompt),
) -> Result<AuthToken> {
    let client = reqwest::blocking::Client::new();
    let device = device_flow::request_device_code(&client, client_id)?;
    on_prompt(LoginPrompt {
        verification_uri: device.verification_uri.clone(),
        user_code: device.user_code.clone(),
    });
    let github_token = device_flow::poll_for_token(&client, client_id, &device)?;

    let mut token = AuthToken {
        github_token,
        copilot_token: None,
        username: None,
        expires_at: None,
        scheme_version: CURRENT_SCHEME_VERSION,
    };
    // Best-effort: absence of a Copilot token is an explicit fallback path,
    // not a login failure (`spec.md` §3, Auth Token invariant).
    let _ = copilot::refresh_if_needed(&client, &mut token);
    token_store::write(codex_home, &token)?;
    Ok(token)
}

pub fn logout(codex_home: &Path) -> Result<bool> {
    token_store::clear(codex_home)
}

/// Startup sequence (`spec.md` §4.8): migrate an older schema if present,
/// then validate the stored token. Returns `Ok(None)` when no credentials
/// are on file (not an error — the caller offers to log in).
pub fn startup_check(
    codex_home: &Path,
) -> Result<Option<(AuthToken, bool /* migration_notice_shown */)>> {
    let migrated = token_store::migrate_if_needed(codex_home)?;
    let Some(token) = token_store::read(codex_home)? else {
        return Ok(None);
    };
    let client = reqwest::blocking::Client::new();
    match copilot::validate_github_token(&client, &token.github_token) {
        Some(false) => {
            token_store::clear(codex_home)?;
            Err(AuthError::NotLoggedIn)
        }
        // `None` covers the network-error case: proceed silently.
        Some(true) | None => Ok(Some((token, migrated))),
    }
}

/// Ensure the Copilot token is fresh before a request goes out
/// (`spec.md` §4.8 step 3). Mutates and re-persists `token` if refreshed.
pub fn ensure_fresh(codex_home: &Path, token: &mut AuthToken) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    if copilot::refresh_if_needed(&client, token)? {
        token.expires_at = token.expires_at.or(Some(Utc::now()));
        token_store::write(codex_home, token)?;
    }
    Ok(())
}
