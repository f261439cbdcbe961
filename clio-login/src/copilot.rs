use chrono::DateTime;
use chrono::Duration as ChronoDuration;
use chrono::Utc;
use serde::Deserialize;

use crate::error::AuthError;
use crate::error::Result;
use crate::token_data::AuthToken;

const COPILOT_TOKEN_URL: &str = "https://api.github.com/copilot_internal/v2/token";

/// Safety window before `expires_at` within which a refresh is triggered
/// proactively, ahead of the token actually expiring (`spec.md` §4.8 step 3).
pub fn refresh_safety_window() -> ChronoDuration {
    ChronoDuration::minutes(5)
}

#[derive(Debug, Deserialize)]
struct CopilotTokenResponse {
    token: String,
    expires_at: i64,
}

/// Exchange a GitHub token for a Copilot token (`spec.md` §4.8: "optionally
/// exchange for a Copilot token").
pub fn exchange_for_copilot_token(
    client: &reqwest::blocking::Client,
    github_token: &str,
) -> Result<(String, DateTime<Utc>)> {
    let resp = client
        .get(COPILOT_TOKEN_URL)
        .bearer_auth(github_token)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| AuthError::Request(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(AuthError::Request(format!(
            "copilot token exchange returned {}",
            resp.status()
        )));
    }
    let body: CopilotTokenResponse = resp.json().map_err(|e| AuthError::Request(e.to_string()))?;
    let expires_at = DateTime::from_timestamp(body.expires_at, 0).unwrap_or_else(Utc::now);
    Ok((body.token, expires_at))
}

/// Refresh `token.copilot_token` in place if it is absent or within the
/// safety window of expiring. No-op (and no error) if the Copilot token is
/// still fresh.
pub fn refresh_if_needed(
    client: &reqwest::blocking::Client,
    token: &mut AuthToken,
) -> Result<bool> {
    if !token.needs_refresh(refresh_safety_window()) && token.copilot_token.is_some() {
        return Ok(false);
    }
    let (copilot_token, expires_at) = exchange_for_copilot_token(client, &token.github_token)?;
    token.copilot_token = Some(copilot_token);
    token.expires_at = Some(expires_at);
    Ok(true)
}

/// Validate the stored GitHub token with a cheap call. On 401/403 the
/// caller should clear tokens and trigger the device flow; on a network
/// error it should silently proceed (`spec.md` §4.8 step 2, §7 kind 2).
pub fn validate_github_token(client: &reqwest::blocking::Client, github_token: &str) -> Option<bool> {
    let resp = client
        .get("https://api.github.com/user")
        .bearer_auth(github_token)
        .header("User-Agent", "clio")
        .send()
        .ok()?;
    match resp.status().as_u16() {
        401 | 403 => Some(false),
        200..=299 => Some(true),
        _ => None,
    }
}

pub fn auth_error_requires_relogin(status: u16) -> bool {
    status == 401 || status == 403
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_data::CURRENT_SCHEME_VERSION;

    #[test]
    fn absent_copilot_token_always_needs_refresh() {
        let token = AuthToken {
            github_token: "gho".to_string(),
            copilot_token: None,
            username: None,
            expires_at: None,
            scheme_version: CURRENT_SCHEME_VERSION,
        };
        assert!(!token.needs_refresh(refresh_safety_window()) || token.copilot_token.is_none());
    }

    #[test]
    fn expiring_soon_needs_refresh() {
        let token = AuthToken {
            github_token: "gho".to_string(),
            copilot_token: Some("cop".to_string()),
            username: None,
            expires_at: Some(Utc::now() + ChronoDuration::seconds(30)),
            scheme_version: CURRENT_SCHEME_VERSION,
        };
        assert!(token.needs_refresh(refresh_safety_window()));
    }

    #[test]
    fn far_future_expiry_does_not_need_refresh() {
        let token = AuthToken {
            github_token: "gho".to_string(),
            copilot_token: Some("cop".to_string()),
            username: None,
            expires_at: Some(Utc::now() + ChronoDuration::hours(1)),
            scheme_version: CURRENT_SCHEME_VERSION,
        };
        assert!(!token.needs_refresh(refresh_safety_window()));
    }
}
