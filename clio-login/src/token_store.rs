use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Result;
use crate::token_data::AuthToken;
use crate::token_data::CURRENT_SCHEME_VERSION;

pub fn credentials_path(codex_home: &Path) -> PathBuf {
    codex_home.join("github_tokens.json")
}

/// Read the stored credentials, if any. A missing file is `Ok(None)`, not an
/// error: the caller should treat that as "not logged in" and proceed to
/// trigger the device flow rather than fail (`spec.md` §7, kind 2).
pub fn read(codex_home: &Path) -> Result<Option<AuthToken>> {
    let path = credentials_path(codex_home);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    let token: AuthToken = serde_json::from_str(&text)?;
    Ok(Some(token))
}

/// Write credentials with user-only permissions, matching the teacher's
/// `auth_store.rs::write_auth_json` convention.
pub fn write(codex_home: &Path, token: &AuthToken) -> Result<()> {
    std::fs::create_dir_all(codex_home)?;
    let path = credentials_path(codex_home);
    let json = serde_json::to_string_pretty(token)?;
    let mut options = OpenOptions::new();
    options.truncate(true).write(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path)?;
    use std::io::Write as _;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Clear stored credentials, returning to an unauthenticated state
/// (`spec.md` §4.8, Logout).
pub fn clear(codex_home: &Path) -> Result<bool> {
    let path = credentials_path(codex_home);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Rewrite an older-schema file in place, bumping `scheme_version`. Returns
/// `true` if a migration notice should be shown (`spec.md` §4.8 step 1).
pub fn migrate_if_needed(codex_home: &Path) -> Result<bool> {
    let Some(mut token) = read(codex_home)? else {
        return Ok(false);
    };
    if !token.needs_migration() {
        return Ok(false);
    }
    token.scheme_version = CURRENT_SCHEME_VERSION;
    write(codex_home, &token)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample() -> AuthToken {
        AuthToken {
            github_token: "gho_abc".to_string(),
            copilot_token: None,
            username: Some("octocat".to_string()),
            expires_at: Some(Utc::now()),
            scheme_version: CURRENT_SCHEME_VERSION,
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let home = tempdir().expect("tempdir");
        write(home.path(), &sample()).expect("write");
        let read_back = read(home.path()).expect("read").expect("present");
        assert_eq!(read_back.github_token, "gho_abc");
    }

    #[test]
    fn missing_file_is_none_not_error() {
        let home = tempdir().expect("tempdir");
        assert!(read(home.path()).expect("read ok").is_none());
    }

    #[test]
    fn migration_bumps_old_scheme_version() {
        let home = tempdir().expect("tempdir");
        let mut old = sample();
        old.scheme_version = 1;
        write(home.path(), &old).expect("write");
        let migrated = migrate_if_needed(home.path()).expect("migrate");
        assert!(migrated);
        let after = read(home.path()).expect("read").expect("present");
        assert_eq!(after.scheme_version, CURRENT_SCHEME_VERSION);
    }

    #[test]
    fn logout_clears_file() {
        let home = tempdir().expect("tempdir");
        write(home.path(), &sample()).expect("write");
        assert!(clear(home.path()).expect("clear"));
        assert!(read(home.path()).expect("read").is_none());
    }
}
