use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use clio_protocol::Message;

use crate::billing::Billing;
use crate::config::sessions_dir;
use crate::config_types::ThemeSelection;
use crate::error::ClioError;
use crate::error::Result;

/// Persisted session state, one JSON file per session under
/// `.clio/sessions/<id>.json` (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub working_directory: PathBuf,
    pub history: Vec<Message>,
    pub theme: ThemeSelection,
    #[serde(default)]
    pub current_file: Option<PathBuf>,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub context_files: Vec<PathBuf>,
    /// Set once a premium-charge notice has been shown, so repeated turns
    /// do not re-display it.
    #[serde(default)]
    pub premium_charge_message_shown: bool,

    #[serde(skip)]
    lock: Option<SessionLock>,
}

impl Session {
    pub fn new(codex_home: &Path, working_directory: PathBuf) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let lock = SessionLock::acquire(codex_home, &id)?;
        Ok(Self {
            id,
            working_directory,
            history: Vec::new(),
            theme: ThemeSelection::default(),
            current_file: None,
            billing: Billing::default(),
            context_files: Vec::new(),
            premium_charge_message_shown: false,
            lock: Some(lock),
        })
    }

    fn path_for(codex_home: &Path, id: &str) -> PathBuf {
        sessions_dir(codex_home).join(format!("{id}.json"))
    }

    /// Resume a session by id. On read failure the session is treated as
    /// absent (`spec.md` §6: "no destructive recovery") — the caller should
    /// fall back to creating a new one rather than deleting anything.
    pub fn resume(codex_home: &Path, id: &str) -> Result<Option<Self>> {
        let path = Self::path_for(codex_home, id);
        if !path.exists() {
            return Ok(None);
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => return Err(ClioError::SessionReadFailed(e)),
        };
        let mut session: Session = match serde_json::from_str(&text) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        let lock = SessionLock::acquire(codex_home, id)?;
        session.lock = Some(lock);
        Ok(Some(session))
    }

    /// Append a user message and an assistant (or system error) message as
    /// one atomic unit (`spec.md` §3: "a turn either commits... or is
    /// rolled back on error"). `result` carries the assistant text on
    /// success, or `None` to record only the user message (workflow error
    /// after it already wrote its own system entry).
    pub fn commit_turn(&mut self, user_text: &str, assistant_text: Option<&str>) {
        let before = self.history.len();
        self.history.push(Message::user(user_text));
        if let Some(text) = assistant_text {
            self.history.push(Message::assistant(text));
        } else {
            // Roll back the user message too: nothing durable happened.
            self.history.truncate(before);
        }
    }

    /// Record a system-level error entry without removing anything already
    /// committed (`spec.md` §7, kind 1/9: always persisted).
    pub fn record_system_error(&mut self, text: &str) {
        self.history.push(Message::system(text));
    }

    pub fn save(&self, codex_home: &Path) -> Result<()> {
        let dir = sessions_dir(codex_home);
        std::fs::create_dir_all(&dir)?;
        let path = Self::path_for(codex_home, &self.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// Advisory exclusive lock over a session file, held for the process
/// lifetime. Released automatically on drop; the kernel also releases it if
/// the process dies (SIGINT best-effort path, `spec.md` §5).
#[derive(Debug)]
struct SessionLock {
    _file: File,
    path: PathBuf,
}

impl SessionLock {
    #[cfg(unix)]
    fn acquire(codex_home: &Path, id: &str) -> Result<Self> {
        let dir = sessions_dir(codex_home);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{id}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        let fd = std::os::unix::io::AsRawFd::as_raw_fd(&file);
        // SAFETY: fd is a valid, open file descriptor owned by `file` for
        // the duration of this call.
        let rc = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            return Err(ClioError::SessionLocked {
                id: id.to_string(),
                lock_path: path.display().to_string(),
            });
        }
        Ok(Self { _file: file, path })
    }

    #[cfg(not(unix))]
    fn acquire(codex_home: &Path, id: &str) -> Result<Self> {
        let dir = sessions_dir(codex_home);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{id}.lock"));
        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .map_err(|_| ClioError::SessionLocked {
                id: id.to_string(),
                lock_path: path.display().to_string(),
            })?;
        Ok(Self { _file: file, path })
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn commit_turn_appends_exactly_two_entries_on_success() {
        let home = tempdir().expect("tempdir");
        let mut session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
        let before = session.history.len();
        session.commit_turn("hi", Some("hello back"));
        assert_eq!(session.history.len(), before + 2);
    }

    #[test]
    fn commit_turn_rolls_back_user_message_on_failure() {
        let home = tempdir().expect("tempdir");
        let mut session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
        let before = session.history.len();
        session.commit_turn("hi", None);
        assert_eq!(session.history.len(), before);
    }

    #[test]
    fn second_open_of_same_session_is_locked() {
        let home = tempdir().expect("tempdir");
        let session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
        session.save(home.path()).expect("save");
        let id = session.id.clone();
        let err = Session::resume(home.path(), &id)
            .expect_err("second concurrent open must fail while the first lock is held");
        assert!(matches!(err, ClioError::SessionLocked { .. }));
    }

    #[test]
    fn resume_after_lock_released_succeeds() {
        let home = tempdir().expect("tempdir");
        let session = Session::new(home.path(), PathBuf::from(".")).expect("new session");
        session.save(home.path()).expect("save");
        let id = session.id.clone();
        drop(session);
        let resumed = Session::resume(home.path(), &id).expect("resume").expect("present");
        assert_eq!(resumed.id, id);
    }

    #[test]
    fn resume_of_missing_session_is_none_not_error() {
        let home = tempdir().expect("tempdir");
        let resumed = Session::resume(home.path(), "does-not-exist").expect("no destructive error");
        assert!(resumed.is_none());
    }
}
