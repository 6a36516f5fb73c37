//! Session persistence — JSON save/load across restarts.

use std::path::PathBuf;

use levdesk_core::domain::Session;

/// Session file location: `<config_dir>/levdesk/session.json`.
pub fn session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("levdesk")
        .join("session.json")
}

/// Load the persisted session. Missing or corrupt files yield the default
/// session; the caller can show a warning for the corrupt case.
pub fn load(path: &std::path::Path) -> (Session, Option<String>) {
    match Session::load(path) {
        Ok(session) => (session, None),
        Err(e) => (
            Session::default(),
            Some(format!("session file unreadable, starting fresh: {e}")),
        ),
    }
}

/// Save the session, creating parent directories.
pub fn save(path: &std::path::Path, session: &Session) -> anyhow::Result<()> {
    session.save(path)
}
