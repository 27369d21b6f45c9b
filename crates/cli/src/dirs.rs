//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across operating systems, following
//! platform conventions for cache and data directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Platform-specific log directory.
///
/// - macOS: `~/Library/Caches/combat/logs`
/// - Linux: `~/.cache/combat/logs` (or `$XDG_CACHE_HOME/combat/logs`)
/// - Windows: `%LOCALAPPDATA%\combat\logs`
/// - Fallback: `/tmp/combat/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "combat")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/combat"))
        .join("logs")
}

/// Platform-specific directory for persisted sessions.
///
/// - macOS: `~/Library/Application Support/combat/sessions`
/// - Linux: `~/.local/share/combat/sessions` (or `$XDG_DATA_HOME/combat/sessions`)
/// - Windows: `%APPDATA%\combat\sessions`
/// - Fallback: `./save_data/sessions`
pub fn sessions_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "combat")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
        .join("sessions")
}

/// A new `session_{timestamp}` name.
pub fn new_session_id() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!("session_{}", secs)
}

/// Most recently modified `session_*` directory under `sessions_dir`.
pub fn latest_session(sessions_dir: &Path) -> Result<PathBuf> {
    let mut sessions = Vec::new();

    for entry in std::fs::read_dir(sessions_dir)
        .with_context(|| format!("Failed to read sessions directory: {}", sessions_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("session_"))
        {
            let modified = entry.metadata()?.modified()?;
            sessions.push((path, modified));
        }
    }

    sessions
        .into_iter()
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path)
        .with_context(|| format!("No sessions found in {}", sessions_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_session_ignores_other_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("scratch")).unwrap();
        std::fs::create_dir(root.path().join("session_10")).unwrap();

        let latest = latest_session(root.path()).unwrap();
        assert_eq!(latest, root.path().join("session_10"));
    }

    #[test]
    fn empty_sessions_dir_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(latest_session(root.path()).is_err());
    }
}
