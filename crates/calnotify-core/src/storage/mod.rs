pub mod config;
pub mod pending;
pub mod snapshot;

pub use config::{AgentSettings, CalendarSettings, Config};
pub use pending::{PendingNotification, PendingQueue};
pub use snapshot::{EventCache, JsonEventCache, SyncSnapshot};

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Returns `~/.config/calnotify[-dev]/` based on CALNOTIFY_ENV.
///
/// Set CALNOTIFY_ENV=dev to use a development data directory, or
/// CALNOTIFY_DATA_DIR to point at an explicit directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("CALNOTIFY_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or(StorageError::DirUnavailable)?
                .join(".config");

            let env = std::env::var("CALNOTIFY_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("calnotify-dev")
            } else {
                base_dir.join("calnotify")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write `contents` to `path` via a temporary file and rename, so a crash
/// mid-write never leaves a truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        assert!(!path.with_extension("tmp").exists());
    }
}
