//! Persisted record of the last successful sync.
//!
//! The snapshot is what makes removal detection work across process
//! restarts: the next sync compares freshly fetched events against the
//! events stored here and cancels reminders for anything that vanished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, write_atomic};
use crate::error::StorageError;
use crate::event::CalendarEvent;

/// The set of upcoming events as of the last completed sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    /// When the snapshot was written, if ever.
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

impl SyncSnapshot {
    pub fn new(events: Vec<CalendarEvent>, synced_at: DateTime<Utc>) -> Self {
        Self {
            synced_at: Some(synced_at),
            events,
        }
    }
}

/// Store for the event snapshot.
pub trait EventCache: Send + Sync {
    /// The last persisted snapshot. A missing or unreadable file reads as
    /// an empty snapshot rather than an error; stale reminders left behind
    /// by a lost snapshot are cleaned up by the following sync anyway.
    fn load(&self) -> SyncSnapshot;

    /// Replace the persisted snapshot.
    fn save(&self, snapshot: &SyncSnapshot) -> Result<(), StorageError>;
}

/// [`EventCache`] backed by a JSON file.
pub struct JsonEventCache {
    path: PathBuf,
}

impl JsonEventCache {
    /// Cache at `events.json` under the data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(data_dir()?.join("events.json")))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the snapshot file. Used on sign-out.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl EventCache for JsonEventCache {
    fn load(&self) -> SyncSnapshot {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Discarding unreadable event snapshot: {}", e);
                    SyncSnapshot::default()
                }
            },
            Err(_) => SyncSnapshot::default(),
        }
    }

    fn save(&self, snapshot: &SyncSnapshot) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, &content)
    }
}
