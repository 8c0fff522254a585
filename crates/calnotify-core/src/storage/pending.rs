//! File-backed queue of scheduled notifications.
//!
//! Desktop notification daemons display immediately rather than at a
//! future time, so scheduled reminders are parked here and the watch
//! agent drains whatever has come due on each tick.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, write_atomic};
use crate::error::StorageError;
use crate::notify::{NotificationRequest, Notifier, ScheduleError};
use crate::policy::{NotificationSound, ReminderSlot};

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub event_id: String,
    pub slot: ReminderSlot,
    pub title: String,
    pub body: String,
    pub sound: NotificationSound,
    pub trigger_at: DateTime<Utc>,
    /// When the notification was queued.
    pub scheduled_at: DateTime<Utc>,
}

impl PendingNotification {
    pub fn identifier(&self) -> String {
        self.slot.identifier(&self.event_id)
    }
}

impl From<NotificationRequest> for PendingNotification {
    fn from(request: NotificationRequest) -> Self {
        Self {
            event_id: request.event_id,
            slot: request.slot,
            title: request.title,
            body: request.body,
            sound: request.sound,
            trigger_at: request.trigger_at,
            scheduled_at: Utc::now(),
        }
    }
}

/// [`Notifier`] backed by a JSON file under the data directory.
pub struct PendingQueue {
    path: PathBuf,
}

impl PendingQueue {
    /// Queue at `pending.json` under the data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(data_dir()?.join("pending.json")))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Vec<PendingNotification> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Discarding unreadable pending queue: {}", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    fn write(&self, items: &[PendingNotification]) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(items)?;
        write_atomic(&self.path, &content)
    }

    /// All queued notifications, soonest first.
    pub fn list(&self) -> Vec<PendingNotification> {
        let mut items = self.read();
        items.sort_by_key(|n| n.trigger_at);
        items
    }

    /// Remove and return the notifications due at or before `now`,
    /// soonest first.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<PendingNotification>, StorageError> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.read().into_iter().partition(|n| n.trigger_at <= now);
        if !due.is_empty() {
            self.write(&rest)?;
        }
        due.sort_by_key(|n| n.trigger_at);
        Ok(due)
    }
}

#[async_trait]
impl Notifier for PendingQueue {
    async fn schedule(&self, request: &NotificationRequest) -> Result<(), ScheduleError> {
        let mut items = self.read();
        let identifier = request.identifier();
        items.retain(|n| n.identifier() != identifier);
        items.push(PendingNotification::from(request.clone()));
        self.write(&items)?;
        Ok(())
    }

    async fn cancel(&self, event_id: &str, slot: ReminderSlot) {
        let mut items = self.read();
        let before = items.len();
        items.retain(|n| !(n.event_id == event_id && n.slot == slot));
        if items.len() == before {
            return;
        }
        if let Err(e) = self.write(&items) {
            tracing::warn!("Failed to update pending queue after cancel: {}", e);
        }
    }

    async fn cancel_all(&self) {
        if let Err(e) = self.write(&[]) {
            tracing::warn!("Failed to clear pending queue: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(event_id: &str, slot: ReminderSlot, minutes_ahead: i64) -> NotificationRequest {
        NotificationRequest {
            event_id: event_id.to_string(),
            slot,
            title: format!("Event {event_id}"),
            body: "Starting soon".to_string(),
            sound: NotificationSound::Default,
            trigger_at: Utc::now() + Duration::minutes(minutes_ahead),
        }
    }

    fn queue() -> (tempfile::TempDir, PendingQueue) {
        let dir = tempfile::tempdir().unwrap();
        let queue = PendingQueue::new(dir.path().join("pending.json"));
        (dir, queue)
    }

    #[tokio::test]
    async fn schedule_then_list_orders_by_trigger() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("b", ReminderSlot::First, 90))
            .await
            .unwrap();
        queue
            .schedule(&request("a", ReminderSlot::First, 30))
            .await
            .unwrap();

        let ids: Vec<String> = queue.list().iter().map(|n| n.identifier()).collect();
        assert_eq!(ids, vec!["a-first", "b-first"]);
    }

    #[tokio::test]
    async fn schedule_same_slot_replaces_earlier_request() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("a", ReminderSlot::First, 30))
            .await
            .unwrap();
        let updated = request("a", ReminderSlot::First, 45);
        queue.schedule(&updated).await.unwrap();

        let items = queue.list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].trigger_at, updated.trigger_at);
    }

    #[tokio::test]
    async fn cancel_removes_only_the_named_slot() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("a", ReminderSlot::First, 30))
            .await
            .unwrap();
        queue
            .schedule(&request("a", ReminderSlot::Second, 75))
            .await
            .unwrap();

        queue.cancel("a", ReminderSlot::First).await;

        let items = queue.list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].identifier(), "a-second");
    }

    #[tokio::test]
    async fn cancel_on_empty_queue_creates_no_file() {
        let (_dir, queue) = queue();
        queue.cancel("ghost", ReminderSlot::First).await;
        assert!(!queue.path().exists());
    }

    #[tokio::test]
    async fn cancel_all_clears_queue() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("a", ReminderSlot::First, 30))
            .await
            .unwrap();
        queue
            .schedule(&request("b", ReminderSlot::Second, 60))
            .await
            .unwrap();

        queue.cancel_all().await;
        assert!(queue.list().is_empty());
    }

    #[tokio::test]
    async fn take_due_drains_only_past_triggers() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("past", ReminderSlot::First, -5))
            .await
            .unwrap();
        queue
            .schedule(&request("future", ReminderSlot::First, 60))
            .await
            .unwrap();

        let due = queue.take_due(Utc::now()).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].event_id, "past");

        let remaining = queue.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].event_id, "future");
    }

    #[tokio::test]
    async fn take_due_returns_empty_when_nothing_due() {
        let (_dir, queue) = queue();
        queue
            .schedule(&request("future", ReminderSlot::First, 60))
            .await
            .unwrap();

        assert!(queue.take_due(Utc::now()).unwrap().is_empty());
        assert_eq!(queue.list().len(), 1);
    }
}
