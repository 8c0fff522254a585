//! Notification scheduling port and content composition.

pub mod content;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StorageError;
use crate::policy::{NotificationSound, ReminderSlot};

/// A reminder to be delivered at a fixed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Id of the event the reminder belongs to.
    pub event_id: String,
    pub slot: ReminderSlot,
    pub title: String,
    pub body: String,
    pub sound: NotificationSound,
    /// When the notification fires.
    pub trigger_at: DateTime<Utc>,
}

impl NotificationRequest {
    /// Stable identifier, `{event_id}-{slot}`.
    pub fn identifier(&self) -> String {
        self.slot.identifier(&self.event_id)
    }
}

/// Why a single notification could not be scheduled.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Store of scheduled notifications.
///
/// Scheduling under an identifier that is already present replaces the
/// earlier request. Cancels target identifiers and are silent no-ops when
/// nothing matches, so callers can cancel without tracking what exists.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Register `request` for delivery at its trigger time.
    async fn schedule(&self, request: &NotificationRequest) -> Result<(), ScheduleError>;

    /// Remove the scheduled notification for `slot` of `event_id`, if any.
    async fn cancel(&self, event_id: &str, slot: ReminderSlot);

    /// Remove every scheduled notification owned by this application.
    async fn cancel_all(&self);
}
