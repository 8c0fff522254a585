//! # Calnotify Core Library
//!
//! Core logic for Calnotify, a calendar reminder agent: it mirrors the
//! upcoming events of a Google Calendar into two local notifications per
//! event and keeps those notifications correct as the calendar changes.
//! All operations are available through a standalone CLI binary.
//!
//! ## Architecture
//!
//! - **Sync**: a reconciler that fetches upcoming events, diffs them
//!   against the last snapshot, and cancels/schedules notifications to match
//! - **Storage**: TOML-based configuration plus JSON state files for the
//!   event snapshot and the pending notification queue
//! - **Calendar**: read adapter for the Google Calendar API with OAuth2
//!   tokens held in the OS keyring
//! - **Notify**: notification scheduling port and reminder text composition
//!
//! ## Key Components
//!
//! - [`SyncReconciler`]: drives one sync cycle end to end
//! - [`ReminderPolicy`]: lead times and sounds for the two reminder slots
//! - [`Config`]: application configuration management
//! - [`CalendarSource`] / [`Notifier`] / [`EventCache`]: the ports a
//!   platform supplies

pub mod sync;
pub mod storage;
pub mod calendar;
pub mod notify;
pub mod auth;
pub mod event;
pub mod policy;
pub mod error;

pub use calendar::{CalendarSource, FetchError, GoogleCalendar};
pub use event::CalendarEvent;
pub use notify::{NotificationRequest, Notifier, ScheduleError};
pub use policy::{NotificationSound, ReminderPolicy, ReminderSlot};
pub use storage::{
    Config, EventCache, JsonEventCache, PendingNotification, PendingQueue, SyncSnapshot,
};
pub use sync::{SyncError, SyncReconciler, SyncReport};
pub use error::{ConfigError, CoreError, OAuthError, StorageError};
