//! Sync cycle driver.
//!
//! Reconciles the scheduled notifications with the calendar: fetch the
//! upcoming events, diff against the last snapshot, cancel whatever is
//! stale, schedule what remains, then persist the new snapshot.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use super::plan;
use crate::calendar::{CalendarSource, FetchError};
use crate::error::StorageError;
use crate::event::CalendarEvent;
use crate::notify::{content, Notifier};
use crate::policy::{ReminderPolicy, ReminderSlot};
use crate::storage::{EventCache, SyncSnapshot};

/// Fetch deadline applied when the caller does not supply one.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a sync cycle produced no report.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No usable calendar connection. Nothing was touched.
    #[error("calendar access is not authorized")]
    PermissionDenied,

    /// The fetch failed; previously scheduled notifications were left
    /// exactly as they were.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Notifications were already issued but the snapshot could not be
    /// written. The next cycle starts from the stale snapshot and
    /// converges on its own.
    #[error("could not persist the event snapshot: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of one completed sync cycle.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SyncReport {
    /// Events returned by the calendar fetch.
    pub fetched: usize,
    /// Events remaining after the strictly-in-the-future filter.
    pub future: usize,
    /// Events with at least one reminder actually scheduled.
    pub scheduled: usize,
    /// Individual reminders scheduled.
    pub slots_scheduled: usize,
    /// Reminders skipped because their trigger time had already passed.
    pub slots_skipped: usize,
    /// Reminders the notifier rejected.
    pub schedule_failures: usize,
    /// True when more upcoming events existed than the per-cycle ceiling.
    pub truncated: bool,
    /// When the cycle ran.
    pub synced_at: DateTime<Utc>,
}

impl SyncReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        let mut message = format!(
            "{} fetched, {} upcoming, {} scheduled",
            self.fetched, self.future, self.scheduled
        );
        if self.slots_skipped > 0 {
            message.push_str(&format!(", {} reminder(s) already past", self.slots_skipped));
        }
        if self.schedule_failures > 0 {
            message.push_str(&format!(", {} failed", self.schedule_failures));
        }
        if self.truncated {
            message.push_str(" (truncated)");
        }
        message
    }
}

/// Drives sync cycles end to end. Cycles never overlap: a second caller
/// waits for the running cycle to finish, then runs its own.
pub struct SyncReconciler<S, N, C> {
    source: S,
    notifier: N,
    cache: C,
    fetch_timeout: Option<Duration>,
    guard: Mutex<()>,
}

impl<S, N, C> SyncReconciler<S, N, C>
where
    S: CalendarSource,
    N: Notifier,
    C: EventCache,
{
    pub fn new(source: S, notifier: N, cache: C) -> Self {
        Self {
            source,
            notifier,
            cache,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
            guard: Mutex::new(()),
        }
    }

    /// Replace the fetch deadline. `None` waits indefinitely.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Run one sync cycle against the current clock.
    pub async fn sync(&self, policy: &ReminderPolicy) -> Result<SyncReport, SyncError> {
        let _cycle = self.guard.lock().await;
        self.run(policy, Utc::now()).await
    }

    /// Cycle body with an injected clock.
    pub(crate) async fn run(
        &self,
        policy: &ReminderPolicy,
        now: DateTime<Utc>,
    ) -> Result<SyncReport, SyncError> {
        if !self.source.is_authorized() {
            return Err(SyncError::PermissionDenied);
        }

        let fetched = self.fetch().await?;
        let fetched_count = fetched.len();

        let previous = self.cache.load();
        let plan = plan::plan(fetched, &previous.events, now);
        let future_count = plan.future.len();

        if plan.truncated {
            tracing::warn!(
                "{} upcoming events exceed the per-cycle ceiling; scheduling the soonest {}",
                future_count,
                plan::MAX_SCHEDULED_EVENTS
            );
        }

        // Cancels run before any schedule: stale reminders for removed
        // events must be gone first, and every upcoming event is cleared
        // so nothing lingers from an earlier cycle under the same id.
        for id in &plan.removed_ids {
            for slot in ReminderSlot::ALL {
                self.notifier.cancel(id, slot).await;
            }
        }
        for event in &plan.future {
            for slot in ReminderSlot::ALL {
                self.notifier.cancel(&event.id, slot).await;
            }
        }

        let mut scheduled_events = 0usize;
        let mut slots_scheduled = 0usize;
        let mut slots_skipped = 0usize;
        let mut schedule_failures = 0usize;

        for event in plan.scheduled() {
            let mut any_slot = false;
            for slot in ReminderSlot::ALL {
                let request = content::build_request(event, slot, policy);
                if request.trigger_at <= now {
                    slots_skipped += 1;
                    continue;
                }
                match self.notifier.schedule(&request).await {
                    Ok(()) => {
                        slots_scheduled += 1;
                        any_slot = true;
                    }
                    Err(e) => {
                        schedule_failures += 1;
                        tracing::warn!(
                            "Failed to schedule {} reminder for event {}: {}",
                            slot,
                            event.id,
                            e
                        );
                    }
                }
            }
            if any_slot {
                scheduled_events += 1;
            }
        }

        // The snapshot keeps ALL upcoming events, not just the scheduled
        // prefix, so removals past the ceiling are still detected next
        // cycle. Persisting is the last step; on failure the notifications
        // stand and the stale snapshot heals next cycle.
        let truncated = plan.truncated;
        self.cache.save(&SyncSnapshot::new(plan.future, now))?;

        let report = SyncReport {
            fetched: fetched_count,
            future: future_count,
            scheduled: scheduled_events,
            slots_scheduled,
            slots_skipped,
            schedule_failures,
            truncated,
            synced_at: now,
        };
        tracing::info!("Sync complete: {}", report.summary());
        Ok(report)
    }

    async fn fetch(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.source.fetch_events()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Network(format!(
                    "fetch exceeded the {}s deadline",
                    limit.as_secs()
                ))),
            },
            None => self.source.fetch_events().await,
        }
    }
}
