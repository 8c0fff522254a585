//! Pure planning step of a sync cycle.
//!
//! Everything here is computed before any side effect runs, so the
//! reconciler's cancel and schedule calls follow a plan that can be
//! inspected and tested on its own.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::event::{self, CalendarEvent};

/// Ceiling on events scheduled in one cycle. The tightest delivery target
/// caps pending notifications at 64; 27 events is 54 slots, leaving
/// headroom for anything else the process has queued.
pub const MAX_SCHEDULED_EVENTS: usize = 27;

/// What a sync cycle will do, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    /// Upcoming events, soonest first, after normalization.
    pub future: Vec<CalendarEvent>,
    /// Ids present in the previous snapshot but absent from `future`.
    pub removed_ids: Vec<String>,
    /// True when `future` exceeds the scheduling ceiling.
    pub truncated: bool,
}

impl SyncPlan {
    /// The prefix of `future` that actually receives notifications.
    pub fn scheduled(&self) -> &[CalendarEvent] {
        let end = self.future.len().min(MAX_SCHEDULED_EVENTS);
        &self.future[..end]
    }
}

/// Compute the plan for one cycle: normalize the fetched list, keep events
/// starting strictly after `now`, sort soonest first (id as tiebreak), and
/// diff against the previous snapshot to find removals.
///
/// An event that was in the snapshot but has since started counts as
/// removed; its reminders are stale either way.
pub fn plan(
    fetched: Vec<CalendarEvent>,
    previous: &[CalendarEvent],
    now: DateTime<Utc>,
) -> SyncPlan {
    let mut future: Vec<CalendarEvent> = event::normalize(fetched)
        .into_iter()
        .filter(|e| e.start > now)
        .collect();
    future.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let current_ids: HashSet<&str> = future.iter().map(|e| e.id.as_str()).collect();
    let removed_ids = previous
        .iter()
        .filter(|e| !current_ids.contains(e.id.as_str()))
        .map(|e| e.id.clone())
        .collect();

    let truncated = future.len() > MAX_SCHEDULED_EVENTS;

    SyncPlan {
        future,
        removed_ids,
        truncated,
    }
}
