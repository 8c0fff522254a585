//! Calendar-to-notification reconciliation.
//!
//! One sync cycle fetches the upcoming events, diffs them against the
//! last snapshot, and rebuilds the scheduled notifications to match.

pub mod plan;
pub mod reconciler;

#[cfg(test)]
mod plan_tests;

pub use plan::{plan, SyncPlan, MAX_SCHEDULED_EVENTS};
pub use reconciler::{SyncError, SyncReconciler, SyncReport, DEFAULT_FETCH_TIMEOUT};
