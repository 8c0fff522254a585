//! Calendar source port and adapters.

pub mod google;

pub use google::GoogleCalendar;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::CalendarEvent;

/// Why a fetch produced no usable event list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No account is connected, or the grant was revoked.
    #[error("calendar access is not authorized")]
    Unauthorized,

    /// Transport failure or an unexpected response.
    #[error("calendar fetch failed: {0}")]
    Network(String),

    /// The provider is rate limiting us.
    #[error("calendar API quota exceeded")]
    QuotaExceeded,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

/// Read access to the upcoming events of one calendar account.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Whether the account connection is usable. Local check only, no
    /// network round-trip.
    fn is_authorized(&self) -> bool;

    /// Upcoming events within the source's fetch horizon.
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, FetchError>;
}
