//! Google Calendar read adapter.
//!
//! Fetches upcoming events from one calendar over the Calendar v3 API,
//! using tokens managed by [`crate::auth::oauth`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Client;

use super::{CalendarSource, FetchError};
use crate::auth::oauth;
use crate::error::OAuthError;
use crate::event::CalendarEvent;
use crate::storage::CalendarSettings;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendar {
    client: Client,
    base_url: String,
    calendar_id: String,
    horizon_days: u32,
}

impl GoogleCalendar {
    pub fn new(settings: &CalendarSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            calendar_id: settings.calendar_id.clone(),
            horizon_days: settings.horizon_days,
        }
    }

    /// Override the API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch events starting between `from` and `to`, expanded to single
    /// occurrences and ordered by start time.
    pub async fn fetch_window(
        &self,
        token: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, FetchError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", from.to_rfc3339()),
                ("timeMax", to.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => FetchError::Unauthorized,
                403 | 429 => FetchError::QuotaExceeded,
                code => FetchError::Network(format!("calendar API returned HTTP {code}")),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(parse_events(&body))
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    fn is_authorized(&self) -> bool {
        oauth::load_tokens().is_some()
    }

    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        let token = oauth::access_token().await.map_err(|e| match e {
            OAuthError::NotAuthenticated
            | OAuthError::NoRefreshToken
            | OAuthError::ClientNotConfigured
            | OAuthError::TokenRejected(_) => FetchError::Unauthorized,
            other => FetchError::Network(other.to_string()),
        })?;

        let now = Utc::now();
        let horizon = now + Duration::days(i64::from(self.horizon_days));
        self.fetch_window(&token, now, horizon).await
    }
}

/// Parse the API `items` array, skipping entries with no usable start time.
fn parse_events(body: &serde_json::Value) -> Vec<CalendarEvent> {
    let Some(items) = body["items"].as_array() else {
        return Vec::new();
    };
    items.iter().filter_map(parse_item).collect()
}

fn parse_item(item: &serde_json::Value) -> Option<CalendarEvent> {
    let start = parse_start(&item["start"])?;
    let id = item["id"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let title = item["summary"].as_str().unwrap_or_default();

    let mut event = CalendarEvent::new(id, title, start);
    if let Some(location) = item["location"].as_str() {
        event = event.with_location(location);
    }
    if let Some(description) = item["description"].as_str() {
        event = event.with_description(description);
    }
    Some(event)
}

/// `start.dateTime` for timed events, `start.date` for all-day ones
/// (taken as midnight UTC).
fn parse_start(start: &serde_json::Value) -> Option<DateTime<Utc>> {
    if let Some(datetime) = start["dateTime"].as_str() {
        return DateTime::parse_from_rfc3339(datetime)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }
    let date = start["date"].as_str()?;
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(naive.and_hms_opt(0, 0, 0)?.and_utc())
}
