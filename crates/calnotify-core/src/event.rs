//! Calendar event model and ingestion helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One calendar occurrence, as fetched from the source calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable identifier from the source calendar.
    pub id: String,
    /// Human-readable summary. Never empty after ingestion.
    pub title: String,
    /// Start instant; the sole ordering key.
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            location: None,
            description: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Clean a freshly fetched event list for caching.
///
/// Drops events with empty or whitespace-only titles and collapses
/// duplicate ids, keeping the last occurrence. The position of the first
/// occurrence is retained so the result is deterministic.
pub fn normalize(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut out: Vec<CalendarEvent> = Vec::with_capacity(events.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for event in events {
        if event.title.trim().is_empty() {
            continue;
        }
        match seen.get(&event.id) {
            Some(&i) => out[i] = event,
            None => {
                seen.insert(event.id.clone(), out.len());
                out.push(event);
            }
        }
    }
    out
}

/// The soonest event strictly after `now`, if any.
pub fn next_event(events: &[CalendarEvent], now: DateTime<Utc>) -> Option<&CalendarEvent> {
    events
        .iter()
        .filter(|e| e.start > now)
        .min_by_key(|e| e.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(id: &str, title: &str, start: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent::new(id, title, start)
    }

    #[test]
    fn normalize_drops_untitled_events() {
        let now = Utc::now();
        let events = vec![
            event("a", "Standup", now),
            event("b", "", now),
            event("c", "   ", now),
        ];

        let cleaned = normalize(events);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].id, "a");
    }

    #[test]
    fn normalize_keeps_last_duplicate() {
        let now = Utc::now();
        let events = vec![
            event("a", "Old title", now),
            event("b", "Other", now + Duration::hours(1)),
            event("a", "New title", now + Duration::hours(2)),
        ];

        let cleaned = normalize(events);
        assert_eq!(cleaned.len(), 2);
        // Last write wins, first position is kept.
        assert_eq!(cleaned[0].id, "a");
        assert_eq!(cleaned[0].title, "New title");
        assert_eq!(cleaned[1].id, "b");
    }

    #[test]
    fn next_event_picks_soonest_future() {
        let now = Utc::now();
        let events = vec![
            event("past", "Past", now - Duration::hours(1)),
            event("later", "Later", now + Duration::hours(3)),
            event("soon", "Soon", now + Duration::minutes(10)),
        ];

        let next = next_event(&events, now).unwrap();
        assert_eq!(next.id, "soon");
    }

    #[test]
    fn next_event_none_when_all_past() {
        let now = Utc::now();
        let events = vec![event("past", "Past", now - Duration::minutes(1))];
        assert!(next_event(&events, now).is_none());
    }

    #[test]
    fn event_roundtrips_through_json() {
        let now = Utc::now();
        let original = event("e1", "Review", now)
            .with_location("Room 4")
            .with_description("Bring <b>notes</b>");

        let json = serde_json::to_string(&original).unwrap();
        let parsed: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
