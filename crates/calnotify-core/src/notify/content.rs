//! Text composition for reminder notifications.

use super::NotificationRequest;
use crate::event::CalendarEvent;
use crate::policy::{ReminderPolicy, ReminderSlot, LEAD_TIME_CHOICES};

/// Human label for a lead time in minutes.
pub fn lead_label(minutes: u32) -> String {
    if let Some((_, label)) = LEAD_TIME_CHOICES.iter().find(|(m, _)| *m == minutes) {
        return (*label).to_string();
    }
    match minutes {
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}

/// Strip HTML tags from calendar descriptions, which often carry markup.
///
/// Removes `<...>` pairs and trims the result. A `<` with no closing `>`
/// is ordinary text and is kept.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Notification body: a "Starting in ..." line (with location when known),
/// then the cleaned event description if there is one.
pub fn build_body(event: &CalendarEvent, lead_minutes: u32) -> String {
    let mut first_line = format!("Starting in {}", lead_label(lead_minutes));
    if let Some(location) = &event.location {
        if !location.is_empty() {
            first_line.push_str(" \u{2022} ");
            first_line.push_str(location);
        }
    }

    let mut lines = vec![first_line];
    if let Some(description) = &event.description {
        let clean = strip_html(description);
        if !clean.is_empty() {
            lines.push(clean);
        }
    }
    lines.join("\n")
}

/// Full request for one reminder slot of an event.
pub fn build_request(
    event: &CalendarEvent,
    slot: ReminderSlot,
    policy: &ReminderPolicy,
) -> NotificationRequest {
    NotificationRequest {
        event_id: event.id.clone(),
        slot,
        title: event.title.clone(),
        body: build_body(event, policy.lead_minutes(slot)),
        sound: policy.sound(slot),
        trigger_at: policy.trigger_at(slot, event.start),
    }
}

/// Title and body for the sound-preview notification of one slot.
pub fn test_notification(policy: &ReminderPolicy, slot: ReminderSlot) -> (String, String) {
    (
        "Test Notification".to_string(),
        format!(
            "This is your {} reminder sound",
            lead_label(policy.lead_minutes(slot))
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::NotificationSound;
    use chrono::{Duration, Utc};

    #[test]
    fn lead_label_covers_named_choices() {
        for (minutes, label) in LEAD_TIME_CHOICES {
            assert_eq!(lead_label(minutes), label);
        }
        assert_eq!(lead_label(1), "1 minute");
        assert_eq!(lead_label(45), "45 minutes");
    }

    #[test]
    fn strip_html_removes_tags() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("  plain text "), "plain text");
    }

    #[test]
    fn strip_html_keeps_text_with_bare_angle() {
        assert_eq!(strip_html("a < b"), "a < b");
    }

    #[test]
    fn body_includes_location_and_description() {
        let event = CalendarEvent::new("e1", "Standup", Utc::now())
            .with_location("Room 4")
            .with_description("<p>Bring the <b>roadmap</b></p>");

        assert_eq!(
            build_body(&event, 15),
            "Starting in 15 minutes \u{2022} Room 4\nBring the roadmap"
        );
    }

    #[test]
    fn body_omits_markup_only_description() {
        let event = CalendarEvent::new("e1", "Standup", Utc::now()).with_description("<p> </p>");
        assert_eq!(build_body(&event, 60), "Starting in 1 hour");
    }

    #[test]
    fn request_carries_slot_identity_and_trigger() {
        let start = Utc::now() + Duration::hours(2);
        let event = CalendarEvent::new("e1", "Standup", start);
        let policy = ReminderPolicy::default();

        let request = build_request(&event, ReminderSlot::Second, &policy);
        assert_eq!(request.identifier(), "e1-second");
        assert_eq!(request.title, "Standup");
        assert_eq!(request.trigger_at, start - Duration::minutes(15));
        assert_eq!(request.sound, NotificationSound::Default);
    }

    #[test]
    fn test_notification_names_the_lead_time() {
        let policy = ReminderPolicy::default();
        let (title, body) = test_notification(&policy, ReminderSlot::First);
        assert_eq!(title, "Test Notification");
        assert_eq!(body, "This is your 1 hour reminder sound");

        let (_, body) = test_notification(&policy, ReminderSlot::Second);
        assert_eq!(body, "This is your 15 minutes reminder sound");
    }
}
