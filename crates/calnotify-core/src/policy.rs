//! Reminder policy: lead times, sounds, and slot identity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default lead time for the first reminder, in minutes.
pub const DEFAULT_FIRST_LEAD_MINUTES: u32 = 60;

/// Default lead time for the second reminder, in minutes.
pub const DEFAULT_SECOND_LEAD_MINUTES: u32 = 15;

/// Offered lead times with their display labels. Config accepts any
/// positive value; these are the ones pickers and help text present.
pub const LEAD_TIME_CHOICES: [(u32, &str); 7] = [
    (5, "5 minutes"),
    (10, "10 minutes"),
    (15, "15 minutes"),
    (30, "30 minutes"),
    (60, "1 hour"),
    (120, "2 hours"),
    (1440, "1 day"),
];

/// The two notifications maintained per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderSlot {
    First,
    Second,
}

impl ReminderSlot {
    pub const ALL: [ReminderSlot; 2] = [ReminderSlot::First, ReminderSlot::Second];

    pub fn name(&self) -> &'static str {
        match self {
            ReminderSlot::First => "first",
            ReminderSlot::Second => "second",
        }
    }

    /// Stable notification identifier for this slot of an event.
    ///
    /// Cancels issued in a later sync cycle must target exactly the
    /// notifications created in an earlier one, so the key is a plain
    /// concatenation rather than a hash.
    pub fn identifier(&self, event_id: &str) -> String {
        format!("{event_id}-{}", self.name())
    }
}

impl fmt::Display for ReminderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReminderSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ReminderSlot::First),
            "second" => Ok(ReminderSlot::Second),
            other => Err(format!(
                "unknown reminder slot '{other}' (expected first or second)"
            )),
        }
    }
}

/// Fixed sound set for reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSound {
    #[default]
    Default,
    Alarm,
    Notification,
    Ringtone,
    Silent,
}

impl NotificationSound {
    pub const ALL: [NotificationSound; 5] = [
        NotificationSound::Default,
        NotificationSound::Alarm,
        NotificationSound::Notification,
        NotificationSound::Ringtone,
        NotificationSound::Silent,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            NotificationSound::Default => "default",
            NotificationSound::Alarm => "alarm",
            NotificationSound::Notification => "notification",
            NotificationSound::Ringtone => "ringtone",
            NotificationSound::Silent => "silent",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationSound::Default => "Default",
            NotificationSound::Alarm => "Alarm",
            NotificationSound::Notification => "Notification",
            NotificationSound::Ringtone => "Ringtone",
            NotificationSound::Silent => "Silent",
        }
    }

    /// Freedesktop sound-theme name for desktop delivery; `None` means
    /// deliver silently.
    pub fn desktop_sound(&self) -> Option<&'static str> {
        match self {
            NotificationSound::Default | NotificationSound::Notification => {
                Some("message-new-instant")
            }
            NotificationSound::Alarm => Some("alarm-clock-elapsed"),
            NotificationSound::Ringtone => Some("phone-incoming-call"),
            NotificationSound::Silent => None,
        }
    }
}

impl fmt::Display for NotificationSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for NotificationSound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(NotificationSound::Default),
            "alarm" => Ok(NotificationSound::Alarm),
            "notification" => Ok(NotificationSound::Notification),
            "ringtone" => Ok(NotificationSound::Ringtone),
            "silent" => Ok(NotificationSound::Silent),
            other => Err(format!(
                "unknown sound '{other}' (expected default, alarm, notification, ringtone or silent)"
            )),
        }
    }
}

/// The configured reminder schedule: two lead times and two sounds.
///
/// Lives in the `[reminders]` section of the config file and is re-read
/// at the start of every sync cycle, so edits apply from the next cycle
/// on without rewriting already-scheduled notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    /// Minutes before the event start for the first reminder.
    /// Common choices: 5, 10, 15, 30, 60, 120, 1440. Default: 60
    #[serde(default = "default_first_lead")]
    pub first_lead_minutes: u32,

    /// Minutes before the event start for the second reminder.
    /// Default: 15
    #[serde(default = "default_second_lead")]
    pub second_lead_minutes: u32,

    /// Sound for the first reminder.
    #[serde(default)]
    pub first_sound: NotificationSound,

    /// Sound for the second reminder.
    #[serde(default)]
    pub second_sound: NotificationSound,
}

fn default_first_lead() -> u32 {
    DEFAULT_FIRST_LEAD_MINUTES
}

fn default_second_lead() -> u32 {
    DEFAULT_SECOND_LEAD_MINUTES
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            first_lead_minutes: DEFAULT_FIRST_LEAD_MINUTES,
            second_lead_minutes: DEFAULT_SECOND_LEAD_MINUTES,
            first_sound: NotificationSound::default(),
            second_sound: NotificationSound::default(),
        }
    }
}

impl ReminderPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both lead times, in minutes.
    pub fn with_leads(mut self, first: u32, second: u32) -> Self {
        self.first_lead_minutes = first;
        self.second_lead_minutes = second;
        self
    }

    /// Set both sounds.
    pub fn with_sounds(mut self, first: NotificationSound, second: NotificationSound) -> Self {
        self.first_sound = first;
        self.second_sound = second;
        self
    }

    pub fn lead_minutes(&self, slot: ReminderSlot) -> u32 {
        match slot {
            ReminderSlot::First => self.first_lead_minutes,
            ReminderSlot::Second => self.second_lead_minutes,
        }
    }

    pub fn sound(&self, slot: ReminderSlot) -> NotificationSound {
        match slot {
            ReminderSlot::First => self.first_sound,
            ReminderSlot::Second => self.second_sound,
        }
    }

    /// When the reminder for `slot` fires for an event starting at `start`.
    pub fn trigger_at(&self, slot: ReminderSlot, start: DateTime<Utc>) -> DateTime<Utc> {
        start - Duration::minutes(i64::from(self.lead_minutes(slot)))
    }

    /// Lead times must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for slot in ReminderSlot::ALL {
            if self.lead_minutes(slot) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{slot} reminder lead time must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_default_values() {
        let policy = ReminderPolicy::default();
        assert_eq!(policy.first_lead_minutes, 60);
        assert_eq!(policy.second_lead_minutes, 15);
        assert_eq!(policy.first_sound, NotificationSound::Default);
        assert_eq!(policy.second_sound, NotificationSound::Default);
    }

    #[test]
    fn slot_identifier_is_stable_concatenation() {
        assert_eq!(ReminderSlot::First.identifier("ev1"), "ev1-first");
        assert_eq!(ReminderSlot::Second.identifier("ev1"), "ev1-second");
    }

    #[test]
    fn trigger_at_subtracts_lead() {
        let policy = ReminderPolicy::new().with_leads(60, 15);
        let start = Utc::now();
        assert_eq!(
            policy.trigger_at(ReminderSlot::First, start),
            start - Duration::minutes(60)
        );
        assert_eq!(
            policy.trigger_at(ReminderSlot::Second, start),
            start - Duration::minutes(15)
        );
    }

    #[test]
    fn slot_parses_from_name() {
        assert_eq!("first".parse::<ReminderSlot>(), Ok(ReminderSlot::First));
        assert_eq!("second".parse::<ReminderSlot>(), Ok(ReminderSlot::Second));
        assert!("third".parse::<ReminderSlot>().is_err());
    }

    #[test]
    fn sound_parses_from_id() {
        for sound in NotificationSound::ALL {
            assert_eq!(sound.id().parse::<NotificationSound>(), Ok(sound));
        }
        assert!("loud".parse::<NotificationSound>().is_err());
    }

    #[test]
    fn silent_sound_has_no_desktop_name() {
        assert_eq!(NotificationSound::Silent.desktop_sound(), None);
        assert!(NotificationSound::Alarm.desktop_sound().is_some());
    }

    #[test]
    fn validate_rejects_zero_lead() {
        let policy = ReminderPolicy::new().with_leads(0, 15);
        assert!(policy.validate().is_err());
        assert!(ReminderPolicy::default().validate().is_ok());
    }

    #[test]
    fn policy_roundtrips_through_toml() {
        let policy = ReminderPolicy::new()
            .with_leads(120, 5)
            .with_sounds(NotificationSound::Alarm, NotificationSound::Silent);

        let text = toml::to_string(&policy).unwrap();
        let parsed: ReminderPolicy = toml::from_str(&text).unwrap();
        assert_eq!(parsed, policy);
    }
}
