//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Reminder lead times and sounds
//! - Calendar fetch settings (calendar id, horizon, timeout)
//! - Background agent cadence
//!
//! Configuration is stored at `~/.config/calnotify/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{data_dir, write_atomic};
use crate::error::ConfigError;
use crate::policy::ReminderPolicy;

/// Calendar fetch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// Calendar to sync. "primary" is the account's main calendar.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// How far ahead to fetch events, in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Abort a fetch that runs longer than this.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

/// Background agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Minutes between sync cycles in watch mode.
    #[serde(default = "default_sync_interval_minutes")]
    pub sync_interval_minutes: u64,
    /// Seconds between checks for due notifications.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calnotify/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: ReminderPolicy,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

// Default functions
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_horizon_days() -> u32 {
    30
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_sync_interval_minutes() -> u64 {
    15
}
fn default_tick_secs() -> u64 {
    60
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            horizon_days: default_horizon_days(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            sync_interval_minutes: default_sync_interval_minutes(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(String::new()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| {
                            ConfigError::Invalid(format!("cannot parse '{value}' as boolean"))
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    ConfigError::Invalid(format!(
                                        "cannot parse '{value}' as number"
                                    ))
                                })?
                        } else {
                            return Err(ConfigError::Invalid(format!(
                                "cannot parse '{value}' as number"
                            )));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Same as [`load`](Self::load) but against an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Same as [`save`](Self::save) but against an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(path, &content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist immediately, so the next
    /// sync cycle picks it up.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the resulting config is invalid, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.reminders.validate()?;
        *self = updated;
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Fetch deadline as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.calendar.fetch_timeout_secs)
    }

    /// Delay between sync cycles in watch mode.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.agent.sync_interval_minutes * 60)
    }

    /// Delay between due-notification checks in watch mode.
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.agent.tick_secs)
    }
}
