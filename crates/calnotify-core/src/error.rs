//! Error types for the Calnotify core library.

use thiserror::Error;

/// Top-level error type aggregating all core failures.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    #[error("Sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    #[error("Calendar error: {0}")]
    Fetch(#[from] crate::calendar::FetchError),

    #[error("Notification error: {0}")]
    Schedule(#[from] crate::notify::ScheduleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("invalid value: {0}")]
    Invalid(String),
}

/// State-file errors (event snapshot and pending queue).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no usable config directory")]
    DirUnavailable,
}

/// OAuth flow and credential storage errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no OAuth client configured; run `auth login --client-id ... --client-secret ...`")]
    ClientNotConfigured,

    #[error("stored tokens have no refresh token; run `auth login` again")]
    NoRefreshToken,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint rejected the request: {0}")]
    TokenRejected(String),

    #[error("callback did not contain an authorization code")]
    MissingCode,

    #[error("could not open the browser: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
