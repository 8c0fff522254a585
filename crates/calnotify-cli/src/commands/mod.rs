pub mod auth;
pub mod config;
pub mod events;
pub mod notify;
pub mod status;
pub mod sync;
pub mod watch;
