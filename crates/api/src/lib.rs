pub mod auth;
pub mod client;
pub mod notifications;
pub mod servers;
pub mod tokens;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{Ack, ApiClient};
pub use notifications::NotificationCenter;
pub use servers::{
    LogKind, NewServer, ServerAction, ServerLogEntry, ServerStatus, ServerUpdate, DEFAULT_LOG_LIMIT,
    DEFAULT_MAX_PLAYERS,
};
pub use tokens::{Activation, GeneratedToken, DEFAULT_DURATION_DAYS};
