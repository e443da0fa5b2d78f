//! Error types for Herald.
//!
//! [`Error`] covers configuration and programmer mistakes (missing name, bad
//! credentials, disallowed events). These are returned synchronously and never
//! caught internally. [`ClientError`] is what a [`ChatClient`](crate::core::client::ChatClient)
//! reports for operational failures; the bot converts those into a failed
//! [`Outcome`](crate::core::outcome::Outcome) instead of propagating them.

use thiserror::Error;

/// Configuration and validation errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Your bot must have a name!")]
    MissingName,

    #[error("Bot {name} must authenticate with either a token, or an email and a password")]
    MissingCredentials { name: String },

    #[error("Bot {name} must have events!")]
    MissingEvents { name: String },

    #[error("You are not allowed to set an event {event} to bot {name}")]
    EventNotAllowed { name: String, event: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Operational failures reported by the underlying chat client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Client is not signed in")]
    NotConnected,

    #[error("Unsupported by this client: {0}")]
    Unsupported(String),

    #[error("Invalid platform id: {0}")]
    InvalidId(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Platform rejected the request: {0}")]
    Platform(String),
}

impl From<poise::serenity_prelude::Error> for ClientError {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Platform(value.to_string())
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
