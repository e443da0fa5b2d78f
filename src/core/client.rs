//! The capability interface a bot composes with.
//!
//! A [`ChatClient`] owns the network connection, the signed-in user and the
//! known channel/user collections. The bot never owns those; it only queries
//! snapshots and asks the client to act.

use super::events::{EventKind, Listener};
use super::model::{Channel, ChatMessage, CurrentUser, MessageTarget, Presence, User};
use crate::errors::ClientError;
use async_trait::async_trait;
use std::fmt;

/// Means of authenticating against the platform.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Account { email: String, password: String },
}

// Keep secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Credentials::Token(..)"),
            Self::Account { email, .. } => f
                .debug_struct("Credentials::Account")
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Authenticates and establishes the connection.
    async fn login(&self, credentials: &Credentials) -> Result<(), ClientError>;

    /// Subscribes a listener to an event kind.
    fn on(&self, kind: EventKind, listener: Listener);

    fn listener_count(&self, kind: EventKind) -> usize;

    /// The signed-in user, if any.
    fn user(&self) -> Option<CurrentUser>;

    /// Every channel the client currently knows about.
    fn channels(&self) -> Vec<Channel>;

    /// Every user the client currently knows about.
    fn users(&self) -> Vec<User>;

    async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
    ) -> Result<ChatMessage, ClientError>;

    /// Changes the signed-in user's name and returns the user as the platform now reports it.
    async fn set_username(&self, name: &str) -> Result<CurrentUser, ClientError>;

    /// Applies a presence and returns the presence as the platform now reports it.
    async fn set_presence(&self, presence: &Presence) -> Result<Presence, ClientError>;
}
