//! Results of network-touching bot operations.
//!
//! Operations that talk to the platform never return `Err` and never panic.
//! They log and hand back an [`Outcome`], so a failure is visible in the type
//! even though it does not interrupt control flow.

use super::model::{ChannelId, MessageTarget};
use crate::errors::ClientError;
use thiserror::Error;

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(Failure),
}

impl Outcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub const fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

impl From<Outcome> for bool {
    fn from(outcome: Outcome) -> Self {
        outcome.is_success()
    }
}

impl<E: Into<Failure>> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::Failure(e.into()),
        }
    }
}

/// Why an operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("{0} is not known to the client")]
    NotFound(MessageTarget),

    #[error("the bot is not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("requested {expected}, platform reports {actual}")]
    Mismatch { expected: String, actual: String },
}

/// Result of sending one message to every own channel.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Channels the message was sent to.
    pub targeted: usize,
    /// Send attempts that ran to completion, delivered or not.
    pub completed: usize,
    /// Channels whose send came back as a failure.
    pub failures: Vec<(ChannelId, Failure)>,
}

impl BroadcastReport {
    /// True when every targeted send ran to completion.
    ///
    /// A send that completed with a failure still counts. Use
    /// [`all_delivered`](Self::all_delivered) for per-channel delivery.
    pub const fn is_success(&self) -> bool {
        self.completed == self.targeted
    }

    pub fn all_delivered(&self) -> bool {
        self.is_success() && self.failures.is_empty()
    }
}

impl From<BroadcastReport> for bool {
    fn from(report: BroadcastReport) -> Self {
        report.is_success()
    }
}
