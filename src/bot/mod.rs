//! Bot layer - identity, credentials and presence on top of a chat client
//!
//! A [`Bot`] composes with a [`ChatClient`] rather than being one. It validates
//! its configuration up front, only lets handlers subscribe to allow-listed
//! events, and turns every network failure into a logged [`Outcome`].

/// Read-only channel views
pub mod channels;
/// Sending and broadcasting messages
pub mod messaging;

use crate::config::BotConfig;
use crate::core::{
    Activity, ChatClient, Credentials, Event, EventKind, Failure, Listener, Outcome, Presence,
    Status,
};
use crate::errors::{Error, Result};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, error, info, instrument, warn};

/// An event handler. It receives the bot first, then the event payload.
pub type Handler = Arc<dyn Fn(Bot, Event) -> BoxFuture<'static, ()> + Send + Sync>;

/// Boxes an async closure into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Bot, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |bot, event| -> BoxFuture<'static, ()> { Box::pin(f(bot, event)) })
}

/// A named bot bound to a chat client.
///
/// Cloning is cheap; every clone refers to the same bot.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

struct BotInner {
    client: Arc<dyn ChatClient>,
    credentials: Credentials,
    state: RwLock<BotState>,
}

struct BotState {
    name: String,
    presence: Presence,
}

impl Bot {
    /// Creates a bot from its configuration.
    ///
    /// # Errors
    /// Returns [`Error::MissingName`] without a name, and
    /// [`Error::MissingCredentials`] unless the config carries a token or both
    /// an email and a password.
    pub fn new(config: &BotConfig, client: Arc<dyn ChatClient>) -> Result<Self> {
        let name = config.name().ok_or(Error::MissingName)?.to_string();
        let credentials = config
            .credentials()
            .ok_or_else(|| Error::MissingCredentials { name: name.clone() })?;

        debug!(bot = %name, ?credentials, "Bot created");
        Ok(Self {
            inner: Arc::new(BotInner {
                client,
                credentials,
                state: RwLock::new(BotState {
                    name,
                    presence: config.presence(),
                }),
            }),
        })
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.read_state(|state| state.name.clone())
    }

    /// The presence this bot wants to show. See [`user`](Self::user) for what
    /// the platform reports.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.read_state(|state| state.presence.clone())
    }

    #[must_use]
    pub fn client(&self) -> &Arc<dyn ChatClient> {
        &self.inner.client
    }

    /// Subscribes an async closure to an event. See [`set_event_handler`](Self::set_event_handler).
    pub fn set_event<F, Fut>(&self, event: &str, f: F) -> Result<()>
    where
        F: Fn(Self, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.set_event_handler(event, handler(f))
    }

    /// Subscribes a handler to an allow-listed event.
    ///
    /// The handler is called with this bot followed by the event payload.
    /// Registering twice subscribes twice.
    ///
    /// # Errors
    /// Returns [`Error::EventNotAllowed`] if `event` is unknown or not in
    /// [`ALLOWED_EVENTS`](crate::core::ALLOWED_EVENTS). Nothing is subscribed
    /// in that case.
    pub fn set_event_handler(&self, event: &str, handler: Handler) -> Result<()> {
        let kind = event
            .parse::<EventKind>()
            .ok()
            .filter(|kind| kind.is_allowed())
            .ok_or_else(|| Error::EventNotAllowed {
                name: self.name(),
                event: event.to_string(),
            })?;

        // Weak, so the client's listener table does not keep the bot alive.
        let bot: Weak<BotInner> = Arc::downgrade(&self.inner);
        let listener: Listener = Arc::new(move |event| -> BoxFuture<'static, ()> {
            match bot.upgrade() {
                Some(inner) => handler(Self { inner }, event),
                None => Box::pin(async {}),
            }
        });
        self.inner.client.on(kind, listener);

        debug!(bot = %self.name(), event = %kind, "Event handler registered");
        Ok(())
    }

    /// Signs in with the stored credentials, then applies the configured
    /// presence and, if `apply_name` is set, the configured name.
    ///
    /// Every failure is logged and reported through the outcome.
    #[instrument(skip(self), fields(bot = %self.name()))]
    pub async fn signin(&self, apply_name: bool) -> Outcome {
        if let Err(e) = self.inner.client.login(&self.inner.credentials).await {
            error!(error = %e, "Failed to sign in");
            return Outcome::Failure(e.into());
        }
        info!("Signed in");

        let presence = self.apply_presence().await;
        if presence.is_failure() {
            return presence;
        }

        if apply_name {
            return self.apply_name().await;
        }
        Outcome::Success
    }

    /// Stores a new name and pushes it to the platform.
    pub async fn set_name(&self, name: &str) -> Outcome {
        self.write_state(|state| state.name = name.to_string());
        self.apply_name().await
    }

    /// Stores a new status and pushes the presence to the platform.
    pub async fn set_status(&self, status: Status) -> Outcome {
        self.write_state(|state| state.presence.status = status);
        self.apply_presence().await
    }

    /// Stores a new activity (or clears it) and pushes the presence to the platform.
    pub async fn set_game(&self, activity: Option<Activity>) -> Outcome {
        self.write_state(|state| state.presence.activity = activity);
        self.apply_presence().await
    }

    async fn apply_name(&self) -> Outcome {
        let name = self.name();
        match self.inner.client.set_username(&name).await {
            Ok(user) if user.username == name => {
                info!(bot = %name, user_id = %user.id, "Name applied");
                Outcome::Success
            }
            Ok(user) => {
                warn!(bot = %name, user_id = %user.id, reported = %user.username, "Name not applied");
                Outcome::Failure(Failure::Mismatch {
                    expected: name,
                    actual: user.username,
                })
            }
            Err(e) => {
                error!(bot = %name, error = %e, "Failed to apply name");
                Outcome::Failure(e.into())
            }
        }
    }

    async fn apply_presence(&self) -> Outcome {
        let requested = self.presence();
        match self.inner.client.set_presence(&requested).await {
            Ok(actual) if actual == requested => {
                info!(bot = %self.name(), status = %actual.status, activity = ?actual.activity, "Presence applied");
                Outcome::Success
            }
            Ok(actual) => {
                warn!(bot = %self.name(), requested = ?requested, reported = ?actual, "Presence not applied");
                Outcome::Failure(Failure::Mismatch {
                    expected: format!("{requested:?}"),
                    actual: format!("{actual:?}"),
                })
            }
            Err(e) => {
                error!(bot = %self.name(), error = %e, "Failed to apply presence");
                Outcome::Failure(e.into())
            }
        }
    }

    fn read_state<T>(&self, f: impl FnOnce(&BotState) -> T) -> T {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    fn write_state(&self, f: impl FnOnce(&mut BotState)) {
        f(&mut self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner));
    }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read_state(|state| {
            f.debug_struct("Bot")
                .field("name", &state.name)
                .field("credentials", &self.inner.credentials)
                .field("presence", &state.presence)
                .finish_non_exhaustive()
        })
    }
}
