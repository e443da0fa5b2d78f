//! One-call bot setup: validate, construct, register handlers, optionally sign in.

use crate::bot::{Bot, Handler, handler};
use crate::config::BotConfig;
use crate::core::{ChatClient, Event};
use crate::errors::{Error, Result};
use futures::future::{self, BoxFuture};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// A bot that becomes available once initialization has finished.
pub type PendingBot = BoxFuture<'static, Bot>;

/// Event handlers to register, in order, keyed by event name.
#[derive(Clone, Default)]
pub struct Events {
    entries: Vec<(String, Handler)>,
}

impl Events {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an async closure for `event`.
    #[must_use]
    pub fn on<F, Fut>(self, event: impl Into<String>, f: F) -> Self
    where
        F: Fn(Bot, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.with_handler(event, handler(f))
    }

    #[must_use]
    pub fn with_handler(mut self, event: impl Into<String>, handler: Handler) -> Self {
        self.entries.push((event.into(), handler));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

/// Creates a bot, subscribes `events` and, with `instant_login`, signs in.
///
/// Validation happens before anything is returned. The pending bot resolves
/// after sign-in completes, whether it succeeded or not; without
/// `instant_login` it resolves immediately.
///
/// An empty `Events` is accepted and registers nothing.
///
/// # Errors
/// Fails if the config has no name, `events` is `None`, the credentials are
/// incomplete, or any event name is not allowed.
pub fn init(
    config: &BotConfig,
    events: Option<Events>,
    client: Arc<dyn ChatClient>,
) -> Result<PendingBot> {
    let name = config.name().ok_or(Error::MissingName)?;
    let events = events.ok_or_else(|| Error::MissingEvents {
        name: name.to_string(),
    })?;

    let bot = Bot::new(config, client)?;
    for (event, handler) in events.entries {
        bot.set_event_handler(&event, handler)?;
    }

    if !config.instant_login {
        return Ok(Box::pin(future::ready(bot)));
    }

    let apply_name = config.set_name;
    Ok(Box::pin(async move {
        let outcome = bot.signin(apply_name).await;
        info!(bot = %bot.name(), signed_in = outcome.is_success(), "Initialization finished");
        bot
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{ChannelKind, ChatClient, EventKind};
    use crate::errors::ClientError;
    use crate::test_utils::{FAKE_USER_ID, FakeClient, channel, init_test_tracing, token_config};

    fn noop_events() -> Events {
        Events::new().on("ready", |_bot, _event| async {})
    }

    #[test]
    fn test_init_requires_name() {
        let config = BotConfig {
            token: Some("Some token".to_string()),
            ..BotConfig::default()
        };
        assert!(matches!(
            init(&config, Some(noop_events()), FakeClient::shared()),
            Err(Error::MissingName)
        ));
    }

    #[test]
    fn test_init_requires_events() {
        assert!(matches!(
            init(&token_config("Stan Marsh"), None, FakeClient::shared()),
            Err(Error::MissingEvents { .. })
        ));
    }

    #[tokio::test]
    async fn test_init_accepts_empty_events() {
        let client = FakeClient::shared();
        let bot = init(&token_config("Stan Marsh"), Some(Events::new()), client.clone())
            .unwrap()
            .await;
        assert_eq!(bot.name(), "Stan Marsh");
        assert_eq!(client.listener_count(EventKind::Ready), 0);
    }

    #[test]
    fn test_init_rejects_disallowed_event() {
        let events = noop_events().on("debug", |_bot, _event| async {});
        let client = FakeClient::shared();
        let result = init(&token_config("Stan Marsh"), Some(events), client.clone());
        assert!(matches!(result, Err(Error::EventNotAllowed { ref event, .. }) if event == "debug"));
        assert_eq!(client.listener_count(EventKind::Debug), 0);
    }

    #[tokio::test]
    async fn test_init_without_instant_login_does_not_sign_in() {
        let client = FakeClient::shared();
        let bot = init(&token_config("Stan Marsh"), Some(noop_events()), client.clone())
            .unwrap()
            .await;

        assert_eq!(bot.name(), "Stan Marsh");
        assert!(client.logins().is_empty());
        assert_eq!(client.listener_count(EventKind::Ready), 1);
    }

    #[tokio::test]
    async fn test_init_with_instant_login_signs_in_and_greets() {
        init_test_tracing();
        let client = FakeClient::shared();
        client.add_channel(channel("1", ChannelKind::Text, Some("g"), &[FAKE_USER_ID]));
        let config = BotConfig {
            instant_login: true,
            set_name: true,
            ..token_config("Stan Marsh")
        };
        let events = Events::new().on("ready", |bot, _event| async move {
            let report = bot.broadcast_message("I just logged in, 'sup lads!").await;
            assert!(report.is_success());
        });

        let bot = init(&config, Some(events), client.clone()).unwrap().await;
        assert_eq!(client.logins().len(), 1);
        assert_eq!(bot.user().unwrap().username, "Stan Marsh");

        let user = bot.user().unwrap();
        client.emit(Event::Ready { user }).await;
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_init_resolves_even_when_signin_fails() {
        let client = FakeClient::shared();
        client.fail_login(ClientError::Connection("no route".to_string()));
        let config = BotConfig {
            instant_login: true,
            ..token_config("Stan Marsh")
        };

        let bot = init(&config, Some(noop_events()), client.clone()).unwrap().await;
        assert!(bot.user().is_none());
    }

    #[test]
    fn test_events_debug_lists_names() {
        let events = noop_events().on("message", |_bot, _event| async {});
        assert_eq!(events.len(), 2);
        assert_eq!(format!("{events:?}"), r#"["ready", "message"]"#);
    }
}
