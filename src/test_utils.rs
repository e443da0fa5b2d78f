//! Shared test utilities for Herald.
//!
//! [`FakeClient`] is an in-memory [`ChatClient`] whose collections, failures
//! and recorded calls are set up directly by tests.

use crate::config::BotConfig;
use crate::core::{
    Channel, ChannelId, ChannelKind, ChatClient, ChatMessage, Credentials, CurrentUser, Event,
    EventEmitter, EventKind, GuildId, Listener, MessageId, MessageTarget, Presence, Status, User,
    UserId,
};
use crate::errors::ClientError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

/// Id the fake client signs in as.
pub const FAKE_USER_ID: &str = "100";
/// Name the platform reports before any rename.
pub const FAKE_USERNAME: &str = "herald-test";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// A named bot config authenticating with a dummy token.
pub fn token_config(name: &str) -> BotConfig {
    BotConfig::with_token(name, "Some token")
}

pub fn channel(id: &str, kind: ChannelKind, guild: Option<&str>, members: &[&str]) -> Channel {
    Channel {
        id: ChannelId::from(id),
        name: Some(format!("channel-{id}")),
        kind,
        guild_id: guild.map(GuildId::from),
        member_ids: members.iter().map(|m| UserId::from(*m)).collect(),
    }
}

pub fn user(id: &str) -> User {
    User {
        id: UserId::from(id),
        username: id.to_string(),
        bot: false,
    }
}

#[derive(Default)]
struct FakeState {
    user: Option<CurrentUser>,
    channels: Vec<Channel>,
    users: Vec<User>,
    logins: Vec<Credentials>,
    sent: Vec<(MessageTarget, String)>,
    login_error: Option<ClientError>,
    reject_usernames: bool,
    pinned_status: Option<Status>,
    failing_channels: HashSet<ChannelId>,
}

#[derive(Default)]
pub struct FakeClient {
    emitter: EventEmitter,
    state: Mutex<FakeState>,
}

impl FakeClient {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub async fn emit(&self, event: Event) -> usize {
        self.emitter.emit(event).await
    }

    pub fn add_channel(&self, channel: Channel) {
        self.state().channels.push(channel);
    }

    pub fn add_user(&self, user: User) {
        self.state().users.push(user);
    }

    pub fn fail_login(&self, error: ClientError) {
        self.state().login_error = Some(error);
    }

    pub fn reject_usernames(&self) {
        self.state().reject_usernames = true;
    }

    /// Makes the platform ignore status changes and keep reporting `status`.
    pub fn pin_status(&self, status: Status) {
        self.state().pinned_status = Some(status);
    }

    pub fn fail_sends_to(&self, channel_id: ChannelId) {
        self.state().failing_channels.insert(channel_id);
    }

    pub fn logins(&self) -> Vec<Credentials> {
        self.state().logins.clone()
    }

    pub fn sent(&self) -> Vec<(MessageTarget, String)> {
        self.state().sent.clone()
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let mut state = self.state();
        if let Some(error) = state.login_error.clone() {
            return Err(error);
        }
        state.logins.push(credentials.clone());
        state.user = Some(CurrentUser {
            id: UserId::from(FAKE_USER_ID),
            username: FAKE_USERNAME.to_string(),
            presence: Presence::default(),
        });
        Ok(())
    }

    fn on(&self, kind: EventKind, listener: Listener) {
        self.emitter.on(kind, listener);
    }

    fn listener_count(&self, kind: EventKind) -> usize {
        self.emitter.listener_count(kind)
    }

    fn user(&self) -> Option<CurrentUser> {
        self.state().user.clone()
    }

    fn channels(&self) -> Vec<Channel> {
        self.state().channels.clone()
    }

    fn users(&self) -> Vec<User> {
        self.state().users.clone()
    }

    async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
    ) -> Result<ChatMessage, ClientError> {
        let mut state = self.state();
        let Some(me) = state.user.clone() else {
            return Err(ClientError::NotConnected);
        };
        let channel_id = match target {
            MessageTarget::Channel(id) if state.failing_channels.contains(id) => {
                return Err(ClientError::Platform(format!("Missing Access to {id}")));
            }
            MessageTarget::Channel(id) => id.clone(),
            MessageTarget::User(id) => ChannelId::new(format!("dm-{id}")),
        };
        state.sent.push((target.clone(), content.to_string()));
        Ok(ChatMessage {
            id: MessageId::new(state.sent.len().to_string()),
            channel_id,
            author: User {
                id: me.id,
                username: me.username,
                bot: true,
            },
            content: content.to_string(),
            sent_at: chrono::Utc::now(),
        })
    }

    async fn set_username(&self, name: &str) -> Result<CurrentUser, ClientError> {
        let mut state = self.state();
        let reject = state.reject_usernames;
        let user = state.user.as_mut().ok_or(ClientError::NotConnected)?;
        if reject {
            return Err(ClientError::Platform(
                "You are changing your username too fast".to_string(),
            ));
        }
        user.username = name.to_string();
        Ok(user.clone())
    }

    async fn set_presence(&self, presence: &Presence) -> Result<Presence, ClientError> {
        let mut state = self.state();
        let pinned = state.pinned_status;
        let user = state.user.as_mut().ok_or(ClientError::NotConnected)?;
        user.presence = Presence {
            status: pinned.unwrap_or(presence.status),
            activity: presence.activity.clone(),
        };
        Ok(user.presence.clone())
    }
}
