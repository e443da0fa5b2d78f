//! Discord backend - a [`ChatClient`] driven by serenity through poise
//!
//! The serenity client runs on a background task once [`login`](ChatClient::login)
//! is called. Gateway events are forwarded through poise's event hook, and the
//! serenity cache backs the channel and user collections.

mod convert;
mod handler;

use crate::config::DiscordOptions;
use crate::core::{
    Channel, ChannelId, ChatClient, ChatMessage, Credentials, CurrentUser, Event, EventEmitter,
    EventKind, Listener, MessageTarget, Presence, User, UserId,
};
use crate::errors::{ClientError, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::oneshot;
use tracing::{error, info, instrument};

/// How many DM channels are remembered before the oldest are forgotten.
const DIRECT_CHANNEL_LIMIT: usize = 1_000;

/// Intents used when the configuration does not name any.
#[must_use]
pub fn default_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_PRESENCES
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

#[must_use]
pub fn gateway_intents(options: &DiscordOptions) -> serenity::GatewayIntents {
    options
        .intents
        .map_or_else(default_intents, serenity::GatewayIntents::from_bits_truncate)
}

#[derive(Default)]
struct Session {
    ctx: Option<serenity::Context>,
    /// Fired once the cache holds every guild from the initial handshake.
    ready_tx: Option<oneshot::Sender<()>>,
    presence: Presence,
    /// Name set through the API that the cache has not seen yet.
    username: Option<String>,
    /// DM channels seen so far with their recipient, oldest first in `direct_order`.
    direct: HashMap<ChannelId, (Channel, User)>,
    direct_order: VecDeque<ChannelId>,
}

/// State shared between the client handle and the event hook.
pub(crate) struct Shared {
    emitter: EventEmitter,
    session: RwLock<Session>,
}

impl Shared {
    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.session.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        f(&mut self.session.write().unwrap_or_else(PoisonError::into_inner))
    }

    fn context(&self) -> Option<serenity::Context> {
        self.read(|session| session.ctx.clone())
    }

    fn presence(&self) -> Presence {
        self.read(|session| session.presence.clone())
    }

    fn mark_ready(&self) {
        if let Some(ready_tx) = self.write(|session| session.ready_tx.take()) {
            let _ = ready_tx.send(());
        }
    }

    fn own_user(&self, me: &serenity::CurrentUser) -> CurrentUser {
        self.with_pending_name(convert::current_user(me, self.presence()))
    }

    fn with_pending_name(&self, mut user: CurrentUser) -> CurrentUser {
        if let Some(username) = self.read(|session| session.username.clone()) {
            user.username = username;
        }
        user
    }

    fn forget_username(&self) {
        self.write(|session| session.username = None);
    }

    fn remember_direct(&self, channel: Channel, user: User) {
        self.write(|session| {
            let id = channel.id.clone();
            if session.direct.insert(id.clone(), (channel, user)).is_none() {
                session.direct_order.push_back(id);
            }
            while session.direct_order.len() > DIRECT_CHANNEL_LIMIT {
                if let Some(oldest) = session.direct_order.pop_front() {
                    session.direct.remove(&oldest);
                }
            }
        });
    }

    fn guild_channel(&self, ctx: &serenity::Context, channel: &serenity::GuildChannel) -> Channel {
        // Member lists need the guild in cache; an empty list is the best we can say otherwise.
        let member_ids = channel
            .members(&ctx.cache)
            .map(|members| {
                members
                    .into_iter()
                    .map(|member| UserId::new(member.user.id.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        convert::guild_channel(channel, member_ids)
    }
}

/// A Discord bot account connection.
pub struct DiscordClient {
    options: DiscordOptions,
    shared: Arc<Shared>,
}

impl DiscordClient {
    #[must_use]
    pub fn new(options: DiscordOptions) -> Self {
        Self {
            options,
            shared: Arc::new(Shared {
                emitter: EventEmitter::new(),
                session: RwLock::new(Session::default()),
            }),
        }
    }

    fn context(&self) -> Result<serenity::Context, ClientError> {
        self.shared.context().ok_or(ClientError::NotConnected)
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    #[instrument(skip_all)]
    async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let Credentials::Token(token) = credentials else {
            return Err(ClientError::Unsupported(
                "Discord bots sign in with a token".to_string(),
            ));
        };

        let (ready_tx, ready_rx) = oneshot::channel();
        self.shared
            .write(|session| session.ready_tx = Some(ready_tx));
        let shared = Arc::clone(&self.shared);
        let framework = poise::Framework::<Arc<Shared>, Error>::builder()
            .options(poise::FrameworkOptions {
                event_handler: |ctx, event, _framework, shared| {
                    Box::pin(handler::forward(ctx, event, shared))
                },
                on_error: |error| Box::pin(handler::on_error(error)),
                ..Default::default()
            })
            .setup(move |ctx, ready, _framework| {
                Box::pin(async move {
                    info!("Logged in as {}", ready.user.name);
                    shared.write(|session| session.ctx = Some(ctx.clone()));
                    Ok(shared)
                })
            })
            .build();

        info!("Setting up Serenity client for Poise framework...");
        let mut client = serenity::Client::builder(token, gateway_intents(&self.options))
            .framework(framework)
            .await
            .inspect_err(|e| error!("Error creating client: {:?}", e))?;

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            info!("Starting bot client...");
            let result = client.start().await;
            // A login still waiting for ready fails instead of hanging.
            shared.write(|session| session.ready_tx = None);
            if let Err(why) = result {
                error!("Client error: {:?}", why);
                shared.emitter.emit(Event::Error(why.to_string())).await;
            }
        });

        ready_rx
            .await
            .map_err(|_| ClientError::Connection("gateway closed before becoming ready".to_string()))
    }

    fn on(&self, kind: EventKind, listener: Listener) {
        self.shared.emitter.on(kind, listener);
    }

    fn listener_count(&self, kind: EventKind) -> usize {
        self.shared.emitter.listener_count(kind)
    }

    fn user(&self) -> Option<CurrentUser> {
        let ctx = self.shared.context()?;
        let me = (*ctx.cache.current_user()).clone();
        Some(self.shared.own_user(&me))
    }

    fn channels(&self) -> Vec<Channel> {
        let Some(ctx) = self.shared.context() else {
            return Vec::new();
        };

        let mut channels = Vec::new();
        for guild_id in ctx.cache.guilds() {
            // Copy out so the cache guard is released before member lookups.
            let guild_channels: Vec<serenity::GuildChannel> = match ctx.cache.guild(guild_id) {
                Some(guild) => guild.channels.values().cloned().collect(),
                None => continue,
            };
            channels.extend(
                guild_channels
                    .iter()
                    .map(|channel| self.shared.guild_channel(&ctx, channel)),
            );
        }
        channels.extend(self.shared.read(|session| {
            session
                .direct
                .values()
                .map(|(channel, _)| channel.clone())
                .collect::<Vec<_>>()
        }));
        channels
    }

    fn users(&self) -> Vec<User> {
        let Some(ctx) = self.shared.context() else {
            return Vec::new();
        };

        let mut users: BTreeMap<UserId, User> = self.shared.read(|session| {
            session
                .direct
                .values()
                .map(|(_, user)| (user.id.clone(), user.clone()))
                .collect()
        });
        for guild_id in ctx.cache.guilds() {
            if let Some(guild) = ctx.cache.guild(guild_id) {
                for member in guild.members.values() {
                    let user = convert::user(&member.user);
                    users.insert(user.id.clone(), user);
                }
            }
        }
        users.into_values().collect()
    }

    async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
    ) -> Result<ChatMessage, ClientError> {
        let ctx = self.context()?;
        let message = match target {
            MessageTarget::Channel(id) => {
                convert::channel_id(id)?.say(&ctx.http, content).await?
            }
            MessageTarget::User(id) => {
                convert::user_id(id)?
                    .direct_message(&ctx, serenity::CreateMessage::new().content(content))
                    .await?
            }
        };
        Ok(convert::message(&message))
    }

    async fn set_username(&self, name: &str) -> Result<CurrentUser, ClientError> {
        let ctx = self.context()?;
        let mut me = (*ctx.cache.current_user()).clone();
        me.edit(&ctx, serenity::EditProfile::new().username(name))
            .await?;

        // The cache keeps the old name until the gateway sends a user update.
        self.shared
            .write(|session| session.username = Some(me.name.clone()));
        Ok(self.shared.own_user(&me))
    }

    async fn set_presence(&self, presence: &Presence) -> Result<Presence, ClientError> {
        let ctx = self.context()?;
        let activity = presence
            .activity
            .as_ref()
            .map(convert::activity_data)
            .transpose()?;
        ctx.set_presence(activity, convert::online_status(presence.status));

        // The gateway does not echo our own presence back; what was sent is what is shown.
        self.shared
            .write(|session| session.presence = presence.clone());
        Ok(self.shared.presence())
    }
}
