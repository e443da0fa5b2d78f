//! Event catalog, allow-list and a small emitter.
//!
//! Every event a client can raise has an [`EventKind`]. Only the kinds in
//! [`ALLOWED_EVENTS`] may be subscribed to through a bot; the rest (debug
//! chatter, resumes) stay internal to the client.

use super::model::{
    Channel, ChannelId, ChatMessage, CurrentUser, GuildId, MessageId, Presence, User, UserId,
};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

/// Every event a chat client can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Message,
    MessageUpdate,
    MessageDelete,
    ChannelCreate,
    ChannelDelete,
    ChannelUpdate,
    GuildCreate,
    GuildDelete,
    GuildMemberAdd,
    GuildMemberRemove,
    PresenceUpdate,
    TypingStart,
    UserUpdate,
    Warn,
    Error,
    Disconnect,
    Reconnecting,
    Debug,
    Resume,
}

/// Events a bot is permitted to subscribe to.
pub const ALLOWED_EVENTS: &[EventKind] = &[
    EventKind::Ready,
    EventKind::Message,
    EventKind::MessageUpdate,
    EventKind::MessageDelete,
    EventKind::ChannelCreate,
    EventKind::ChannelDelete,
    EventKind::ChannelUpdate,
    EventKind::GuildCreate,
    EventKind::GuildDelete,
    EventKind::GuildMemberAdd,
    EventKind::GuildMemberRemove,
    EventKind::PresenceUpdate,
    EventKind::TypingStart,
    EventKind::UserUpdate,
    EventKind::Warn,
    EventKind::Error,
    EventKind::Disconnect,
    EventKind::Reconnecting,
];

impl EventKind {
    const ALL: [Self; 20] = [
        Self::Ready,
        Self::Message,
        Self::MessageUpdate,
        Self::MessageDelete,
        Self::ChannelCreate,
        Self::ChannelDelete,
        Self::ChannelUpdate,
        Self::GuildCreate,
        Self::GuildDelete,
        Self::GuildMemberAdd,
        Self::GuildMemberRemove,
        Self::PresenceUpdate,
        Self::TypingStart,
        Self::UserUpdate,
        Self::Warn,
        Self::Error,
        Self::Disconnect,
        Self::Reconnecting,
        Self::Debug,
        Self::Resume,
    ];

    /// The event's public name, as used in handler maps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Message => "message",
            Self::MessageUpdate => "messageUpdate",
            Self::MessageDelete => "messageDelete",
            Self::ChannelCreate => "channelCreate",
            Self::ChannelDelete => "channelDelete",
            Self::ChannelUpdate => "channelUpdate",
            Self::GuildCreate => "guildCreate",
            Self::GuildDelete => "guildDelete",
            Self::GuildMemberAdd => "guildMemberAdd",
            Self::GuildMemberRemove => "guildMemberRemove",
            Self::PresenceUpdate => "presenceUpdate",
            Self::TypingStart => "typingStart",
            Self::UserUpdate => "userUpdate",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Disconnect => "disconnect",
            Self::Reconnecting => "reconnecting",
            Self::Debug => "debug",
            Self::Resume => "resume",
        }
    }

    #[must_use]
    pub fn is_allowed(self) -> bool {
        ALLOWED_EVENTS.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown event `{s}`"))
    }
}

/// An event together with its payload, in the order the client reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Ready {
        user: CurrentUser,
    },
    Message(ChatMessage),
    MessageUpdate {
        old: Option<ChatMessage>,
        new: Option<ChatMessage>,
    },
    MessageDelete {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    ChannelCreate(Channel),
    ChannelDelete(Channel),
    ChannelUpdate {
        old: Option<Channel>,
        new: Channel,
    },
    GuildCreate {
        guild_id: GuildId,
        name: String,
    },
    GuildDelete {
        guild_id: GuildId,
    },
    GuildMemberAdd {
        guild_id: GuildId,
        user: User,
    },
    GuildMemberRemove {
        guild_id: GuildId,
        user: User,
    },
    PresenceUpdate {
        user_id: UserId,
        presence: Presence,
    },
    TypingStart {
        channel_id: ChannelId,
        user_id: UserId,
    },
    UserUpdate {
        old: Option<CurrentUser>,
        new: CurrentUser,
    },
    Warn(String),
    Error(String),
    Disconnect,
    Reconnecting,
    Debug(String),
    Resume,
}

impl Event {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Ready { .. } => EventKind::Ready,
            Self::Message(_) => EventKind::Message,
            Self::MessageUpdate { .. } => EventKind::MessageUpdate,
            Self::MessageDelete { .. } => EventKind::MessageDelete,
            Self::ChannelCreate(_) => EventKind::ChannelCreate,
            Self::ChannelDelete(_) => EventKind::ChannelDelete,
            Self::ChannelUpdate { .. } => EventKind::ChannelUpdate,
            Self::GuildCreate { .. } => EventKind::GuildCreate,
            Self::GuildDelete { .. } => EventKind::GuildDelete,
            Self::GuildMemberAdd { .. } => EventKind::GuildMemberAdd,
            Self::GuildMemberRemove { .. } => EventKind::GuildMemberRemove,
            Self::PresenceUpdate { .. } => EventKind::PresenceUpdate,
            Self::TypingStart { .. } => EventKind::TypingStart,
            Self::UserUpdate { .. } => EventKind::UserUpdate,
            Self::Warn(_) => EventKind::Warn,
            Self::Error(_) => EventKind::Error,
            Self::Disconnect => EventKind::Disconnect,
            Self::Reconnecting => EventKind::Reconnecting,
            Self::Debug(_) => EventKind::Debug,
            Self::Resume => EventKind::Resume,
        }
    }
}

/// A subscription registered on a client.
pub type Listener = Arc<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;

/// Listener registry keyed by event kind.
///
/// Listeners run sequentially in registration order. Registering the same
/// listener twice means it runs twice.
#[derive(Default)]
pub struct EventEmitter {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl EventEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, kind: EventKind, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(listener);
    }

    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Runs every listener for the event's kind and returns how many ran.
    pub async fn emit(&self, event: Event) -> usize {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.kind())
            .cloned()
            .unwrap_or_default();

        for listener in &listeners {
            listener(event.clone()).await;
        }
        listeners.len()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(kind, listeners)| (*kind, listeners.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}
