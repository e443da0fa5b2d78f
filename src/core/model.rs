//! Platform-agnostic view of the entities a chat client knows about.
//!
//! These types are what the bot reads from its [`ChatClient`](super::client::ChatClient):
//! users, channels, messages and presence. The client owns the real objects;
//! the bot only ever sees snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a platform-assigned id string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

platform_id!(
    /// Id of a channel (guild channel, DM or group DM).
    ChannelId
);
platform_id!(
    /// Id of a user account.
    UserId
);
platform_id!(
    /// Id of a single message.
    MessageId
);
platform_id!(
    /// Id of a guild (server).
    GuildId
);

/// Online status broadcast for the bot's account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Online,
    Idle,
    #[serde(rename = "dnd")]
    DoNotDisturb,
    Invisible,
    Offline,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::DoNotDisturb => "dnd",
            Self::Invisible => "invisible",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the bot is shown to be doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Playing,
    Streaming,
    Listening,
    Watching,
    Competing,
}

/// An activity descriptor, e.g. "playing Minecraft".
///
/// In configuration this may be written either as a bare string, which means
/// "playing <string>", or as a table with `name`, `kind` and an optional `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ActivitySpec")]
pub struct Activity {
    pub kind: ActivityKind,
    pub name: String,
    /// Stream URL, only meaningful for [`ActivityKind::Streaming`].
    pub url: Option<String>,
}

impl Activity {
    #[must_use]
    pub fn new(kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self::new(ActivityKind::Playing, name)
    }

    #[must_use]
    pub fn streaming(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: ActivityKind::Streaming,
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActivitySpec {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        kind: ActivityKind,
        #[serde(default)]
        url: Option<String>,
    },
}

impl From<ActivitySpec> for Activity {
    fn from(spec: ActivitySpec) -> Self {
        match spec {
            ActivitySpec::Name(name) => Self::playing(name),
            ActivitySpec::Full { name, kind, url } => Self { kind, name, url },
        }
    }
}

/// Status plus activity, as shown to other users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub status: Status,
    pub activity: Option<Activity>,
}

/// A user account known to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub bot: bool,
}

/// The account the client is signed in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub presence: Presence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Text,
    Voice,
    /// Group direct message.
    Group,
    /// One-to-one direct message.
    Direct,
    Category,
}

/// A channel snapshot together with the ids of the users who can see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: Option<String>,
    pub kind: ChannelKind,
    pub guild_id: Option<GuildId>,
    pub member_ids: Vec<UserId>,
}

impl Channel {
    #[must_use]
    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }
}

/// A message as delivered by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: User,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Where an outgoing message goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageTarget {
    Channel(ChannelId),
    User(UserId),
}

impl fmt::Display for MessageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) => write!(f, "channel {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}
