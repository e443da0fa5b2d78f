//! Read-only views over the client's channel collection.

use super::Bot;
use crate::core::{Channel, ChannelKind, CurrentUser, User};

impl Bot {
    /// The user the client is signed in as, as the platform reports it.
    #[must_use]
    pub fn user(&self) -> Option<CurrentUser> {
        self.inner.client.user()
    }

    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.inner.client.users()
    }

    #[must_use]
    pub fn channels(&self) -> Vec<Channel> {
        self.inner.client.channels()
    }

    #[must_use]
    pub fn text_channels(&self) -> Vec<Channel> {
        self.channels_where(|channel| channel.kind == ChannelKind::Text)
    }

    #[must_use]
    pub fn voice_channels(&self) -> Vec<Channel> {
        self.channels_where(|channel| channel.kind == ChannelKind::Voice)
    }

    /// Group direct messages.
    #[must_use]
    pub fn group_channels(&self) -> Vec<Channel> {
        self.channels_where(|channel| channel.kind == ChannelKind::Group)
    }

    /// Channels that belong to a guild, whatever their kind.
    #[must_use]
    pub fn guild_channels(&self) -> Vec<Channel> {
        self.channels_where(|channel| channel.guild_id.is_some())
    }

    /// One-to-one direct messages.
    #[must_use]
    pub fn direct_channels(&self) -> Vec<Channel> {
        self.channels_where(|channel| channel.kind == ChannelKind::Direct)
    }

    /// Channels whose member list contains the signed-in user. Empty before sign-in.
    #[must_use]
    pub fn own_channels(&self) -> Vec<Channel> {
        let Some(me) = self.user() else {
            return Vec::new();
        };
        self.channels_where(|channel| channel.has_member(&me.id))
    }

    fn channels_where(&self, keep: impl Fn(&Channel) -> bool) -> Vec<Channel> {
        self.channels().into_iter().filter(|c| keep(c)).collect()
    }
}
