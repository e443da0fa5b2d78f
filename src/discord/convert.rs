//! Conversions between serenity models and Herald's snapshots.

use crate::core::{
    Activity, ActivityKind, Channel, ChannelId, ChannelKind, ChatMessage, CurrentUser, GuildId,
    MessageId, Presence, Status, User, UserId,
};
use crate::errors::ClientError;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

fn snowflake(id: &str) -> Result<u64, ClientError> {
    id.parse::<u64>()
        .ok()
        .filter(|n| *n != 0)
        .ok_or_else(|| ClientError::InvalidId(id.to_string()))
}

pub fn channel_id(id: &ChannelId) -> Result<serenity::ChannelId, ClientError> {
    Ok(serenity::ChannelId::new(snowflake(id.as_str())?))
}

pub fn user_id(id: &UserId) -> Result<serenity::UserId, ClientError> {
    Ok(serenity::UserId::new(snowflake(id.as_str())?))
}

pub fn user(user: &serenity::User) -> User {
    User {
        id: UserId::new(user.id.to_string()),
        username: user.name.clone(),
        bot: user.bot,
    }
}

pub fn current_user(me: &serenity::CurrentUser, presence: Presence) -> CurrentUser {
    CurrentUser {
        id: UserId::new(me.id.to_string()),
        username: me.name.clone(),
        presence,
    }
}

pub fn message(message: &serenity::Message) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(message.id.to_string()),
        channel_id: ChannelId::new(message.channel_id.to_string()),
        author: user(&message.author),
        content: message.content.clone(),
        sent_at: DateTime::<Utc>::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .unwrap_or_default(),
    }
}

fn channel_kind(kind: serenity::ChannelType) -> ChannelKind {
    match kind {
        serenity::ChannelType::Voice | serenity::ChannelType::Stage => ChannelKind::Voice,
        serenity::ChannelType::Private => ChannelKind::Direct,
        serenity::ChannelType::Category => ChannelKind::Category,
        // News, forums and threads all carry text.
        _ => ChannelKind::Text,
    }
}

pub fn guild_channel(channel: &serenity::GuildChannel, member_ids: Vec<UserId>) -> Channel {
    Channel {
        id: ChannelId::new(channel.id.to_string()),
        name: Some(channel.name.clone()),
        kind: channel_kind(channel.kind),
        guild_id: Some(GuildId::new(channel.guild_id.to_string())),
        member_ids,
    }
}

/// A DM channel as seen from an incoming message.
pub fn direct_channel(message: &serenity::Message, me: UserId) -> Channel {
    Channel {
        id: ChannelId::new(message.channel_id.to_string()),
        name: None,
        kind: ChannelKind::Direct,
        guild_id: None,
        member_ids: vec![UserId::new(message.author.id.to_string()), me],
    }
}

pub fn online_status(status: Status) -> serenity::OnlineStatus {
    match status {
        Status::Online => serenity::OnlineStatus::Online,
        Status::Idle => serenity::OnlineStatus::Idle,
        Status::DoNotDisturb => serenity::OnlineStatus::DoNotDisturb,
        Status::Invisible => serenity::OnlineStatus::Invisible,
        Status::Offline => serenity::OnlineStatus::Offline,
    }
}

fn status(status: serenity::OnlineStatus) -> Status {
    match status {
        serenity::OnlineStatus::Online => Status::Online,
        serenity::OnlineStatus::Idle => Status::Idle,
        serenity::OnlineStatus::DoNotDisturb => Status::DoNotDisturb,
        serenity::OnlineStatus::Invisible => Status::Invisible,
        _ => Status::Offline,
    }
}

pub fn activity_data(activity: &Activity) -> Result<serenity::ActivityData, ClientError> {
    let name = activity.name.as_str();
    Ok(match activity.kind {
        ActivityKind::Playing => serenity::ActivityData::playing(name),
        ActivityKind::Listening => serenity::ActivityData::listening(name),
        ActivityKind::Watching => serenity::ActivityData::watching(name),
        ActivityKind::Competing => serenity::ActivityData::competing(name),
        ActivityKind::Streaming => {
            let url = activity.url.as_deref().ok_or_else(|| {
                ClientError::Unsupported(format!("streaming activity `{name}` without a url"))
            })?;
            serenity::ActivityData::streaming(name, url)
                .map_err(|e| ClientError::Platform(e.to_string()))?
        }
    })
}

fn activity(activity: &serenity::Activity) -> Option<Activity> {
    let kind = match activity.kind {
        serenity::ActivityType::Playing => ActivityKind::Playing,
        serenity::ActivityType::Streaming => ActivityKind::Streaming,
        serenity::ActivityType::Listening => ActivityKind::Listening,
        serenity::ActivityType::Watching => ActivityKind::Watching,
        serenity::ActivityType::Competing => ActivityKind::Competing,
        _ => return None,
    };
    Some(Activity {
        kind,
        name: activity.name.clone(),
        url: activity.url.as_ref().map(ToString::to_string),
    })
}

pub fn presence(presence: &serenity::Presence) -> Presence {
    Presence {
        status: status(presence.status),
        activity: presence.activities.iter().find_map(activity),
    }
}
