//! Gateway event forwarding through poise's event hook.
//!
//! Serenity events are translated into Herald [`Event`]s and handed to the
//! client's emitter. Events without a Herald counterpart are dropped.

use super::{Shared, convert};
use crate::core::{Event, EventKind, GuildId, UserId};
use crate::errors::Error;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, trace};

pub(super) async fn forward(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    shared: &Arc<Shared>,
) -> Result<(), Error> {
    if let Some(event) = translate(ctx, event, shared) {
        let kind = event.kind();
        if kind == EventKind::Ready {
            shared.mark_ready();
        }
        let listeners = shared.emitter.emit(event).await;
        trace!(event = %kind, listeners, "Forwarded gateway event");
    }
    Ok(())
}

pub(super) async fn on_error(error: poise::FrameworkError<'_, Arc<Shared>, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            error!("Error while forwarding event: {:?}", error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Whether `event` means the cache holds every guild from the handshake.
///
/// Guilds arrive after the gateway's ready message, so with any guilds to
/// load the handshake only completes at `CacheReady`.
fn completes_startup(event: &serenity::FullEvent) -> bool {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => data_about_bot.guilds.is_empty(),
        serenity::FullEvent::CacheReady { .. } => true,
        _ => false,
    }
}

fn translate(ctx: &serenity::Context, event: &serenity::FullEvent, shared: &Shared) -> Option<Event> {
    use serenity::FullEvent as E;

    Some(match event {
        E::Ready { .. } | E::CacheReady { .. } => {
            if !completes_startup(event) {
                return None;
            }
            let me = (*ctx.cache.current_user()).clone();
            Event::Ready {
                user: shared.own_user(&me),
            }
        }
        E::Message { new_message } => {
            if new_message.guild_id.is_none() {
                let me = UserId::new(ctx.cache.current_user().id.to_string());
                shared.remember_direct(
                    convert::direct_channel(new_message, me),
                    convert::user(&new_message.author),
                );
            }
            Event::Message(convert::message(new_message))
        }
        E::MessageUpdate {
            old_if_available,
            new,
            ..
        } => Event::MessageUpdate {
            old: old_if_available.as_ref().map(convert::message),
            new: new.as_ref().map(convert::message),
        },
        E::MessageDelete {
            channel_id,
            deleted_message_id,
            ..
        } => Event::MessageDelete {
            channel_id: channel_id.to_string().into(),
            message_id: deleted_message_id.to_string().into(),
        },
        E::ChannelCreate { channel } => Event::ChannelCreate(shared.guild_channel(ctx, channel)),
        E::ChannelDelete { channel, .. } => {
            Event::ChannelDelete(convert::guild_channel(channel, Vec::new()))
        }
        E::ChannelUpdate { old, new } => Event::ChannelUpdate {
            old: old
                .as_ref()
                .map(|channel| convert::guild_channel(channel, Vec::new())),
            new: shared.guild_channel(ctx, new),
        },
        E::GuildCreate { guild, .. } => Event::GuildCreate {
            guild_id: GuildId::new(guild.id.to_string()),
            name: guild.name.clone(),
        },
        E::GuildDelete { incomplete, .. } => Event::GuildDelete {
            guild_id: GuildId::new(incomplete.id.to_string()),
        },
        E::GuildMemberAddition { new_member } => Event::GuildMemberAdd {
            guild_id: GuildId::new(new_member.guild_id.to_string()),
            user: convert::user(&new_member.user),
        },
        E::GuildMemberRemoval { guild_id, user, .. } => Event::GuildMemberRemove {
            guild_id: GuildId::new(guild_id.to_string()),
            user: convert::user(user),
        },
        E::PresenceUpdate { new_data } => Event::PresenceUpdate {
            user_id: UserId::new(new_data.user.id.to_string()),
            presence: convert::presence(new_data),
        },
        E::TypingStart { event } => Event::TypingStart {
            channel_id: event.channel_id.to_string().into(),
            user_id: UserId::new(event.user_id.to_string()),
        },
        E::UserUpdate { old_data, new } => {
            shared.forget_username();
            Event::UserUpdate {
                old: old_data
                    .as_ref()
                    .map(|old| convert::current_user(old, shared.presence())),
                new: convert::current_user(new, shared.presence()),
            }
        }
        E::ShardStageUpdate { event } => match event.new {
            serenity::ConnectionStage::Disconnected => Event::Disconnect,
            serenity::ConnectionStage::Resuming | serenity::ConnectionStage::Connecting
                if matches!(event.old, serenity::ConnectionStage::Connected) =>
            {
                Event::Reconnecting
            }
            stage => Event::Debug(format!("shard {:?} is {stage:?}", event.shard_id)),
        },
        E::Resume { .. } => Event::Resume,
        _ => return None,
    })
}
