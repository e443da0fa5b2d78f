//! Sending messages to channels and users.

use super::Bot;
use crate::core::{BroadcastReport, ChannelId, Failure, MessageTarget, Outcome, UserId};
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

impl Bot {
    /// Sends `content` to a channel the client knows about.
    ///
    /// An unknown id fails with [`Failure::NotFound`] and nothing is sent.
    pub async fn send_message_to_channel(&self, channel_id: &ChannelId, content: &str) -> Outcome {
        let target = MessageTarget::Channel(channel_id.clone());
        if !self.channels().iter().any(|channel| &channel.id == channel_id) {
            warn!(bot = %self.name(), channel_id = %channel_id, "Channel not found, message not sent");
            return Outcome::Failure(Failure::NotFound(target));
        }
        self.deliver(target, content).await
    }

    /// Sends `content` to a user the client knows about.
    ///
    /// An unknown id fails with [`Failure::NotFound`] and nothing is sent.
    pub async fn send_message_to_user(&self, user_id: &UserId, content: &str) -> Outcome {
        let target = MessageTarget::User(user_id.clone());
        if !self.users().iter().any(|user| &user.id == user_id) {
            warn!(bot = %self.name(), user_id = %user_id, "User not found, message not sent");
            return Outcome::Failure(Failure::NotFound(target));
        }
        self.deliver(target, content).await
    }

    /// Sends `content` to every own channel concurrently.
    ///
    /// The report counts a send as completed even when it failed; see
    /// [`BroadcastReport::is_success`].
    #[instrument(skip(self, content), fields(bot = %self.name()))]
    pub async fn broadcast_message(&self, content: &str) -> BroadcastReport {
        let targets = self.own_channels();
        let sends = targets.iter().map(|channel| async move {
            let outcome = self
                .deliver(MessageTarget::Channel(channel.id.clone()), content)
                .await;
            (channel.id.clone(), outcome)
        });
        let results = join_all(sends).await;

        let report = BroadcastReport {
            targeted: targets.len(),
            completed: results.len(),
            failures: results
                .into_iter()
                .filter_map(|(id, outcome)| match outcome {
                    Outcome::Success => None,
                    Outcome::Failure(failure) => Some((id, failure)),
                })
                .collect(),
        };
        info!(
            targeted = report.targeted,
            completed = report.completed,
            failed = report.failures.len(),
            "Broadcast finished"
        );
        report
    }

    async fn deliver(&self, target: MessageTarget, content: &str) -> Outcome {
        match self.inner.client.send_message(&target, content).await {
            Ok(message) => {
                debug!(to = %target, message_id = %message.id, "Message sent");
                Outcome::Success
            }
            Err(e) => {
                error!(bot = %self.name(), to = %target, error = %e, "Failed to send message");
                Outcome::Failure(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ChannelKind;
    use crate::errors::ClientError;
    use crate::test_utils::{FAKE_USER_ID, FakeClient, channel, init_test_tracing, token_config, user};
    use std::sync::Arc;

    async fn signed_in(client: &Arc<FakeClient>) -> Bot {
        let bot = Bot::new(&token_config("Stan Marsh"), client.clone()).unwrap();
        assert!(bot.signin(false).await.is_success());
        bot
    }

    #[tokio::test]
    async fn test_send_to_unknown_channel_is_not_found() {
        let client = FakeClient::shared();
        let bot = signed_in(&client).await;

        let outcome = bot
            .send_message_to_channel(&ChannelId::from("404"), "hello?")
            .await;
        assert_eq!(
            outcome.failure(),
            Some(&Failure::NotFound(MessageTarget::Channel(ChannelId::from("404"))))
        );
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_unknown_user_is_not_found() {
        let client = FakeClient::shared();
        let bot = signed_in(&client).await;

        assert!(!bool::from(
            bot.send_message_to_user(&UserId::from("404"), "hello?").await
        ));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_known_channel_and_user() {
        let client = FakeClient::shared();
        client.add_channel(channel("10", ChannelKind::Text, Some("g"), &[]));
        client.add_user(user("kyle"));
        let bot = signed_in(&client).await;

        assert!(bot.send_message_to_channel(&ChannelId::from("10"), "hi all").await.is_success());
        assert!(bot.send_message_to_user(&UserId::from("kyle"), "hi kyle").await.is_success());
        assert_eq!(
            client.sent(),
            vec![
                (MessageTarget::Channel(ChannelId::from("10")), "hi all".to_string()),
                (MessageTarget::User(UserId::from("kyle")), "hi kyle".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_platform_rejection_is_failure() {
        let client = FakeClient::shared();
        client.add_channel(channel("10", ChannelKind::Text, Some("g"), &[]));
        client.fail_sends_to(ChannelId::from("10"));
        let bot = signed_in(&client).await;

        assert!(matches!(
            bot.send_message_to_channel(&ChannelId::from("10"), "hi").await,
            Outcome::Failure(Failure::Client(ClientError::Platform(_)))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_targets_only_own_channels() {
        init_test_tracing();
        let client = FakeClient::shared();
        for id in ["1", "2", "3"] {
            client.add_channel(channel(id, ChannelKind::Text, Some("g"), &[FAKE_USER_ID, "kyle"]));
        }
        for id in ["4", "5"] {
            client.add_channel(channel(id, ChannelKind::Text, Some("g"), &["kyle"]));
        }
        let bot = signed_in(&client).await;

        let report = bot.broadcast_message("Ready to rock with Kyle!").await;
        assert!(report.is_success());
        assert!(report.all_delivered());
        assert_eq!(report.targeted, 3);

        let mut targeted: Vec<_> = client
            .sent()
            .into_iter()
            .map(|(target, _)| target.to_string())
            .collect();
        targeted.sort();
        assert_eq!(targeted, vec!["channel 1", "channel 2", "channel 3"]);
    }

    #[tokio::test]
    async fn test_broadcast_counts_failed_sends_as_completed() {
        let client = FakeClient::shared();
        for id in ["1", "2"] {
            client.add_channel(channel(id, ChannelKind::Text, Some("g"), &[FAKE_USER_ID]));
        }
        client.fail_sends_to(ChannelId::from("2"));
        let bot = signed_in(&client).await;

        let report = bot.broadcast_message("hi").await;
        assert!(bool::from(report.clone()));
        assert!(!report.all_delivered());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, ChannelId::from("2"));
    }

    #[tokio::test]
    async fn test_broadcast_before_signin_targets_nothing() {
        let client = FakeClient::shared();
        client.add_channel(channel("1", ChannelKind::Text, Some("g"), &[FAKE_USER_ID]));
        let bot = Bot::new(&token_config("Stan Marsh"), client.clone()).unwrap();

        let report = bot.broadcast_message("anyone?").await;
        assert_eq!(report.targeted, 0);
        assert!(report.is_success());
        assert!(client.sent().is_empty());
    }
}
