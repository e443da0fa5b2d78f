//! Connection options handed through to the Discord client.

use serde::Deserialize;

/// Options for [`DiscordClient`](crate::discord::DiscordClient).
///
/// Read from the `[discord]` table of the bot configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscordOptions {
    /// Raw gateway intent bits. Falls back to the client's default set when absent.
    pub intents: Option<u64>,
}
