/// Bot identity, credentials and presence settings
pub mod bot;

/// Pass-through options for the Discord client
pub mod discord;

pub use bot::{BotConfig, load_config, load_default_config};
pub use discord::DiscordOptions;
