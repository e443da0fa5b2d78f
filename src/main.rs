use dotenvy::dotenv;
use herald::config;
use herald::core::Event;
use herald::discord::DiscordClient;
use herald::errors::Result;
use herald::init::{Events, init};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the bot configuration (token may come from DISCORD_BOT_TOKEN)
    let bot_config = config::load_default_config()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;
    info!(bot = ?bot_config.name(), "Successfully processed configuration.");

    // 4. Wire handlers
    let events = Events::new()
        .on("ready", |bot, _event| async move {
            let report = bot
                .broadcast_message(&format!("{} is here.", bot.name()))
                .await;
            info!(
                channels = report.targeted,
                failed = report.failures.len(),
                "Greeted own channels"
            );
        })
        .on("message", |bot, event| async move {
            let Event::Message(message) = event else {
                return;
            };
            let is_self = bot.user().is_some_and(|me| me.id == message.author.id);
            if !is_self && message.content.trim() == "!ping" {
                let _ = bot
                    .send_message_to_channel(&message.channel_id, "Pong!")
                    .await;
            }
        })
        .on("warn", |_bot, event| async move {
            warn!(?event, "Client warning");
        })
        .on("error", |_bot, event| async move {
            error!(?event, "Client error");
        });

    // 5. Build the bot; signs in now if `instant_login` is set
    let client = Arc::new(DiscordClient::new(bot_config.discord.clone()));
    let bot = init(&bot_config, Some(events), client)?.await;
    if !bot_config.instant_login && bot.signin(bot_config.set_name).await.is_failure() {
        error!("Sign-in failed, shutting down.");
        return Ok(());
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");
    Ok(())
}
