//! Bot configuration loading from config.toml
//!
//! A bot is described by its name, one form of credentials and the presence
//! it should show once signed in. Everything else is optional.

use super::discord::DiscordOptions;
use crate::core::{Activity, Credentials, Presence, Status};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::env::VarError;
use std::fmt;
use std::path::Path;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_VAR: &str = "HERALD_CONFIG";
/// Environment variable supplying the token when the file has none.
pub const TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";

/// Construction-time configuration for a [`Bot`](crate::bot::Bot).
///
/// Nothing is validated here; [`Bot::new`](crate::bot::Bot::new) rejects a
/// config without a name or without a complete credential form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub name: Option<String>,
    pub token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Initial status, `online` unless configured
    pub status: Status,
    pub activity: Option<Activity>,
    /// Sign in as part of [`init`](crate::init::init)
    pub instant_login: bool,
    /// Push the configured name to the platform after signing in
    pub set_name: bool,
    pub discord: DiscordOptions,
}

impl BotConfig {
    /// Shorthand for a named bot authenticating with a token.
    #[must_use]
    pub fn with_token(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Shorthand for a named bot authenticating with an account.
    #[must_use]
    pub fn with_account(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// The configured name, if present and not blank.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_ref())
    }

    /// Resolves the credential form to use.
    ///
    /// A token wins over an email/password pair. An account needs both halves.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(token) = non_blank(self.token.as_ref()) {
            return Some(Credentials::Token(token.to_string()));
        }
        match (
            non_blank(self.email.as_ref()),
            non_blank(self.password.as_ref()),
        ) {
            (Some(email), Some(password)) => Some(Credentials::Account {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn presence(&self) -> Presence {
        Presence {
            status: self.status,
            activity: self.activity.clone(),
        }
    }

    /// Fills in the token from outside the file when the file has no
    /// credentials of its own.
    ///
    /// # Errors
    /// Returns [`Error::EnvVar`] when the file has no credentials and the
    /// fallback could not be read.
    pub fn with_fallback_token(
        mut self,
        token: std::result::Result<String, VarError>,
    ) -> Result<Self> {
        if self.credentials().is_none() {
            self.token = Some(token?).filter(|t| !t.trim().is_empty());
        }
        Ok(self)
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("name", &self.name)
            .field("token", &self.token.as_ref().map(|_| ".."))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| ".."))
            .field("status", &self.status)
            .field("activity", &self.activity)
            .field("instant_login", &self.instant_login)
            .field("set_name", &self.set_name)
            .field("discord", &self.discord)
            .finish()
    }
}

/// Loads bot configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type (e.g. an unknown status)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `$HERALD_CONFIG` or `./config.toml`, taking the
/// token from `$DISCORD_BOT_TOKEN` when the file does not carry credentials.
///
/// # Errors
/// Fails like [`load_config`], or with [`Error::EnvVar`] when neither the
/// file nor the environment provides credentials.
pub fn load_default_config() -> Result<BotConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_config(&path)?.with_fallback_token(std::env::var(TOKEN_VAR))
}
