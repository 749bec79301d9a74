//! Environment configuration for the bundled bot
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.6.0
//!
//! ## Changelog
//! - 1.0.0: Token, development guild, shutdown cleanup and log level

use anyhow::{anyhow, Result};
use serenity::model::id::GuildId;

/// Bot configuration read from environment variables
///
/// | Variable           | Required | Default |
/// |--------------------|----------|---------|
/// | `DISCORD_TOKEN`    | yes      |         |
/// | `DISCORD_GUILD_ID` | no       | global  |
/// | `REMOVE_COMMANDS`  | no       | `true`  |
/// | `LOG_LEVEL`        | no       | `info`  |
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Register commands for this guild only (instant updates while developing)
    pub discord_guild_id: Option<GuildId>,
    /// Delete every registered command on shutdown
    pub remove_commands: bool,
    pub log_level: String,
}

impl Config {
    /// Load from the process environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let discord_guild_id = match lookup("DISCORD_GUILD_ID").filter(|g| !g.trim().is_empty()) {
            Some(raw) => Some(GuildId(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow!("DISCORD_GUILD_ID '{raw}' is not a snowflake: {e}"))?,
            )),
            None => None,
        };

        let remove_commands = match lookup("REMOVE_COMMANDS") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("REMOVE_COMMANDS '{raw}' is not a boolean"))?,
            None => true,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            discord_token,
            discord_guild_id,
            remove_commands,
            log_level,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
