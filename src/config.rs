use anyhow::{anyhow, Context};
use poise::serenity_prelude::{ChannelId, GuildId};

use crate::BotError;

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    /// When set, commands are registered in this guild only.
    pub guild_id: Option<GuildId>,
    /// Channel that receives info and error logs. Logging to Discord is skipped without it.
    pub log_channel_id: Option<ChannelId>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BotError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("Expected {} as an environment variable", key))
        };
        let snowflake = |key: &str| -> Result<Option<u64>, BotError> {
            match lookup(key).filter(|value| !value.trim().is_empty()) {
                Some(raw) => {
                    let id = raw
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("{} must be a Discord ID, got `{}`", key, raw))?;
                    if id == 0 {
                        return Err(anyhow!("{} must be a Discord ID, got `0`", key));
                    }
                    Ok(Some(id))
                }
                None => Ok(None),
            }
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            guild_id: snowflake("GUILD_ID")?.map(GuildId::new),
            log_channel_id: snowflake("LOG_CHANNEL_ID")?.map(ChannelId::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<BotConfig, BotError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn optional_ids_default_to_none() {
        let config = config(&[("DISCORD_TOKEN", "token"), ("DATABASE_URL", "postgres://x")]).unwrap();
        assert_eq!(config.discord_token, "token");
        assert!(config.guild_id.is_none());
        assert!(config.log_channel_id.is_none());
    }

    #[test]
    fn ids_are_parsed() {
        let config = config(&[
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://x"),
            ("GUILD_ID", "123456789"),
            ("LOG_CHANNEL_ID", " 42 "),
        ])
        .unwrap();
        assert_eq!(config.guild_id, Some(GuildId::new(123456789)));
        assert_eq!(config.log_channel_id, Some(ChannelId::new(42)));
    }

    #[test]
    fn missing_or_malformed_values_fail() {
        assert!(config(&[("DATABASE_URL", "postgres://x")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "token"), ("DATABASE_URL", " ")]).is_err());
        assert!(config(&[
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://x"),
            ("GUILD_ID", "not-a-guild"),
        ])
        .is_err());
        assert!(config(&[
            ("DISCORD_TOKEN", "token"),
            ("DATABASE_URL", "postgres://x"),
            ("LOG_CHANNEL_ID", "0"),
        ])
        .is_err());
    }
}
