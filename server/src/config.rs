//! Relay configuration parsed from environment variables.

use std::collections::HashSet;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is required")]
    Missing { var: &'static str },
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    /// Credentials accepted on `GET /ws?token=`.
    pub tokens: HashSet<String>,
    /// Per-connection buffer for messages relayed from peers.
    pub channel_capacity: usize,
}

impl RelayConfig {
    /// Build typed relay config from environment variables.
    ///
    /// Required:
    /// - `RELAY_TOKENS`: comma-separated accepted credentials
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `RELAY_CHANNEL_CAPACITY`: default 256
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RelayConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or unparseable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_tokens = lookup("RELAY_TOKENS").ok_or(ConfigError::Missing { var: "RELAY_TOKENS" })?;
        let tokens: HashSet<String> = raw_tokens
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        if tokens.is_empty() {
            return Err(ConfigError::Invalid { var: "RELAY_TOKENS", value: raw_tokens });
        }

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let channel_capacity = parse_or("RELAY_CHANNEL_CAPACITY", lookup("RELAY_CHANNEL_CAPACITY"), DEFAULT_CHANNEL_CAPACITY)?;
        if channel_capacity == 0 {
            return Err(ConfigError::Invalid { var: "RELAY_CHANNEL_CAPACITY", value: "0".into() });
        }

        Ok(Self { port, tokens, channel_capacity })
    }

    /// Whether `token` may open a relay connection.
    #[must_use]
    pub fn accepts(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
