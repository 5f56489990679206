// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use std::time::Duration;

use serde::Deserialize;

/// Environment variable selecting the [`RemovalPolicy`].
pub const ENV_REMOVAL_POLICY: &str = "OPRF_RELAY_REMOVAL_POLICY";
/// Environment variable holding the removal token lifetime in seconds.
pub const ENV_REMOVAL_TOKEN_TTL_SECS: &str = "OPRF_RELAY_REMOVAL_TOKEN_TTL_SECS";

pub const DEFAULT_REMOVAL_TOKEN_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value `{value}`")]
    InvalidValue { name: &'static str, value: String },
}

/// What a removal request must present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// The identifier alone. Anyone who knows a phone number can delete its secret.
    #[default]
    IdentifierOnly,
    /// A removal token minted by a recent authentication of the current
    /// registration. Authentication needs only the phone number, so this limits
    /// removals to recent callers of the exchange; it does not prove ownership.
    RequireToken,
}

impl RemovalPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "require_token" => Some(RemovalPolicy::RequireToken),
            "identifier_only" => Some(RemovalPolicy::IdentifierOnly),
            _ => None,
        }
    }
}

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub removal_policy: RemovalPolicy,
    pub removal_token_ttl_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            removal_policy: RemovalPolicy::default(),
            removal_token_ttl_secs: DEFAULT_REMOVAL_TOKEN_TTL_SECS,
        }
    }
}

impl RelayConfig {
    /// Reads the configuration from the process environment, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`RelayConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_REMOVAL_POLICY) {
            config.removal_policy =
                RemovalPolicy::parse(&value).ok_or(ConfigError::InvalidValue {
                    name: ENV_REMOVAL_POLICY,
                    value,
                })?;
        }

        if let Some(value) = lookup(ENV_REMOVAL_TOKEN_TTL_SECS) {
            config.removal_token_ttl_secs = match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_REMOVAL_TOKEN_TTL_SECS,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    pub fn removal_token_ttl(&self) -> Duration {
        Duration::from_secs(self.removal_token_ttl_secs)
    }
}
