//! Service configuration
//!
//! Environment:
//! - CHAT_ENVIRONMENT: `development` (default) or `production`
//! - CHAT_BIND_ADDR: listen address (default `0.0.0.0:3001`)
//! - CHAT_STORE_PATH: JSONL document file (in-memory only when unset)
//! - EVENT_GRID_ENDPOINT / EVENT_GRID_KEY: cloud event publisher
//! - CHAT_FUNCTION_KEYS: comma-separated accepted function keys
//! - CHAT_JWT_SECRET: HS256 secret for bearer tokens (min 32 chars)
//! - CHAT_ASSISTANT_REPLIES: `true` to answer each message with an assistant reply

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Minimum accepted length of the JWT signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("{0} must be at least 32 characters")]
    SecretTooShort(&'static str),

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventGridConfig {
    pub endpoint: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub store_path: Option<PathBuf>,
    pub event_grid: Option<EventGridConfig>,
    pub function_keys: Vec<String>,
    pub jwt_secret: Option<String>,
    pub assistant_replies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("CHAT_ENVIRONMENT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "CHAT_ENVIRONMENT",
                value,
            })?,
            None => Environment::default(),
        };

        let bind_addr_raw = get("CHAT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "CHAT_BIND_ADDR",
                value: bind_addr_raw.clone(),
            })?;

        let event_grid = match (get("EVENT_GRID_ENDPOINT"), get("EVENT_GRID_KEY")) {
            (Some(endpoint), Some(key)) => Some(EventGridConfig { endpoint, key }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete("EVENT_GRID_ENDPOINT", "EVENT_GRID_KEY")),
        };

        let function_keys: Vec<String> = get("CHAT_FUNCTION_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let jwt_secret = get("CHAT_JWT_SECRET");
        if let Some(secret) = &jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                return Err(ConfigError::SecretTooShort("CHAT_JWT_SECRET"));
            }
        }

        let assistant_replies = match get("CHAT_ASSISTANT_REPLIES") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                var: "CHAT_ASSISTANT_REPLIES",
                value,
            })?,
            None => false,
        };

        let config = Self {
            environment,
            bind_addr,
            store_path: get("CHAT_STORE_PATH").map(PathBuf::from),
            event_grid,
            function_keys,
            jwt_secret,
            assistant_replies,
        };
        config.validate()?;
        Ok(config)
    }

    /// Production requires real collaborators; development falls back to mocks
    fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_development() {
            return Ok(());
        }
        if !self.has_credentials() {
            return Err(ConfigError::Missing("CHAT_FUNCTION_KEYS or CHAT_JWT_SECRET"));
        }
        if self.store_path.is_none() {
            return Err(ConfigError::Missing("CHAT_STORE_PATH"));
        }
        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.function_keys.is_empty() || self.jwt_secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            store_path: None,
            event_grid: None,
            function_keys: Vec::new(),
            jwt_secret: None,
            assistant_replies: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults_to_development_with_mocks() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_production_requires_credentials_and_store() {
        let err = config_from(&[("CHAT_ENVIRONMENT", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));

        let err = config_from(&[
            ("CHAT_ENVIRONMENT", "production"),
            ("CHAT_FUNCTION_KEYS", "k1"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("CHAT_STORE_PATH"));

        let config = config_from(&[
            ("CHAT_ENVIRONMENT", "production"),
            ("CHAT_FUNCTION_KEYS", "k1, k2 ,"),
            ("CHAT_STORE_PATH", "/var/lib/chat/docs.jsonl"),
        ])
        .unwrap();
        assert_eq!(config.function_keys, vec!["k1", "k2"]);
    }

    #[test]
    fn test_event_grid_settings_come_in_pairs() {
        let err = config_from(&[("EVENT_GRID_ENDPOINT", "https://example.invalid/api/events")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Incomplete(..)));

        let config = config_from(&[
            ("EVENT_GRID_ENDPOINT", "https://example.invalid/api/events"),
            ("EVENT_GRID_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(config.event_grid.unwrap().key, "secret");
    }

    #[test]
    fn test_rejects_short_secret_and_bad_values() {
        assert_eq!(
            config_from(&[("CHAT_JWT_SECRET", "short")]).unwrap_err(),
            ConfigError::SecretTooShort("CHAT_JWT_SECRET")
        );
        assert!(config_from(&[("CHAT_ENVIRONMENT", "staging")]).is_err());
        assert!(config_from(&[("CHAT_BIND_ADDR", "not-an-addr")]).is_err());
        assert!(config_from(&[("CHAT_ASSISTANT_REPLIES", "maybe")]).is_err());
    }

    #[test]
    fn test_assistant_flag_parsing() {
        let config = config_from(&[("CHAT_ASSISTANT_REPLIES", "TRUE")]).unwrap();
        assert!(config.assistant_replies);
    }
}
