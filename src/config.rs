//! Application configuration.
//!
//! Values come from a TOML file with environment variable overrides on
//! top; everything has a usable default so the responder starts with no
//! configuration at all.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Which storage substrate backs the coordination core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process map; duplicates are only caught within this instance.
    #[default]
    Memory,
    /// Shared Redis store; duplicates are caught across every instance
    /// pointed at it.
    Redis,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "unknown backend '{other}', expected 'memory' or 'redis'"
            )),
        }
    }
}

/// Connection settings for the shared store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub address: String,
    pub port: u16,
    pub password: String,
}

impl RedisConfig {
    /// Connection URL in the form the client expects.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/", self.address, self.port)
        } else {
            format!("redis://:{}@{}:{}/", self.password, self.address, self.port)
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 6379,
            password: String::new(),
        }
    }
}

/// Event-lock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Seconds an unreleased grant stays exclusive.
    pub ttl_secs: u64,
}

impl LockConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { ttl_secs: 10 }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub lock: LockConfig,
    /// Display label used in response text; defaults to the hostname.
    #[serde(default = "default_identity")]
    pub identity: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            redis: RedisConfig::default(),
            lock: LockConfig::default(),
            identity: default_identity(),
        }
    }
}

fn default_identity() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "tickline".to_string())
}

impl AppConfig {
    /// Load configuration with layered precedence: the explicit `path` if
    /// given, otherwise `./tickline.toml` if present, otherwise defaults.
    /// Environment variable overrides always apply last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading configuration file");
                Self::from_toml_file(path)?
            }
            None => {
                let local = Path::new("./tickline.toml");
                if local.exists() {
                    tracing::info!("loading configuration from ./tickline.toml");
                    Self::from_toml_file(local)?
                } else {
                    tracing::info!("no configuration file found, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("TICKLINE_REDIS_ADDRESS") {
            self.redis.address = val;
        }
        if let Ok(val) = std::env::var("TICKLINE_REDIS_PORT") {
            self.redis.port = parse_env("TICKLINE_REDIS_PORT", &val, "not a valid port number")?;
        }
        if let Ok(val) = std::env::var("TICKLINE_REDIS_PASSWORD") {
            self.redis.password = val;
        }
        if let Ok(val) = std::env::var("TICKLINE_LOCK_TTL_SECS") {
            self.lock.ttl_secs =
                parse_env("TICKLINE_LOCK_TTL_SECS", &val, "not a number of seconds")?;
        }
        if let Ok(val) = std::env::var("TICKLINE_IDENTITY") {
            self.identity = val;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str, reason: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    })
}
