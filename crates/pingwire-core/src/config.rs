//! Configuration system for pingwire.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $PINGWIRE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/pingwire/config.toml
//!   3. ~/.config/pingwire/config.toml

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::segment::DEFAULT_CHUNK_SIZE;

/// Default inactivity window closing a receive session.
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 500;

/// Default port selector. Raw ICMP sockets ignore it, but it is passed
/// through to bind/sendto unchanged.
pub const DEFAULT_PORT: u16 = 50;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PingwireConfig {
    pub sender: SenderConfig,
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// IPv4 address the echo requests are sent to.
    pub destination: String,
    pub port: u16,
    /// Maximum compressed bytes per frame.
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub port: u16,
    /// Silence after which a session is considered complete.
    pub inactivity_timeout_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            destination: Ipv4Addr::LOCALHOST.to_string(),
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
        }
    }
}

impl SenderConfig {
    pub fn destination_addr(&self) -> Result<Ipv4Addr, ConfigError> {
        self.destination
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.destination.clone()))
    }
}

impl ReceiverConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("pingwire")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    #[error("inactivity timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PingwireConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            PingwireConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("PINGWIRE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = PingwireConfig::default().to_toml()?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject values that would only fail later, once I/O has started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sender.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.receiver.inactivity_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.sender.destination_addr()?;
        Ok(())
    }

    /// Apply PINGWIRE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("PINGWIRE_SENDER__DESTINATION") {
            self.sender.destination = v;
        }
        if let Some(p) = var("PINGWIRE_SENDER__PORT").and_then(|v| v.parse().ok()) {
            self.sender.port = p;
        }
        if let Some(n) = var("PINGWIRE_SENDER__CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.sender.chunk_size = n;
        }
        if let Some(p) = var("PINGWIRE_RECEIVER__PORT").and_then(|v| v.parse().ok()) {
            self.receiver.port = p;
        }
        if let Some(ms) = var("PINGWIRE_RECEIVER__INACTIVITY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.receiver.inactivity_timeout_ms = ms;
        }
    }
}
