//! # Configuration Management
//!
//! Centralized configuration for the plugin-message protocol.
//!
//! This module provides structured configuration for the message channel, the
//! ack handshake and logging output.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Handshake Tuning
//! - The ack check delay must comfortably exceed a round trip through the
//!   proxy and the backend; 30 seconds is the default
//! - The miss threshold provides hysteresis against isolated message loss

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Protocol version reported in ack payloads
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plugin message channel carrying every envelope
pub const MESSAGE_CHANNEL: &str = "sr:messagechannel";

/// Max allowed decompressed size of a compressed section (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default delay before an unanswered ack request counts as a miss
pub const ACK_CHECK_DELAY: Duration = Duration::from_secs(30);

/// Consecutive misses before an endpoint is classified as broken
pub const ACK_MISS_THRESHOLD: u32 = 3;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// Channel identity
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Ack handshake configuration
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProtocolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("SKIN_CHANNEL_NAME") {
            config.channel.name = name;
        }

        if let Ok(version) = std::env::var("SKIN_CHANNEL_LOCAL_VERSION") {
            config.channel.local_version = version;
        }

        if let Ok(delay) = std::env::var("SKIN_CHANNEL_ACK_CHECK_DELAY_MS") {
            if let Ok(val) = delay.parse::<u64>() {
                config.handshake.ack_check_delay = Duration::from_millis(val);
            }
        }

        if let Ok(threshold) = std::env::var("SKIN_CHANNEL_ACK_MISS_THRESHOLD") {
            if let Ok(val) = threshold.parse::<u32>() {
                config.handshake.miss_threshold = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.channel.validate());
        errors.extend(self.handshake.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Channel identity shared by both sides of the conversation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Plugin message channel name (namespace:path)
    pub name: String,

    /// Version string sent in ack payloads and compared against the peer's
    pub local_version: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: String::from(MESSAGE_CHANNEL),
            local_version: String::from(PROTOCOL_VERSION),
        }
    }
}

impl ChannelConfig {
    /// Validate channel configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.name.split_once(':') {
            Some((namespace, path)) if !namespace.is_empty() && !path.is_empty() => {
                if self.name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
                    errors.push(format!(
                        "Channel name must be lowercase without whitespace: '{}'",
                        self.name
                    ));
                }
            }
            _ => errors.push(format!(
                "Invalid channel name: '{}' (expected format: 'namespace:path')",
                self.name
            )),
        }

        if self.local_version.trim().is_empty() {
            errors.push("Local version cannot be empty".to_string());
        }

        errors
    }
}

/// Ack handshake configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandshakeConfig {
    /// Delay before an unanswered ack request is counted as a miss
    #[serde(with = "duration_serde")]
    pub ack_check_delay: Duration,

    /// Consecutive misses before the endpoint is marked broken
    pub miss_threshold: u32,

    /// How long an issued ack id is remembered for correlation
    #[serde(with = "duration_serde")]
    pub pending_ack_ttl: Duration,

    /// Maximum number of outstanding ack ids remembered at once
    pub max_pending_acks: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            ack_check_delay: ACK_CHECK_DELAY,
            miss_threshold: ACK_MISS_THRESHOLD,
            pending_ack_ttl: Duration::from_secs(300),
            max_pending_acks: 10_000,
        }
    }
}

impl HandshakeConfig {
    /// Validate handshake configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.ack_check_delay.as_millis() < 100 {
            errors.push("Ack check delay too short (minimum: 100ms)".to_string());
        } else if self.ack_check_delay.as_secs() > 600 {
            errors.push("Ack check delay too long (maximum: 600s)".to_string());
        }

        if self.miss_threshold == 0 {
            errors.push("Miss threshold must be greater than 0".to_string());
        } else if self.miss_threshold > 100 {
            errors.push(format!(
                "Miss threshold too large: {} (maximum: 100)",
                self.miss_threshold
            ));
        }

        if self.pending_ack_ttl < self.ack_check_delay {
            errors.push(
                "Pending ack TTL cannot be shorter than the ack check delay".to_string(),
            );
        }

        if self.max_pending_acks == 0 {
            errors.push("Max pending acks must be greater than 0".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("skin-channel-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
