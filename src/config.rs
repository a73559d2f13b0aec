//! # Configuration Management
//!
//! Wire constants and the runtime configuration for codecs and sockets.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - `RAKNET_PROTOCOL_*` environment overrides via `from_env()`
//!
//! Packet codecs never read this module's structs directly. They receive a
//! [`CodecOptions`] built by [`CodecConfig::options`].

use crate::core::ack::{AckDecodeMode, AckLimits, MAX_ACK_ENTRIES, MAX_RANGE_SPAN};
use crate::core::serializer::{ByteOrder, CodecOptions};
use crate::error::{ProtocolError, Result};
use crate::protocol::acceptor::ProtocolAcceptor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// RakNet protocol version spoken by default
pub const DEFAULT_PROTOCOL_VERSION: u8 = 6;

/// Size of the system address table in connection packets
pub const SYSTEM_ADDRESS_COUNT: usize = 20;

/// Marker carried by every offline message
pub const OFFLINE_MESSAGE_MAGIC: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56,
    0x78,
];

/// Largest UDP payload we will ever receive
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Default listen address (the Bedrock port)
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:19132";

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProtocolConfig {
    /// Packet codec configuration
    #[serde(default)]
    pub codec: CodecConfig,

    /// UDP socket configuration
    #[serde(default)]
    pub socket: SocketConfig,

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

        if let Ok(addr) = std::env::var("RAKNET_PROTOCOL_ADDRESS") {
            config.socket.address = addr;
        }

        if let Ok(version) = std::env::var("RAKNET_PROTOCOL_VERSION") {
            config.codec.protocol_version = version.parse::<u8>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid RAKNET_PROTOCOL_VERSION: {e}"))
            })?;
        }

        if let Ok(count) = std::env::var("RAKNET_PROTOCOL_SYSTEM_ADDRESS_COUNT") {
            config.codec.system_address_count = count.parse::<usize>().map_err(|e| {
                ProtocolError::ConfigError(format!(
                    "Invalid RAKNET_PROTOCOL_SYSTEM_ADDRESS_COUNT: {e}"
                ))
            })?;
        }

        if let Ok(mode) = std::env::var("RAKNET_PROTOCOL_ACK_DECODE_MODE") {
            config.codec.ack_decode_mode = match mode.as_str() {
                "standard" => AckDecodeMode::Standard,
                "legacy_two_triad_single" => AckDecodeMode::LegacyTwoTriadSingle,
                other => {
                    return Err(ProtocolError::ConfigError(format!(
                        "Invalid RAKNET_PROTOCOL_ACK_DECODE_MODE: {other}"
                    )))
                }
            };
        }

        if let Ok(timeout) = std::env::var("RAKNET_PROTOCOL_RECEIVE_TIMEOUT_MS") {
            let millis = timeout.parse::<u64>().map_err(|e| {
                ProtocolError::ConfigError(format!(
                    "Invalid RAKNET_PROTOCOL_RECEIVE_TIMEOUT_MS: {e}"
                ))
            })?;
            config.socket.receive_timeout = Duration::from_millis(millis);
        }

        if let Ok(level) = std::env::var("RAKNET_PROTOCOL_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid RAKNET_PROTOCOL_LOG_LEVEL: {e}"))
            })?;
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
        errors.extend(self.codec.validate());
        errors.extend(self.socket.validate());
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

/// Packet codec configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Protocol version accepted from clients
    pub protocol_version: u8,

    /// Entries in the system address table
    pub system_address_count: usize,

    /// Largest span expanded from one ACK range record
    pub max_ack_range_span: u32,

    /// Largest number of sequence numbers taken from one ACK payload
    pub max_ack_entries: usize,

    /// Record read shape for incoming ACK/NACK payloads
    pub ack_decode_mode: AckDecodeMode,

    /// Drop offline datagrams whose magic does not match
    pub reject_invalid_magic: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            system_address_count: SYSTEM_ADDRESS_COUNT,
            max_ack_range_span: MAX_RANGE_SPAN,
            max_ack_entries: MAX_ACK_ENTRIES,
            ack_decode_mode: AckDecodeMode::Standard,
            reject_invalid_magic: false,
        }
    }
}

impl CodecConfig {
    /// Options handed to every serializer built from this configuration
    pub fn options(&self) -> CodecOptions {
        CodecOptions {
            byte_order: ByteOrder::BigEndian,
            system_address_count: self.system_address_count,
            ack_limits: AckLimits {
                max_range_span: self.max_ack_range_span,
                max_entries: self.max_ack_entries,
            },
            ack_decode_mode: self.ack_decode_mode,
        }
    }

    pub fn acceptor(&self) -> ProtocolAcceptor {
        ProtocolAcceptor::new(self.protocol_version)
    }

    /// Validate codec configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.protocol_version == 0 {
            errors.push("Protocol version must be greater than 0".to_string());
        }

        if self.system_address_count == 0 {
            errors.push("System address count must be greater than 0".to_string());
        } else if self.system_address_count > 64 {
            errors.push(format!(
                "System address count too large: {} (maximum: 64)",
                self.system_address_count
            ));
        }

        if self.max_ack_range_span == 0 {
            errors.push("Max ACK range span must be greater than 0".to_string());
        }

        if self.max_ack_entries == 0 {
            errors.push("Max ACK entries must be greater than 0".to_string());
        } else if self.max_ack_entries > 1 << 24 {
            errors.push(format!(
                "Max ACK entries too large: {} (sequence numbers are 24-bit)",
                self.max_ack_entries
            ));
        }

        errors
    }
}

/// UDP socket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Bind address for servers, peer address for clients
    pub address: String,

    /// Allow sending to broadcast addresses
    pub broadcast: bool,

    /// Receive buffer size per datagram
    pub max_datagram_size: usize,

    /// How long `receive_timeout` waits for a datagram
    #[serde(with = "duration_serde")]
    pub receive_timeout: Duration,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            address: String::from(DEFAULT_ADDRESS),
            broadcast: false,
            max_datagram_size: MAX_DATAGRAM_SIZE,
            receive_timeout: Duration::from_secs(5),
        }
    }
}

impl SocketConfig {
    /// Validate socket configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Socket address cannot be empty".to_string());
        } else {
            if self.address.parse::<std::net::SocketAddr>().is_err() {
                errors.push(format!(
                    "Invalid socket address format: '{}' (expected format: '0.0.0.0:19132')",
                    self.address
                ));
            }
        }

        // Smallest MTU a RakNet peer may probe with
        if self.max_datagram_size < 400 {
            errors.push(format!(
                "Max datagram size too small: {} (minimum: 400)",
                self.max_datagram_size
            ));
        } else if self.max_datagram_size > MAX_DATAGRAM_SIZE {
            errors.push(format!(
                "Max datagram size too large: {} (maximum: {MAX_DATAGRAM_SIZE})",
                self.max_datagram_size
            ));
        }

        if self.receive_timeout.as_millis() < 10 {
            errors.push("Receive timeout too short (minimum: 10ms)".to_string());
        } else if self.receive_timeout.as_secs() > 300 {
            errors.push("Receive timeout too long (maximum: 300s)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level, overridden by `RUST_LOG` when set
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("raknet-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
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

        if self.json_format && !self.log_to_console {
            errors.push("json_format has no effect when log_to_console is false".to_string());
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

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    // Single test so no other test observes the variables mid-change
    #[test]
    fn test_from_env_overrides_and_errors() {
        let vars = [
            ("RAKNET_PROTOCOL_SYSTEM_ADDRESS_COUNT", "10"),
            ("RAKNET_PROTOCOL_RECEIVE_TIMEOUT_MS", "250"),
            ("RAKNET_PROTOCOL_LOG_LEVEL", "debug"),
            ("RAKNET_PROTOCOL_ACK_DECODE_MODE", "legacy_two_triad_single"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let config = ProtocolConfig::from_env().unwrap();
        assert_eq!(config.codec.system_address_count, 10);
        assert_eq!(config.socket.receive_timeout, Duration::from_millis(250));
        assert_eq!(config.logging.log_level, Level::DEBUG);
        assert_eq!(config.codec.ack_decode_mode, AckDecodeMode::LegacyTwoTriadSingle);

        for (key, bad) in [
            ("RAKNET_PROTOCOL_SYSTEM_ADDRESS_COUNT", "twenty"),
            ("RAKNET_PROTOCOL_RECEIVE_TIMEOUT_MS", "-5"),
            ("RAKNET_PROTOCOL_LOG_LEVEL", "loud"),
            ("RAKNET_PROTOCOL_VERSION", "300"),
            ("RAKNET_PROTOCOL_ACK_DECODE_MODE", "sideways"),
        ] {
            let previous = std::env::var(key).ok();
            std::env::set_var(key, bad);
            let err = ProtocolConfig::from_env().expect_err(key);
            assert!(err.to_string().contains(key), "{err}");
            match previous {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }

        for (key, _) in vars {
            std::env::remove_var(key);
        }
        assert!(ProtocolConfig::from_env().is_ok());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert!(config.validate_strict().is_ok());
    }

    #[test]
    fn test_options_from_codec_config() {
        let config = CodecConfig {
            system_address_count: 10,
            max_ack_range_span: 64,
            ack_decode_mode: AckDecodeMode::LegacyTwoTriadSingle,
            ..CodecConfig::default()
        };
        let options = config.options();
        assert_eq!(options.system_address_count, 10);
        assert_eq!(options.ack_limits.max_range_span, 64);
        assert_eq!(options.ack_limits.max_entries, MAX_ACK_ENTRIES);
        assert_eq!(options.ack_decode_mode, AckDecodeMode::LegacyTwoTriadSingle);
        assert_eq!(CodecConfig::default().options(), CodecOptions::default());
    }

    #[test]
    fn test_acceptor_from_codec_config() {
        let acceptor = CodecConfig::default().acceptor();
        assert!(acceptor.accepts(DEFAULT_PROTOCOL_VERSION));
        assert!(!acceptor.accepts(DEFAULT_PROTOCOL_VERSION + 1));
    }

    #[test]
    fn test_partial_toml() {
        let config = ProtocolConfig::from_toml(
            r#"
            [codec]
            protocol_version = 10
            ack_decode_mode = "legacy_two_triad_single"

            [logging]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.codec.protocol_version, 10);
        assert_eq!(config.codec.system_address_count, SYSTEM_ADDRESS_COUNT);
        assert_eq!(config.codec.ack_decode_mode, AckDecodeMode::LegacyTwoTriadSingle);
        assert_eq!(config.logging.log_level, Level::DEBUG);
        assert_eq!(config.socket.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_example_config_parses_back() {
        let example = ProtocolConfig::example_config();
        let config = ProtocolConfig::from_toml(&example).unwrap();
        assert_eq!(config.socket.receive_timeout, Duration::from_secs(5));
        assert_eq!(config.logging.log_level, Level::INFO);
    }

    #[test]
    fn test_magic_constant() {
        assert_eq!(OFFLINE_MESSAGE_MAGIC[0], 0x00);
        assert_eq!(OFFLINE_MESSAGE_MAGIC[15], 0x78);
    }
}
