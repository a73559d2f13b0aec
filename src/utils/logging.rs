//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` formatter driven by
//! [`LoggingConfig`]. `RUST_LOG` takes precedence over the configured level.

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

fn level_directive(config: &LoggingConfig) -> String {
    config.log_level.as_str().to_ascii_lowercase()
}

/// Build the filter for `config`, preferring `RUST_LOG` when it is set
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        EnvFilter::try_from_default_env()
            .map_err(|e| ProtocolError::ConfigError(format!("Invalid RUST_LOG directive: {e}")))
    } else {
        Ok(EnvFilter::new(level_directive(config)))
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when console logging is disabled or another
/// subscriber is already installed, so calling this twice is harmless.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    if !config.log_to_console {
        return Ok(false);
    }

    let filter = env_filter(config)?;
    let installed = if config.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(app = %config.app_name, "Logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use tracing::Level;

    #[test]
    fn test_level_directive() {
        let config = LoggingConfig {
            log_level: Level::DEBUG,
            ..LoggingConfig::default()
        };
        assert_eq!(level_directive(&config), "debug");
    }

    #[test]
    fn test_disabled_console_installs_nothing() {
        let config = LoggingConfig {
            log_to_console: false,
            ..LoggingConfig::default()
        };
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }
}
