//! # Utility Modules
//!
//! Logging setup and process-wide metrics.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` installation from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: Thread-safe datagram and codec counters

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
