//! Observability and Metrics
//!
//! Counters for datagram traffic and codec failures.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ProtocolError;

/// Global metrics collector for datagram and codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Total datagrams sent
    pub datagrams_sent: AtomicU64,
    /// Total datagrams received
    pub datagrams_received: AtomicU64,
    /// Total bytes sent
    pub bytes_sent: AtomicU64,
    /// Total bytes received
    pub bytes_received: AtomicU64,
    /// Packets decoded successfully
    pub packets_decoded: AtomicU64,
    /// Datagrams discarded because they failed to parse
    pub decode_failures: AtomicU64,
    /// Offline datagrams with a wrong magic
    pub magic_mismatches: AtomicU64,
    /// Datagrams with an unregistered leading byte
    pub unknown_ids: AtomicU64,
    /// ACK packets seen
    pub acks: AtomicU64,
    /// NACK packets seen
    pub nacks: AtomicU64,
    /// Socket errors
    pub socket_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            datagrams_sent: AtomicU64::new(0),
            datagrams_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            packets_decoded: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            magic_mismatches: AtomicU64::new(0),
            unknown_ids: AtomicU64::new(0),
            acks: AtomicU64::new(0),
            nacks: AtomicU64::new(0),
            socket_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a datagram sent
    pub fn datagram_sent(&self, byte_count: u64) {
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a datagram received
    pub fn datagram_received(&self, byte_count: u64) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn packet_decoded(&self) {
        self.packets_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded datagram, classified by the error that caused it
    pub fn decode_failed(&self, error: &ProtocolError) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
        match error {
            ProtocolError::MagicMismatch => {
                self.magic_mismatches.fetch_add(1, Ordering::Relaxed);
            }
            ProtocolError::UnknownPacketId(_) => {
                self.unknown_ids.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub fn ack_seen(&self) {
        self.acks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nack_seen(&self) {
        self.nacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a socket error
    pub fn socket_error(&self) {
        self.socket_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            packets_decoded: self.packets_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            magic_mismatches: self.magic_mismatches.load(Ordering::Relaxed),
            unknown_ids: self.unknown_ids.load(Ordering::Relaxed),
            acks: self.acks.load(Ordering::Relaxed),
            nacks: self.nacks.load(Ordering::Relaxed),
            socket_errors: self.socket_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            datagrams_sent = snapshot.datagrams_sent,
            datagrams_received = snapshot.datagrams_received,
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            packets_decoded = snapshot.packets_decoded,
            decode_failures = snapshot.decode_failures,
            magic_mismatches = snapshot.magic_mismatches,
            unknown_ids = snapshot.unknown_ids,
            acks = snapshot.acks,
            nacks = snapshot.nacks,
            socket_errors = snapshot.socket_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Protocol metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub datagrams_sent: u64,
    pub datagrams_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_decoded: u64,
    pub decode_failures: u64,
    pub magic_mismatches: u64,
    pub unknown_ids: u64,
    pub acks: u64,
    pub nacks: u64,
    pub socket_errors: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    // Force initialization
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
