//! # Error Types
//!
//! Error handling for the RakNet packet protocol.
//!
//! This module defines every error variant the codec can produce, from short
//! reads on a datagram to unknown message identifiers.
//!
//! ## Error Categories
//! - **Parse Errors**: Buffer underruns, unexpected or unknown packet IDs,
//!   unknown address versions, malformed strings
//! - **Validation Errors**: Offline magic mismatches, MTU values too small to encode
//! - **I/O Errors**: Socket failures from the transport collaborator
//! - **Configuration Errors**: Invalid or unreadable configuration
//!
//! Parse errors are scoped to a single datagram. Callers are expected to log
//! them and drop the datagram; nothing in this crate retries.
//!
//! ## Example Usage
//! ```rust
//! use raknet_protocol::error::{ProtocolError, Result};
//! use raknet_protocol::protocol::RakPacket;
//! use raknet_protocol::core::serializer::CodecOptions;
//! use tracing::warn;
//!
//! fn handle(datagram: &[u8]) -> Result<()> {
//!     let packet = RakPacket::from_bytes(datagram, CodecOptions::default())?;
//!     let _ = packet.id();
//!     Ok(())
//! }
//!
//! if let Err(e) = handle(&[0xFF]) {
//!     warn!(error = %e, "Dropping datagram");
//!     assert!(matches!(e, ProtocolError::UnknownPacketId(0xFF)));
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// String codec errors
    pub const ERR_STRING_NOT_ASCII: &str = "String contains non-ASCII bytes";
    pub const ERR_STRING_TOO_LONG: &str = "String exceeds 65535 bytes";

    /// Handshake errors
    pub const ERR_INVALID_MAGIC: &str = "Offline message magic does not match";
    pub const ERR_SYSTEM_TIME: &str = "System time error: time went backwards";
}

/// Primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Unexpected packet ID: expected 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedPacketId { expected: u8, actual: u8 },

    #[error("Unknown packet ID: 0x{0:02x}")]
    UnknownPacketId(u8),

    #[error("Unknown IP address version: {0}")]
    UnknownAddressVersion(u8),

    #[error("{}", constants::ERR_INVALID_MAGIC)]
    MagicMismatch,

    #[error("Invalid string: {0}")]
    InvalidString(String),

    #[error("MTU size {0} is smaller than the 46 byte request overhead")]
    MtuTooSmall(u16),

    #[error("Too many acknowledgment records: {0} (maximum 65535)")]
    TooManyRecords(usize),

    #[error("Unknown packet reliability: {0}")]
    UnknownReliability(u8),

    #[error("Unexpected message type")]
    UnexpectedMessage,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// Whether this error means the datagram being parsed should be dropped.
    ///
    /// Magic mismatches are included: they only surface as errors when the
    /// caller asked for strict validation.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            ProtocolError::BufferUnderrun { .. }
                | ProtocolError::UnexpectedPacketId { .. }
                | ProtocolError::UnknownPacketId(_)
                | ProtocolError::UnknownAddressVersion(_)
                | ProtocolError::MagicMismatch
                | ProtocolError::InvalidString(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_classification() {
        assert!(ProtocolError::BufferUnderrun {
            needed: 8,
            remaining: 2
        }
        .is_parse_failure());
        assert!(ProtocolError::UnknownAddressVersion(5).is_parse_failure());
        assert!(ProtocolError::MagicMismatch.is_parse_failure());
        assert!(!ProtocolError::ConfigError("bad".into()).is_parse_failure());
        assert!(!ProtocolError::UnexpectedMessage.is_parse_failure());
    }

    #[test]
    fn test_magic_mismatch_message() {
        assert_eq!(
            ProtocolError::MagicMismatch.to_string(),
            constants::ERR_INVALID_MAGIC
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ProtocolError::UnexpectedPacketId {
            expected: 0x05,
            actual: 0x1c,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected packet ID: expected 0x05, got 0x1c"
        );
        assert_eq!(
            ProtocolError::UnknownAddressVersion(9).to_string(),
            "Unknown IP address version: 9"
        );
    }
}
