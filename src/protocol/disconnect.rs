//! Disconnect reasons.
//!
//! Descriptive only: these travel in local events raised by a session layer,
//! never on the wire.

use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisconnectReason {
    ClientDisconnect = 0x00,
    ServerDisconnect = 0x01,
    PeerTimeout = 0x02,
    ClientReconnect = 0x03,
    ServerShutdown = 0x04,
    SplitPacketTooLarge = 0x05,
    SplitPacketTooManyConcurrent = 0x06,
    SplitPacketInvalidPartIndex = 0x07,
    SplitPacketInconsistentHeader = 0x08,
}

impl DisconnectReason {
    pub fn from_u8(code: u8) -> Option<Self> {
        let reason = match code {
            0x00 => DisconnectReason::ClientDisconnect,
            0x01 => DisconnectReason::ServerDisconnect,
            0x02 => DisconnectReason::PeerTimeout,
            0x03 => DisconnectReason::ClientReconnect,
            0x04 => DisconnectReason::ServerShutdown,
            0x05 => DisconnectReason::SplitPacketTooLarge,
            0x06 => DisconnectReason::SplitPacketTooManyConcurrent,
            0x07 => DisconnectReason::SplitPacketInvalidPartIndex,
            0x08 => DisconnectReason::SplitPacketInconsistentHeader,
            _ => return None,
        };
        Some(reason)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            DisconnectReason::ClientDisconnect => "client disconnect",
            DisconnectReason::ServerDisconnect => "server disconnect",
            DisconnectReason::PeerTimeout => "timeout",
            DisconnectReason::ClientReconnect => {
                "new session established on same address and port"
            }
            DisconnectReason::ServerShutdown => "server shutdown",
            DisconnectReason::SplitPacketTooLarge => {
                "received packet split into more parts than allowed"
            }
            DisconnectReason::SplitPacketTooManyConcurrent => {
                "too many received split packets being reassembled at once"
            }
            DisconnectReason::SplitPacketInvalidPartIndex => "invalid split packet part index",
            DisconnectReason::SplitPacketInconsistentHeader => {
                "received split packet header inconsistent with previous fragments"
            }
        }
    }

    /// Describe a raw reason code, including codes this table does not know
    pub fn describe(code: u8) -> Cow<'static, str> {
        match Self::from_u8(code) {
            Some(reason) => Cow::Borrowed(reason.description()),
            None => Cow::Owned(format!("Unknown reason {code}")),
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
