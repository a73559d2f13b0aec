//! Protocol version acceptance policy.

use crate::config::DEFAULT_PROTOCOL_VERSION;

/// Accepts exactly one RakNet protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAcceptor {
    version: u8,
}

impl ProtocolAcceptor {
    pub fn new(version: u8) -> Self {
        Self { version }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn accepts(&self, version: u8) -> bool {
        version == self.version
    }
}

impl Default for ProtocolAcceptor {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL_VERSION)
    }
}
