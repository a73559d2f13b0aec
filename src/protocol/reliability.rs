//! Packet reliability modes.
//!
//! Two independent axes: whether delivery is guaranteed, and whether the
//! receiver enforces strict order, newest-wins sequencing, or nothing.
//! The packet layer only classifies; the session layer acts on it.

use crate::error::{ProtocolError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketReliability {
    Unreliable = 0x00,
    UnreliableSequenced = 0x01,
    Reliable = 0x02,
    ReliableOrdered = 0x03,
    ReliableSequenced = 0x04,
    UnreliableWithAckReceipt = 0x05,
    ReliableWithAckReceipt = 0x06,
    ReliableOrderedWithAckReceipt = 0x07,
}

impl PacketReliability {
    pub fn from_u8(value: u8) -> Result<Self> {
        let reliability = match value {
            0x00 => PacketReliability::Unreliable,
            0x01 => PacketReliability::UnreliableSequenced,
            0x02 => PacketReliability::Reliable,
            0x03 => PacketReliability::ReliableOrdered,
            0x04 => PacketReliability::ReliableSequenced,
            0x05 => PacketReliability::UnreliableWithAckReceipt,
            0x06 => PacketReliability::ReliableWithAckReceipt,
            0x07 => PacketReliability::ReliableOrderedWithAckReceipt,
            other => return Err(ProtocolError::UnknownReliability(other)),
        };
        Ok(reliability)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Delivery is guaranteed
    pub fn is_reliable(self) -> bool {
        !matches!(
            self,
            PacketReliability::Unreliable
                | PacketReliability::UnreliableSequenced
                | PacketReliability::UnreliableWithAckReceipt
        )
    }

    /// Receiver drops or reorders out-of-order arrivals (sequenced modes included)
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            PacketReliability::UnreliableSequenced
                | PacketReliability::ReliableOrdered
                | PacketReliability::ReliableSequenced
                | PacketReliability::ReliableOrderedWithAckReceipt
        )
    }

    /// Newest-wins: stale arrivals are dropped rather than reordered
    pub fn is_sequenced(self) -> bool {
        matches!(
            self,
            PacketReliability::UnreliableSequenced | PacketReliability::ReliableSequenced
        )
    }
}

impl TryFrom<u8> for PacketReliability {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value)
    }
}
