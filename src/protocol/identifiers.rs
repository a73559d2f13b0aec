//! Message identifiers.
//!
//! These values are a wire compatibility surface shared with every RakNet
//! peer. They are append-only: never renumber an existing entry.

use std::fmt;

use crate::error::{ProtocolError, Result};

/// Leading byte of every RakNet datagram this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageIdentifier {
    /// Ping from a connected system. Updates timestamps.
    ConnectedPing = 0x00,
    /// Ping from an unconnected system. Reply but do not update timestamps.
    UnconnectedPing = 0x01,
    /// Ping from an unconnected system. Only reply if we have open connections.
    UnconnectedPingOpenConnections = 0x02,
    /// Pong from a connected system. Updates timestamps.
    ConnectedPong = 0x03,
    /// C2S: magic, protocol number, padding up to the probed MTU
    OpenConnectionRequestOne = 0x05,
    /// S2C: magic, server GUID, security flag, MTU
    OpenConnectionReplyOne = 0x06,
    /// C2S: magic, server address, MTU, client GUID
    OpenConnectionRequestTwo = 0x07,
    /// S2C: magic, server GUID, client address, MTU, security flag
    OpenConnectionReplyTwo = 0x08,
    /// C2S: client GUID, timestamp, security flag
    ConnectionRequest = 0x09,
    /// Our connection request to the server has been accepted
    ConnectionRequestAccepted = 0x10,
    /// A remote system has successfully connected
    NewIncomingConnection = 0x13,
    /// The remote system has disconnected from us
    DisconnectNotification = 0x15,
    /// The remote protocol version does not match ours.
    /// The 2nd byte of the message carries the remote version.
    IncompatibleProtocolVersion = 0x19,
    /// Pong from an unconnected system, followed by system-specific data
    UnconnectedPong = 0x1C,
    /// Inform a remote system of our IP/port
    AdvertiseSystem = 0x1D,
    /// Negative acknowledgment
    Nack = 0xA0,
    /// Acknowledgment
    Ack = 0xC0,
}

impl MessageIdentifier {
    /// Every known identifier, in wire order
    pub const ALL: [MessageIdentifier; 17] = [
        MessageIdentifier::ConnectedPing,
        MessageIdentifier::UnconnectedPing,
        MessageIdentifier::UnconnectedPingOpenConnections,
        MessageIdentifier::ConnectedPong,
        MessageIdentifier::OpenConnectionRequestOne,
        MessageIdentifier::OpenConnectionReplyOne,
        MessageIdentifier::OpenConnectionRequestTwo,
        MessageIdentifier::OpenConnectionReplyTwo,
        MessageIdentifier::ConnectionRequest,
        MessageIdentifier::ConnectionRequestAccepted,
        MessageIdentifier::NewIncomingConnection,
        MessageIdentifier::DisconnectNotification,
        MessageIdentifier::IncompatibleProtocolVersion,
        MessageIdentifier::UnconnectedPong,
        MessageIdentifier::AdvertiseSystem,
        MessageIdentifier::Nack,
        MessageIdentifier::Ack,
    ];

    pub fn from_u8(id: u8) -> Result<Self> {
        let identifier = match id {
            0x00 => MessageIdentifier::ConnectedPing,
            0x01 => MessageIdentifier::UnconnectedPing,
            0x02 => MessageIdentifier::UnconnectedPingOpenConnections,
            0x03 => MessageIdentifier::ConnectedPong,
            0x05 => MessageIdentifier::OpenConnectionRequestOne,
            0x06 => MessageIdentifier::OpenConnectionReplyOne,
            0x07 => MessageIdentifier::OpenConnectionRequestTwo,
            0x08 => MessageIdentifier::OpenConnectionReplyTwo,
            0x09 => MessageIdentifier::ConnectionRequest,
            0x10 => MessageIdentifier::ConnectionRequestAccepted,
            0x13 => MessageIdentifier::NewIncomingConnection,
            0x15 => MessageIdentifier::DisconnectNotification,
            0x19 => MessageIdentifier::IncompatibleProtocolVersion,
            0x1C => MessageIdentifier::UnconnectedPong,
            0x1D => MessageIdentifier::AdvertiseSystem,
            0xA0 => MessageIdentifier::Nack,
            0xC0 => MessageIdentifier::Ack,
            other => return Err(ProtocolError::UnknownPacketId(other)),
        };
        Ok(identifier)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Offline messages are exchanged before a connection exists and carry the magic
    pub fn is_offline(self) -> bool {
        matches!(
            self,
            MessageIdentifier::UnconnectedPing
                | MessageIdentifier::UnconnectedPingOpenConnections
                | MessageIdentifier::UnconnectedPong
                | MessageIdentifier::OpenConnectionRequestOne
                | MessageIdentifier::OpenConnectionReplyOne
                | MessageIdentifier::OpenConnectionRequestTwo
                | MessageIdentifier::OpenConnectionReplyTwo
                | MessageIdentifier::IncompatibleProtocolVersion
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageIdentifier::ConnectedPing => "CONNECTED_PING",
            MessageIdentifier::UnconnectedPing => "UNCONNECTED_PING",
            MessageIdentifier::UnconnectedPingOpenConnections => {
                "UNCONNECTED_PING_OPEN_CONNECTIONS"
            }
            MessageIdentifier::ConnectedPong => "CONNECTED_PONG",
            MessageIdentifier::OpenConnectionRequestOne => "OPEN_CONNECTION_REQUEST_ONE",
            MessageIdentifier::OpenConnectionReplyOne => "OPEN_CONNECTION_REPLY_ONE",
            MessageIdentifier::OpenConnectionRequestTwo => "OPEN_CONNECTION_REQUEST_TWO",
            MessageIdentifier::OpenConnectionReplyTwo => "OPEN_CONNECTION_REPLY_TWO",
            MessageIdentifier::ConnectionRequest => "CONNECTION_REQUEST",
            MessageIdentifier::ConnectionRequestAccepted => "CONNECTION_REQUEST_ACCEPTED",
            MessageIdentifier::NewIncomingConnection => "NEW_INCOMING_CONNECTION",
            MessageIdentifier::DisconnectNotification => "DISCONNECT_NOTIFICATION",
            MessageIdentifier::IncompatibleProtocolVersion => "INCOMPATIBLE_PROTOCOL_VERSION",
            MessageIdentifier::UnconnectedPong => "UNCONNECTED_PONG",
            MessageIdentifier::AdvertiseSystem => "ADVERTISE_SYSTEM",
            MessageIdentifier::Nack => "NACK",
            MessageIdentifier::Ack => "ACK",
        }
    }
}

impl TryFrom<u8> for MessageIdentifier {
    type Error = ProtocolError;

    fn try_from(id: u8) -> Result<Self> {
        Self::from_u8(id)
    }
}

impl From<MessageIdentifier> for u8 {
    fn from(id: MessageIdentifier) -> Self {
        id as u8
    }
}

impl fmt::Display for MessageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02x})", self.name(), self.as_u8())
    }
}
