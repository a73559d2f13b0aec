//! # Packet Registry
//!
//! [`RakPacket`] is the closed set of every message this crate can decode.
//! Receivers that do not know in advance which message a datagram holds
//! decode through it: the leading byte is peeked, mapped through
//! [`MessageIdentifier`] and the matching concrete type is decoded.
//!
//! ```
//! use raknet_protocol::core::serializer::CodecOptions;
//! use raknet_protocol::protocol::messages::UnconnectedPing;
//! use raknet_protocol::protocol::{Packet, RakPacket};
//!
//! let bytes = UnconnectedPing::new(10, 42).to_bytes().unwrap();
//! let packet = RakPacket::from_bytes(&bytes, CodecOptions::default()).unwrap();
//! assert!(matches!(packet, RakPacket::UnconnectedPing(ref p) if p.client_id == 42));
//! ```

use bytes::Bytes;

use crate::core::serializer::{CodecOptions, PacketSerializer};
use crate::error::{ProtocolError, Result};
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::messages::*;
use crate::protocol::packet::{Ack, Magic, Nack, OfflinePacket, Packet};

macro_rules! rak_packets {
    (
        with_magic { $($off:ident),* $(,)? }
        without_magic { $($on:ident),* $(,)? }
    ) => {
        /// Any decodable message
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum RakPacket {
            $($off($off),)*
            $($on($on),)*
        }

        $(
            impl From<$off> for RakPacket {
                fn from(packet: $off) -> Self {
                    RakPacket::$off(packet)
                }
            }
        )*
        $(
            impl From<$on> for RakPacket {
                fn from(packet: $on) -> Self {
                    RakPacket::$on(packet)
                }
            }
        )*

        impl RakPacket {
            pub fn identifier(&self) -> MessageIdentifier {
                match self {
                    $(RakPacket::$off(_) => MessageIdentifier::$off,)*
                    $(RakPacket::$on(_) => MessageIdentifier::$on,)*
                }
            }

            /// Write the full packet, ID byte included
            pub fn encode(&self, out: &mut PacketSerializer) -> Result<()> {
                match self {
                    $(RakPacket::$off(p) => p.encode(out),)*
                    $(RakPacket::$on(p) => p.encode(out),)*
                }
            }

            /// The offline magic, if this packet carries one
            pub fn magic(&self) -> Option<&Magic> {
                match self {
                    $(RakPacket::$off(p) => Some(p.magic()),)*
                    _ => None,
                }
            }

            fn decode_as(identifier: MessageIdentifier, input: &mut PacketSerializer) -> Result<Self> {
                match identifier {
                    $(MessageIdentifier::$off => <$off as Packet>::decode(input).map(RakPacket::$off),)*
                    $(MessageIdentifier::$on => <$on as Packet>::decode(input).map(RakPacket::$on),)*
                }
            }
        }
    };
}

rak_packets! {
    with_magic {
        UnconnectedPing,
        UnconnectedPingOpenConnections,
        UnconnectedPong,
        OpenConnectionRequestOne,
        OpenConnectionReplyOne,
        OpenConnectionRequestTwo,
        OpenConnectionReplyTwo,
        IncompatibleProtocolVersion,
    }
    without_magic {
        ConnectedPing,
        ConnectedPong,
        ConnectionRequest,
        ConnectionRequestAccepted,
        NewIncomingConnection,
        DisconnectNotification,
        AdvertiseSystem,
        Ack,
        Nack,
    }
}

impl RakPacket {
    /// Decode whichever packet the leading byte names.
    ///
    /// Unknown identifiers fail with [`ProtocolError::UnknownPacketId`]
    /// without consuming anything.
    pub fn decode(input: &mut PacketSerializer) -> Result<Self> {
        let identifier = MessageIdentifier::from_u8(input.peek_u8()?)?;
        Self::decode_as(identifier, input)
    }

    pub fn from_bytes(data: &[u8], options: CodecOptions) -> Result<Self> {
        let mut input = PacketSerializer::wrap(data.into(), options);
        Self::decode(&mut input)
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        self.to_bytes_with(CodecOptions::default())
    }

    pub fn to_bytes_with(&self, options: CodecOptions) -> Result<Bytes> {
        let mut out = PacketSerializer::with_options(options);
        self.encode(&mut out)?;
        Ok(out.freeze())
    }

    /// Leading wire byte of this packet
    pub fn id(&self) -> u8 {
        self.identifier().as_u8()
    }

    pub fn is_offline(&self) -> bool {
        self.magic().is_some()
    }

    /// Fails with [`ProtocolError::MagicMismatch`] when an offline packet
    /// arrived with the wrong magic. Online packets always pass.
    pub fn validate_magic(&self) -> Result<()> {
        match self.magic() {
            Some(magic) if !magic.is_valid() => Err(ProtocolError::MagicMismatch),
            _ => Ok(()),
        }
    }
}
