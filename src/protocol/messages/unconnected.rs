//! Discovery messages exchanged without a connection.

use crate::core::serializer::PacketSerializer;
use crate::error::{ProtocolError, Result};
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::packet::{Magic, OfflinePacket, Packet};

/// Unconnected ping. The two identifiers share one layout:
/// `send_time(8) + magic(16) + client_id`.
///
/// `client_id` is written as 8 bytes. On decode its width is taken from what
/// is left in the datagram (8, 2 or 1 bytes), since older peers send it
/// narrower.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnconnectedPingPacket<const TAG: u8> {
    pub send_time: u64,
    pub magic: Magic,
    pub client_id: u64,
}

/// Ping from an unconnected system (0x01)
pub type UnconnectedPing = UnconnectedPingPacket<{ MessageIdentifier::UnconnectedPing as u8 }>;

/// Ping answered only when the server has open slots (0x02)
pub type UnconnectedPingOpenConnections =
    UnconnectedPingPacket<{ MessageIdentifier::UnconnectedPingOpenConnections as u8 }>;

impl<const TAG: u8> UnconnectedPingPacket<TAG> {
    pub fn new(send_time: u64, client_id: u64) -> Self {
        Self {
            send_time,
            magic: Magic::default(),
            client_id,
        }
    }
}

impl<const TAG: u8> Packet for UnconnectedPingPacket<TAG> {
    const ID: u8 = TAG;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u64(self.send_time);
        self.write_magic(out);
        out.write_u64(self.client_id);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        let send_time = input.read_u64()?;
        let magic = Self::read_magic(input)?;
        let client_id = match input.remaining() {
            0 => {
                return Err(ProtocolError::BufferUnderrun {
                    needed: 1,
                    remaining: 0,
                })
            }
            1 => u64::from(input.read_u8()?),
            2..=7 => u64::from(input.read_u16()?),
            _ => input.read_u64()?,
        };
        Ok(Self {
            send_time,
            magic,
            client_id,
        })
    }
}

impl<const TAG: u8> OfflinePacket for UnconnectedPingPacket<TAG> {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// Server answer to a ping: `send_time(8) + server_id(8) + magic(16) + response`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnconnectedPong {
    pub send_time: u64,
    pub server_id: u64,
    pub magic: Magic,
    pub response: String,
}

impl UnconnectedPong {
    pub fn new(send_time: u64, server_id: u64, response: impl Into<String>) -> Self {
        Self {
            send_time,
            server_id,
            magic: Magic::default(),
            response: response.into(),
        }
    }
}

impl Packet for UnconnectedPong {
    const ID: u8 = MessageIdentifier::UnconnectedPong as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u64(self.send_time);
        out.write_u64(self.server_id);
        self.write_magic(out);
        out.write_string(&self.response)
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            send_time: input.read_u64()?,
            server_id: input.read_u64()?,
            magic: Self::read_magic(input)?,
            response: input.read_string()?,
        })
    }
}

impl OfflinePacket for UnconnectedPong {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// Advertises system data to a remote peer: `response` string only
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvertiseSystem {
    pub response: String,
}

impl AdvertiseSystem {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl Packet for AdvertiseSystem {
    const ID: u8 = MessageIdentifier::AdvertiseSystem as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_string(&self.response)
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            response: input.read_string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::OFFLINE_MESSAGE_MAGIC;

    #[test]
    fn test_ping_layout() {
        let ping = UnconnectedPing::new(0x0102_0304_0506_0708, 0xAABB);
        let bytes = ping.to_bytes().unwrap();
        assert_eq!(bytes.len(), 1 + 8 + 16 + 8);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[9..25], &OFFLINE_MESSAGE_MAGIC);
        assert_eq!(&bytes[25..], &[0, 0, 0, 0, 0, 0, 0xAA, 0xBB]);

        let decoded = UnconnectedPing::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, ping);
        assert!(decoded.is_valid());
    }

    #[test]
    fn test_ping_open_connections_id() {
        let ping = UnconnectedPingOpenConnections::new(5, 6);
        let bytes = ping.to_bytes().unwrap();
        assert_eq!(bytes[0], 0x02);
        assert!(UnconnectedPing::from_bytes(&bytes).is_err());
        assert_eq!(
            UnconnectedPingOpenConnections::from_bytes(&bytes).unwrap(),
            ping
        );
    }

    #[test]
    fn test_ping_narrow_client_id() {
        let mut s = PacketSerializer::new();
        s.write_u8(0x01);
        s.write_u64(99);
        s.write_bytes(&OFFLINE_MESSAGE_MAGIC);
        s.write_u16(0x1234);
        let decoded = UnconnectedPing::decode(&mut s).unwrap();
        assert_eq!(decoded.client_id, 0x1234);

        let mut s = PacketSerializer::new();
        s.write_u8(0x01);
        s.write_u64(99);
        s.write_bytes(&OFFLINE_MESSAGE_MAGIC);
        s.write_u8(7);
        assert_eq!(UnconnectedPing::decode(&mut s).unwrap().client_id, 7);
    }

    #[test]
    fn test_ping_missing_client_id() {
        let mut s = PacketSerializer::new();
        s.write_u8(0x01);
        s.write_u64(99);
        s.write_bytes(&OFFLINE_MESSAGE_MAGIC);
        assert!(matches!(
            UnconnectedPing::decode(&mut s),
            Err(ProtocolError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_pong_roundtrip() {
        let pong = UnconnectedPong::new(1, 2, "MCPE;Dedicated Server;390;1.14.60;0;10");
        let bytes = pong.to_bytes().unwrap();
        assert_eq!(bytes[0], 0x1C);
        assert_eq!(&bytes[17..33], &OFFLINE_MESSAGE_MAGIC);
        assert_eq!(UnconnectedPong::from_bytes(&bytes).unwrap(), pong);
    }

    #[test]
    fn test_advertise_system() {
        let advert = AdvertiseSystem::new("hello");
        let bytes = advert.to_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[0x1D, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(AdvertiseSystem::from_bytes(&bytes).unwrap(), advert);
    }
}
