//! Two-phase open-connection exchange: MTU discovery and basic
//! anti-spoofing before the server commits a session.

use crate::config::DEFAULT_PROTOCOL_VERSION;
use crate::core::address::InternetAddress;
use crate::core::serializer::PacketSerializer;
use crate::error::{ProtocolError, Result};
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::packet::{Magic, OfflinePacket, Packet};

/// IP header (20) + UDP header (8) + ID (1) + magic (16) + protocol (1)
pub const REQUEST_ONE_OVERHEAD: u16 = 46;

/// MTU probe: `magic(16) + protocol(1) + zero padding`.
///
/// There is no length field. The padding brings the datagram up to
/// `mtu_size - 28` bytes and the receiver infers `mtu_size` from what is left
/// after the protocol byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnectionRequestOne {
    pub magic: Magic,
    pub protocol: u8,
    pub mtu_size: u16,
}

impl OpenConnectionRequestOne {
    pub fn new(protocol: u8, mtu_size: u16) -> Self {
        Self {
            magic: Magic::default(),
            protocol,
            mtu_size,
        }
    }
}

impl Default for OpenConnectionRequestOne {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL_VERSION, 1492)
    }
}

impl Packet for OpenConnectionRequestOne {
    const ID: u8 = MessageIdentifier::OpenConnectionRequestOne as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        let padding = self
            .mtu_size
            .checked_sub(REQUEST_ONE_OVERHEAD)
            .ok_or(ProtocolError::MtuTooSmall(self.mtu_size))?;
        self.write_magic(out);
        out.write_u8(self.protocol);
        out.write_zeros(usize::from(padding));
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        let magic = Self::read_magic(input)?;
        let protocol = input.read_u8()?;
        let padding = input.remaining();
        input.skip(padding)?;
        let mtu_size = u16::try_from(padding + usize::from(REQUEST_ONE_OVERHEAD))
            .unwrap_or(u16::MAX);
        Ok(Self {
            magic,
            protocol,
            mtu_size,
        })
    }
}

impl OfflinePacket for OpenConnectionRequestOne {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// `magic(16) + server_id(8) + use_security(1) + mtu_size(2)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenConnectionReplyOne {
    pub magic: Magic,
    pub server_id: u64,
    pub use_security: bool,
    pub mtu_size: u16,
}

impl OpenConnectionReplyOne {
    pub fn new(server_id: u64, use_security: bool, mtu_size: u16) -> Self {
        Self {
            magic: Magic::default(),
            server_id,
            use_security,
            mtu_size,
        }
    }
}

impl Packet for OpenConnectionReplyOne {
    const ID: u8 = MessageIdentifier::OpenConnectionReplyOne as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        self.write_magic(out);
        out.write_u64(self.server_id);
        out.write_bool(self.use_security);
        out.write_u16(self.mtu_size);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            magic: Self::read_magic(input)?,
            server_id: input.read_u64()?,
            use_security: input.read_bool()?,
            mtu_size: input.read_u16()?,
        })
    }
}

impl OfflinePacket for OpenConnectionReplyOne {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// `magic(16) + server_address + mtu_size(2) + client_id(8)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenConnectionRequestTwo {
    pub magic: Magic,
    pub server_address: InternetAddress,
    pub mtu_size: u16,
    pub client_id: u64,
}

impl OpenConnectionRequestTwo {
    pub fn new(server_address: InternetAddress, mtu_size: u16, client_id: u64) -> Self {
        Self {
            magic: Magic::default(),
            server_address,
            mtu_size,
            client_id,
        }
    }
}

impl Packet for OpenConnectionRequestTwo {
    const ID: u8 = MessageIdentifier::OpenConnectionRequestTwo as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        self.write_magic(out);
        out.write_address(&self.server_address);
        out.write_u16(self.mtu_size);
        out.write_u64(self.client_id);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            magic: Self::read_magic(input)?,
            server_address: input.read_address()?,
            mtu_size: input.read_u16()?,
            client_id: input.read_u64()?,
        })
    }
}

impl OfflinePacket for OpenConnectionRequestTwo {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// `magic(16) + server_id(8) + client_address + mtu_size(2) + use_security(1)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenConnectionReplyTwo {
    pub magic: Magic,
    pub server_id: u64,
    pub client_address: InternetAddress,
    pub mtu_size: u16,
    pub use_security: bool,
}

impl OpenConnectionReplyTwo {
    pub fn new(
        server_id: u64,
        client_address: InternetAddress,
        mtu_size: u16,
        use_security: bool,
    ) -> Self {
        Self {
            magic: Magic::default(),
            server_id,
            client_address,
            mtu_size,
            use_security,
        }
    }
}

impl Packet for OpenConnectionReplyTwo {
    const ID: u8 = MessageIdentifier::OpenConnectionReplyTwo as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        self.write_magic(out);
        out.write_u64(self.server_id);
        out.write_address(&self.client_address);
        out.write_u16(self.mtu_size);
        out.write_bool(self.use_security);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            magic: Self::read_magic(input)?,
            server_id: input.read_u64()?,
            client_address: input.read_address()?,
            mtu_size: input.read_u16()?,
            use_security: input.read_bool()?,
        })
    }
}

impl OfflinePacket for OpenConnectionReplyTwo {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}

/// Sent instead of [`OpenConnectionReplyOne`] when the protocol version is
/// not accepted: `protocol(1) + magic(16) + server_id(8)`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncompatibleProtocolVersion {
    pub protocol: u8,
    pub magic: Magic,
    pub server_id: u64,
}

impl IncompatibleProtocolVersion {
    pub fn new(protocol: u8, server_id: u64) -> Self {
        Self {
            protocol,
            magic: Magic::default(),
            server_id,
        }
    }
}

impl Packet for IncompatibleProtocolVersion {
    const ID: u8 = MessageIdentifier::IncompatibleProtocolVersion as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u8(self.protocol);
        self.write_magic(out);
        out.write_u64(self.server_id);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            protocol: input.read_u8()?,
            magic: Self::read_magic(input)?,
            server_id: input.read_u64()?,
        })
    }
}

impl OfflinePacket for IncompatibleProtocolVersion {
    fn magic(&self) -> &Magic {
        &self.magic
    }
}
