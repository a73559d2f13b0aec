//! # Packet Framing
//!
//! Every message is a one-byte identifier followed by a payload. Concrete
//! types implement [`Packet`]; the header handling lives in its default
//! methods.
//!
//! ## Wire Format
//! ```text
//! [ID(1)] [payload(N)]
//! ```
//!
//! Offline packets also carry the 16-byte offline magic, but the position of
//! the magic differs per message so each payload writes it itself.

use bytes::Bytes;

use crate::config::OFFLINE_MESSAGE_MAGIC;
use crate::core::ack;
use crate::core::serializer::{CodecOptions, PacketSerializer};
use crate::error::{ProtocolError, Result};
use crate::protocol::identifiers::MessageIdentifier;

/// A message with a fixed wire identifier
pub trait Packet: Sized {
    /// Leading byte identifying this message on the wire
    const ID: u8;

    /// Write the fields following the ID byte
    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()>;

    /// Read the fields following the ID byte
    fn decode_payload(input: &mut PacketSerializer) -> Result<Self>;

    fn encode_header(&self, out: &mut PacketSerializer) {
        out.write_u8(Self::ID);
    }

    /// Write the ID byte followed by the payload
    fn encode(&self, out: &mut PacketSerializer) -> Result<()> {
        self.encode_header(out);
        self.encode_payload(out)
    }

    /// Consume the ID byte. On a mismatch the cursor is left where it was.
    fn decode_header(input: &mut PacketSerializer) -> Result<()> {
        let actual = input.peek_u8()?;
        if actual != Self::ID {
            return Err(ProtocolError::UnexpectedPacketId {
                expected: Self::ID,
                actual,
            });
        }
        input.skip(1)
    }

    /// Read a full packet, header included
    fn decode(input: &mut PacketSerializer) -> Result<Self> {
        Self::decode_header(input)?;
        Self::decode_payload(input)
    }

    fn to_bytes(&self) -> Result<Bytes> {
        self.to_bytes_with(CodecOptions::default())
    }

    fn to_bytes_with(&self, options: CodecOptions) -> Result<Bytes> {
        let mut out = PacketSerializer::with_options(options);
        self.encode(&mut out)?;
        Ok(out.freeze())
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, CodecOptions::default())
    }

    fn from_bytes_with(data: &[u8], options: CodecOptions) -> Result<Self> {
        let mut input = PacketSerializer::wrap(data.into(), options);
        Self::decode(&mut input)
    }
}

/// The 16 bytes that mark an offline message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Magic([u8; 16]);

impl Magic {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Whether these bytes equal the offline message magic
    pub fn is_valid(&self) -> bool {
        self.0 == OFFLINE_MESSAGE_MAGIC
    }

    pub fn read(input: &mut PacketSerializer) -> Result<Self> {
        input.read_array::<16>().map(Self)
    }

    pub fn write(&self, out: &mut PacketSerializer) {
        out.write_bytes(&self.0);
    }
}

impl Default for Magic {
    fn default() -> Self {
        Self(OFFLINE_MESSAGE_MAGIC)
    }
}

/// Packets exchanged before a connection exists.
///
/// Decoding keeps whatever magic arrived on the wire. Check
/// [`OfflinePacket::is_valid`] before trusting the payload.
pub trait OfflinePacket: Packet {
    fn magic(&self) -> &Magic;

    fn is_valid(&self) -> bool {
        self.magic().is_valid()
    }

    /// Like [`OfflinePacket::is_valid`] but as an error for `?` chains
    fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ProtocolError::MagicMismatch)
        }
    }

    fn read_magic(input: &mut PacketSerializer) -> Result<Magic> {
        Magic::read(input)
    }

    fn write_magic(&self, out: &mut PacketSerializer) {
        self.magic().write(out);
    }
}

/// Packets exchanged once a connection is established
pub trait OnlinePacket: Packet {}

/// A set of acknowledged (or negatively acknowledged) sequence numbers.
///
/// ACK and NACK differ only in their identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcknowledgePacket<const TAG: u8> {
    pub sequence_numbers: Vec<u32>,
}

/// Positive acknowledgment (0xC0)
pub type Ack = AcknowledgePacket<{ MessageIdentifier::Ack as u8 }>;

/// Negative acknowledgment (0xA0)
pub type Nack = AcknowledgePacket<{ MessageIdentifier::Nack as u8 }>;

impl<const TAG: u8> AcknowledgePacket<TAG> {
    pub fn new(sequence_numbers: Vec<u32>) -> Self {
        Self { sequence_numbers }
    }

    pub fn is_empty(&self) -> bool {
        self.sequence_numbers.is_empty()
    }

    /// Sort ascending and drop duplicates
    pub fn normalize(&mut self) {
        self.sequence_numbers.sort_unstable();
        self.sequence_numbers.dedup();
    }
}

impl<const TAG: u8> Packet for AcknowledgePacket<TAG> {
    const ID: u8 = TAG;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        ack::compress(&self.sequence_numbers, out).map(|_| ())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self::new(ack::decompress(input)?))
    }
}
