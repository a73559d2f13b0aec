//! # Binary Field Codec
//!
//! A cursor over a [`BytesMut`] buffer used by every packet to read and write
//! its fields.
//!
//! Writes always append to the end of the buffer. Reads advance an internal
//! offset and never move past the end: a read that would overrun fails with
//! [`ProtocolError::BufferUnderrun`] and leaves the cursor where it was.
//!
//! ## Byte Order
//! Multi-byte integers use the serializer's configured [`ByteOrder`]
//! (big-endian unless overridden). Each integer accessor has a `*_with`
//! variant taking an explicit order for the fields that the wire format
//! pins to little-endian (ACK triads and the IPv6 family tag).
//!
//! ## Strings
//! ASCII only, 2-byte length prefix, no terminator.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::config::SYSTEM_ADDRESS_COUNT;
use crate::core::ack::{AckDecodeMode, AckLimits};
use crate::error::{constants, ProtocolError, Result};

/// Byte order for multi-byte integer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Network order (default for RakNet)
    #[default]
    BigEndian,
    /// Used for ACK triads and the IPv6 address-family tag
    LittleEndian,
}

/// Options carried by a serializer and consulted by packet codecs.
///
/// These replace process-wide constants: anything a packet needs to know about
/// the peer's flavour of RakNet is passed in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Default order for integer fields
    pub byte_order: ByteOrder,
    /// Size of the system address table in connection packets
    pub system_address_count: usize,
    /// Caps applied while expanding ACK/NACK records
    pub ack_limits: AckLimits,
    /// Record read shape used when decoding ACK/NACK payloads
    pub ack_decode_mode: AckDecodeMode,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::BigEndian,
            system_address_count: SYSTEM_ADDRESS_COUNT,
            ack_limits: AckLimits::default(),
            ack_decode_mode: AckDecodeMode::Standard,
        }
    }
}

/// Read/write cursor over a packet buffer
#[derive(Debug, Clone, Default)]
pub struct PacketSerializer {
    buffer: BytesMut,
    offset: usize,
    options: CodecOptions,
}

impl PacketSerializer {
    /// Create an empty serializer for writing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty serializer with explicit codec options
    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            buffer: BytesMut::new(),
            offset: 0,
            options,
        }
    }

    /// Create an empty serializer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Wrap received bytes for reading
    pub fn from_slice(data: &[u8]) -> Self {
        Self::wrap(BytesMut::from(data), CodecOptions::default())
    }

    /// Wrap an existing buffer with explicit codec options
    pub fn wrap(buffer: BytesMut, options: CodecOptions) -> Self {
        Self {
            buffer,
            offset: 0,
            options,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Entire underlying buffer, including bytes already read
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current read position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// True once every byte has been read
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Byte at the read position without consuming it
    pub fn peek_u8(&self) -> Result<u8> {
        self.buffer
            .get(self.offset)
            .copied()
            .ok_or(ProtocolError::BufferUnderrun {
                needed: 1,
                remaining: 0,
            })
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.offset = 0;
    }

    pub fn into_inner(self) -> BytesMut {
        self.buffer
    }

    /// Consume the serializer and return the written bytes
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }

    fn take(&mut self, needed: usize) -> Result<&[u8]> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ProtocolError::BufferUnderrun { needed, remaining });
        }
        let start = self.offset;
        self.offset += needed;
        Ok(&self.buffer[start..start + needed])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.put_u8(value);
    }

    /// Reads one byte; any non-zero value is `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_u16_with(self.options.byte_order)
    }

    pub fn read_u16_with(&mut self, order: ByteOrder) -> Result<u16> {
        let bytes = self.take_array::<2>()?;
        Ok(match order {
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
        })
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_u16_with(value, self.options.byte_order);
    }

    pub fn write_u16_with(&mut self, value: u16, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.buffer.put_u16(value),
            ByteOrder::LittleEndian => self.buffer.put_u16_le(value),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_u32_with(self.options.byte_order)
    }

    pub fn read_u32_with(&mut self, order: ByteOrder) -> Result<u32> {
        let bytes = self.take_array::<4>()?;
        Ok(match order {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        })
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_u32_with(value, self.options.byte_order);
    }

    pub fn write_u32_with(&mut self, value: u32, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.buffer.put_u32(value),
            ByteOrder::LittleEndian => self.buffer.put_u32_le(value),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_u64_with(self.options.byte_order)
    }

    pub fn read_u64_with(&mut self, order: ByteOrder) -> Result<u64> {
        let bytes = self.take_array::<8>()?;
        Ok(match order {
            ByteOrder::BigEndian => u64::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u64::from_le_bytes(bytes),
        })
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_u64_with(value, self.options.byte_order);
    }

    pub fn write_u64_with(&mut self, value: u64, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.buffer.put_u64(value),
            ByteOrder::LittleEndian => self.buffer.put_u64_le(value),
        }
    }

    /// Read a 24-bit unsigned integer
    pub fn read_triad(&mut self, order: ByteOrder) -> Result<u32> {
        let [a, b, c] = self.take_array::<3>()?;
        Ok(match order {
            ByteOrder::BigEndian => u32::from_be_bytes([0, a, b, c]),
            ByteOrder::LittleEndian => u32::from_le_bytes([a, b, c, 0]),
        })
    }

    /// Write the low 24 bits of `value`
    pub fn write_triad(&mut self, value: u32, order: ByteOrder) {
        match order {
            ByteOrder::BigEndian => self.buffer.put_slice(&value.to_be_bytes()[1..]),
            ByteOrder::LittleEndian => self.buffer.put_slice(&value.to_le_bytes()[..3]),
        }
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.take(len).map(Bytes::copy_from_slice)
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.take_array::<N>()
    }

    /// Read everything left in the buffer
    pub fn read_remaining(&mut self) -> Bytes {
        let start = self.offset;
        self.offset = self.buffer.len();
        Bytes::copy_from_slice(&self.buffer[start..])
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.put_slice(data);
    }

    pub fn write_zeros(&mut self, len: usize) {
        self.buffer.put_bytes(0, len);
    }

    /// Read a length-prefixed ASCII string
    pub fn read_string(&mut self) -> Result<String> {
        let len = usize::from(self.read_u16()?);
        let bytes = self.take(len)?;
        if !bytes.is_ascii() {
            return Err(ProtocolError::InvalidString(
                constants::ERR_STRING_NOT_ASCII.to_string(),
            ));
        }
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| ProtocolError::InvalidString(e.to_string()))
    }

    /// Write a length-prefixed ASCII string
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        if !value.is_ascii() {
            return Err(ProtocolError::InvalidString(
                constants::ERR_STRING_NOT_ASCII.to_string(),
            ));
        }
        let len = u16::try_from(value.len()).map_err(|_| {
            ProtocolError::InvalidString(constants::ERR_STRING_TOO_LONG.to_string())
        })?;
        self.write_u16(len);
        self.write_bytes(value.as_bytes());
        Ok(())
    }
}
