//! # Datagram Codec
//!
//! `tokio-util` codec turning one UDP datagram into one [`RakPacket`].
//!
//! UDP preserves message boundaries, so there is no length prefix: each call
//! to [`Decoder::decode`] takes the whole buffer as a single datagram. A
//! datagram that fails to parse is logged, counted and dropped and the
//! decoder returns `Ok(None)`, so a [`UdpFramed`](tokio_util::udp::UdpFramed)
//! stream keeps running. Use [`RakCodec::decode_datagram`] to see the error.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

use crate::config::CodecConfig;
use crate::core::serializer::{CodecOptions, PacketSerializer};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::RakPacket;
use crate::utils::metrics::{global_metrics, Timer};

/// Codec for RakNet datagrams
#[derive(Debug, Clone, Copy, Default)]
pub struct RakCodec {
    options: CodecOptions,
    reject_invalid_magic: bool,
}

impl RakCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            options,
            reject_invalid_magic: false,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            options: config.options(),
            reject_invalid_magic: config.reject_invalid_magic,
        }
    }

    /// Drop offline datagrams whose magic does not match
    pub fn reject_invalid_magic(mut self, reject: bool) -> Self {
        self.reject_invalid_magic = reject;
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode one datagram, surfacing parse failures.
    ///
    /// Trailing bytes after a well-formed packet are ignored.
    pub fn decode_datagram(&self, datagram: impl Into<BytesMut>) -> Result<RakPacket> {
        let mut input = PacketSerializer::wrap(datagram.into(), self.options);
        let packet = RakPacket::decode(&mut input)?;

        if self.reject_invalid_magic {
            packet.validate_magic()?;
        }

        if !input.is_eof() {
            trace!(
                id = %packet.identifier(),
                trailing = input.remaining(),
                "Ignoring trailing bytes"
            );
        }
        Ok(packet)
    }

    /// Encode one packet into a fresh datagram
    pub fn encode_datagram(&self, packet: &RakPacket) -> Result<Bytes> {
        packet.to_bytes_with(self.options)
    }
}

/// Count a successfully decoded packet
pub(crate) fn record_decoded(packet: &RakPacket) {
    let metrics = global_metrics();
    metrics.packet_decoded();
    match packet {
        RakPacket::Ack(_) => metrics.ack_seen(),
        RakPacket::Nack(_) => metrics.nack_seen(),
        _ => {}
    }
}

impl Decoder for RakCodec {
    type Item = RakPacket;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }

        let _timer = Timer::start("decode_datagram");
        // The whole buffer is one datagram
        let datagram = src.split();
        let len = datagram.len();

        match self.decode_datagram(datagram) {
            Ok(packet) => {
                record_decoded(&packet);
                debug!(id = %packet.identifier(), len, "Decoded datagram");
                Ok(Some(packet))
            }
            Err(e) if e.is_parse_failure() => {
                global_metrics().decode_failed(&e);
                warn!(error = %e, len, "Discarding malformed datagram");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Encoder<RakPacket> for RakCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: RakPacket, dst: &mut BytesMut) -> Result<()> {
        let mut out = PacketSerializer::wrap(dst.split_off(dst.len()), self.options);
        item.encode(&mut out)?;

        let written = out.len();
        dst.unsplit(out.into_inner());
        trace!(id = %item.identifier(), len = written, "Encoded datagram");
        Ok(())
    }
}
