//! # Core Protocol Components
//!
//! Low-level field serialization and the datagram codec.
//!
//! This module provides the foundation every packet is built on: a byte
//! cursor with RakNet's integer, triad, string and address encodings, the
//! ACK/NACK range compression and a `tokio-util` codec for UDP.
//!
//! ## Components
//! - **Serializer**: [`PacketSerializer`](serializer::PacketSerializer) and its [`CodecOptions`](serializer::CodecOptions)
//! - **Address**: IPv4/IPv6 endpoint encoding
//! - **Ack**: sequence-number record compression with decode caps
//! - **Codec**: one datagram in, one [`RakPacket`](crate::protocol::RakPacket) out
//!
//! ## Security
//! - Reads never pass the end of the buffer
//! - ACK ranges expand to at most 513 entries and 4096 per payload by default
//! - Nothing allocates from an untrusted length before checking what remains

pub mod ack;
pub mod address;
pub mod codec;
pub mod serializer;
