//! # raknet-protocol
//!
//! Wire-level packet protocol for RakNet-compatible UDP peers: field
//! encoding, the offline/online message catalog, the connection handshake
//! and ACK/NACK range compression.
//!
//! The packet layer is synchronous and does no I/O. [`transport`] provides
//! tokio UDP sockets and [`core::codec::RakCodec`] plugs into
//! `tokio_util::udp::UdpFramed` for callers that want a stream of packets.
//!
//! ```
//! use raknet_protocol::protocol::messages::{UnconnectedPing, UnconnectedPong};
//! use raknet_protocol::protocol::{handshake, Packet, RakPacket};
//! use raknet_protocol::core::serializer::CodecOptions;
//!
//! let datagram = UnconnectedPing::new(1_000, 42).to_bytes().unwrap();
//! if let RakPacket::UnconnectedPing(ping) =
//!     RakPacket::from_bytes(&datagram, CodecOptions::default()).unwrap()
//! {
//!     let pong: UnconnectedPong = handshake::answer_ping(&ping, 7, "MCPE;Server").unwrap();
//!     assert_eq!(pong.send_time, 1_000);
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::ProtocolConfig;
pub use crate::core::codec::RakCodec;
pub use crate::core::serializer::{CodecOptions, PacketSerializer};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{MessageIdentifier, Packet, RakPacket};
