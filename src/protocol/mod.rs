//! # RakNet Handshake Protocol
//!
//! Message identifiers, the packet framing contract, every handshake
//! message and the pieces that route and answer them.
//!
//! ## Components
//! - **Packet**: [`Packet`] trait plus the offline/online split and ACK/NACK
//! - **Messages**: one type per handshake message
//! - **Registry**: [`RakPacket`], decode by leading byte
//! - **Dispatcher**: per-identifier handlers
//! - **Handshake**: pure builders for each step of the exchange

pub mod acceptor;
pub mod disconnect;
pub mod dispatcher;
pub mod handshake;
pub mod identifiers;
pub mod messages;
pub mod packet;
pub mod registry;
pub mod reliability;

pub use acceptor::ProtocolAcceptor;
pub use disconnect::DisconnectReason;
pub use dispatcher::Dispatcher;
pub use handshake::HandshakeStage;
pub use identifiers::MessageIdentifier;
pub use packet::{Ack, AcknowledgePacket, Magic, Nack, OfflinePacket, OnlinePacket, Packet};
pub use registry::RakPacket;
pub use reliability::PacketReliability;

#[cfg(test)]
mod tests;
