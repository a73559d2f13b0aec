//! # Transport Layer
//!
//! UDP sockets that carry RakNet datagrams. The packet layer never touches
//! them; callers receive bytes here and hand them to the codec.

pub mod udp;

pub use udp::{receive_packet, ClientSocket, DatagramSocket, ServerSocket};
