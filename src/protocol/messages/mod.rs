//! Concrete handshake messages, grouped by connection phase.

pub mod connected;
pub mod open_connection;
pub mod unconnected;

pub use connected::{
    ConnectedPing, ConnectedPong, ConnectionRequest, ConnectionRequestAccepted,
    DisconnectNotification, NewIncomingConnection,
};
pub use open_connection::{
    IncompatibleProtocolVersion, OpenConnectionReplyOne, OpenConnectionReplyTwo,
    OpenConnectionRequestOne, OpenConnectionRequestTwo, REQUEST_ONE_OVERHEAD,
};
pub use unconnected::{
    AdvertiseSystem, UnconnectedPing, UnconnectedPingOpenConnections, UnconnectedPingPacket,
    UnconnectedPong,
};
