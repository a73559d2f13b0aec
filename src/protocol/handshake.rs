//! RakNet connection handshake.
//!
//! Pure builders for each step of the exchange. Nothing here touches a
//! socket or a clock other than through [`current_timestamp`]; callers own
//! I/O, retries and timeouts.
//!
//! ```text
//! client                                   server
//!   | OpenConnectionRequestOne (MTU probe) -> |
//!   | <- OpenConnectionReplyOne               |   or IncompatibleProtocolVersion
//!   | OpenConnectionRequestTwo             -> |
//!   | <- OpenConnectionReplyTwo               |
//!   | ConnectionRequest                    -> |
//!   | <- ConnectionRequestAccepted            |
//!   | NewIncomingConnection                -> |
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::address::InternetAddress;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::acceptor::ProtocolAcceptor;
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::messages::*;
use crate::protocol::packet::OfflinePacket;
use crate::protocol::registry::RakPacket;

use tracing::{debug, instrument, warn};

/// Milliseconds since the Unix epoch, the unit of every RakNet timestamp
///
/// # Errors
/// Returns a `ProtocolError::Custom` if the system time is earlier than UNIX_EPOCH
pub fn current_timestamp() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .map_err(|_| ProtocolError::Custom(constants::ERR_SYSTEM_TIME.into()))
}

/// Server: answer an MTU probe.
///
/// Replies with [`OpenConnectionReplyOne`] echoing the probed MTU when the
/// acceptor takes the client's protocol, otherwise with
/// [`IncompatibleProtocolVersion`] carrying the version we speak.
#[instrument(skip(acceptor, request), fields(protocol = request.protocol, mtu = request.mtu_size))]
pub fn respond_to_request_one(
    acceptor: &ProtocolAcceptor,
    request: &OpenConnectionRequestOne,
    server_id: u64,
    use_security: bool,
) -> Result<RakPacket> {
    request.validate()?;

    if !acceptor.accepts(request.protocol) {
        warn!(
            expected = acceptor.version(),
            "Rejecting open connection request with incompatible protocol"
        );
        return Ok(IncompatibleProtocolVersion::new(acceptor.version(), server_id).into());
    }

    debug!("Accepted MTU probe");
    Ok(OpenConnectionReplyOne::new(server_id, use_security, request.mtu_size).into())
}

/// Server: answer the second open-connection request, echoing its MTU
#[instrument(skip(request), fields(mtu = request.mtu_size, client_id = request.client_id))]
pub fn respond_to_request_two(
    request: &OpenConnectionRequestTwo,
    client_address: InternetAddress,
    server_id: u64,
    use_security: bool,
) -> Result<OpenConnectionReplyTwo> {
    request.validate()?;
    debug!(%client_address, "Replying to open connection request two");
    Ok(OpenConnectionReplyTwo::new(
        server_id,
        client_address,
        request.mtu_size,
        use_security,
    ))
}

/// Server: accept a [`ConnectionRequest`], echoing its send time
#[instrument(skip(request), fields(client_id = request.client_id))]
pub fn accept_connection(
    request: &ConnectionRequest,
    client_address: InternetAddress,
    receive_time: u64,
    system_address_count: usize,
) -> ConnectionRequestAccepted {
    debug!(%client_address, "Accepting connection request");
    ConnectionRequestAccepted::new(client_address, request.send_time, receive_time)
        .with_system_addresses(vec![InternetAddress::unspecified(); system_address_count])
}

/// Server: answer an unconnected ping with our advertisement string
pub fn answer_ping<P>(ping: &P, server_id: u64, response: impl Into<String>) -> Result<UnconnectedPong>
where
    P: PingLike,
{
    if !ping.magic_is_valid() {
        return Err(ProtocolError::MagicMismatch);
    }
    Ok(UnconnectedPong::new(ping.send_time(), server_id, response))
}

/// Either side: answer a connected ping
pub fn answer_connected_ping(ping: &ConnectedPing, receive_time: u64) -> ConnectedPong {
    ConnectedPong::new(ping.send_time, receive_time)
}

/// Both unconnected ping flavours
pub trait PingLike {
    fn send_time(&self) -> u64;
    fn magic_is_valid(&self) -> bool;
}

impl<const TAG: u8> PingLike for UnconnectedPingPacket<TAG> {
    fn send_time(&self) -> u64 {
        self.send_time
    }

    fn magic_is_valid(&self) -> bool {
        self.is_valid()
    }
}

/// Client: build the MTU probe
pub fn request_one(protocol: u8, mtu_size: u16) -> OpenConnectionRequestOne {
    OpenConnectionRequestOne::new(protocol, mtu_size)
}

/// Client: follow up an accepted probe, keeping the MTU the server agreed to
#[instrument(skip(reply), fields(server_id = reply.server_id))]
pub fn request_two(
    reply: &OpenConnectionReplyOne,
    server_address: InternetAddress,
    client_id: u64,
) -> Result<OpenConnectionRequestTwo> {
    reply.validate()?;
    debug!(mtu = reply.mtu_size, "Server accepted MTU probe");
    Ok(OpenConnectionRequestTwo::new(
        server_address,
        reply.mtu_size,
        client_id,
    ))
}

/// Client: acknowledge an accepted connection, echoing the server's address table
pub fn new_incoming_connection(
    accepted: &ConnectionRequestAccepted,
    server_address: InternetAddress,
    receive_time: u64,
) -> NewIncomingConnection {
    NewIncomingConnection::new(server_address, accepted.receive_time, receive_time)
        .with_system_addresses(accepted.system_addresses.clone())
}

/// Position in the handshake, named by the message that should arrive next.
///
/// `Rejected` and `Disconnected` are terminal: the server refused the
/// protocol version, or either side sent a disconnect notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandshakeStage {
    #[default]
    RequestOne,
    ReplyOne,
    RequestTwo,
    ReplyTwo,
    ConnectionRequest,
    ConnectionRequestAccepted,
    NewIncomingConnection,
    Connected,
    Rejected,
    Disconnected,
}

impl HandshakeStage {
    /// The message expected at this stage, `None` once connected or finished
    pub fn expected_next(self) -> Option<MessageIdentifier> {
        match self {
            HandshakeStage::RequestOne => Some(MessageIdentifier::OpenConnectionRequestOne),
            HandshakeStage::ReplyOne => Some(MessageIdentifier::OpenConnectionReplyOne),
            HandshakeStage::RequestTwo => Some(MessageIdentifier::OpenConnectionRequestTwo),
            HandshakeStage::ReplyTwo => Some(MessageIdentifier::OpenConnectionReplyTwo),
            HandshakeStage::ConnectionRequest => Some(MessageIdentifier::ConnectionRequest),
            HandshakeStage::ConnectionRequestAccepted => {
                Some(MessageIdentifier::ConnectionRequestAccepted)
            }
            HandshakeStage::NewIncomingConnection => {
                Some(MessageIdentifier::NewIncomingConnection)
            }
            HandshakeStage::Connected
            | HandshakeStage::Rejected
            | HandshakeStage::Disconnected => None,
        }
    }

    pub fn successor(self) -> Self {
        match self {
            HandshakeStage::RequestOne => HandshakeStage::ReplyOne,
            HandshakeStage::ReplyOne => HandshakeStage::RequestTwo,
            HandshakeStage::RequestTwo => HandshakeStage::ReplyTwo,
            HandshakeStage::ReplyTwo => HandshakeStage::ConnectionRequest,
            HandshakeStage::ConnectionRequest => HandshakeStage::ConnectionRequestAccepted,
            HandshakeStage::ConnectionRequestAccepted => HandshakeStage::NewIncomingConnection,
            HandshakeStage::NewIncomingConnection | HandshakeStage::Connected => {
                HandshakeStage::Connected
            }
            HandshakeStage::Rejected => HandshakeStage::Rejected,
            HandshakeStage::Disconnected => HandshakeStage::Disconnected,
        }
    }

    /// Move past `packet` if it is legal at this stage.
    ///
    /// A disconnect notification ends the handshake from any live stage,
    /// including `Connected`. An incompatible protocol reply to the MTU probe
    /// ends it in `Rejected`.
    ///
    /// # Errors
    /// [`ProtocolError::UnexpectedPacketId`] for any other message and
    /// [`ProtocolError::UnexpectedMessage`] once connected or finished.
    pub fn advance(self, packet: &RakPacket) -> Result<Self> {
        if self.is_finished() {
            return Err(ProtocolError::UnexpectedMessage);
        }

        let actual = packet.identifier();
        match (self, actual) {
            (_, MessageIdentifier::DisconnectNotification) => {
                return Ok(HandshakeStage::Disconnected)
            }
            (HandshakeStage::ReplyOne, MessageIdentifier::IncompatibleProtocolVersion) => {
                return Ok(HandshakeStage::Rejected)
            }
            _ => {}
        }

        let expected = self.expected_next().ok_or(ProtocolError::UnexpectedMessage)?;
        if actual != expected {
            return Err(ProtocolError::UnexpectedPacketId {
                expected: expected.as_u8(),
                actual: actual.as_u8(),
            });
        }
        Ok(self.successor())
    }

    pub fn is_connected(self) -> bool {
        self == HandshakeStage::Connected
    }

    /// No further message can move this stage
    pub fn is_finished(self) -> bool {
        matches!(self, HandshakeStage::Rejected | HandshakeStage::Disconnected)
    }
}
