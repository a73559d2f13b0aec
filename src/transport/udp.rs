//! UDP sockets speaking RakNet datagrams.
//!
//! [`ServerSocket`] is unconnected: every receive yields the sender and every
//! send names its destination. [`ClientSocket`] is connected to one peer.
//! Both implement [`DatagramSocket`] so packet-level helpers work with either.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::Mutex;
use tokio_util::udp::UdpFramed;
use tracing::{debug, info, instrument, warn};

use crate::config::{SocketConfig, MAX_DATAGRAM_SIZE};
use crate::core::codec::{record_decoded, RakCodec};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::RakPacket;
use crate::utils::metrics::global_metrics;

/// Receive side shared by both socket flavours
pub trait DatagramSocket {
    /// Take a datagram if one is already queued, `None` on would-block
    fn try_receive(&self) -> io::Result<Option<(Bytes, SocketAddr)>>;

    /// Wait for the next datagram
    fn receive(&self) -> impl Future<Output = io::Result<(Bytes, SocketAddr)>> + Send;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

fn record_received(result: io::Result<(usize, SocketAddr)>) -> io::Result<(usize, SocketAddr)> {
    match &result {
        Ok((len, _)) => global_metrics().datagram_received(*len as u64),
        Err(e) if e.kind() != io::ErrorKind::WouldBlock => global_metrics().socket_error(),
        Err(_) => {}
    }
    result
}

fn record_sent(result: io::Result<usize>) -> io::Result<usize> {
    match &result {
        Ok(len) => global_metrics().datagram_sent(*len as u64),
        Err(_) => global_metrics().socket_error(),
    }
    result
}

/// Receive space kept across calls.
///
/// Each datagram is split off the front as [`Bytes`]; the allocation is
/// reclaimed on a later receive once every split-off datagram is dropped.
#[derive(Debug)]
struct ReceiveBuffer {
    buffer: Mutex<BytesMut>,
    max_datagram_size: usize,
}

impl ReceiveBuffer {
    fn new(max_datagram_size: usize) -> Self {
        Self {
            buffer: Mutex::new(BytesMut::with_capacity(max_datagram_size)),
            max_datagram_size,
        }
    }

    fn prepare(&self, buffer: &mut BytesMut) {
        buffer.clear();
        buffer.reserve(self.max_datagram_size);
    }

    /// Run a non-blocking read against the retained buffer. While an async
    /// receive holds it, a one-off buffer is used instead.
    fn try_fill<F>(&self, read: F) -> io::Result<Option<(Bytes, SocketAddr)>>
    where
        F: FnOnce(&mut BytesMut) -> io::Result<(usize, SocketAddr)>,
    {
        let mut spare;
        let mut guard = self.buffer.try_lock().ok();
        let buffer = match guard.as_deref_mut() {
            Some(buffer) => buffer,
            None => {
                spare = BytesMut::new();
                &mut spare
            }
        };
        self.prepare(buffer);

        match record_received(read(&mut *buffer)) {
            Ok((len, from)) => Ok(Some((buffer.split_to(len).freeze(), from))),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Unconnected socket serving many peers
#[derive(Debug)]
pub struct ServerSocket {
    socket: UdpSocket,
    receive: ReceiveBuffer,
    receive_timeout: Duration,
}

impl ServerSocket {
    #[instrument(skip(addr))]
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(address = %socket.local_addr()?, "Listening for datagrams");
        Ok(Self {
            socket,
            receive: ReceiveBuffer::new(MAX_DATAGRAM_SIZE),
            receive_timeout: SocketConfig::default().receive_timeout,
        })
    }

    /// Bind to `config.address`, applying the broadcast flag and sizes
    pub async fn from_config(config: &SocketConfig) -> Result<Self> {
        let addr: SocketAddr = config.address.parse().map_err(|_| {
            ProtocolError::ConfigError(format!("Invalid socket address: {}", config.address))
        })?;
        let mut server = Self::bind(addr).await?;
        server.set_broadcast(config.broadcast)?;
        server.receive = ReceiveBuffer::new(config.max_datagram_size);
        server.receive_timeout = config.receive_timeout;
        Ok(server)
    }

    pub fn set_broadcast(&self, on: bool) -> io::Result<()> {
        self.socket.set_broadcast(on)
    }

    pub fn broadcast(&self) -> io::Result<bool> {
        self.socket.broadcast()
    }

    pub async fn send_to(&self, buffer: &[u8], target: SocketAddr) -> io::Result<usize> {
        record_sent(self.socket.send_to(buffer, target).await)
    }

    /// Encode and send one packet
    #[instrument(skip(self, packet, codec), fields(id = %packet.identifier()))]
    pub async fn send_packet(
        &self,
        packet: &RakPacket,
        target: SocketAddr,
        codec: &RakCodec,
    ) -> Result<usize> {
        let bytes = codec.encode_datagram(packet)?;
        Ok(self.send_to(&bytes, target).await?)
    }

    /// Like [`DatagramSocket::receive`] but gives up after the configured timeout
    pub async fn receive_timeout(&self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        match tokio::time::timeout(self.receive_timeout, self.receive()).await {
            Ok(received) => received.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Hand the socket to a `tokio-util` framed stream/sink
    pub fn into_framed(self, codec: RakCodec) -> UdpFramed<RakCodec> {
        UdpFramed::new(self.socket, codec)
    }
}

impl DatagramSocket for ServerSocket {
    fn try_receive(&self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        self.receive
            .try_fill(|buffer| self.socket.try_recv_buf_from(buffer))
    }

    async fn receive(&self) -> io::Result<(Bytes, SocketAddr)> {
        let mut buffer = self.receive.buffer.lock().await;
        self.receive.prepare(&mut buffer);
        let (len, from) = record_received(self.socket.recv_buf_from(&mut *buffer).await)?;
        Ok((buffer.split_to(len).freeze(), from))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// Socket connected to a single server
#[derive(Debug)]
pub struct ClientSocket {
    socket: UdpSocket,
    peer: SocketAddr,
    receive: ReceiveBuffer,
}

impl ClientSocket {
    /// Bind an ephemeral port of the peer's family and connect to `peer`
    #[instrument]
    pub async fn connect(peer: SocketAddr) -> Result<Self> {
        let bind: SocketAddr = if peer.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind).await?;
        socket.connect(peer).await?;
        debug!(local = %socket.local_addr()?, "Connected datagram socket");
        Ok(Self {
            socket,
            peer,
            receive: ReceiveBuffer::new(MAX_DATAGRAM_SIZE),
        })
    }

    /// Connect to `config.address`
    pub async fn from_config(config: &SocketConfig) -> Result<Self> {
        let peer: SocketAddr = config.address.parse().map_err(|_| {
            ProtocolError::ConfigError(format!("Invalid socket address: {}", config.address))
        })?;
        let mut client = Self::connect(peer).await?;
        client.receive = ReceiveBuffer::new(config.max_datagram_size);
        Ok(client)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub async fn send(&self, buffer: &[u8]) -> io::Result<usize> {
        record_sent(self.socket.send(buffer).await)
    }

    /// Encode and send one packet to the peer
    #[instrument(skip(self, packet, codec), fields(id = %packet.identifier()))]
    pub async fn send_packet(&self, packet: &RakPacket, codec: &RakCodec) -> Result<usize> {
        let bytes = codec.encode_datagram(packet)?;
        Ok(self.send(&bytes).await?)
    }
}

impl DatagramSocket for ClientSocket {
    fn try_receive(&self) -> io::Result<Option<(Bytes, SocketAddr)>> {
        self.receive.try_fill(|buffer| {
            self.socket
                .try_recv_buf(buffer)
                .map(|len| (len, self.peer))
        })
    }

    async fn receive(&self) -> io::Result<(Bytes, SocketAddr)> {
        let mut buffer = self.receive.buffer.lock().await;
        self.receive.prepare(&mut buffer);
        let len = self.socket.recv_buf(&mut *buffer).await;
        let (len, from) = record_received(len.map(|len| (len, self.peer)))?;
        Ok((buffer.split_to(len).freeze(), from))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// Receive until a datagram decodes, dropping malformed ones.
///
/// Socket errors end the loop; parse failures never do.
pub async fn receive_packet<S: DatagramSocket>(
    socket: &S,
    codec: &RakCodec,
) -> Result<(RakPacket, SocketAddr)> {
    loop {
        let (datagram, from) = socket.receive().await?;
        match codec.decode_datagram(&datagram[..]) {
            Ok(packet) => {
                record_decoded(&packet);
                debug!(%from, id = %packet.identifier(), "Received packet");
                return Ok((packet, from));
            }
            Err(e) if e.is_parse_failure() => {
                global_metrics().decode_failed(&e);
                warn!(%from, error = %e, len = datagram.len(), "Discarding malformed datagram");
            }
            Err(e) => return Err(e),
        }
    }
}
