//! Messages exchanged once the open-connection phase has completed.

use crate::config::SYSTEM_ADDRESS_COUNT;
use crate::core::address::InternetAddress;
use crate::core::serializer::PacketSerializer;
use crate::error::Result;
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::packet::{OnlinePacket, Packet};

/// Trailing `send_time(8) + receive_time(8)` after a system address table
const TIMESTAMP_TAIL_LEN: usize = 16;

/// Reads `count` addresses, substituting the placeholder once only the
/// timestamp tail is left. Tolerates peers that send a shorter table.
fn read_system_addresses(input: &mut PacketSerializer, count: usize) -> Result<Vec<InternetAddress>> {
    let mut addresses = Vec::with_capacity(count);
    for _ in 0..count {
        if input.remaining() > TIMESTAMP_TAIL_LEN {
            addresses.push(input.read_address()?);
        } else {
            addresses.push(InternetAddress::unspecified());
        }
    }
    Ok(addresses)
}

fn placeholder_addresses() -> Vec<InternetAddress> {
    vec![InternetAddress::unspecified(); SYSTEM_ADDRESS_COUNT]
}

/// Round-trip probe: `send_time(8)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectedPing {
    pub send_time: u64,
}

impl ConnectedPing {
    pub fn new(send_time: u64) -> Self {
        Self { send_time }
    }
}

impl Packet for ConnectedPing {
    const ID: u8 = MessageIdentifier::ConnectedPing as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u64(self.send_time);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            send_time: input.read_u64()?,
        })
    }
}

impl OnlinePacket for ConnectedPing {}

/// Answer to [`ConnectedPing`]: `send_time(8) + receive_time(8)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectedPong {
    pub send_time: u64,
    pub receive_time: u64,
}

impl ConnectedPong {
    pub fn new(send_time: u64, receive_time: u64) -> Self {
        Self {
            send_time,
            receive_time,
        }
    }
}

impl Packet for ConnectedPong {
    const ID: u8 = MessageIdentifier::ConnectedPong as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u64(self.send_time);
        out.write_u64(self.receive_time);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            send_time: input.read_u64()?,
            receive_time: input.read_u64()?,
        })
    }
}

impl OnlinePacket for ConnectedPong {}

/// `client_id(8) + send_time(8) + use_security(1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionRequest {
    pub client_id: u64,
    pub send_time: u64,
    pub use_security: bool,
}

impl ConnectionRequest {
    pub fn new(client_id: u64, send_time: u64, use_security: bool) -> Self {
        Self {
            client_id,
            send_time,
            use_security,
        }
    }
}

impl Packet for ConnectionRequest {
    const ID: u8 = MessageIdentifier::ConnectionRequest as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_u64(self.client_id);
        out.write_u64(self.send_time);
        out.write_bool(self.use_security);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self {
            client_id: input.read_u64()?,
            send_time: input.read_u64()?,
            use_security: input.read_bool()?,
        })
    }
}

impl OnlinePacket for ConnectionRequest {}

/// `address + reserved(2) + system addresses + send_time(8) + receive_time(8)`.
///
/// The table always has `system_address_count` entries on the wire. Entries
/// missing from `system_addresses` are written as `0.0.0.0:0` and extra
/// entries are dropped. Decoding always yields `system_address_count`
/// entries, so only a table of exactly that length round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequestAccepted {
    pub address: InternetAddress,
    pub system_addresses: Vec<InternetAddress>,
    pub send_time: u64,
    pub receive_time: u64,
}

impl ConnectionRequestAccepted {
    /// Build with a placeholder table of [`SYSTEM_ADDRESS_COUNT`] entries
    pub fn new(address: InternetAddress, send_time: u64, receive_time: u64) -> Self {
        Self {
            address,
            system_addresses: placeholder_addresses(),
            send_time,
            receive_time,
        }
    }

    pub fn with_system_addresses(mut self, system_addresses: Vec<InternetAddress>) -> Self {
        self.system_addresses = system_addresses;
        self
    }
}

impl Default for ConnectionRequestAccepted {
    fn default() -> Self {
        Self::new(InternetAddress::unspecified(), 0, 0)
    }
}

impl Packet for ConnectionRequestAccepted {
    const ID: u8 = MessageIdentifier::ConnectionRequestAccepted as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_address(&self.address);
        out.write_u16(0);

        let placeholder = InternetAddress::unspecified();
        for i in 0..out.options().system_address_count {
            let address = self.system_addresses.get(i).unwrap_or(&placeholder);
            out.write_address(address);
        }

        out.write_u64(self.send_time);
        out.write_u64(self.receive_time);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        let address = input.read_address()?;
        input.read_u16()?;
        let count = input.options().system_address_count;
        let system_addresses = read_system_addresses(input, count)?;
        Ok(Self {
            address,
            system_addresses,
            send_time: input.read_u64()?,
            receive_time: input.read_u64()?,
        })
    }
}

impl OnlinePacket for ConnectionRequestAccepted {}

/// `address + system addresses + send_time(8) + receive_time(8)`.
///
/// At most `system_address_count` entries of `system_addresses` are written.
/// Decoding always yields `system_address_count` entries, filling the ones a
/// peer left out with `0.0.0.0:0`. A table of any other length comes back
/// truncated or padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncomingConnection {
    pub address: InternetAddress,
    pub system_addresses: Vec<InternetAddress>,
    pub send_time: u64,
    pub receive_time: u64,
}

impl NewIncomingConnection {
    /// Build with a placeholder table of [`SYSTEM_ADDRESS_COUNT`] entries
    pub fn new(address: InternetAddress, send_time: u64, receive_time: u64) -> Self {
        Self {
            address,
            system_addresses: placeholder_addresses(),
            send_time,
            receive_time,
        }
    }

    pub fn with_system_addresses(mut self, system_addresses: Vec<InternetAddress>) -> Self {
        self.system_addresses = system_addresses;
        self
    }
}

impl Default for NewIncomingConnection {
    fn default() -> Self {
        Self::new(InternetAddress::unspecified(), 0, 0)
    }
}

impl Packet for NewIncomingConnection {
    const ID: u8 = MessageIdentifier::NewIncomingConnection as u8;

    fn encode_payload(&self, out: &mut PacketSerializer) -> Result<()> {
        out.write_address(&self.address);
        let count = out.options().system_address_count;
        for address in self.system_addresses.iter().take(count) {
            out.write_address(address);
        }
        out.write_u64(self.send_time);
        out.write_u64(self.receive_time);
        Ok(())
    }

    fn decode_payload(input: &mut PacketSerializer) -> Result<Self> {
        let address = input.read_address()?;
        let count = input.options().system_address_count;
        let system_addresses = read_system_addresses(input, count)?;
        Ok(Self {
            address,
            system_addresses,
            send_time: input.read_u64()?,
            receive_time: input.read_u64()?,
        })
    }
}

impl OnlinePacket for NewIncomingConnection {}

/// Empty payload; the identifier alone ends the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisconnectNotification;

impl Packet for DisconnectNotification {
    const ID: u8 = MessageIdentifier::DisconnectNotification as u8;

    fn encode_payload(&self, _out: &mut PacketSerializer) -> Result<()> {
        Ok(())
    }

    fn decode_payload(_input: &mut PacketSerializer) -> Result<Self> {
        Ok(Self)
    }
}

impl OnlinePacket for DisconnectNotification {}
