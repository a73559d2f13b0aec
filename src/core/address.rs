//! # Address Codec
//!
//! Network endpoints as they appear inside handshake packets.
//!
//! ## Wire Format
//! ```text
//! IPv4: [version=4(1)] [~octet(1) x4] [port(2)]
//! IPv6: [version=6(1)] [AF_INET6(2, LE)] [port(2)] [0(4)] [addr(16)] [0(4)]
//! ```
//!
//! IPv4 octets are bitwise complemented on the wire. The IPv6 layout mirrors
//! a native `sockaddr_in6` (family, port, flow info, address, scope id).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::core::serializer::{ByteOrder, PacketSerializer};
use crate::error::{ProtocolError, Result};

/// Address family tag written for IPv6 endpoints (Linux `AF_INET6`)
pub const AF_INET6: u16 = 10;

/// Encoded size of an IPv4 address field
pub const IPV4_ENCODED_LEN: usize = 7;

/// Encoded size of an IPv6 address field
pub const IPV6_ENCODED_LEN: usize = 29;

/// An IP endpoint with an explicit version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternetAddress {
    ip: IpAddr,
    port: u16,
}

impl InternetAddress {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn v4(ip: Ipv4Addr, port: u16) -> Self {
        Self::new(IpAddr::V4(ip), port)
    }

    pub fn v6(ip: Ipv6Addr, port: u16) -> Self {
        Self::new(IpAddr::V6(ip), port)
    }

    /// Placeholder used to pad system address tables: `0.0.0.0:0`
    pub const fn unspecified() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// IP version byte as written on the wire (4 or 6)
    pub fn version(&self) -> u8 {
        match self.ip {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 6,
        }
    }

    /// Number of bytes [`PacketSerializer::write_address`] emits for this address
    pub fn encoded_len(&self) -> usize {
        match self.ip {
            IpAddr::V4(_) => IPV4_ENCODED_LEN,
            IpAddr::V6(_) => IPV6_ENCODED_LEN,
        }
    }

    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl Default for InternetAddress {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl From<SocketAddr> for InternetAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl From<InternetAddress> for SocketAddr {
    fn from(addr: InternetAddress) -> Self {
        addr.to_socket_addr()
    }
}

impl fmt::Display for InternetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ip, self.port)
    }
}

impl PacketSerializer {
    /// Read an endpoint written by [`PacketSerializer::write_address`]
    pub fn read_address(&mut self) -> Result<InternetAddress> {
        let version = self.read_u8()?;
        match version {
            4 => {
                let octets = self.read_array::<4>()?.map(|b| !b);
                let port = self.read_u16()?;
                Ok(InternetAddress::v4(Ipv4Addr::from(octets), port))
            }
            6 => {
                self.read_u16_with(ByteOrder::LittleEndian)?;
                let port = self.read_u16()?;
                self.read_u32()?;
                let octets = self.read_array::<16>()?;
                self.read_u32()?;
                Ok(InternetAddress::v6(Ipv6Addr::from(octets), port))
            }
            other => Err(ProtocolError::UnknownAddressVersion(other)),
        }
    }

    pub fn write_address(&mut self, address: &InternetAddress) {
        self.write_u8(address.version());
        match address.ip {
            IpAddr::V4(ip) => {
                for octet in ip.octets() {
                    self.write_u8(!octet);
                }
                self.write_u16(address.port);
            }
            IpAddr::V6(ip) => {
                self.write_u16_with(AF_INET6, ByteOrder::LittleEndian);
                self.write_u16(address.port);
                self.write_u32(0);
                self.write_bytes(&ip.octets());
                self.write_u32(0);
            }
        }
    }
}
