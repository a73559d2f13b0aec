//! Byte-exact wire format tests
//!
//! Every expected buffer here is written out by hand from the RakNet layout,
//! so a change in field order, width or byte order fails loudly.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::uninlined_format_args
)]

use std::net::{Ipv4Addr, Ipv6Addr};

use raknet_protocol::config::OFFLINE_MESSAGE_MAGIC;
use raknet_protocol::core::ack::{self, AckRecord};
use raknet_protocol::core::address::InternetAddress;
use raknet_protocol::core::serializer::{ByteOrder, PacketSerializer};
use raknet_protocol::protocol::messages::*;
use raknet_protocol::protocol::{Ack, Nack, Packet};

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

#[test]
fn test_ipv4_address_is_complemented() {
    let mut s = PacketSerializer::new();
    s.write_address(&InternetAddress::v4(Ipv4Addr::new(127, 0, 0, 1), 19132));
    assert_eq!(s.buffer(), &[0x04, 0x80, 0xFF, 0xFF, 0xFE, 0x4A, 0xBC]);
}

#[test]
fn test_ipv6_address_layout() {
    let ip = Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 0x0001);
    let mut s = PacketSerializer::new();
    s.write_address(&InternetAddress::v6(ip, 443));

    let expected = concat(&[
        &[0x06],
        &[0x0A, 0x00], // AF_INET6, little-endian
        &[0x01, 0xBB],
        &[0, 0, 0, 0],
        &ip.octets(),
        &[0, 0, 0, 0],
    ]);
    assert_eq!(s.buffer(), expected.as_slice());
    assert_eq!(s.len(), 29);
}

#[test]
fn test_triads() {
    let mut s = PacketSerializer::new();
    s.write_triad(0x010203, ByteOrder::LittleEndian);
    s.write_triad(0x010203, ByteOrder::BigEndian);
    assert_eq!(s.buffer(), &[0x03, 0x02, 0x01, 0x01, 0x02, 0x03]);
}

#[test]
fn test_ack_contiguous_run_is_one_range() {
    let bytes = Ack::new(vec![5, 6, 7, 8]).to_bytes().unwrap();
    assert_eq!(
        bytes.as_ref(),
        &[0xC0, 0x00, 0x01, 0x00, 0x05, 0x00, 0x00, 0x08, 0x00, 0x00]
    );
}

#[test]
fn test_ack_gaps_are_singles() {
    let bytes = Nack::new(vec![5, 7, 9]).to_bytes().unwrap();
    assert_eq!(
        bytes.as_ref(),
        &[
            0xA0, 0x00, 0x03, //
            0x01, 0x05, 0x00, 0x00, //
            0x01, 0x07, 0x00, 0x00, //
            0x01, 0x09, 0x00, 0x00,
        ]
    );
}

#[test]
fn test_ack_empty() {
    let bytes = Ack::new(Vec::new()).to_bytes().unwrap();
    assert_eq!(bytes.as_ref(), &[0xC0, 0x00, 0x00]);
}

#[test]
fn test_ack_records() {
    assert_eq!(
        ack::to_records(&[1, 2, 3, 10, 12, 13]),
        vec![
            AckRecord::Range { start: 1, end: 3 },
            AckRecord::Single(10),
            AckRecord::Range { start: 12, end: 13 },
        ]
    );
}

#[test]
fn test_unconnected_pong_golden() {
    let pong = UnconnectedPong::new(1, 2, "ab");
    let expected = concat(&[
        &[0x1C],
        &[0, 0, 0, 0, 0, 0, 0, 1],
        &[0, 0, 0, 0, 0, 0, 0, 2],
        &OFFLINE_MESSAGE_MAGIC,
        &[0x00, 0x02, b'a', b'b'],
    ]);
    assert_eq!(pong.to_bytes().unwrap().as_ref(), expected.as_slice());
}

#[test]
fn test_open_connection_request_one_padding() {
    let bytes = OpenConnectionRequestOne::new(6, 1492).to_bytes().unwrap();
    // Datagram is the MTU minus IP and UDP headers
    assert_eq!(bytes.len(), 1492 - 28);
    assert_eq!(bytes[0], 0x05);
    assert_eq!(&bytes[1..17], &OFFLINE_MESSAGE_MAGIC);
    assert_eq!(bytes[17], 6);
    assert!(bytes[18..].iter().all(|b| *b == 0));
}

#[test]
fn test_open_connection_reply_one_golden() {
    let reply = OpenConnectionReplyOne::new(0x0102030405060708, true, 1400);
    let expected = concat(&[
        &[0x06],
        &OFFLINE_MESSAGE_MAGIC,
        &[1, 2, 3, 4, 5, 6, 7, 8],
        &[0x01],
        &[0x05, 0x78],
    ]);
    assert_eq!(reply.to_bytes().unwrap().as_ref(), expected.as_slice());
}

#[test]
fn test_open_connection_request_two_golden() {
    let server = InternetAddress::v4(Ipv4Addr::new(10, 0, 0, 1), 19132);
    let request = OpenConnectionRequestTwo::new(server, 1400, 9);
    let expected = concat(&[
        &[0x07],
        &OFFLINE_MESSAGE_MAGIC,
        &[0x04, 0xF5, 0xFF, 0xFF, 0xFE, 0x4A, 0xBC],
        &[0x05, 0x78],
        &[0, 0, 0, 0, 0, 0, 0, 9],
    ]);
    assert_eq!(request.to_bytes().unwrap().as_ref(), expected.as_slice());
}

#[test]
fn test_incompatible_protocol_version_golden() {
    let packet = IncompatibleProtocolVersion::new(10, 3);
    let expected = concat(&[&[0x19, 10], &OFFLINE_MESSAGE_MAGIC, &[0, 0, 0, 0, 0, 0, 0, 3]]);
    assert_eq!(packet.to_bytes().unwrap().as_ref(), expected.as_slice());
}

#[test]
fn test_connection_request_golden() {
    let request = ConnectionRequest::new(2, 3, false);
    assert_eq!(
        request.to_bytes().unwrap().as_ref(),
        &[0x09, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3, 0]
    );
}

#[test]
fn test_connected_pong_golden() {
    let pong = ConnectedPong::new(0x10, 0x20);
    assert_eq!(
        pong.to_bytes().unwrap().as_ref(),
        &[0x03, 0, 0, 0, 0, 0, 0, 0, 0x10, 0, 0, 0, 0, 0, 0, 0, 0x20]
    );
}
