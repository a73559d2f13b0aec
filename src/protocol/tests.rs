// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::Ipv4Addr;

use crate::core::address::InternetAddress;
use crate::core::serializer::CodecOptions;
use crate::error::ProtocolError;
use crate::protocol::acceptor::ProtocolAcceptor;
use crate::protocol::handshake::*;
use crate::protocol::messages::*;
use crate::protocol::packet::{Magic, Packet};
use crate::protocol::registry::RakPacket;

const SERVER_ID: u64 = 0x5345_5256_4552_0001;
const CLIENT_ID: u64 = 0x434C_4945_4E54_0002;

/// Send a packet "over the wire": encode, then decode through the registry
fn wire(packet: impl Into<RakPacket>) -> RakPacket {
    let bytes = packet.into().to_bytes().expect("encode should succeed");
    RakPacket::from_bytes(&bytes, CodecOptions::default()).expect("decode should succeed")
}

#[test]
fn test_full_handshake_flow() {
    let server_address = InternetAddress::v4(Ipv4Addr::new(192, 0, 2, 1), 19132);
    let client_address = InternetAddress::v4(Ipv4Addr::new(198, 51, 100, 9), 50123);
    let acceptor = ProtocolAcceptor::default();

    let mut client_stage = HandshakeStage::ReplyOne;
    let mut server_stage = HandshakeStage::RequestOne;

    // =================== Step 1: MTU probe ===================
    let mtu_request = wire(request_one(acceptor.version(), 1492));
    server_stage = server_stage.advance(&mtu_request).unwrap();
    let request = match mtu_request {
        RakPacket::OpenConnectionRequestOne(p) => p,
        other => panic!("Expected OpenConnectionRequestOne, got {other:?}"),
    };
    assert_eq!(request.mtu_size, 1492);

    let reply = wire(respond_to_request_one(&acceptor, &request, SERVER_ID, false).unwrap());
    client_stage = client_stage.advance(&reply).unwrap();
    let reply = match reply {
        RakPacket::OpenConnectionReplyOne(p) => p,
        other => panic!("Expected OpenConnectionReplyOne, got {other:?}"),
    };
    assert_eq!(reply.server_id, SERVER_ID);
    assert_eq!(reply.mtu_size, 1492);

    // =================== Step 2: Second request ===================
    client_stage = client_stage.successor();
    server_stage = server_stage.successor();
    let request_two = wire(request_two(&reply, server_address, CLIENT_ID).unwrap());
    server_stage = server_stage.advance(&request_two).unwrap();
    let request_two = match request_two {
        RakPacket::OpenConnectionRequestTwo(p) => p,
        other => panic!("Expected OpenConnectionRequestTwo, got {other:?}"),
    };
    assert_eq!(request_two.server_address, server_address);
    assert_eq!(request_two.client_id, CLIENT_ID);

    let reply_two =
        wire(respond_to_request_two(&request_two, client_address, SERVER_ID, false).unwrap());
    client_stage = client_stage.advance(&reply_two).unwrap();
    let reply_two = match reply_two {
        RakPacket::OpenConnectionReplyTwo(p) => p,
        other => panic!("Expected OpenConnectionReplyTwo, got {other:?}"),
    };
    assert_eq!(reply_two.client_address, client_address);
    assert_eq!(reply_two.mtu_size, 1492);

    // =================== Step 3: Connection request ===================
    client_stage = client_stage.successor();
    server_stage = server_stage.successor();
    let connect = wire(ConnectionRequest::new(CLIENT_ID, 1_000, false));
    server_stage = server_stage.advance(&connect).unwrap();
    let connect = match connect {
        RakPacket::ConnectionRequest(p) => p,
        other => panic!("Expected ConnectionRequest, got {other:?}"),
    };

    let accepted = wire(accept_connection(&connect, client_address, 1_005, 20));
    client_stage = client_stage.advance(&accepted).unwrap();
    let accepted = match accepted {
        RakPacket::ConnectionRequestAccepted(p) => p,
        other => panic!("Expected ConnectionRequestAccepted, got {other:?}"),
    };
    assert_eq!(accepted.address, client_address);
    assert_eq!(accepted.send_time, 1_000);
    assert_eq!(accepted.receive_time, 1_005);
    assert_eq!(accepted.system_addresses.len(), 20);

    // =================== Step 4: New incoming connection ===================
    client_stage = client_stage.successor();
    server_stage = server_stage.successor();
    let incoming = wire(new_incoming_connection(&accepted, server_address, 1_010));
    server_stage = server_stage.advance(&incoming).unwrap();
    match incoming {
        RakPacket::NewIncomingConnection(p) => {
            assert_eq!(p.address, server_address);
            assert_eq!(p.send_time, 1_005);
            assert_eq!(p.receive_time, 1_010);
        }
        other => panic!("Expected NewIncomingConnection, got {other:?}"),
    }

    client_stage = client_stage.successor();
    assert!(client_stage.is_connected());
    assert!(server_stage.is_connected());
}

#[test]
fn test_incompatible_protocol_is_reported() {
    let acceptor = ProtocolAcceptor::new(11);
    let request = OpenConnectionRequestOne::new(10, 1200);

    match respond_to_request_one(&acceptor, &request, SERVER_ID, false).unwrap() {
        RakPacket::IncompatibleProtocolVersion(p) => {
            assert_eq!(p.protocol, 11);
            assert_eq!(p.server_id, SERVER_ID);
        }
        other => panic!("Expected IncompatibleProtocolVersion, got {other:?}"),
    }
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut request = OpenConnectionRequestOne::new(6, 1200);
    request.magic = Magic::new([0xAB; 16]);

    // Decoding keeps the bad magic, responding refuses it
    let decoded = OpenConnectionRequestOne::from_bytes(&request.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.magic, request.magic);
    assert!(matches!(
        respond_to_request_one(&ProtocolAcceptor::default(), &decoded, SERVER_ID, false),
        Err(ProtocolError::MagicMismatch)
    ));
}

#[test]
fn test_discovery_ping() {
    let ping = UnconnectedPingOpenConnections::new(123, CLIENT_ID);
    let decoded = match wire(ping) {
        RakPacket::UnconnectedPingOpenConnections(p) => p,
        other => panic!("Expected UnconnectedPingOpenConnections, got {other:?}"),
    };

    let pong = wire(answer_ping(&decoded, SERVER_ID, "MCPE;Server;390;1.14.60;0;10").unwrap());
    match pong {
        RakPacket::UnconnectedPong(p) => {
            assert_eq!(p.send_time, 123);
            assert_eq!(p.server_id, SERVER_ID);
            assert!(p.response.starts_with("MCPE;"));
        }
        other => panic!("Expected UnconnectedPong, got {other:?}"),
    }
}

#[test]
fn test_out_of_order_message() {
    let stage = HandshakeStage::ConnectionRequest;
    let err = stage.advance(&wire(ConnectedPing::new(4))).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::UnexpectedPacketId {
            expected: 0x09,
            actual: 0x00
        }
    ));
}

#[test]
fn test_incompatible_protocol_ends_handshake() {
    let acceptor = ProtocolAcceptor::new(11);
    let client_stage = HandshakeStage::RequestOne.successor();

    let reply = wire(
        respond_to_request_one(&acceptor, &request_one(10, 1200), SERVER_ID, false).unwrap(),
    );
    let client_stage = client_stage.advance(&reply).unwrap();
    assert_eq!(client_stage, HandshakeStage::Rejected);
    assert!(client_stage.is_finished());
    assert!(!client_stage.is_connected());

    assert!(matches!(
        client_stage.advance(&wire(OpenConnectionReplyOne::new(SERVER_ID, false, 1200))),
        Err(ProtocolError::UnexpectedMessage)
    ));
}

#[test]
fn test_incompatible_protocol_only_answers_request_one() {
    let err = HandshakeStage::ReplyTwo
        .advance(&wire(IncompatibleProtocolVersion::new(6, SERVER_ID)))
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::UnexpectedPacketId {
            expected: 0x08,
            actual: 0x19
        }
    ));
}

#[test]
fn test_disconnect_from_any_stage() {
    let live = [
        HandshakeStage::RequestOne,
        HandshakeStage::ReplyOne,
        HandshakeStage::RequestTwo,
        HandshakeStage::ReplyTwo,
        HandshakeStage::ConnectionRequest,
        HandshakeStage::ConnectionRequestAccepted,
        HandshakeStage::NewIncomingConnection,
        HandshakeStage::Connected,
    ];
    for stage in live {
        let next = stage.advance(&wire(DisconnectNotification)).unwrap();
        assert_eq!(next, HandshakeStage::Disconnected, "from {stage:?}");
    }

    let done = HandshakeStage::Disconnected;
    assert!(done.is_finished());
    assert_eq!(done.expected_next(), None);
    assert_eq!(done.successor(), HandshakeStage::Disconnected);
    assert!(matches!(
        done.advance(&wire(DisconnectNotification)),
        Err(ProtocolError::UnexpectedMessage)
    ));
}
