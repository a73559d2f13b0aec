#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use raknet_protocol::RakCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let mut codec = RakCodec::default().reject_invalid_magic(true);
    let mut buffer = BytesMut::from(data);
    // Parse failures are swallowed, the datagram is always consumed
    let _ = codec.decode(&mut buffer);
    assert!(buffer.is_empty());
});
