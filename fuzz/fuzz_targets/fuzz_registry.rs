#![no_main]

use libfuzzer_sys::fuzz_target;
use raknet_protocol::{CodecOptions, RakPacket};

fuzz_target!(|data: &[u8]| {
    // Any datagram must decode or fail cleanly
    if let Ok(packet) = RakPacket::from_bytes(data, CodecOptions::default()) {
        // Whatever decoded must encode again
        if let Ok(bytes) = packet.to_bytes() {
            let _ = RakPacket::from_bytes(&bytes, CodecOptions::default());
        }
    }
});
