#![no_main]

use libfuzzer_sys::fuzz_target;
use raknet_protocol::core::ack::{compress, decompress, AckDecodeMode, MAX_ACK_ENTRIES};
use raknet_protocol::{CodecOptions, PacketSerializer};

fuzz_target!(|data: &[u8]| {
    for mode in [AckDecodeMode::Standard, AckDecodeMode::LegacyTwoTriadSingle] {
        let options = CodecOptions {
            ack_decode_mode: mode,
            ..CodecOptions::default()
        };
        let mut input = PacketSerializer::wrap(data.into(), options);
        if let Ok(seqs) = decompress(&mut input) {
            assert!(seqs.len() <= MAX_ACK_ENTRIES);

            let mut out = PacketSerializer::new();
            let _ = compress(&seqs, &mut out);
        }
    }
});
