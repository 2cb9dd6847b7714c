#![no_main]

use libfuzzer_sys::fuzz_target;
use tasd_codec::{RawHeader, RawPacket};

fuzz_target!(|data: &[u8]| {
    // Writing a payload and parsing it back must reproduce it exactly
    let packet = RawPacket {
        key: &[0xFF, 0x01],
        payload: data,
    };

    if let Ok(bytes) = packet.to_bytes() {
        match RawPacket::parse(&bytes, &RawHeader::V1_TWO_OCTET_KEYS) {
            Ok((parsed, end)) => {
                assert_eq!(parsed.key, packet.key);
                assert_eq!(parsed.payload, data);
                assert_eq!(end, bytes.len());
            }
            Err(err) => panic!("canonical octets failed to parse: {err}"),
        }
    }
});
