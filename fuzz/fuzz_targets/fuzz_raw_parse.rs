#![no_main]

use libfuzzer_sys::fuzz_target;
use tasd_codec::{PacketStream, RawHeader, RawPacket};

fuzz_target!(|data: &[u8]| {
    // Fuzz header and packet parsing - test for panics and overflows
    let _ = RawHeader::parse(data);

    if let Some(header) = RawHeader::try_parse(data) {
        let _ = RawPacket::parse(&data[7..], &header);
    }

    if let Some(stream) = PacketStream::try_new(data) {
        for _ in stream {}
    }
});
