#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tasd_codec::{PacketStream, TasdCodec, TasdFile};
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // The incremental decoder must agree with the in-memory walk
    let mut codec = TasdCodec::new();
    let mut buf = BytesMut::new();
    let mut decoded = Vec::new();
    'feed: for chunk in data.chunks(7) {
        buf.extend_from_slice(chunk);
        loop {
            match codec.decode(&mut buf) {
                Ok(Some(packet)) => decoded.push(packet),
                Ok(None) => break,
                Err(_) => break 'feed,
            }
        }
    }

    if let Some(stream) = PacketStream::try_new(data) {
        for (walked, incremental) in stream.zip(decoded.iter()) {
            assert_eq!(walked.key, &incremental.key[..]);
            assert_eq!(walked.payload, &incremental.payload[..]);
        }
    }

    let _ = TasdFile::parse(data);
});
