//! Integration tests for zero-copy codec operations
//!
//! These tests validate the streaming decoder and encoder, including the
//! zero-copy split of decoded keys and payloads out of the receive buffer.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::BytesMut;
use tasd_codec::{RawHeader, RawPacket, TasdCodec, TasdError};
use tokio_util::codec::{Decoder, Encoder};

const V1_HEADER: [u8; 7] = [0x54, 0x41, 0x53, 0x44, 0x00, 0x01, 0x02];

#[test]
fn test_codec_decode_zero_copy_split() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    assert!(codec
        .decode(&mut buffer)
        .expect("header should decode")
        .is_none());
    assert_eq!(buffer.len(), 0);

    buffer.extend_from_slice(&[0xFF, 0x01, 0x01, 0x05, 1, 2, 3, 4, 5]);
    let base = buffer.as_ptr();

    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");

    // Key and payload are views into the receive buffer, not copies.
    assert_eq!(packet.key.as_ptr(), base);
    assert_eq!(packet.payload.as_ptr(), base.wrapping_add(4));
    assert_eq!(packet.key_u16(), Some(0xFF01));
    assert_eq!(packet.payload, vec![1, 2, 3, 4, 5]);
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_codec_partial_decode_preserves_buffer() {
    let mut codec = TasdCodec::new();

    // Only 5 of the 7 header octets.
    let mut buffer = BytesMut::from(&V1_HEADER[..5]);
    let result = codec.decode(&mut buffer).expect("Decode should not error");
    assert!(result.is_none());
    assert_eq!(buffer.len(), 5); // Buffer unchanged

    // Complete the header, then supply a partial packet.
    buffer.extend_from_slice(&V1_HEADER[5..]);
    buffer.extend_from_slice(&[0xFF, 0x01, 0x01]);
    let result = codec.decode(&mut buffer).expect("Decode should not error");
    assert!(result.is_none());
    assert_eq!(buffer.len(), 3); // Header consumed, packet preserved
}

#[test]
fn test_codec_header_and_packet_in_one_read() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    buffer.extend_from_slice(&[0xFF, 0xFE, 0x01, 0x01, 0x01]);

    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(packet.key_u16(), Some(0xFFFE));
    assert_eq!(packet.payload, vec![0x01]);
    assert_eq!(buffer.len(), 0);

    let header = codec.header().expect("header should be retained");
    assert_eq!(header.version(), 1);
    assert_eq!(header.global_key_length(), 2);
}

#[test]
fn test_codec_multiple_packets_in_buffer() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    buffer.extend_from_slice(&[0xFF, 0x01, 0x01, 0x03, 1, 2, 3]);
    buffer.extend_from_slice(&[0xFF, 0x01, 0x01, 0x03, 4, 5, 6]);

    let decoded1 = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(decoded1.payload, vec![1, 2, 3]);

    let decoded2 = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(decoded2.payload, vec![4, 5, 6]);

    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_codec_incremental_buffer_fill() {
    let mut codec = TasdCodec::new();

    // Header plus one packet, fed one octet at a time.
    let mut full_bytes = V1_HEADER.to_vec();
    full_bytes.extend_from_slice(&[0x00, 0x13, 0x01, 0x04, 0xAA, 0xBB, 0xCC, 0xDD]);

    let mut buffer = BytesMut::new();
    for (i, byte) in full_bytes.iter().enumerate() {
        buffer.extend_from_slice(&[*byte]);

        let result = codec.decode(&mut buffer).expect("Should not error");

        if i < full_bytes.len() - 1 {
            assert!(result.is_none());
        } else {
            let decoded = result.expect("Should decode when complete");
            assert_eq!(decoded.key_u16(), Some(0x0013));
            assert_eq!(decoded.payload, vec![0xAA, 0xBB, 0xCC, 0xDD]);
            assert_eq!(buffer.len(), 0);
        }
    }
}

#[test]
fn test_codec_bare_zero_length_packet() {
    let mut codec = TasdCodec::new();

    // The zero-width length shorthand needs no further octets, so the
    // decoder can consume it as soon as it arrives.
    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    buffer.extend_from_slice(&[0xFF, 0xFF, 0x00]);

    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(packet.key_u16(), Some(0xFFFF));
    assert!(packet.payload.is_empty());
    assert_eq!(buffer.len(), 0);

    let eof = codec.decode_eof(&mut buffer).expect("clean end of stream");
    assert!(eof.is_none());
}

#[test]
fn test_codec_decode_eof_reports_truncation() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    buffer.extend_from_slice(&[0xFF, 0x01, 0x01, 0x05, 1, 2]);

    // Not an error yet; more octets could arrive.
    assert!(codec.decode(&mut buffer).expect("partial").is_none());

    // At end of stream the leftover octets are named precisely.
    let result = codec.decode_eof(&mut buffer);
    assert!(matches!(result, Err(TasdError::PayloadTooShort(9))));
}

#[test]
fn test_codec_decode_eof_reports_short_header() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..5]);
    assert!(codec.decode(&mut buffer).expect("partial").is_none());

    let result = codec.decode_eof(&mut buffer);
    assert!(matches!(result, Err(TasdError::HeaderTooShort(5))));
}

#[test]
fn test_codec_rejects_wrong_magic() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&b"TASB\x00\x01\x02"[..]);
    let result = codec.decode(&mut buffer);
    assert!(matches!(result, Err(TasdError::MissingMagicBytes)));
}

#[test]
fn test_codec_rejects_width_above_four() {
    let mut codec = TasdCodec::new();

    let mut buffer = BytesMut::from(&V1_HEADER[..]);
    buffer.extend_from_slice(&[0xFF, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x01]);

    let result = codec.decode(&mut buffer);
    assert!(matches!(result, Err(TasdError::LengthFieldTooHigh(5))));
}

#[test]
fn test_codec_wide_keys_pass_through() {
    let mut codec = TasdCodec::new();

    // 3-octet keys: raw framing still works, only key_u16 is unavailable.
    let mut buffer = BytesMut::from(&[0x54, 0x41, 0x53, 0x44, 0x00, 0x01, 0x03][..]);
    buffer.extend_from_slice(&[0x01, 0x02, 0x03, 0x01, 0x02, 0xAA, 0xBB]);

    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(packet.key, vec![0x01, 0x02, 0x03]);
    assert_eq!(packet.key_u16(), None);
    assert_eq!(packet.payload, vec![0xAA, 0xBB]);
}

#[test]
fn test_codec_encode_round_trip() {
    let mut codec = TasdCodec::new();
    let mut buffer = BytesMut::new();

    codec
        .encode(&RawHeader::V1_TWO_OCTET_KEYS, &mut buffer)
        .expect("Failed to encode header");
    codec
        .encode((&[0xFF, 0x01][..], &b"Hello, world!"[..]), &mut buffer)
        .expect("Failed to encode packet");
    codec
        .encode((&[0xFF, 0xFF][..], &[][..]), &mut buffer)
        .expect("Failed to encode packet");

    // Encoded form is the canonical one packet writing produces.
    let expected_tail = RawPacket {
        key: &[0xFF, 0xFF],
        payload: &[],
    }
    .to_bytes()
    .expect("canonical write");
    assert_eq!(&buffer[buffer.len() - 4..], &expected_tail[..]);

    let mut decoder = TasdCodec::new();
    let first = decoder
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(first.key_u16(), Some(0xFF01));
    assert_eq!(first.payload, &b"Hello, world!"[..]);

    let second = decoder
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(second.key_u16(), Some(0xFFFF));
    assert!(second.payload.is_empty());

    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_codec_encode_buffer_reuse() {
    let mut codec = TasdCodec::new();
    let mut buffer = BytesMut::with_capacity(1000);

    codec
        .encode(&RawHeader::V1_TWO_OCTET_KEYS, &mut buffer)
        .expect("Failed to encode header");
    for i in 0..10u8 {
        let payload = vec![i; 10];
        codec
            .encode((&[0xFE, 0x01][..], &payload[..]), &mut buffer)
            .expect("Failed to encode");
    }

    // Header plus 10 packets of (key 2 + width 1 + length 1 + payload 10).
    assert_eq!(buffer.len(), 7 + 10 * 14);

    let mut decoder = TasdCodec::new();
    let mut count = 0u8;
    while let Some(packet) = decoder.decode(&mut buffer).expect("Failed to decode") {
        assert_eq!(packet.payload.len(), 10);
        assert_eq!(packet.payload[0], count);
        count += 1;
    }
    assert_eq!(count, 10);
}
