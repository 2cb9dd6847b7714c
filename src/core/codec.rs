//! # Streaming Codec
//!
//! [`tokio_util::codec`] integration for feeding a dump through any
//! `AsyncRead`/`AsyncWrite` transport.
//!
//! ## Components
//! - **TasdCodec**: stateful [`Decoder`]/[`Encoder`]; parses the file
//!   header once, then frames packets
//! - **OwnedPacket**: a decoded packet whose key and payload are
//!   [`Bytes`] views into the receive buffer, split off without copying
//!
//! A partial frame yields `Ok(None)` and reserves exactly the octets still
//! missing, so the next read can complete it. Structural corruption (a
//! length width above 4, a payload length past the addressable limit) is a
//! hard error; the stream cannot resynchronize past it.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::config::{HEADER_LEN, KEY_LEN_V1, MAX_LENGTH_WIDTH};
use crate::core::header::RawHeader;
use crate::core::packet::RawPacket;
use crate::error::TasdError;

/// A packet decoded from a byte stream. Key and payload share the receive
/// buffer's allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPacket {
    /// The packet key, `global_key_length` octets.
    pub key: Bytes,
    /// The payload octets.
    pub payload: Bytes,
}

impl OwnedPacket {
    /// The key as a big-endian integer, when it is the standard 2 octets
    /// wide.
    pub fn key_u16(&self) -> Option<u16> {
        let octets: [u8; KEY_LEN_V1] = self.key[..].try_into().ok()?;
        Some(u16::from_be_bytes(octets))
    }

    /// Borrows this packet as a [`RawPacket`] view.
    pub fn as_raw(&self) -> RawPacket<'_> {
        RawPacket {
            key: &self.key[..],
            payload: &self.payload[..],
        }
    }
}

/// Incremental codec over the dump wire format.
///
/// Decoding consumes the 7-octet file header first and holds it for the
/// life of the codec; every subsequent frame is one packet. Encoding is
/// stateless: write a header with [`RawHeader`], then one frame per
/// key/payload pair.
#[derive(Debug, Default, Clone)]
pub struct TasdCodec {
    header: Option<RawHeader<'static>>,
}

impl TasdCodec {
    /// A codec that has not yet seen a file header.
    pub fn new() -> TasdCodec {
        TasdCodec::default()
    }

    /// The file header, once one has been decoded.
    pub fn header(&self) -> Option<&RawHeader<'static>> {
        self.header.as_ref()
    }
}

impl Decoder for TasdCodec {
    type Item = OwnedPacket;
    type Error = TasdError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<OwnedPacket>, TasdError> {
        let header = match self.header.as_ref() {
            Some(header) => header.clone(),
            None => {
                if src.len() < HEADER_LEN {
                    src.reserve(HEADER_LEN - src.len());
                    return Ok(None);
                }
                let header = RawHeader::parse(&src[..])?.into_owned();
                src.advance(HEADER_LEN);
                debug!(
                    version = header.version(),
                    key_length = header.global_key_length(),
                    "accepted dump header"
                );
                self.header = Some(header.clone());
                header
            }
        };

        let key_len = usize::from(header.global_key_length());
        let (end, payload_len) = match RawPacket::parse(&src[..], &header) {
            Ok((packet, end)) => (end, packet.payload.len()),
            Err(TasdError::PacketHeaderTooShort(_)) => {
                src.reserve((key_len + 2).saturating_sub(src.len()));
                return Ok(None);
            }
            Err(TasdError::LengthFieldTooShort(width)) => {
                src.reserve((key_len + 1 + usize::from(width)).saturating_sub(src.len()));
                return Ok(None);
            }
            Err(TasdError::PayloadTooShort(end)) => {
                src.reserve(end.saturating_sub(src.len()));
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let mut frame = src.split_to(end);
        let key = frame.split_to(key_len).freeze();
        // Skip the length-width octet and the length field itself.
        frame.advance(frame.len() - payload_len);
        let payload = frame.freeze();
        trace!(octets = end, payload = payload_len, "decoded packet");
        Ok(Some(OwnedPacket { key, payload }))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<OwnedPacket>, TasdError> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None if src.is_empty() => Ok(None),
            // Leftover octets at end of stream: re-parse to name what is
            // missing.
            None => Err(match self.header.as_ref() {
                None => RawHeader::parse(&src[..])
                    .err()
                    .unwrap_or(TasdError::HeaderTooShort(src.len())),
                Some(header) => RawPacket::parse(&src[..], header)
                    .err()
                    .unwrap_or(TasdError::PacketHeaderTooShort(src.len())),
            }),
        }
    }
}

impl Encoder<&RawHeader<'_>> for TasdCodec {
    type Error = TasdError;

    fn encode(&mut self, header: &RawHeader<'_>, dst: &mut BytesMut) -> Result<(), TasdError> {
        dst.extend_from_slice(header.as_bytes());
        Ok(())
    }
}

impl Encoder<(&[u8], &[u8])> for TasdCodec {
    type Error = TasdError;

    fn encode(&mut self, (key, payload): (&[u8], &[u8]), dst: &mut BytesMut) -> Result<(), TasdError> {
        if RawPacket::length_width(payload.len()) > MAX_LENGTH_WIDTH {
            return Err(TasdError::LengthFieldTooHigh(payload.len() as u64));
        }
        let total = RawPacket::encoded_len(key.len(), payload.len());
        let start = dst.len();
        dst.resize(start + total, 0);
        RawPacket::write_to(&mut dst[start..], key, payload)?;
        trace!(octets = total, "encoded packet");
        Ok(())
    }
}
