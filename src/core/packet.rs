//! # Packet Codec
//!
//! Parsing and writing of one framed key/payload pair.
//!
//! ## Wire Format
//! ```text
//! [Key(KeyLength)] [LengthWidth(1)] [Length(0-4, BE)] [Payload(N)]
//! ```
//!
//! The one-octet length-width field (`PEXP`) names how many octets encode
//! the payload length (`PLEN`): 0 is a legacy zero-length
//! shorthand accepted on read, 1 through 4 are that many big-endian octets,
//! and anything higher is rejected. Writers always emit the smallest width
//! that fits, with a zero-length payload encoded as the two octets
//! `0x01 0x00`.

use std::fmt;

use crate::config::{MAX_LENGTH_WIDTH, MAX_PAYLOAD_LEN};
use crate::core::header::RawHeader;
use crate::error::{Result, TasdError};
use crate::utils::octets::{OctetsExt, OctetsMutExt};

/// One parsed packet: borrowed views of its key and payload octets.
///
/// Both slices alias the buffer the packet was parsed from, so a packet can
/// neither outlive that buffer nor observe it being mutated; the borrow
/// checker enforces what the wire format can only document. Equality
/// compares octets, not storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket<'a> {
    /// Exactly `global_key_length` octets naming the packet type.
    pub key: &'a [u8],
    /// Zero or more payload octets; meaning is up to the typed layer.
    pub payload: &'a [u8],
}

impl<'a> RawPacket<'a> {
    /// Parses one packet from the start of `buf` under `header`'s key
    /// length, returning the packet and the offset immediately past it
    /// (the start of the next packet, or `buf.len()`).
    ///
    /// A buffer that is exactly `key ++ [0x00]` is accepted as a bare
    /// zero-length packet with no length field at all.
    ///
    /// # Errors
    /// - [`TasdError::PacketHeaderTooShort`] if `buf` cannot hold a key and
    ///   a length-width octet
    /// - [`TasdError::LengthFieldTooShort`] if the declared length octets
    ///   are not all present
    /// - [`TasdError::LengthFieldTooHigh`] if the declared width exceeds 4,
    ///   or the decoded length exceeds [`MAX_PAYLOAD_LEN`], or offset
    ///   arithmetic would overflow
    /// - [`TasdError::PayloadTooShort`] if `buf` ends inside the payload
    pub fn parse(buf: &'a [u8], header: &RawHeader<'_>) -> Result<(RawPacket<'a>, usize)> {
        let key_len = usize::from(header.global_key_length());

        if buf.len() < key_len + 2 {
            return match buf.len().checked_sub(key_len) {
                Some(1) if buf[key_len] == 0 => {
                    // Bare zero-length form: key then a lone 0 octet at the
                    // very end of the buffer.
                    let packet = RawPacket {
                        key: &buf[..key_len],
                        payload: &[],
                    };
                    Ok((packet, key_len + 1))
                }
                Some(1) => Err(TasdError::LengthFieldTooShort(buf[key_len])),
                _ => Err(TasdError::PacketHeaderTooShort(buf.len())),
            };
        }

        let length_width = buf[key_len];
        let length_start = key_len + 1;
        let length: u64 = match length_width {
            0 => 0,
            1 => u64::from(buf[length_start]),
            2 => {
                if buf.len() < key_len + 3 {
                    return Err(TasdError::LengthFieldTooShort(length_width));
                }
                u64::from(buf.get_u16_be(length_start))
            }
            3 => {
                if buf.len() < key_len + 4 {
                    return Err(TasdError::LengthFieldTooShort(length_width));
                }
                u64::from(buf.get_u24_be(length_start))
            }
            4 => {
                if buf.len() < key_len + 5 {
                    return Err(TasdError::LengthFieldTooShort(length_width));
                }
                u64::from(buf.get_u32_be(length_start))
            }
            width => return Err(TasdError::LengthFieldTooHigh(u64::from(width))),
        };

        let key = &buf[..key_len];
        let payload_start = length_start + usize::from(length_width);
        if length == 0 {
            let packet = RawPacket { key, payload: &[] };
            return Ok((packet, payload_start));
        }

        if length > MAX_PAYLOAD_LEN {
            return Err(TasdError::LengthFieldTooHigh(length));
        }
        let end = payload_start
            .checked_add(length as usize)
            .ok_or(TasdError::LengthFieldTooHigh(length))?;
        if buf.len() < end {
            return Err(TasdError::PayloadTooShort(end));
        }

        let packet = RawPacket {
            key,
            payload: &buf[payload_start..end],
        };
        Ok((packet, end))
    }

    /// Non-raising form of [`RawPacket::parse`]; agrees with it bit-for-bit
    /// on every input.
    pub fn try_parse(buf: &'a [u8], header: &RawHeader<'_>) -> Option<(RawPacket<'a>, usize)> {
        Self::parse(buf, header).ok()
    }

    /// Smallest length-field width in octets able to carry `payload_len`.
    /// Zero-length payloads still take one octet (the canonical `0x01 0x00`
    /// form; the bare zero-octet form is never written).
    pub fn length_width(payload_len: usize) -> usize {
        let bits = usize::BITS - payload_len.leading_zeros();
        (bits as usize).div_ceil(8).max(1)
    }

    /// Encoded size of a packet with the given key and payload lengths.
    pub fn encoded_len(key_len: usize, payload_len: usize) -> usize {
        key_len + 1 + Self::length_width(payload_len) + payload_len
    }

    /// Writes `key`, the minimal length encoding of `payload.len()`, and
    /// `payload` into the front of `dst`, returning the octet count
    /// written.
    ///
    /// # Errors
    /// - [`TasdError::LengthFieldTooHigh`] if `payload.len()` does not fit
    ///   a 4-octet length field
    /// - [`TasdError::DestinationTooShort`] if `dst` is smaller than
    ///   [`RawPacket::encoded_len`]
    pub fn write_to(dst: &mut [u8], key: &[u8], payload: &[u8]) -> Result<usize> {
        let width = Self::length_width(payload.len());
        if width > MAX_LENGTH_WIDTH {
            return Err(TasdError::LengthFieldTooHigh(payload.len() as u64));
        }
        let total = key.len() + 1 + width + payload.len();
        if dst.len() < total {
            return Err(TasdError::DestinationTooShort(total));
        }

        dst[..key.len()].copy_from_slice(key);
        dst[key.len()] = width as u8;
        dst.put_uint_be(payload.len() as u64, width, key.len() + 1);
        dst[key.len() + 1 + width..total].copy_from_slice(payload);
        Ok(total)
    }

    /// Non-raising form of [`RawPacket::write_to`].
    pub fn try_write_to(dst: &mut [u8], key: &[u8], payload: &[u8]) -> Option<usize> {
        Self::write_to(dst, key, payload).ok()
    }

    /// Writes this packet's canonical encoding into the front of `dst`.
    ///
    /// # Errors
    /// As for [`RawPacket::write_to`].
    pub fn encode_into(&self, dst: &mut [u8]) -> Result<usize> {
        Self::write_to(dst, self.key, self.payload)
    }

    /// This packet's canonical encoding as an owned buffer.
    ///
    /// # Errors
    /// [`TasdError::LengthFieldTooHigh`] if the payload does not fit a
    /// 4-octet length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; Self::encoded_len(self.key.len(), self.payload.len())];
        let written = self.encode_into(&mut out)?;
        debug_assert_eq!(written, out.len());
        Ok(out)
    }
}

impl fmt::Display for RawPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key 0x")?;
        for octet in self.key {
            write!(f, "{octet:02X}")?;
        }
        if self.payload.is_empty() {
            return write!(f, ", payload empty");
        }
        write!(f, ", payload 0x")?;
        for (i, octet) in self.payload.iter().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            write!(f, "{octet:02X}")?;
        }
        Ok(())
    }
}
