//! # File Header Codec
//!
//! Parsing and writing of the fixed 7-octet TASD file header.
//!
//! ## Wire Format
//! ```text
//! [Magic(4) = "TASD"] [Version(2, BE)] [KeyLength(1)]
//! ```
//!
//! The key length declared here applies to every packet in the stream that
//! follows; it is a property of the whole dump, not of any one packet.

use std::borrow::Cow;
use std::fmt;

use crate::config::{HEADER_LEN, KEY_LEN_V1, MAGIC_BYTES, PROTOCOL_VERSION};
use crate::error::{Result, TasdError};
use crate::utils::octets::{OctetsExt, OctetsMutExt};

const VERSION_OFFSET: usize = 4;
const KEY_LENGTH_OFFSET: usize = 6;

/// A TASD file header: magic bytes, format version, and the global key
/// length of the packet stream that follows.
///
/// Parsing borrows the first 7 octets of the caller's buffer without
/// copying; [`RawHeader::new`] builds a header that owns its 7 octets
/// inline. Two headers compare equal when their version and key length
/// match, regardless of which storage backs them.
#[derive(Clone)]
pub struct RawHeader<'a> {
    raw: Cow<'a, [u8; HEADER_LEN]>,
}

impl<'a> RawHeader<'a> {
    /// Version 1 with 2-octet packet keys, the only key width the filtered
    /// stream and typed registry operate on.
    pub const V1_TWO_OCTET_KEYS: RawHeader<'static> = RawHeader {
        raw: Cow::Owned(encode_parts(PROTOCOL_VERSION, KEY_LEN_V1 as u8)),
    };

    /// Builds a header owning its backing octets.
    pub fn new(version: u16, global_key_length: u8) -> RawHeader<'static> {
        RawHeader {
            raw: Cow::Owned(encode_parts(version, global_key_length)),
        }
    }

    /// Parses a header from the start of `buf`, borrowing `buf[0..7]`.
    ///
    /// # Errors
    /// - [`TasdError::MissingMagicBytes`] if `buf` does not begin with the
    ///   4 magic octets (including buffers shorter than 4)
    /// - [`TasdError::HeaderTooShort`] if the magic matches but fewer than
    ///   7 octets are present
    pub fn parse(buf: &'a [u8]) -> Result<RawHeader<'a>> {
        if !buf.starts_with(&MAGIC_BYTES) {
            return Err(TasdError::MissingMagicBytes);
        }
        let Some(raw) = buf.first_chunk::<HEADER_LEN>() else {
            return Err(TasdError::HeaderTooShort(buf.len()));
        };
        Ok(RawHeader {
            raw: Cow::Borrowed(raw),
        })
    }

    /// Non-raising form of [`RawHeader::parse`]; agrees with it on every
    /// input.
    pub fn try_parse(buf: &'a [u8]) -> Option<RawHeader<'a>> {
        Self::parse(buf).ok()
    }

    /// Writes magic + `version` + `global_key_length` into `dst[0..7]`.
    ///
    /// # Errors
    /// [`TasdError::DestinationTooShort`] if `dst` holds fewer than 7
    /// octets.
    pub fn write_to(dst: &mut [u8], version: u16, global_key_length: u8) -> Result<()> {
        if dst.len() < HEADER_LEN {
            return Err(TasdError::DestinationTooShort(HEADER_LEN));
        }
        dst[..MAGIC_BYTES.len()].copy_from_slice(&MAGIC_BYTES);
        dst.put_u16_be(version, VERSION_OFFSET);
        dst[KEY_LENGTH_OFFSET] = global_key_length;
        Ok(())
    }

    /// Non-raising form of [`RawHeader::write_to`].
    pub fn try_write_to(dst: &mut [u8], version: u16, global_key_length: u8) -> bool {
        Self::write_to(dst, version, global_key_length).is_ok()
    }

    /// Writes this header's 7 octets into `dst[0..7]`.
    ///
    /// # Errors
    /// [`TasdError::DestinationTooShort`] if `dst` holds fewer than 7
    /// octets.
    pub fn encode_into(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() < HEADER_LEN {
            return Err(TasdError::DestinationTooShort(HEADER_LEN));
        }
        dst[..HEADER_LEN].copy_from_slice(self.as_bytes());
        Ok(())
    }

    /// Format revision, big-endian on the wire. Not interpreted by this
    /// layer beyond storage and comparison.
    pub fn version(&self) -> u16 {
        self.raw.get_u16_be(VERSION_OFFSET)
    }

    /// Fixed octet width of every packet key in the stream.
    pub fn global_key_length(&self) -> u8 {
        self.raw[KEY_LENGTH_OFFSET]
    }

    /// The header's 7 wire octets.
    pub fn as_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.raw
    }

    /// Detaches the header from its source buffer.
    pub fn into_owned(self) -> RawHeader<'static> {
        RawHeader {
            raw: Cow::Owned(*self.raw),
        }
    }
}

const fn encode_parts(version: u16, global_key_length: u8) -> [u8; HEADER_LEN] {
    let v = version.to_be_bytes();
    [
        MAGIC_BYTES[0],
        MAGIC_BYTES[1],
        MAGIC_BYTES[2],
        MAGIC_BYTES[3],
        v[0],
        v[1],
        global_key_length,
    ]
}

impl PartialEq for RawHeader<'_> {
    fn eq(&self, other: &Self) -> bool {
        // Magic is fixed, so only the version and key length octets vary.
        self.raw[VERSION_OFFSET..] == other.raw[VERSION_OFFSET..]
    }
}

impl Eq for RawHeader<'_> {}

impl fmt::Debug for RawHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHeader")
            .field("version", &self.version())
            .field("global_key_length", &self.global_key_length())
            .finish()
    }
}

impl fmt::Display for RawHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TASD v{}, {}-octet keys",
            self.version(),
            self.global_key_length()
        )
    }
}
