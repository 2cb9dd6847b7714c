//! # Wire Constants
//!
//! Fixed parameters of the TASD container format.
//!
//! Everything here is dictated by the published format: the magic bytes and
//! header size are structural, and the payload ceiling is derived from what a
//! single in-memory buffer can address once framing overhead is subtracted.
//!
//! ## Security Considerations
//! - `MAX_PAYLOAD_LEN` bounds the length a packet may declare, so a hostile
//!   length field cannot drive offset arithmetic past the addressable range.
//! - Magic bytes prevent accidental misinterpretation of non-TASD files.

/// Current supported format version, stored big-endian in the header.
pub const PROTOCOL_VERSION: u16 = 1;

/// Magic bytes identifying a TASD dump (0x54415344, "TASD").
pub const MAGIC_BYTES: [u8; 4] = [0x54, 0x41, 0x53, 0x44];

/// Fixed size of the file header: magic (4) + version (2) + key length (1).
pub const HEADER_LEN: usize = 7;

/// Packet key width declared by version 1 dumps. The key-filtered stream and
/// the typed registry only operate at this width.
pub const KEY_LEN_V1: usize = 2;

/// Widest supported length field (PEXP); larger declared widths are rejected.
pub const MAX_LENGTH_WIDTH: usize = 4;

/// Max payload length a packet may declare: the largest positive signed
/// offset the host can address, minus header and packet framing overhead.
pub const MAX_PAYLOAD_LEN: u64 =
    (isize::MAX as u64) - (HEADER_LEN as u64 + 1 + MAX_LENGTH_WIDTH as u64);
