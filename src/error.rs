//! # Error Types
//!
//! Error handling for the TASD codec.
//!
//! This module defines all error variants that can occur while reading or
//! writing the container format, from a missing magic number to a payload
//! that runs past the end of its buffer.
//!
//! ## Error Categories
//! - **Header errors**: missing magic bytes, truncated header
//! - **Packet errors**: truncated packet header or length field, oversized or
//!   truncated payloads
//! - **Write errors**: destination buffer too small for the encoded form
//! - **Stream errors**: unsupported key widths, I/O failures while feeding
//!   the incremental decoder
//!
//! Every failure is a data-validation error surfaced to the immediate
//! caller; nothing here is transient or retried internally. All errors
//! implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use tasd_codec::error::{Result, TasdError};
//! use tasd_codec::core::header::RawHeader;
//!
//! fn dump_version(buf: &[u8]) -> Result<u16> {
//!     let header = RawHeader::parse(buf)?;
//!     Ok(header.version())
//! }
//!
//! assert!(matches!(
//!     dump_version(b"not a tasd dump"),
//!     Err(TasdError::MissingMagicBytes)
//! ));
//! assert_eq!(
//!     dump_version(&[0x54, 0x41, 0x53, 0x44, 0x00, 0x01, 0x02]).ok(),
//!     Some(1)
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// TasdError is the primary error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum TasdError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("magic bytes 'TASD' not found at start of buffer")]
    MissingMagicBytes,

    #[error("header truncated: {0} of 7 octets present")]
    HeaderTooShort(usize),

    #[error("packet header truncated: buffer holds {0} octet(s)")]
    PacketHeaderTooShort(usize),

    #[error("length field truncated: {0}-octet length declared")]
    LengthFieldTooShort(u8),

    #[error("length field too high: {0}")]
    LengthFieldTooHigh(u64),

    #[error("payload truncated: packet extends to offset {0}")]
    PayloadTooShort(usize),

    #[error("destination too short: {0} octets required")]
    DestinationTooShort(usize),

    #[error("unsupported key length: {0} octets (only 2-octet keys)")]
    UnsupportedKeyLength(u8),
}

/// Type alias for Results using TasdError
pub type Result<T> = std::result::Result<T, TasdError>;
