//! # TASD Codec
//!
//! Zero-copy reader and writer for the TASD container format, the binary
//! interchange format for tool-assisted-emulation dumps.
//!
//! A dump is a 7-octet file header followed by a flat sequence of packets.
//! Every packet carries a key (its type, 2 octets in version 1), a
//! variable-width big-endian payload length, and the payload itself.
//!
//! ## Components
//! - **[`RawHeader`]**: file header parsing and writing
//! - **[`RawPacket`]**: single-packet parsing and canonical writing over
//!   borrowed octets
//! - **[`PacketStream`] / [`StrictPacketStream`]**: cursors over an
//!   in-memory dump, with [`OfKey`] filtering by packet key
//! - **[`TasdCodec`]**: incremental [`tokio_util::codec`] framing for byte
//!   streams
//! - **[`TasdFile`] / [`TypedPacket`]**: the version-1 key registry and
//!   best-effort typed decoding
//!
//! ## Wire Format
//! ```text
//! [Magic "TASD"(4)] [Version(2, BE)] [KeyLength(1)]
//! [Key(KeyLength)] [LengthWidth(1)] [Length(0-4, BE)] [Payload(N)]
//! ```
//!
//! ## Example
//! ```rust
//! use tasd_codec::PacketStream;
//!
//! let mut dump = vec![0x54, 0x41, 0x53, 0x44, 0x00, 0x01, 0x02];
//! dump.extend_from_slice(&[0xFF, 0x01, 0x01, 0x0D]);
//! dump.extend_from_slice(b"Hello, world!");
//!
//! let mut packets = PacketStream::try_new(&dump).unwrap();
//! let comment = packets.next().unwrap();
//! assert_eq!(comment.key, [0xFF, 0x01]);
//! assert_eq!(comment.payload, b"Hello, world!");
//! assert!(packets.next().is_none());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod packets;
pub mod utils;

pub use crate::core::codec::{OwnedPacket, TasdCodec};
pub use crate::core::header::RawHeader;
pub use crate::core::packet::RawPacket;
pub use crate::core::stream::{OfKey, PacketStream, StrictPacketStream};
pub use crate::error::{Result, TasdError};
pub use crate::packets::{PacketKey, TasdFile, TypedPacket};
