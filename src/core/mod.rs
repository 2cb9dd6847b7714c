//! # Core Container Components
//!
//! Low-level dump handling: the file header, packet framing, and stream
//! enumeration.
//!
//! This module provides the foundation for the container format, handling
//! header validation, packet parsing and writing, and incremental decoding.
//!
//! ## Components
//! - **Header**: 7-octet file header with magic bytes, version, and key
//!   length
//! - **Packet**: key/length/payload framing with variable-width lengths
//! - **Stream**: quiet and raising cursors over an in-memory dump
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Version(2)] [KeyLength(1)]
//! [Key(KeyLength)] [LengthWidth(1)] [Length(0-4)] [Payload(N)]
//! ```

pub mod codec;
pub mod header;
pub mod packet;
pub mod stream;
