//! # Packet Stream Enumeration
//!
//! Single-pass cursors over the packet sequence of an in-memory dump.
//!
//! ## Components
//! - **PacketStream**: quiet traversal; malformed input simply ends the
//!   stream
//! - **StrictPacketStream**: same traversal, but a malformed packet is
//!   surfaced once as an error item before the stream fuses
//! - **OfKey**: wraps either stream, yielding only packets with a target
//!   2-octet key
//!
//! Both streams borrow the dump buffer, start immediately after the 7-octet
//! header, and advance by each packet's reported end offset. Cloning a
//! stream clones its cursor; the clones advance independently.

use crate::config::{HEADER_LEN, KEY_LEN_V1};
use crate::core::header::RawHeader;
use crate::core::packet::RawPacket;
use crate::error::{Result, TasdError};

/// Quiet packet cursor: yields packets until the buffer is exhausted or a
/// packet fails to parse, then yields `None` forever. Callers that need to
/// know *why* iteration stopped can re-parse at [`PacketStream::offset`]
/// with [`RawPacket::parse`], or use [`StrictPacketStream`].
#[derive(Debug, Clone)]
pub struct PacketStream<'a> {
    header: RawHeader<'a>,
    buf: &'a [u8],
    offset: usize,
}

impl<'a> PacketStream<'a> {
    /// Parses the file header of `buf` and positions the cursor on the
    /// first packet. Returns `None` when the header is malformed.
    pub fn try_new(buf: &'a [u8]) -> Option<PacketStream<'a>> {
        let header = RawHeader::try_parse(buf)?;
        Some(PacketStream {
            header,
            buf,
            offset: HEADER_LEN,
        })
    }

    /// The header this stream was seeded with.
    pub fn header(&self) -> &RawHeader<'a> {
        &self.header
    }

    /// Offset of the next unparsed packet within the dump buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Restricts this stream to packets whose key equals `key`.
    ///
    /// # Errors
    /// [`TasdError::UnsupportedKeyLength`] when the header declares a key
    /// width other than 2 octets.
    pub fn of_key(self, key: impl Into<u16>) -> Result<OfKey<PacketStream<'a>>> {
        let declared = self.header.global_key_length();
        OfKey::new(self, key.into(), declared)
    }
}

impl<'a> Iterator for PacketStream<'a> {
    type Item = RawPacket<'a>;

    fn next(&mut self) -> Option<RawPacket<'a>> {
        let (packet, end) = RawPacket::try_parse(&self.buf[self.offset..], &self.header)?;
        self.offset += end;
        Some(packet)
    }
}

/// Raising packet cursor: yields `Ok` packets, and surfaces a malformed
/// packet as one `Err` item before fusing. A dump whose last packet ends
/// exactly at the end of the buffer terminates with plain `None`, so `Err`
/// always means truncation or corruption, never a clean end.
#[derive(Debug, Clone)]
pub struct StrictPacketStream<'a> {
    header: RawHeader<'a>,
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> StrictPacketStream<'a> {
    /// Parses the file header of `buf` and positions the cursor on the
    /// first packet.
    ///
    /// # Errors
    /// Propagates [`RawHeader::parse`] errors for a malformed header.
    pub fn new(buf: &'a [u8]) -> Result<StrictPacketStream<'a>> {
        let header = RawHeader::parse(buf)?;
        Ok(StrictPacketStream {
            header,
            buf,
            offset: HEADER_LEN,
            done: false,
        })
    }

    /// The header this stream was seeded with.
    pub fn header(&self) -> &RawHeader<'a> {
        &self.header
    }

    /// Offset of the next unparsed packet within the dump buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Restricts this stream to packets whose key equals `key`; `Err`
    /// items still pass through.
    ///
    /// # Errors
    /// [`TasdError::UnsupportedKeyLength`] when the header declares a key
    /// width other than 2 octets.
    pub fn of_key(self, key: impl Into<u16>) -> Result<OfKey<StrictPacketStream<'a>>> {
        let declared = self.header.global_key_length();
        OfKey::new(self, key.into(), declared)
    }
}

impl<'a> Iterator for StrictPacketStream<'a> {
    type Item = Result<RawPacket<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.offset == self.buf.len() {
            self.done = true;
            return None;
        }
        match RawPacket::parse(&self.buf[self.offset..], &self.header) {
            Ok((packet, end)) => {
                self.offset += end;
                Some(Ok(packet))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Key-filtered view over a packet stream. Construct with
/// [`PacketStream::of_key`] or [`StrictPacketStream::of_key`].
#[derive(Debug, Clone)]
pub struct OfKey<I> {
    inner: I,
    key: [u8; KEY_LEN_V1],
}

impl<I> OfKey<I> {
    fn new(inner: I, key: u16, declared_key_length: u8) -> Result<OfKey<I>> {
        // The comparison below is fixed at 2 octets, so wider (or narrower)
        // streams cannot be filtered.
        if usize::from(declared_key_length) != KEY_LEN_V1 {
            return Err(TasdError::UnsupportedKeyLength(declared_key_length));
        }
        Ok(OfKey {
            inner,
            key: key.to_be_bytes(),
        })
    }

    /// The target key as a big-endian integer.
    pub fn key(&self) -> u16 {
        u16::from_be_bytes(self.key)
    }
}

impl<'a> Iterator for OfKey<PacketStream<'a>> {
    type Item = RawPacket<'a>;

    fn next(&mut self) -> Option<RawPacket<'a>> {
        let key = self.key;
        self.inner.find(|packet| packet.key == key)
    }
}

impl<'a> Iterator for OfKey<StrictPacketStream<'a>> {
    type Item = Result<RawPacket<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(packet) if packet.key == self.key => return Some(Ok(packet)),
                Ok(_) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
