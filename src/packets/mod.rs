//! # Typed Packet Registry
//!
//! Version-1 key assignments and best-effort typed decoding.
//!
//! ## Components
//! - **PacketKey**: the version-1 key registry as a 2-octet enum
//! - **TypedPacket**: decoded payloads for the general metadata keys
//! - **TasdFile**: whole-dump parse and write
//!
//! Decoding is total and lenient. A payload that does not match its key's
//! documented shape, and any key without a typed decoder (console-specific
//! and input keys among them), is preserved octet-for-octet as
//! [`TypedPacket::Unrecognized`], so parsing a dump and writing it back
//! never drops data it did not understand.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{HEADER_LEN, KEY_LEN_V1, PROTOCOL_VERSION};
use crate::core::header::RawHeader;
use crate::core::packet::RawPacket;
use crate::core::stream::StrictPacketStream;
use crate::error::{Result, TasdError};
use crate::utils::octets::OctetsExt;

/// Version-1 packet keys, big-endian 2-octet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum PacketKey {
    // general
    ConsoleType = 0x0001,
    ConsoleRegion = 0x0002,
    GameTitle = 0x0003,
    RomName = 0x0004,
    Attribution = 0x0005,
    Category = 0x0006,
    EmulatorName = 0x0007,
    EmulatorVersion = 0x0008,
    EmulatorCore = 0x0009,
    TasLastModified = 0x000A,
    DumpCreated = 0x000B,
    DumpLastModified = 0x000C,
    TotalFrames = 0x000D,
    Rerecords = 0x000E,
    SourceLink = 0x000F,
    BlankFrames = 0x0010,
    Verified = 0x0011,
    MemoryInit = 0x0012,
    GameIdentifier = 0x0013,
    MovieLicense = 0x0014,
    MovieFile = 0x0015,
    PortController = 0x00F0,

    // NES
    NesLatchFilter = 0x0101,
    NesClockFilter = 0x0102,
    NesOverread = 0x0103,
    NesGameGenieCode = 0x0104,

    // SNES
    SnesClockFilter = 0x0202,
    SnesOverread = 0x0203,
    SnesGameGenieCode = 0x0204,
    SnesLatchTrain = 0x0205,

    // Genesis
    GenesisGameGenieCode = 0x0804,

    // inputs
    InputChunk = 0xFE01,
    InputMoment = 0xFE02,
    Transition = 0xFE03,
    LagFrameChunk = 0xFE04,
    MovieTransition = 0xFE05,

    // misc.
    Comment = 0xFF01,
    Experimental = 0xFFFE,
    Unspecified = 0xFFFF,
}

impl PacketKey {
    /// Looks `value` up in the version-1 registry.
    pub fn from_u16(value: u16) -> Option<PacketKey> {
        let key = match value {
            0x0001 => PacketKey::ConsoleType,
            0x0002 => PacketKey::ConsoleRegion,
            0x0003 => PacketKey::GameTitle,
            0x0004 => PacketKey::RomName,
            0x0005 => PacketKey::Attribution,
            0x0006 => PacketKey::Category,
            0x0007 => PacketKey::EmulatorName,
            0x0008 => PacketKey::EmulatorVersion,
            0x0009 => PacketKey::EmulatorCore,
            0x000A => PacketKey::TasLastModified,
            0x000B => PacketKey::DumpCreated,
            0x000C => PacketKey::DumpLastModified,
            0x000D => PacketKey::TotalFrames,
            0x000E => PacketKey::Rerecords,
            0x000F => PacketKey::SourceLink,
            0x0010 => PacketKey::BlankFrames,
            0x0011 => PacketKey::Verified,
            0x0012 => PacketKey::MemoryInit,
            0x0013 => PacketKey::GameIdentifier,
            0x0014 => PacketKey::MovieLicense,
            0x0015 => PacketKey::MovieFile,
            0x00F0 => PacketKey::PortController,
            0x0101 => PacketKey::NesLatchFilter,
            0x0102 => PacketKey::NesClockFilter,
            0x0103 => PacketKey::NesOverread,
            0x0104 => PacketKey::NesGameGenieCode,
            0x0202 => PacketKey::SnesClockFilter,
            0x0203 => PacketKey::SnesOverread,
            0x0204 => PacketKey::SnesGameGenieCode,
            0x0205 => PacketKey::SnesLatchTrain,
            0x0804 => PacketKey::GenesisGameGenieCode,
            0xFE01 => PacketKey::InputChunk,
            0xFE02 => PacketKey::InputMoment,
            0xFE03 => PacketKey::Transition,
            0xFE04 => PacketKey::LagFrameChunk,
            0xFE05 => PacketKey::MovieTransition,
            0xFF01 => PacketKey::Comment,
            0xFFFE => PacketKey::Experimental,
            0xFFFF => PacketKey::Unspecified,
            _ => return None,
        };
        Some(key)
    }
}

impl From<PacketKey> for u16 {
    fn from(key: PacketKey) -> u16 {
        key as u16
    }
}

/// A packet decoded as far as its key allows.
///
/// Text payloads are decoded as UTF-8 with replacement characters for
/// invalid sequences; timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedPacket {
    ConsoleType { kind: u8, custom: Option<String> },
    ConsoleRegion(u8),
    GameTitle(String),
    RomName(String),
    Attribution { kind: u8, name: String },
    Category(String),
    EmulatorName(String),
    EmulatorVersion(String),
    EmulatorCore(String),
    TasLastModified(i64),
    DumpCreated(i64),
    DumpLastModified(i64),
    TotalFrames(u32),
    Rerecords(u32),
    SourceLink(String),
    BlankFrames(i16),
    Verified(bool),
    GameIdentifier { kind: u8, encoding: u8, digest: Vec<u8> },
    MovieLicense(String),
    PortController { port: u8, peripheral: u16 },
    Comment(String),
    Experimental(bool),
    /// Key `0xFFFF`, carried verbatim.
    Unspecified(Vec<u8>),
    /// Any other key, or a known key whose payload did not fit its shape.
    Unrecognized { key: u16, payload: Vec<u8> },
}

fn text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}

fn seconds(payload: &[u8]) -> Option<i64> {
    (payload.len() == 8).then(|| payload.get_u64_be(0) as i64)
}

fn count(payload: &[u8]) -> Option<u32> {
    (payload.len() == 4).then(|| payload.get_u32_be(0))
}

impl TypedPacket {
    /// Decodes one packet payload under `key`. Never fails: inputs that do
    /// not fit a known shape come back as [`TypedPacket::Unrecognized`].
    pub fn decode(key: u16, payload: &[u8]) -> TypedPacket {
        let fallback = || TypedPacket::Unrecognized {
            key,
            payload: payload.to_vec(),
        };
        let Some(known) = PacketKey::from_u16(key) else {
            return fallback();
        };
        match known {
            PacketKey::ConsoleType => match payload {
                [kind] => TypedPacket::ConsoleType {
                    kind: *kind,
                    custom: None,
                },
                [kind, rest @ ..] => TypedPacket::ConsoleType {
                    kind: *kind,
                    custom: Some(text(rest)),
                },
                [] => fallback(),
            },
            PacketKey::ConsoleRegion => match payload {
                [region] => TypedPacket::ConsoleRegion(*region),
                _ => fallback(),
            },
            PacketKey::GameTitle => TypedPacket::GameTitle(text(payload)),
            PacketKey::RomName => TypedPacket::RomName(text(payload)),
            PacketKey::Attribution => match payload {
                [kind, rest @ ..] => TypedPacket::Attribution {
                    kind: *kind,
                    name: text(rest),
                },
                [] => fallback(),
            },
            PacketKey::Category => TypedPacket::Category(text(payload)),
            PacketKey::EmulatorName => TypedPacket::EmulatorName(text(payload)),
            PacketKey::EmulatorVersion => TypedPacket::EmulatorVersion(text(payload)),
            PacketKey::EmulatorCore => TypedPacket::EmulatorCore(text(payload)),
            PacketKey::TasLastModified => match seconds(payload) {
                Some(stamp) => TypedPacket::TasLastModified(stamp),
                None => fallback(),
            },
            PacketKey::DumpCreated => match seconds(payload) {
                Some(stamp) => TypedPacket::DumpCreated(stamp),
                None => fallback(),
            },
            PacketKey::DumpLastModified => match seconds(payload) {
                Some(stamp) => TypedPacket::DumpLastModified(stamp),
                None => fallback(),
            },
            PacketKey::TotalFrames => match count(payload) {
                Some(frames) => TypedPacket::TotalFrames(frames),
                None => fallback(),
            },
            PacketKey::Rerecords => match count(payload) {
                Some(rerecords) => TypedPacket::Rerecords(rerecords),
                None => fallback(),
            },
            PacketKey::SourceLink => TypedPacket::SourceLink(text(payload)),
            PacketKey::BlankFrames => match payload {
                [hi, lo] => TypedPacket::BlankFrames(i16::from_be_bytes([*hi, *lo])),
                _ => fallback(),
            },
            PacketKey::Verified => match payload {
                [value] => TypedPacket::Verified(*value != 0),
                _ => fallback(),
            },
            PacketKey::GameIdentifier => match payload {
                [kind, encoding, digest @ ..] => TypedPacket::GameIdentifier {
                    kind: *kind,
                    encoding: *encoding,
                    digest: digest.to_vec(),
                },
                _ => fallback(),
            },
            PacketKey::MovieLicense => TypedPacket::MovieLicense(text(payload)),
            PacketKey::PortController => match payload {
                [port, hi, lo] => TypedPacket::PortController {
                    port: *port,
                    peripheral: u16::from_be_bytes([*hi, *lo]),
                },
                _ => fallback(),
            },
            PacketKey::Comment => TypedPacket::Comment(text(payload)),
            PacketKey::Experimental => match payload {
                [value] => TypedPacket::Experimental(*value != 0),
                _ => fallback(),
            },
            PacketKey::Unspecified => TypedPacket::Unspecified(payload.to_vec()),
            // Memory, movie-file, console-specific, and input keys have no
            // typed shape here yet.
            _ => fallback(),
        }
    }

    /// The registry key this packet is written under.
    pub fn key(&self) -> u16 {
        match self {
            TypedPacket::ConsoleType { .. } => PacketKey::ConsoleType.into(),
            TypedPacket::ConsoleRegion(_) => PacketKey::ConsoleRegion.into(),
            TypedPacket::GameTitle(_) => PacketKey::GameTitle.into(),
            TypedPacket::RomName(_) => PacketKey::RomName.into(),
            TypedPacket::Attribution { .. } => PacketKey::Attribution.into(),
            TypedPacket::Category(_) => PacketKey::Category.into(),
            TypedPacket::EmulatorName(_) => PacketKey::EmulatorName.into(),
            TypedPacket::EmulatorVersion(_) => PacketKey::EmulatorVersion.into(),
            TypedPacket::EmulatorCore(_) => PacketKey::EmulatorCore.into(),
            TypedPacket::TasLastModified(_) => PacketKey::TasLastModified.into(),
            TypedPacket::DumpCreated(_) => PacketKey::DumpCreated.into(),
            TypedPacket::DumpLastModified(_) => PacketKey::DumpLastModified.into(),
            TypedPacket::TotalFrames(_) => PacketKey::TotalFrames.into(),
            TypedPacket::Rerecords(_) => PacketKey::Rerecords.into(),
            TypedPacket::SourceLink(_) => PacketKey::SourceLink.into(),
            TypedPacket::BlankFrames(_) => PacketKey::BlankFrames.into(),
            TypedPacket::Verified(_) => PacketKey::Verified.into(),
            TypedPacket::GameIdentifier { .. } => PacketKey::GameIdentifier.into(),
            TypedPacket::MovieLicense(_) => PacketKey::MovieLicense.into(),
            TypedPacket::PortController { .. } => PacketKey::PortController.into(),
            TypedPacket::Comment(_) => PacketKey::Comment.into(),
            TypedPacket::Experimental(_) => PacketKey::Experimental.into(),
            TypedPacket::Unspecified(_) => PacketKey::Unspecified.into(),
            TypedPacket::Unrecognized { key, .. } => *key,
        }
    }

    /// Encodes this packet's payload octets, the inverse of
    /// [`TypedPacket::decode`].
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            TypedPacket::ConsoleType { kind, custom } => {
                let mut payload = vec![*kind];
                if let Some(name) = custom {
                    payload.extend_from_slice(name.as_bytes());
                }
                payload
            }
            TypedPacket::ConsoleRegion(region) => vec![*region],
            TypedPacket::GameTitle(value)
            | TypedPacket::RomName(value)
            | TypedPacket::Category(value)
            | TypedPacket::EmulatorName(value)
            | TypedPacket::EmulatorVersion(value)
            | TypedPacket::EmulatorCore(value)
            | TypedPacket::SourceLink(value)
            | TypedPacket::MovieLicense(value)
            | TypedPacket::Comment(value) => value.as_bytes().to_vec(),
            TypedPacket::Attribution { kind, name } => {
                let mut payload = vec![*kind];
                payload.extend_from_slice(name.as_bytes());
                payload
            }
            TypedPacket::TasLastModified(stamp)
            | TypedPacket::DumpCreated(stamp)
            | TypedPacket::DumpLastModified(stamp) => stamp.to_be_bytes().to_vec(),
            TypedPacket::TotalFrames(value) | TypedPacket::Rerecords(value) => {
                value.to_be_bytes().to_vec()
            }
            TypedPacket::BlankFrames(value) => value.to_be_bytes().to_vec(),
            TypedPacket::Verified(value) | TypedPacket::Experimental(value) => {
                vec![u8::from(*value)]
            }
            TypedPacket::GameIdentifier {
                kind,
                encoding,
                digest,
            } => {
                let mut payload = vec![*kind, *encoding];
                payload.extend_from_slice(digest);
                payload
            }
            TypedPacket::PortController { port, peripheral } => {
                let mut payload = vec![*port];
                payload.extend_from_slice(&peripheral.to_be_bytes());
                payload
            }
            TypedPacket::Unspecified(payload) => payload.clone(),
            TypedPacket::Unrecognized { payload, .. } => payload.clone(),
        }
    }
}

/// A whole dump, parsed to the typed layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasdFile {
    /// Format version from the file header.
    pub version: u16,
    /// Packets in file order.
    pub packets: Vec<TypedPacket>,
}

impl Default for TasdFile {
    fn default() -> TasdFile {
        TasdFile {
            version: PROTOCOL_VERSION,
            packets: Vec::new(),
        }
    }
}

impl TasdFile {
    /// Parses a complete in-memory dump.
    ///
    /// # Errors
    /// - header errors from [`RawHeader::parse`]
    /// - [`TasdError::UnsupportedKeyLength`] when the header declares a key
    ///   width other than 2 octets
    /// - packet framing errors for a truncated or corrupt packet sequence
    pub fn parse(buf: &[u8]) -> Result<TasdFile> {
        let stream = StrictPacketStream::new(buf)?;
        let version = stream.header().version();
        let declared = stream.header().global_key_length();
        if usize::from(declared) != KEY_LEN_V1 {
            return Err(TasdError::UnsupportedKeyLength(declared));
        }
        let mut packets = Vec::new();
        for raw in stream {
            let raw = raw?;
            packets.push(TypedPacket::decode(raw.key.get_u16_be(0), raw.payload));
        }
        debug!(version, packets = packets.len(), "parsed dump");
        Ok(TasdFile { version, packets })
    }

    /// Writes the header and every packet back to canonical wire form.
    ///
    /// # Errors
    /// [`TasdError::LengthFieldTooHigh`] when a payload cannot fit a
    /// 4-octet length field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![0; HEADER_LEN];
        RawHeader::write_to(&mut out, self.version, KEY_LEN_V1 as u8)?;
        for packet in &self.packets {
            let key = packet.key().to_be_bytes();
            let payload = packet.encode_payload();
            let start = out.len();
            out.resize(start + RawPacket::encoded_len(key.len(), payload.len()), 0);
            RawPacket::write_to(&mut out[start..], &key, &payload)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_round_trips_every_key() {
        let keys = [
            PacketKey::ConsoleType,
            PacketKey::ConsoleRegion,
            PacketKey::GameTitle,
            PacketKey::RomName,
            PacketKey::Attribution,
            PacketKey::Category,
            PacketKey::EmulatorName,
            PacketKey::EmulatorVersion,
            PacketKey::EmulatorCore,
            PacketKey::TasLastModified,
            PacketKey::DumpCreated,
            PacketKey::DumpLastModified,
            PacketKey::TotalFrames,
            PacketKey::Rerecords,
            PacketKey::SourceLink,
            PacketKey::BlankFrames,
            PacketKey::Verified,
            PacketKey::MemoryInit,
            PacketKey::GameIdentifier,
            PacketKey::MovieLicense,
            PacketKey::MovieFile,
            PacketKey::PortController,
            PacketKey::NesLatchFilter,
            PacketKey::NesClockFilter,
            PacketKey::NesOverread,
            PacketKey::NesGameGenieCode,
            PacketKey::SnesClockFilter,
            PacketKey::SnesOverread,
            PacketKey::SnesGameGenieCode,
            PacketKey::SnesLatchTrain,
            PacketKey::GenesisGameGenieCode,
            PacketKey::InputChunk,
            PacketKey::InputMoment,
            PacketKey::Transition,
            PacketKey::LagFrameChunk,
            PacketKey::MovieTransition,
            PacketKey::Comment,
            PacketKey::Experimental,
            PacketKey::Unspecified,
        ];
        assert_eq!(keys.len(), 39);
        for key in keys {
            assert_eq!(PacketKey::from_u16(u16::from(key)), Some(key));
        }
        assert_eq!(PacketKey::from_u16(0x0016), None);
        assert_eq!(PacketKey::from_u16(0x00F1), None);
        assert_eq!(PacketKey::from_u16(0xFE00), None);
    }

    #[test]
    fn payload_encoding_inverts_decoding() {
        let samples = [
            TypedPacket::ConsoleType {
                kind: 0x80,
                custom: Some("Homebrew Deck".to_owned()),
            },
            TypedPacket::ConsoleRegion(0x01),
            TypedPacket::GameTitle("Mega Example".to_owned()),
            TypedPacket::Attribution {
                kind: 0x01,
                name: "dumper".to_owned(),
            },
            TypedPacket::TasLastModified(-1),
            TypedPacket::DumpCreated(1_650_000_000),
            TypedPacket::TotalFrames(262_144),
            TypedPacket::Rerecords(9_001),
            TypedPacket::BlankFrames(-2),
            TypedPacket::Verified(true),
            TypedPacket::GameIdentifier {
                kind: 0x02,
                encoding: 0x01,
                digest: vec![0xDE, 0xAD, 0xBE, 0xEF],
            },
            TypedPacket::PortController {
                port: 1,
                peripheral: 0x0101,
            },
            TypedPacket::Comment("round trip".to_owned()),
            TypedPacket::Experimental(false),
            TypedPacket::Unspecified(vec![0x00, 0xFF]),
            TypedPacket::Unrecognized {
                key: 0xFE01,
                payload: vec![0x12, 0x34],
            },
        ];
        for packet in samples {
            let reparsed = TypedPacket::decode(packet.key(), &packet.encode_payload());
            assert_eq!(reparsed, packet);
        }
    }

    #[test]
    fn malformed_shapes_fall_back_verbatim() {
        let cases: [(u16, &[u8]); 4] = [
            (u16::from(PacketKey::ConsoleRegion), &[0x01, 0x02]),
            (u16::from(PacketKey::TotalFrames), &[0x00, 0x01]),
            (u16::from(PacketKey::PortController), &[0x01]),
            (u16::from(PacketKey::Verified), &[]),
        ];
        for (key, payload) in cases {
            assert_eq!(
                TypedPacket::decode(key, payload),
                TypedPacket::Unrecognized {
                    key,
                    payload: payload.to_vec()
                }
            );
        }
    }

    #[test]
    fn untyped_keys_keep_their_octets() {
        let decoded = TypedPacket::decode(u16::from(PacketKey::InputChunk), &[0x00, 0xFF, 0x7F]);
        assert_eq!(
            decoded,
            TypedPacket::Unrecognized {
                key: 0xFE01,
                payload: vec![0x00, 0xFF, 0x7F]
            }
        );
        assert_eq!(decoded.key(), 0xFE01);
    }
}
