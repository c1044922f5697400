use std::fmt;
use std::io::Read;

use crate::codec::Compression;
use crate::error::{read_array, Error, Result};
use crate::walker::BeWalker;

pub const PAYLOAD_HEADER_SIZE: usize = 32;

/// Which record decoder a payload's body is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum RecordKind {
    Meta       = 1,
    Content    = 2,
    Layout     = 3,
    Index      = 4,
    Attributes = 5,
}

impl RecordKind {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(RecordKind::Meta),
            2 => Some(RecordKind::Content),
            3 => Some(RecordKind::Layout),
            4 => Some(RecordKind::Index),
            5 => Some(RecordKind::Attributes),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Meta       => "Meta",
            RecordKind::Content    => "Content",
            RecordKind::Layout     => "Layout",
            RecordKind::Index      => "Index",
            RecordKind::Attributes => "Attributes",
        })
    }
}

/// The fixed 32-byte header in front of every payload body.
///
/// `kind` and `compression` are kept raw: a header with values this build
/// does not know still parses, so its body can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct PayloadHeader {
    pub stored_size: u64,
    pub plain_size:  u64,
    pub checksum:    u64,
    pub num_records: u32,
    pub version:     u16,
    pub kind:        u8,
    pub compression: u8,
}

impl PayloadHeader {
    pub fn read<R: Read>(mut src: R) -> Result<Self> {
        let raw: [u8; PAYLOAD_HEADER_SIZE] = read_array(&mut src)?;
        Self::from_bytes(&raw)
    }

    pub fn from_bytes(raw: &[u8; PAYLOAD_HEADER_SIZE]) -> Result<Self> {
        let mut wlk = BeWalker::new(raw);
        Ok(Self {
            stored_size: wlk.read_u64()?,
            plain_size:  wlk.read_u64()?,
            checksum:    wlk.read_u64()?,
            num_records: wlk.read_u32()?,
            version:     wlk.read_u16()?,
            kind:        wlk.read_u8()?,
            compression: wlk.read_u8()?,
        })
    }

    pub fn record_kind(&self) -> Result<RecordKind> {
        RecordKind::from_raw(self.kind).ok_or(Error::UnknownPayloadKind(self.kind))
    }

    pub fn compression(&self) -> Result<Compression> {
        Compression::from_raw(self.compression).ok_or(Error::UnknownCompression(self.compression))
    }
}

impl fmt::Display for PayloadHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = RecordKind::from_raw(self.kind)
            .map(|k| k.to_string())
            .unwrap_or_else(|| format!("Unknown({})", self.kind));
        let compression = Compression::from_raw(self.compression)
            .map(|c| c.to_string())
            .unwrap_or_else(|| format!("unknown({})", self.compression));
        let savings = if self.plain_size == 0 {
            0.0
        } else {
            100.0 - self.stored_size as f64 / self.plain_size as f64 * 100.0
        };
        write!(
            f,
            "{kind} [Records: {} Compression: {compression}, Savings: {savings:.2}%, Size: {} B]",
            self.num_records, self.plain_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(kind: u8, compression: u8) -> [u8; PAYLOAD_HEADER_SIZE] {
        let mut raw = [0u8; PAYLOAD_HEADER_SIZE];
        raw[0..8].copy_from_slice(&100u64.to_be_bytes());
        raw[8..16].copy_from_slice(&250u64.to_be_bytes());
        raw[16..24].copy_from_slice(&0xdead_beef_cafe_f00du64.to_be_bytes());
        raw[24..28].copy_from_slice(&11u32.to_be_bytes());
        raw[28..30].copy_from_slice(&1u16.to_be_bytes());
        raw[30] = kind;
        raw[31] = compression;
        raw
    }

    #[test]
    fn fields_are_read_in_declaration_order() {
        let hdr = PayloadHeader::read(&raw_header(1, 2)[..]).unwrap();
        assert_eq!(hdr.stored_size, 100);
        assert_eq!(hdr.plain_size, 250);
        assert_eq!(hdr.checksum, 0xdead_beef_cafe_f00d);
        assert_eq!(hdr.num_records, 11);
        assert_eq!(hdr.version, 1);
        assert_eq!(hdr.record_kind().unwrap(), RecordKind::Meta);
        assert_eq!(hdr.compression().unwrap(), Compression::Zstd);
    }

    #[test]
    fn unknown_kind_and_compression_still_parse() {
        let hdr = PayloadHeader::read(&raw_header(42, 7)[..]).unwrap();
        assert!(matches!(hdr.record_kind(), Err(Error::UnknownPayloadKind(42))));
        assert!(matches!(hdr.compression(), Err(Error::UnknownCompression(7))));
    }

    #[test]
    fn short_header_is_truncated() {
        assert!(matches!(PayloadHeader::read(&raw_header(1, 1)[..20]), Err(Error::Truncated)));
    }

    #[test]
    fn display_reports_savings() {
        let hdr = PayloadHeader::read(&raw_header(3, 2)[..]).unwrap();
        assert_eq!(
            hdr.to_string(),
            "Layout [Records: 11 Compression: zstd, Savings: 60.00%, Size: 250 B]"
        );
    }
}
