//! Record decoders, one per payload kind.
//!
//! Every decoder consumes a forward-only stream positioned at the start of
//! one record and leaves it positioned at the start of the next.  Fixed-size
//! sub-headers are read in one go and walked; variable parts are read by
//! their declared lengths.  Partial records are errors.

use std::io::Read;

use serde::{Serialize, Serializer};

use crate::error::Result;

pub mod attribute;
pub mod content;
pub mod index;
pub mod layout;
pub mod meta;

pub use attribute::AttributeRecord;
pub use content::{ContentReader, ContentRecord};
pub use index::IndexRecord;
pub use layout::{FileType, LayoutEntry, LayoutRecord};
pub use meta::{Dependency, DependencyKind, MetaField, MetaRecord, MetaTag};

use super::header::RecordKind;

/// One decoded record.  The active variant always matches the payload kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record")]
pub enum Record {
    Meta(MetaRecord),
    Content(ContentRecord),
    Layout(LayoutRecord),
    Index(IndexRecord),
    Attribute(AttributeRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Meta(_)      => RecordKind::Meta,
            Record::Content(_)   => RecordKind::Content,
            Record::Layout(_)    => RecordKind::Layout,
            Record::Index(_)     => RecordKind::Index,
            Record::Attribute(_) => RecordKind::Attributes,
        }
    }

    /// Decode one record of `kind` from `src`.
    ///
    /// Content records carry no encoding of their own; `remaining` is the
    /// number of payload bytes still unread, which becomes the content bound.
    pub(crate) fn decode<R: Read + ?Sized>(kind: RecordKind, src: &mut R, remaining: u64) -> Result<Self> {
        Ok(match kind {
            RecordKind::Meta       => Record::Meta(MetaRecord::decode(src)?),
            RecordKind::Content    => Record::Content(ContentRecord { len: remaining }),
            RecordKind::Layout     => Record::Layout(LayoutRecord::decode(src)?),
            RecordKind::Index      => Record::Index(IndexRecord::decode(src)?),
            RecordKind::Attributes => Record::Attribute(AttributeRecord::decode(src)?),
        })
    }
}

/// Strip one trailing NUL.  File names are arbitrary bytes, so anything
/// that is not UTF-8 is replaced rather than rejected.
pub(crate) fn trim_terminator(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// 128-bit hashes serialise as 32 lowercase hex digits.
pub(crate) fn serialize_hash<S: Serializer>(hash: &u128, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    format!("{hash:032x}").serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_is_stripped_once() {
        assert_eq!(trim_terminator(b"usr\0"), "usr");
        assert_eq!(trim_terminator(b"usr"), "usr");
        assert_eq!(trim_terminator(b"usr\0\0"), "usr\0");
        assert_eq!(trim_terminator(b""), "");
    }

    #[test]
    fn non_utf8_bytes_are_replaced() {
        assert_eq!(trim_terminator(b"caf\xe9\0"), "caf\u{fffd}");
    }

    #[test]
    fn dispatch_follows_payload_kind() {
        let raw = [&10u64.to_be_bytes()[..], &20u64.to_be_bytes(), &[0u8; 16]].concat();
        let rec = Record::decode(RecordKind::Index, &mut &raw[..], raw.len() as u64).unwrap();
        assert_eq!(rec.kind(), RecordKind::Index);

        let rec = Record::decode(RecordKind::Content, &mut &raw[..], 99).unwrap();
        assert_eq!(rec, Record::Content(ContentRecord { len: 99 }));
    }

    #[test]
    fn hashes_serialise_as_hex() {
        let rec = IndexRecord { start: 0, end: 1, hash: 0xff };
        let json = serde_json::to_value(rec).unwrap();
        assert_eq!(json["hash"], "000000000000000000000000000000ff");
    }
}
