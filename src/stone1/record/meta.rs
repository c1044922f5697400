//! Package metadata records.
//!
//! Layout: `length:u32, tag:u16, field_kind:u8, pad:u8`, then `length`
//! value bytes interpreted according to `field_kind`.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::{read_array, read_vec, Error, Result};
use crate::walker::BeWalker;

use super::trim_terminator;

// ── Tags ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetaTag {
    Name,
    Architecture,
    Version,
    Summary,
    Description,
    Homepage,
    SourceId,
    Depends,
    Provides,
    Conflicts,
    Release,
    License,
    BuildRelease,
    PackageUri,
    PackageHash,
    PackageSize,
    BuildDepends,
    SourceUri,
    SourcePath,
    SourceRef,
    /// A tag newer than this build; the value is still decoded.
    Unknown(u16),
}

impl MetaTag {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            1  => MetaTag::Name,
            2  => MetaTag::Architecture,
            3  => MetaTag::Version,
            4  => MetaTag::Summary,
            5  => MetaTag::Description,
            6  => MetaTag::Homepage,
            7  => MetaTag::SourceId,
            8  => MetaTag::Depends,
            9  => MetaTag::Provides,
            10 => MetaTag::Conflicts,
            11 => MetaTag::Release,
            12 => MetaTag::License,
            13 => MetaTag::BuildRelease,
            14 => MetaTag::PackageUri,
            15 => MetaTag::PackageHash,
            16 => MetaTag::PackageSize,
            17 => MetaTag::BuildDepends,
            18 => MetaTag::SourceUri,
            19 => MetaTag::SourcePath,
            20 => MetaTag::SourceRef,
            other => MetaTag::Unknown(other),
        }
    }
}

impl fmt::Display for MetaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetaTag::Name         => "Name",
            MetaTag::Architecture => "Architecture",
            MetaTag::Version      => "Version",
            MetaTag::Summary      => "Summary",
            MetaTag::Description  => "Description",
            MetaTag::Homepage     => "Homepage",
            MetaTag::SourceId     => "Source ID",
            MetaTag::Depends      => "Depends",
            MetaTag::Provides     => "Provides",
            MetaTag::Conflicts    => "Conflicts",
            MetaTag::Release      => "Release",
            MetaTag::License      => "License",
            MetaTag::BuildRelease => "Build release",
            MetaTag::PackageUri   => "Package URI",
            MetaTag::PackageHash  => "Package hash",
            MetaTag::PackageSize  => "Package size",
            MetaTag::BuildDepends => "Build dependencies",
            MetaTag::SourceUri    => "Source URI",
            MetaTag::SourcePath   => "Source path",
            MetaTag::SourceRef    => "Source ref",
            MetaTag::Unknown(raw) => return write!(f, "Tag({raw})"),
        };
        f.write_str(name)
    }
}

// ── Dependencies ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum DependencyKind {
    PackageName   = 0,
    SharedLibrary = 1,
    PkgConfig     = 2,
    Interpreter   = 3,
    CMake         = 4,
    Python        = 5,
    Binary        = 6,
    SystemBinary  = 7,
    PkgConfig32   = 8,
}

impl DependencyKind {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(DependencyKind::PackageName),
            1 => Some(DependencyKind::SharedLibrary),
            2 => Some(DependencyKind::PkgConfig),
            3 => Some(DependencyKind::Interpreter),
            4 => Some(DependencyKind::CMake),
            5 => Some(DependencyKind::Python),
            6 => Some(DependencyKind::Binary),
            7 => Some(DependencyKind::SystemBinary),
            8 => Some(DependencyKind::PkgConfig32),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DependencyKind::PackageName   => "name",
            DependencyKind::SharedLibrary => "soname",
            DependencyKind::PkgConfig     => "pkgconfig",
            DependencyKind::Interpreter   => "interpreter",
            DependencyKind::CMake         => "cmake",
            DependencyKind::Python        => "python",
            DependencyKind::Binary        => "binary",
            DependencyKind::SystemBinary  => "sysbinary",
            DependencyKind::PkgConfig32   => "pkgconfig32",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub name: String,
}

impl Dependency {
    /// First byte is the kind, the rest a NUL-terminated name.
    fn decode(value: &[u8]) -> Result<Self> {
        let mut wlk = BeWalker::new(value);
        let raw_kind = wlk.read_u8()?;
        let kind = DependencyKind::from_raw(raw_kind).ok_or(Error::UnknownDependencyKind(raw_kind))?;
        let name = trim_terminator(wlk.take(wlk.remaining())?);
        Ok(Self { kind, name })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.name)
    }
}

// ── Fields ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaField {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    String(String),
    Dependency(Dependency),
    Provider(Dependency),
}

impl MetaField {
    fn decode(field_kind: u8, value: &[u8]) -> Result<Self> {
        let mut wlk = BeWalker::new(value);
        Ok(match field_kind {
            1  => MetaField::Int8(wlk.read_u8()? as i8),
            2  => MetaField::Uint8(wlk.read_u8()?),
            3  => MetaField::Int16(wlk.read_u16()? as i16),
            4  => MetaField::Uint16(wlk.read_u16()?),
            5  => MetaField::Int32(wlk.read_u32()? as i32),
            6  => MetaField::Uint32(wlk.read_u32()?),
            7  => MetaField::Int64(wlk.read_u64()? as i64),
            8  => MetaField::Uint64(wlk.read_u64()?),
            9  => MetaField::String(trim_terminator(value)),
            10 => MetaField::Dependency(Dependency::decode(value)?),
            11 => MetaField::Provider(Dependency::decode(value)?),
            other => return Err(Error::UnknownFieldKind(other)),
        })
    }
}

impl fmt::Display for MetaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaField::Int8(v)   => write!(f, "{v}"),
            MetaField::Uint8(v)  => write!(f, "{v}"),
            MetaField::Int16(v)  => write!(f, "{v}"),
            MetaField::Uint16(v) => write!(f, "{v}"),
            MetaField::Int32(v)  => write!(f, "{v}"),
            MetaField::Uint32(v) => write!(f, "{v}"),
            MetaField::Int64(v)  => write!(f, "{v}"),
            MetaField::Uint64(v) => write!(f, "{v}"),
            MetaField::String(v) => f.write_str(v),
            MetaField::Dependency(d) | MetaField::Provider(d) => write!(f, "{d}"),
        }
    }
}

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaRecord {
    pub tag:   MetaTag,
    pub field: MetaField,
}

impl MetaRecord {
    pub fn decode<R: Read + ?Sized>(src: &mut R) -> Result<Self> {
        let head: [u8; 8] = read_array(src)?;
        let mut wlk = BeWalker::new(&head);
        let length = wlk.read_u32()?;
        let tag = MetaTag::from_raw(wlk.read_u16()?);
        let field_kind = wlk.read_u8()?;
        wlk.skip(1)?;

        let value = read_vec(src, length as u64)?;
        let field = MetaField::decode(field_kind, &value)?;
        Ok(Self { tag, field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(tag: u16, field_kind: u8, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(value.len() as u32).to_be_bytes());
        out.extend_from_slice(&tag.to_be_bytes());
        out.push(field_kind);
        out.push(0);
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn string_field_strips_terminator() {
        let raw = encode(1, 9, b"abcd\0");
        let rec = MetaRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.tag, MetaTag::Name);
        assert_eq!(rec.field, MetaField::String("abcd".into()));
    }

    #[test]
    fn string_field_is_length_exact() {
        let raw = encode(4, 9, b"a\0b\0");
        let rec = MetaRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.field, MetaField::String("a\0b".into()));
    }

    #[test]
    fn integer_fields_are_big_endian_and_signed_where_declared() {
        let raw = encode(11, 8, &42u64.to_be_bytes());
        assert_eq!(MetaRecord::decode(&mut &raw[..]).unwrap().field, MetaField::Uint64(42));

        let raw = encode(16, 5, &(-2i32).to_be_bytes());
        assert_eq!(MetaRecord::decode(&mut &raw[..]).unwrap().field, MetaField::Int32(-2));

        let raw = encode(13, 1, &[0xff]);
        assert_eq!(MetaRecord::decode(&mut &raw[..]).unwrap().field, MetaField::Int8(-1));
    }

    #[test]
    fn dependency_and_provider_fields() {
        let raw = encode(8, 10, b"\x01libc.so.6\0");
        let rec = MetaRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.tag, MetaTag::Depends);
        let MetaField::Dependency(dep) = &rec.field else { panic!("not a dependency") };
        assert_eq!(dep.kind, DependencyKind::SharedLibrary);
        assert_eq!(rec.field.to_string(), "soname(libc.so.6)");

        let raw = encode(9, 11, b"\x02zlib\0");
        let rec = MetaRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.field.to_string(), "pkgconfig(zlib)");
    }

    #[test]
    fn decoder_stops_exactly_at_record_end() {
        let mut raw = encode(1, 9, b"bash\0");
        raw.extend_from_slice(&encode(3, 9, b"5.2\0"));
        let mut src = &raw[..];
        assert_eq!(MetaRecord::decode(&mut src).unwrap().field, MetaField::String("bash".into()));
        assert_eq!(MetaRecord::decode(&mut src).unwrap().tag, MetaTag::Version);
        assert!(src.is_empty());
    }

    #[test]
    fn unknown_field_kind_is_rejected() {
        let raw = encode(1, 12, b"x");
        assert!(matches!(MetaRecord::decode(&mut &raw[..]), Err(Error::UnknownFieldKind(12))));
    }

    #[test]
    fn unknown_tag_is_kept() {
        let raw = encode(99, 2, &[7]);
        let rec = MetaRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.tag, MetaTag::Unknown(99));
        assert_eq!(rec.tag.to_string(), "Tag(99)");
    }

    #[test]
    fn short_integer_value_is_out_of_bounds() {
        let raw = encode(16, 8, &[0, 1]);
        assert!(matches!(MetaRecord::decode(&mut &raw[..]), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn partial_record_is_truncated() {
        let raw = encode(1, 9, b"abcd\0");
        assert!(matches!(MetaRecord::decode(&mut &raw[..10]), Err(Error::Truncated)));
        assert!(matches!(MetaRecord::decode(&mut &raw[..5]), Err(Error::Truncated)));
    }
}
