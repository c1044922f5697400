//! Filesystem layout records.
//!
//! Layout: `uid:u32, gid:u32, mode:u32, tag:u32, source_len:u16,
//! target_len:u16, file_type:u8, pad:[u8; 11]`, then `source_len` source
//! bytes followed by `target_len` target bytes.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::error::{read_array, read_vec, Error, Result};
use crate::walker::BeWalker;

use super::{serialize_hash, trim_terminator};

const HASH_LEN: u16 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum FileType {
    Regular         = 1,
    Symlink         = 2,
    Directory       = 3,
    CharacterDevice = 4,
    BlockDevice     = 5,
    Fifo            = 6,
    Socket          = 7,
}

impl FileType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(FileType::Regular),
            2 => Some(FileType::Symlink),
            3 => Some(FileType::Directory),
            4 => Some(FileType::CharacterDevice),
            5 => Some(FileType::BlockDevice),
            6 => Some(FileType::Fifo),
            7 => Some(FileType::Socket),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileType::Regular         => "Regular",
            FileType::Symlink         => "Symlink",
            FileType::Directory       => "Directory",
            FileType::CharacterDevice => "Character device",
            FileType::BlockDevice     => "Block device",
            FileType::Fifo            => "FIFO",
            FileType::Socket          => "Socket",
        })
    }
}

/// What a layout record places on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LayoutEntry {
    /// File contents come from the content store, keyed by hash.
    Regular {
        #[serde(serialize_with = "serialize_hash")]
        hash:   u128,
        target: String,
    },
    Symlink { source: String, target: String },
    Directory(String),
    CharacterDevice(String),
    BlockDevice(String),
    Fifo(String),
    Socket(String),
}

impl LayoutEntry {
    pub fn file_type(&self) -> FileType {
        match self {
            LayoutEntry::Regular { .. }     => FileType::Regular,
            LayoutEntry::Symlink { .. }     => FileType::Symlink,
            LayoutEntry::Directory(_)       => FileType::Directory,
            LayoutEntry::CharacterDevice(_) => FileType::CharacterDevice,
            LayoutEntry::BlockDevice(_)     => FileType::BlockDevice,
            LayoutEntry::Fifo(_)            => FileType::Fifo,
            LayoutEntry::Socket(_)          => FileType::Socket,
        }
    }

    /// Source bytes: the 16 hash bytes for regular files, the link source
    /// for symlinks, nothing otherwise.
    pub fn source(&self) -> Option<Vec<u8>> {
        match self {
            LayoutEntry::Regular { hash, .. }   => Some(hash.to_be_bytes().to_vec()),
            LayoutEntry::Symlink { source, .. } => Some(source.as_bytes().to_vec()),
            _ => None,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            LayoutEntry::Regular { target, .. }
            | LayoutEntry::Symlink { target, .. }
            | LayoutEntry::Directory(target)
            | LayoutEntry::CharacterDevice(target)
            | LayoutEntry::BlockDevice(target)
            | LayoutEntry::Fifo(target)
            | LayoutEntry::Socket(target) => target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutRecord {
    pub uid:   u32,
    pub gid:   u32,
    pub mode:  u32,
    pub tag:   u32,
    pub entry: LayoutEntry,
}

impl LayoutRecord {
    pub fn decode<R: Read + ?Sized>(src: &mut R) -> Result<Self> {
        let head: [u8; 32] = read_array(src)?;
        let mut wlk = BeWalker::new(&head);
        let uid        = wlk.read_u32()?;
        let gid        = wlk.read_u32()?;
        let mode       = wlk.read_u32()?;
        let tag        = wlk.read_u32()?;
        let source_len = wlk.read_u16()?;
        let target_len = wlk.read_u16()?;
        let raw_type   = wlk.read_u8()?;
        wlk.skip(11)?;

        let file_type = FileType::from_raw(raw_type).ok_or(Error::UnknownFileType(raw_type))?;
        if file_type == FileType::Regular && source_len != HASH_LEN {
            return Err(Error::InvalidHashLength(source_len));
        }

        let body = read_vec(src, source_len as u64 + target_len as u64)?;
        let (source, target) = body.split_at(source_len as usize);
        let target = trim_terminator(target);

        let entry = match file_type {
            FileType::Regular => LayoutEntry::Regular {
                hash: BeWalker::new(source).read_u128_halves()?,
                target,
            },
            FileType::Symlink => LayoutEntry::Symlink { source: trim_terminator(source), target },
            FileType::Directory       => LayoutEntry::Directory(target),
            FileType::CharacterDevice => LayoutEntry::CharacterDevice(target),
            FileType::BlockDevice     => LayoutEntry::BlockDevice(target),
            FileType::Fifo            => LayoutEntry::Fifo(target),
            FileType::Socket          => LayoutEntry::Socket(target),
        };
        Ok(Self { uid, gid, mode, tag, entry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(file_type: u8, source: &[u8], target: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&1000u32.to_be_bytes());
        out.extend_from_slice(&100u32.to_be_bytes());
        out.extend_from_slice(&0o100644u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(source.len() as u16).to_be_bytes());
        out.extend_from_slice(&(target.len() as u16).to_be_bytes());
        out.push(file_type);
        out.extend_from_slice(&[0u8; 11]);
        out.extend_from_slice(source);
        out.extend_from_slice(target);
        out
    }

    #[test]
    fn directory_has_target_only() {
        let raw = encode(3, b"", b"usr/bin\0");
        let rec = LayoutRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.entry, LayoutEntry::Directory("usr/bin".into()));
        assert_eq!(rec.entry.file_type(), FileType::Directory);
        assert_eq!(rec.entry.source(), None);
        assert_eq!(rec.uid, 1000);
        assert_eq!(rec.gid, 100);
        assert_eq!(rec.mode, 0o100644);
    }

    #[test]
    fn regular_entry_reads_hash_halves() {
        let hash = 0x0011_2233_4455_6677_8899_aabb_ccdd_eeffu128;
        let raw = encode(1, &hash.to_be_bytes(), b"usr/bin/bash\0");
        let rec = LayoutRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(rec.entry, LayoutEntry::Regular { hash, target: "usr/bin/bash".into() });
        assert_eq!(rec.entry.source().unwrap(), hash.to_be_bytes().to_vec());
    }

    #[test]
    fn symlink_has_source_and_target() {
        let raw = encode(2, b"bash\0", b"usr/bin/sh\0");
        let rec = LayoutRecord::decode(&mut &raw[..]).unwrap();
        assert_eq!(
            rec.entry,
            LayoutEntry::Symlink { source: "bash".into(), target: "usr/bin/sh".into() }
        );
        assert_eq!(rec.entry.target(), "usr/bin/sh");
    }

    #[test]
    fn unknown_file_type_does_not_touch_the_body() {
        let raw = encode(9, b"", b"usr\0");
        let mut src = &raw[..];
        assert!(matches!(LayoutRecord::decode(&mut src), Err(Error::UnknownFileType(9))));
        assert_eq!(src, b"usr\0");
    }

    #[test]
    fn regular_entry_requires_sixteen_byte_hash() {
        let raw = encode(1, &[0u8; 8], b"x\0");
        assert!(matches!(LayoutRecord::decode(&mut &raw[..]), Err(Error::InvalidHashLength(8))));
    }

    #[test]
    fn partial_body_is_truncated() {
        let raw = encode(3, b"", b"usr/share\0");
        assert!(matches!(LayoutRecord::decode(&mut &raw[..36]), Err(Error::Truncated)));
    }
}
