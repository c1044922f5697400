//! Version-agnostic archive prelude.
//!
//! The first 32 bytes of every stone archive:
//!
//! | offset | size | field          |
//! |--------|------|----------------|
//! | 0      | 4    | magic `\0mos`  |
//! | 4      | 24   | version data   |
//! | 28     | 4    | format version |
//!
//! The version data is opaque here; [`crate::stone1::V1Prelude`] interprets it
//! for format version 1.

use std::fmt;
use std::io::Read;

use crate::error::{read_array, Error, Result};
use crate::walker::BeWalker;

pub const MAGIC: &[u8; 4] = b"\0mos";
pub const PRELUDE_SIZE: usize = 32;
pub const VERSION_DATA_SIZE: usize = 24;

/// Known stone format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Version {
    V1 = 1,
}

impl Version {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Version::V1),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", *self as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prelude {
    pub version_data:   [u8; VERSION_DATA_SIZE],
    pub format_version: u32,
}

impl Prelude {
    /// Read exactly [`PRELUDE_SIZE`] bytes from `src` and check the magic.
    pub fn read<R: Read>(mut src: R) -> Result<Self> {
        let raw: [u8; PRELUDE_SIZE] = read_array(&mut src)?;
        Self::from_bytes(&raw)
    }

    pub fn from_bytes(raw: &[u8; PRELUDE_SIZE]) -> Result<Self> {
        let mut wlk = BeWalker::new(raw);
        let magic: [u8; 4] = wlk.take_array()?;
        if &magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }
        Ok(Self {
            version_data:   wlk.take_array()?,
            format_version: wlk.read_u32()?,
        })
    }

    /// The format version, if this build knows it.
    pub fn version(&self) -> Result<Version> {
        Version::from_raw(self.format_version)
            .ok_or(Error::UnsupportedVersion(self.format_version))
    }
}
