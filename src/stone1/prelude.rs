//! Version 1 interpretation of the prelude's 24-byte version data.
//!
//! | offset | size | field         |
//! |--------|------|---------------|
//! | 0      | 2    | payload count |
//! | 2      | 21   | format marker |
//! | 23     | 1    | archive kind  |

use std::fmt;

use crate::error::{Error, Result};
use crate::prelude::{Prelude, Version};
use crate::walker::BeWalker;

/// Fixed byte run every V1 prelude carries.  It only tells V1-shaped data
/// apart from anything else; it is not a checksum.
pub const FORMAT_MARKER: [u8; 21] = [0, 0, 1, 0, 0, 2, 0, 0, 3, 0, 0, 4, 0, 0, 5, 0, 0, 6, 0, 0, 7];

/// What the archive as a whole is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum StoneType {
    Binary        = 1,
    Delta         = 2,
    Repository    = 3,
    BuildManifest = 4,
}

impl StoneType {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(StoneType::Binary),
            2 => Some(StoneType::Delta),
            3 => Some(StoneType::Repository),
            4 => Some(StoneType::BuildManifest),
            _ => None,
        }
    }
}

impl fmt::Display for StoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoneType::Binary        => "binary",
            StoneType::Delta         => "delta",
            StoneType::Repository    => "repository",
            StoneType::BuildManifest => "build manifest",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct V1Prelude {
    pub num_payloads: u16,
    pub stone_type:   StoneType,
}

impl V1Prelude {
    pub fn decode(prelude: &Prelude) -> Result<Self> {
        if prelude.version()? != Version::V1 {
            return Err(Error::UnsupportedVersion(prelude.format_version));
        }
        let mut wlk = BeWalker::new(&prelude.version_data);
        let num_payloads = wlk.read_u16()?;
        if wlk.take(FORMAT_MARKER.len())? != &FORMAT_MARKER[..] {
            return Err(Error::FormatMarkerMismatch);
        }
        let raw_type = wlk.read_u8()?;
        let stone_type = StoneType::from_raw(raw_type)
            .ok_or(Error::UnsupportedArchiveKind(raw_type))?;
        Ok(Self { num_payloads, stone_type })
    }
}
