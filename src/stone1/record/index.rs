use std::io::Read;

use serde::Serialize;

use crate::error::{read_array, Error, Result};
use crate::walker::BeWalker;

use super::serialize_hash;

/// A half-open range `[start, end)` of the concatenated content payloads,
/// addressed by the XXH3-128 hash of the bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub start: u64,
    pub end:   u64,
    #[serde(serialize_with = "serialize_hash")]
    pub hash:  u128,
}

impl IndexRecord {
    pub fn decode<R: Read + ?Sized>(src: &mut R) -> Result<Self> {
        let raw: [u8; 32] = read_array(src)?;
        let mut wlk = BeWalker::new(&raw);
        let start = wlk.read_u64()?;
        let end   = wlk.read_u64()?;
        let hash  = wlk.read_u128_halves()?;
        if end <= start {
            return Err(Error::InvalidIndexRange { start, end });
        }
        Ok(Self { start, end, hash })
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}
