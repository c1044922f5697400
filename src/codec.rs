//! Payload compression registry.
//!
//! A payload header names its compression with a single byte.  Unknown
//! values are not rejected when the header is read; they only fail once a
//! payload body has to be decoded (see [`get_codec`]), so payloads written
//! with a newer codec can still be skipped.
//!
//! Decoding is streaming: a codec wraps the bounded stored-bytes reader and
//! yields the plain bytes, so a payload is never held twice in memory.

use std::fmt;
use std::io::{self, Read};

use crate::error::{Error, Result};

// ── Compression ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum Compression {
    /// Stored verbatim; stored size equals plain size.
    None = 1,
    /// A zstd stream (one or more frames).
    Zstd = 2,
}

impl Compression {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Compression::None),
            2 => Some(Compression::Zstd),
            _ => None,
        }
    }

    /// Human-readable name (diagnostics only — never parsed).
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Codec trait ──────────────────────────────────────────────────────────────

pub trait Codec: Send + Sync {
    fn compression(&self) -> Compression;

    /// Wrap a stored-bytes stream in a stream of plain bytes.
    fn decoder<'a>(&self, stored: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>>;
}

// ── Built-in codec implementations ──────────────────────────────────────────

pub struct NoneCodec;
impl Codec for NoneCodec {
    fn compression(&self) -> Compression { Compression::None }
    fn decoder<'a>(&self, stored: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(stored)
    }
}

pub struct ZstdCodec;
impl Codec for ZstdCodec {
    fn compression(&self) -> Compression { Compression::Zstd }
    fn decoder<'a>(&self, stored: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(zstd::stream::read::Decoder::new(stored)?))
    }
}

// ── Factory ──────────────────────────────────────────────────────────────────

/// Resolve a raw header byte to a built-in codec.
pub fn get_codec(raw: u8) -> Result<Box<dyn Codec>> {
    match Compression::from_raw(raw) {
        Some(Compression::None) => Ok(Box::new(NoneCodec)),
        Some(Compression::Zstd) => Ok(Box::new(ZstdCodec)),
        None => Err(Error::UnknownCompression(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_codec_passes_bytes_through() {
        let codec = get_codec(1).unwrap();
        assert_eq!(codec.compression(), Compression::None);
        let mut out = Vec::new();
        codec.decoder(Box::new(&b"plain"[..])).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"plain");
    }

    #[test]
    fn zstd_codec_streams_plain_bytes() {
        let data = b"stone stone stone stone stone".repeat(10);
        let stored = zstd::encode_all(&data[..], 3).unwrap();
        let codec = get_codec(2).unwrap();
        let mut out = Vec::new();
        codec.decoder(Box::new(&stored[..])).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn unknown_compression_is_rejected() {
        assert!(matches!(get_codec(0), Err(Error::UnknownCompression(0))));
        assert!(matches!(get_codec(9), Err(Error::UnknownCompression(9))));
    }
}
