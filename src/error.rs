use std::io::{self, Read};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The source ended before a fixed-size layout or a declared body was complete.
    #[error("Truncated stone archive")]
    Truncated,

    // ── Prelude ──────────────────────────────────────────────────────────────
    #[error("Not a stone archive (magic {})", hex::encode(.0))]
    BadMagic([u8; 4]),
    #[error("Unsupported stone format version: {0}")]
    UnsupportedVersion(u32),
    /// The fixed V1 marker bytes did not match.  This is a shape check,
    /// it says nothing about tampering.
    #[error("V1 format marker mismatch")]
    FormatMarkerMismatch,
    #[error("Unsupported archive kind: {0}")]
    UnsupportedArchiveKind(u8),

    // ── Payload body ─────────────────────────────────────────────────────────
    #[error("Payload checksum mismatch (expected {expected:016x}, got {actual:016x})")]
    ChecksumMismatch { expected: u64, actual: u64 },
    #[error("Payload size mismatch (expected {expected} bytes, got {actual})")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("Decompression error: {0}")]
    Decompression(#[source] io::Error),
    #[error("Unknown payload kind: {0}")]
    UnknownPayloadKind(u8),
    #[error("Unknown compression: {0}")]
    UnknownCompression(u8),

    // ── Records ──────────────────────────────────────────────────────────────
    #[error("Unknown meta field kind: {0}")]
    UnknownFieldKind(u8),
    #[error("Unknown layout file type: {0}")]
    UnknownFileType(u8),
    #[error("Unknown dependency kind: {0}")]
    UnknownDependencyKind(u8),
    #[error("Regular layout entry carries a {0}-byte hash, expected 16")]
    InvalidHashLength(u16),
    #[error("Invalid index range {start}..{end}")]
    InvalidIndexRange { start: u64, end: u64 },

    // ── Bounds ───────────────────────────────────────────────────────────────
    #[error("Read past the end of the content record")]
    EndOfContent,
    #[error("Out of bounds: requested {requested} bytes, {remaining} remaining")]
    OutOfBounds { requested: usize, remaining: usize },
}

impl Error {
    /// True when the archive was cut short rather than malformed.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::Truncated)
    }
}

/// Lift a short read into [`Error::Truncated`]; everything else stays an IO error.
pub(crate) fn short_read(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated
    } else {
        Error::Io(e)
    }
}

/// Fill a fixed-size array from `src`, mapping short reads to [`Error::Truncated`].
pub(crate) fn read_array<R: Read + ?Sized, const N: usize>(src: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    src.read_exact(&mut buf).map_err(short_read)?;
    Ok(buf)
}

/// Read exactly `len` bytes into a fresh buffer.
///
/// The buffer grows with the data actually read, so a corrupt length field
/// cannot force a huge up-front allocation.
pub(crate) fn read_vec<R: Read + ?Sized>(src: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut *src).take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(Error::Truncated);
    }
    Ok(buf)
}
