//! Payload body pipeline.
//!
//! # Extraction
//! [`extract`] reads exactly `stored_size` bytes from the archive source,
//! runs them through the payload's codec, and copies the plain bytes into a
//! caller-supplied scratch sink.  While copying, an XXH3-64 digest is
//! accumulated and compared against the header checksum once the copy is
//! complete.  The sink is rewound to offset 0 on success, so record decoders
//! always start at the first plain byte.
//!
//! # Skipping
//! [`skip`] discards `stored_size` bytes without decompressing or hashing.
//! The reader uses it for payloads whose records were never requested; the
//! body of such a payload is never verified.  Set
//! [`ReadOptions::verify_skipped`](super::ReadOptions) to extract instead.
//!
//! # Checksum scope
//! By default the digest covers the plain (decompressed) bytes.  Archives
//! written by `moss` checksum the stored bytes instead; select
//! [`ChecksumScope::Stored`] for those.

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::codec::{get_codec, Compression};
use crate::error::{Error, Result};
use crate::stone1::header::PayloadHeader;

/// Which bytes of a payload the header checksum covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumScope {
    /// The decompressed body.
    ///
    /// A corrupted zstd frame header that still decodes to the same bytes
    /// goes unnoticed under this scope; only [`ChecksumScope::Stored`]
    /// covers every stored byte.
    #[default]
    Plain,
    /// The body exactly as stored in the archive.
    Stored,
}

// ── Bounded source ───────────────────────────────────────────────────────────

/// Reads at most `remaining` bytes and remembers whether the inner reader ran
/// dry before the bound was reached.
struct BoundedSource<'a, R: Read> {
    inner:     &'a mut R,
    remaining: u64,
    short:     bool,
}

impl<'a, R: Read> BoundedSource<'a, R> {
    fn new(inner: &'a mut R, limit: u64) -> Self {
        Self { inner, remaining: limit, short: false }
    }
}

impl<R: Read> Read for BoundedSource<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            self.short = true;
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

// ── Hashing tee ──────────────────────────────────────────────────────────────

struct HashingReader<'h, R: Read> {
    inner:  R,
    hasher: &'h mut Xxh3,
}

impl<'h, R: Read> HashingReader<'h, R> {
    fn new(inner: R, hasher: &'h mut Xxh3) -> Self {
        Self { inner, hasher }
    }
}

impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

// ── Bounded copy ─────────────────────────────────────────────────────────────

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// `io::copy` that keeps decoder failures apart from sink failures.
fn copy_into<R, W>(src: &mut R, dst: &mut W) -> std::result::Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; 16 * 1024];
    let mut copied = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        dst.write_all(&buf[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

/// Decode, verify and stage one payload body into `sink`.
///
/// On return the source is positioned just past the stored body and the
/// sink holds exactly `header.plain_size` fresh bytes starting at offset 0.
/// Bytes beyond that in the sink are stale leftovers from earlier payloads.
pub fn extract<R, S>(
    src:    &mut R,
    header: &PayloadHeader,
    scope:  ChecksumScope,
    sink:   &mut S,
) -> Result<()>
where
    R: Read,
    S: Write + Seek,
{
    let codec = get_codec(header.compression)?;
    let compression = codec.compression();
    if compression == Compression::None && header.stored_size != header.plain_size {
        return Err(Error::SizeMismatch { expected: header.stored_size, actual: header.plain_size });
    }
    debug!(
        stored = header.stored_size,
        plain = header.plain_size,
        %compression,
        "extracting payload"
    );

    sink.seek(SeekFrom::Start(0))?;
    let mut hasher = Xxh3::new();
    let mut stored = BoundedSource::new(src, header.stored_size);

    // One byte past plain_size is enough to report an oversized body.
    let limit = header.plain_size.saturating_add(1);
    let copied = match scope {
        ChecksumScope::Plain => match codec.decoder(Box::new(&mut stored)) {
            Ok(plain) => copy_into(&mut HashingReader::new(plain.take(limit), &mut hasher), &mut *sink),
            Err(e) => Err(CopyError::Read(e)),
        },
        ChecksumScope::Stored => match codec.decoder(Box::new(HashingReader::new(&mut stored, &mut hasher))) {
            Ok(plain) => copy_into(&mut plain.take(limit), &mut *sink),
            Err(e) => Err(CopyError::Read(e)),
        },
    };

    let copied = match copied {
        Ok(n) => n,
        Err(CopyError::Read(_)) if stored.short => return Err(Error::Truncated),
        Err(CopyError::Read(e)) if compression == Compression::Zstd => return Err(Error::Decompression(e)),
        Err(CopyError::Read(e)) | Err(CopyError::Write(e)) => return Err(Error::Io(e)),
    };

    // A zstd stream may end before the stored bound (trailing padding).
    // Drain it so the source lines up with the next payload header.
    let trailing = match scope {
        ChecksumScope::Plain => io::copy(&mut stored, &mut io::sink())?,
        ChecksumScope::Stored => io::copy(&mut HashingReader::new(&mut stored, &mut hasher), &mut io::sink())?,
    };
    if stored.short {
        return Err(Error::Truncated);
    }
    if trailing > 0 {
        trace!(trailing, "drained trailing stored bytes");
    }

    if copied != header.plain_size {
        return Err(Error::SizeMismatch { expected: header.plain_size, actual: copied });
    }
    let actual = hasher.digest();
    if actual != header.checksum {
        warn!(expected = header.checksum, actual, "payload checksum mismatch");
        return Err(Error::ChecksumMismatch { expected: header.checksum, actual });
    }

    sink.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Discard a payload body without decoding or verifying it.
pub fn skip<R: Read>(src: &mut R, header: &PayloadHeader) -> Result<()> {
    let mut stored = BoundedSource::new(src, header.stored_size);
    let n = io::copy(&mut stored, &mut io::sink())?;
    if stored.short {
        return Err(Error::Truncated);
    }
    trace!(bytes = n, "skipped payload body");
    Ok(())
}

// ── Staged body view ─────────────────────────────────────────────────────────

/// Reader over the staged plain bytes of the current payload.
///
/// Bounded by the payload's plain size, so record decoders never see stale
/// sink bytes left over from a larger earlier payload.
pub(crate) struct PayloadBody<'a, S: Read> {
    sink:      &'a mut S,
    remaining: &'a mut u64,
}

impl<'a, S: Read> PayloadBody<'a, S> {
    pub(crate) fn new(sink: &'a mut S, remaining: &'a mut u64) -> Self {
        Self { sink, remaining }
    }
}

impl<S: Read> Read for PayloadBody<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if *self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min((*self.remaining).min(usize::MAX as u64) as usize);
        let n = self.sink.read(&mut buf[..max])?;
        *self.remaining -= n as u64;
        Ok(n)
    }
}
