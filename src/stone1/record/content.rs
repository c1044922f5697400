//! Raw file content.
//!
//! A content payload is one opaque byte run: the deduplicated file bodies
//! back to back, carved up later by index records.  Nothing here parses
//! those bytes; the record only says how many of them are available and
//! [`ContentReader`] hands them out.

use std::io::{self, Read};

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    /// Bytes readable through the reader's content view.
    pub len: u64,
}

/// Bounded view over the staged content bytes of the current payload.
///
/// Implements [`Read`] with the usual end-of-stream semantics.  Use
/// [`ContentReader::read_bounded`] to treat a read past the bound as
/// [`Error::EndOfContent`].
pub struct ContentReader<'a> {
    inner:     Box<dyn Read + 'a>,
    remaining: u64,
}

impl<'a> ContentReader<'a> {
    pub(crate) fn new(inner: Box<dyn Read + 'a>, len: u64) -> Self {
        Self { inner, remaining: len }
    }

    /// Bytes left before the bound.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Fill `buf` completely, failing with [`Error::EndOfContent`] if that
    /// would cross the bound.
    pub fn read_bounded(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.len() as u64 > self.remaining {
            return Err(Error::EndOfContent);
        }
        self.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof { Error::EndOfContent } else { Error::Io(e) }
        })
    }
}

impl Read for ContentReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        let n = self.inner.read(&mut buf[..max])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}
