//! Sequential fixed-width field extraction over an in-memory byte slice.
//!
//! Every fixed-size layout in a stone archive (prelude, payload header,
//! record sub-headers) is read into a stack array first and then walked
//! with a [`ByteWalker`].  The byte order is a type parameter rather than an
//! ambient default; stone is big-endian throughout, hence [`BeWalker`].

use byteorder::{BigEndian, ByteOrder};
use std::marker::PhantomData;

use crate::error::{Error, Result};

/// Big-endian walker, the only flavour the stone format needs.
pub type BeWalker<'a> = ByteWalker<'a, BigEndian>;

#[derive(Debug, Clone)]
pub struct ByteWalker<'a, O: ByteOrder> {
    buf:   &'a [u8],
    pos:   usize,
    order: PhantomData<O>,
}

impl<'a, O: ByteOrder> ByteWalker<'a, O> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, order: PhantomData }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::OutOfBounds { requested: n, remaining: self.remaining() });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Advance past `n` bytes of padding.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Take exactly `N` bytes as an array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(O::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(O::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(O::read_u64(self.take(8)?))
    }

    /// A 128-bit value stored as two 8-byte halves, high half first.
    pub fn read_u128_halves(&mut self) -> Result<u128> {
        let hi = self.read_u64()? as u128;
        let lo = self.read_u64()? as u128;
        Ok((hi << 64) | lo)
    }
}
