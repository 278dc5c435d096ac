//! Little-endian binary encoding shared by every persisted structure.
//!
//! Each structure writes a fixed 8-byte magic followed by its fields; nested
//! structures are embedded as a `u64` byte length plus their own encoding.
//! Reading is strict: short input, a wrong magic or trailing bytes are all
//! reported as [`Error::InvalidEncoding`].

use crate::error::{Error, Result};

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    out: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn with_magic(magic: &[u8; 8]) -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(magic);
        Self { out }
    }

    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.out.push(v);
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn usize(&mut self, v: usize) {
        self.u64(v as u64);
    }

    pub(crate) fn words(&mut self, words: &[u64]) {
        self.usize(words.len());
        for &w in words {
            self.u64(w);
        }
    }

    /// Length-prefixed nested blob.
    pub(crate) fn nested(&mut self, bytes: &[u8]) {
        self.usize(bytes.len());
        self.out.extend_from_slice(bytes);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// Bounds-checked little-endian reader over a byte slice.
#[derive(Debug)]
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    off: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, off: 0 }
    }

    /// Create a reader and consume `magic`, failing if it does not match.
    pub(crate) fn with_magic(bytes: &'a [u8], magic: &[u8; 8], what: &str) -> Result<Self> {
        let mut r = Self::new(bytes);
        if r.take(8)? != magic {
            return Err(Error::encoding(format!("bad magic for {what}")));
        }
        Ok(r)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .off
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::encoding("unexpected end of input"))?;
        let slice = &self.bytes[self.off..end];
        self.off = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn usize(&mut self) -> Result<usize> {
        let v = self.u64()?;
        usize::try_from(v).map_err(|_| Error::encoding(format!("value {v} overflows usize")))
    }

    /// Read a length that will size an allocation of `elem_bytes`-wide items.
    ///
    /// Bounded against the remaining input to prevent allocation bombs.
    pub(crate) fn len_prefix(&mut self, elem_bytes: usize) -> Result<usize> {
        let n = self.usize()?;
        if n.saturating_mul(elem_bytes.max(1)) > self.remaining() {
            return Err(Error::encoding(format!(
                "length {n} too large for remaining input ({} bytes)",
                self.remaining()
            )));
        }
        Ok(n)
    }

    pub(crate) fn words(&mut self) -> Result<Vec<u64>> {
        let n = self.len_prefix(8)?;
        let mut words = Vec::with_capacity(n);
        for _ in 0..n {
            words.push(self.u64()?);
        }
        Ok(words)
    }

    pub(crate) fn nested(&mut self) -> Result<&'a [u8]> {
        let n = self.len_prefix(1)?;
        self.take(n)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.off
    }

    pub(crate) fn finish(self, what: &str) -> Result<()> {
        if self.off != self.bytes.len() {
            return Err(Error::encoding(format!("trailing bytes after {what}")));
        }
        Ok(())
    }
}

/// Append `v` as a little-endian base-128 varint.
pub(crate) fn write_vbyte(out: &mut Vec<u8>, mut v: usize) {
    while v >= 0x80 {
        out.push((v as u8 & 0x7F) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Read a varint written by [`write_vbyte`] at `*pos`, advancing it.
pub(crate) fn read_vbyte(bytes: &[u8], pos: &mut usize) -> Option<usize> {
    let mut v = 0usize;
    let mut shift = 0;
    loop {
        let b = *bytes.get(*pos)?;
        *pos += 1;
        if shift >= usize::BITS {
            return None;
        }
        v |= ((b & 0x7F) as usize).checked_shl(shift)?;
        if b & 0x80 == 0 {
            return Some(v);
        }
        shift += 7;
    }
}

/// Number of bits needed to represent `v` (at least 1).
pub(crate) fn bit_width(v: u64) -> usize {
    (64 - v.leading_zeros() as usize).max(1)
}
