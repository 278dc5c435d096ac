//! Packed fixed-width integer arrays.
//!
//! Stores `n` values of `width` bits each back to back in 64-bit words, the
//! implicit baseline for integer sequences: $n \cdot w$ bits plus at most one
//! word of padding, $O(1)$ access, no index.
//!
//! Used wherever a sequence has no exploitable order: bucket header offsets,
//! grammar rules, permutation images and shortcut links.

use crate::codec::{bit_width, ByteReader, ByteWriter};
use crate::error::{Error, Result};

const MAGIC: &[u8; 8] = b"RKINTV01";

/// A packed vector of `width`-bit unsigned integers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntVector {
    data: Vec<u64>,
    width: usize,
    len: usize,
}

impl IntVector {
    /// Create a zero-filled vector of `len` values of `width` bits.
    pub fn with_len(width: usize, len: usize) -> Self {
        let width = width.clamp(1, 64);
        Self {
            data: vec![0u64; (len * width).div_ceil(64)],
            width,
            len,
        }
    }

    /// Pack `values` using the smallest width that fits the maximum.
    pub fn from_slice(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let mut iv = Self::with_len(bit_width(max), values.len());
        for (i, &v) in values.iter().enumerate() {
            iv.set(i, v);
        }
        iv
    }

    /// Return the number of values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per value.
    pub fn width(&self) -> usize {
        self.width
    }

    fn mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Overwrite the value at `i`. Bits above `width` are dropped.
    pub fn set(&mut self, i: usize, value: u64) {
        debug_assert!(i < self.len);
        let value = value & self.mask();
        let bit = i * self.width;
        let (w, off) = (bit / 64, bit % 64);
        self.data[w] &= !(self.mask() << off);
        self.data[w] |= value << off;
        if off + self.width > 64 {
            let spill = off + self.width - 64;
            let hi_mask = (1u64 << spill) - 1;
            self.data[w + 1] &= !hi_mask;
            self.data[w + 1] |= value >> (self.width - spill);
        }
    }

    /// Return the value at `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<u64> {
        if i >= self.len {
            return None;
        }
        let bit = i * self.width;
        let (w, off) = (bit / 64, bit % 64);
        let mut v = self.data[w] >> off;
        if off + self.width > 64 {
            v |= self.data[w + 1] << (64 - off);
        }
        Some(v & self.mask())
    }

    /// Iterate over all values.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.capacity() * 8
    }

    /// Serialize to a stable little-endian encoding.
    ///
    /// Format: magic `RKINTV01`, width u32, len u64, words (u64 count + words).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.u32(self.width as u32);
        w.usize(self.len);
        w.words(&self.data);
        w.finish()
    }

    /// Deserialize from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "IntVector")?;
        let width = r.u32()? as usize;
        let len = r.usize()?;
        let data = r.words()?;
        r.finish("IntVector")?;
        if width == 0 || width > 64 {
            return Err(Error::encoding(format!("IntVector width {width} out of range")));
        }
        let needed = len
            .checked_mul(width)
            .map(|bits| bits.div_ceil(64))
            .ok_or_else(|| Error::encoding("IntVector length overflows"))?;
        if data.len() != needed {
            return Err(Error::encoding(format!(
                "IntVector needs {needed} words, found {}",
                data.len()
            )));
        }
        Ok(Self { data, width, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_across_word_boundaries() {
        let mut iv = IntVector::with_len(7, 40);
        for i in 0..40 {
            iv.set(i, (i as u64 * 37) % 128);
        }
        for i in 0..40 {
            assert_eq!(iv.get(i), Some((i as u64 * 37) % 128));
        }
        assert_eq!(iv.get(40), None);
    }

    #[test]
    fn test_from_slice_picks_width() {
        let iv = IntVector::from_slice(&[0, 5, 3, 17]);
        assert_eq!(iv.width(), 5);
        assert_eq!(iv.iter().collect::<Vec<_>>(), vec![0, 5, 3, 17]);
    }

    #[test]
    fn test_full_width_values() {
        let iv = IntVector::from_slice(&[u64::MAX, 1, u64::MAX - 3]);
        assert_eq!(iv.width(), 64);
        assert_eq!(iv.get(0), Some(u64::MAX));
        assert_eq!(iv.get(2), Some(u64::MAX - 3));
    }

    #[test]
    fn test_bytes_roundtrip_and_rejects_bad_width() {
        let iv = IntVector::from_slice(&[9, 8, 7, 6, 5]);
        let bytes = iv.to_bytes();
        assert_eq!(IntVector::from_bytes(&bytes).unwrap(), iv);

        let mut bad = bytes.clone();
        bad[8..12].copy_from_slice(&0u32.to_le_bytes());
        assert!(IntVector::from_bytes(&bad).is_err());
    }
}
