//! Elias-Fano encoding for monotone sequences.
//!
//! Provides near-optimal space for sorted integers while allowing
//! $O(1)$ random access to any element.
//!
//! # Theory
//!
//! For $n$ sorted integers in range $[0, U]$, Elias-Fano uses:
//! - $L = \lfloor \log_2(U/n) \rfloor$ bits for each "lower" part.
//! - A bit vector of length $n + \lceil U/2^L \rceil$ for "upper" parts.
//!
//! Total space is $n \lceil \log_2(U/n) \rceil + 2n + o(n)$ bits.
//!
//! The front-coded string store keeps its bucket byte offsets here.

use crate::bitvec::BitVector;
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

const MAGIC: &[u8; 8] = b"RKELFA01";

/// Elias-Fano encoding structure.
#[derive(Debug, Clone)]
pub struct EliasFano {
    upper_bits: BitVector,
    lower_bits: Vec<u64>,
    l: usize,
    n: usize,
    universe: u64,
}

fn low_mask(l: usize) -> u64 {
    if l == 0 {
        0
    } else {
        (1u64 << l) - 1
    }
}

impl EliasFano {
    /// Create a new Elias-Fano structure from a sorted sequence whose values
    /// are all `<= universe`.
    pub fn new(values: &[u64], universe: u64) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                upper_bits: BitVector::new(&[], 0),
                lower_bits: Vec::new(),
                l: 0,
                n: 0,
                universe,
            };
        }
        debug_assert!(values.windows(2).all(|w| w[0] <= w[1]));

        // L = floor(log2(U/n))
        let ratio = universe / n as u64;
        let l = if ratio > 0 {
            (63 - ratio.leading_zeros()) as usize
        } else {
            0
        };

        // Lower bits: pack n elements of L bits each
        let mut lower_bits = Vec::with_capacity(n.saturating_mul(l).div_ceil(64));
        let mut current_word = 0u64;
        let mut bit_offset = 0;

        if l > 0 {
            for &v in values {
                let low = v & low_mask(l);
                if bit_offset + l <= 64 {
                    current_word |= low << bit_offset;
                    bit_offset += l;
                    if bit_offset == 64 {
                        lower_bits.push(current_word);
                        current_word = 0;
                        bit_offset = 0;
                    }
                } else {
                    // Split across words
                    let bits_in_this = 64 - bit_offset;
                    current_word |= (low & low_mask(bits_in_this)) << bit_offset;
                    lower_bits.push(current_word);
                    current_word = low >> bits_in_this;
                    bit_offset = l - bits_in_this;
                }
            }
            if bit_offset > 0 {
                lower_bits.push(current_word);
            }
        }

        // Upper bits: n ones and U/2^L zeros
        let num_upper_vals = (universe >> l) as usize + 1;
        let upper_bv_len = n + num_upper_vals;
        let mut upper_data = vec![0u64; upper_bv_len.div_ceil(64)];

        for (i, &v) in values.iter().enumerate() {
            let high = (v >> l) as usize;
            let pos = high + i;
            upper_data[pos / 64] |= 1 << (pos % 64);
        }

        Self {
            upper_bits: BitVector::new(&upper_data, upper_bv_len),
            lower_bits,
            l,
            n,
            universe,
        }
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the sequence has 0 elements.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.upper_bits.size_bytes() + self.lower_bits.capacity() * 8
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u64> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }

        // 1. Get high bits from upper_bits using select1(i)
        let pos = self
            .upper_bits
            .select1(i)
            .ok_or(Error::InvalidSelection(i))?;
        let high = (pos - i) as u64;

        if self.l == 0 {
            return Ok(high);
        }

        // 2. Get low bits from lower_bits
        let start_bit = i * self.l;
        let word_idx = start_bit / 64;
        let bit_offset = start_bit % 64;

        let mut low = self.lower_bits[word_idx] >> bit_offset;
        if bit_offset + self.l > 64 {
            let bits_from_next = bit_offset + self.l - 64;
            low |= (self.lower_bits[word_idx + 1] & low_mask(bits_from_next))
                << (self.l - bits_from_next);
        }
        low &= low_mask(self.l);

        Ok((high << self.l) | low)
    }

    /// Serialize to a stable binary encoding (little-endian).
    ///
    /// Format: magic `RKELFA01`, n u64, universe u64, upper bits (nested),
    /// lower words (u64 count + words). `L` is recomputed on load.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.usize(self.n);
        w.u64(self.universe);
        w.nested(&self.upper_bits.to_bytes());
        w.words(&self.lower_bits);
        w.finish()
    }

    /// Deserialize from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "EliasFano")?;
        let n = r.usize()?;
        let universe = r.u64()?;
        let upper_bits = BitVector::from_bytes(r.nested()?)?;
        let lower_bits = r.words()?;
        r.finish("EliasFano")?;

        let l = match universe.checked_div(n as u64) {
            Some(ratio) if ratio > 0 => (63 - ratio.leading_zeros()) as usize,
            _ => 0,
        };
        if upper_bits.count_ones() != n {
            return Err(Error::encoding(format!(
                "EliasFano upper bits hold {} values, expected {n}",
                upper_bits.count_ones()
            )));
        }
        if lower_bits.len() != n.saturating_mul(l).div_ceil(64) {
            return Err(Error::encoding("EliasFano lower bits have the wrong length"));
        }
        Ok(Self {
            upper_bits,
            lower_bits,
            l,
            n,
            universe,
        })
    }
}
