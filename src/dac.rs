//! Directly addressable codes over symbol sequences.
//!
//! DACs (Brisaboa, Ladra and Navarro) split each variable-length code into
//! chunks and store the $l$-th chunks of all codes together at level $l$,
//! with a bit vector marking which codes continue to the next level. Rank on
//! that bit vector is all that is needed to follow one code downwards, so any
//! code is reachable without decoding its predecessors.
//!
//! Here the "chunks" are the grammar symbols of one record: level $l$ holds
//! the $l$-th symbol of every record that has one.

use crate::bitvec::BitVector;
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;

const MAGIC: &[u8; 8] = b"RKDACS01";

#[derive(Debug, Clone)]
struct Level {
    symbols: IntVector,
    more: BitVector,
}

/// A random-access array of variable-length symbol sequences.
#[derive(Debug, Clone)]
pub struct Dac {
    nonempty: BitVector,
    levels: Vec<Level>,
}

impl Dac {
    /// Build from one symbol sequence per entry.
    pub fn new<S: AsRef<[u64]>>(seqs: &[S]) -> Self {
        let nonempty = BitVector::from_bools(seqs.iter().map(|s| !s.as_ref().is_empty()));
        let mut levels = Vec::new();
        let mut active: Vec<&[u64]> = seqs
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !s.is_empty())
            .collect();
        let mut depth = 0;

        while !active.is_empty() {
            let symbols: Vec<u64> = active.iter().map(|s| s[depth]).collect();
            let more = BitVector::from_bools(active.iter().map(|s| s.len() > depth + 1));
            levels.push(Level {
                symbols: IntVector::from_slice(&symbols),
                more,
            });
            active.retain(|s| s.len() > depth + 1);
            depth += 1;
        }

        Self { nonempty, levels }
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.nonempty.len()
    }

    /// Returns whether there are no sequences.
    pub fn is_empty(&self) -> bool {
        self.nonempty.is_empty()
    }

    /// Length of the longest sequence.
    pub fn max_len(&self) -> usize {
        self.levels.len()
    }

    /// Lazily iterate the symbols of sequence `i`.
    pub fn get(&self, i: usize) -> Option<Symbols<'_>> {
        if i >= self.len() {
            return None;
        }
        let pos = self.nonempty.get(i).then(|| self.nonempty.rank1(i));
        Some(Symbols {
            dac: self,
            level: 0,
            pos,
        })
    }

    /// Largest stored symbol, if any.
    pub fn max_symbol(&self) -> Option<u64> {
        self.levels
            .iter()
            .flat_map(|level| level.symbols.iter())
            .max()
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.nonempty.size_bytes()
            + self
                .levels
                .iter()
                .map(|l| l.symbols.size_bytes() + l.more.size_bytes())
                .sum::<usize>()
    }

    /// Serialize: magic `RKDACS01`, nonempty marks (nested), level count u64,
    /// then per level its symbols and continuation marks (both nested).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.nested(&self.nonempty.to_bytes());
        w.usize(self.levels.len());
        for level in &self.levels {
            w.nested(&level.symbols.to_bytes());
            w.nested(&level.more.to_bytes());
        }
        w.finish()
    }

    /// Deserialize, checking that every level is sized by the one above it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "Dac")?;
        let nonempty = BitVector::from_bytes(r.nested()?)?;
        let n_levels = r.len_prefix(16)?;
        let mut levels = Vec::with_capacity(n_levels);
        let mut expected = nonempty.count_ones();
        for depth in 0..n_levels {
            let symbols = IntVector::from_bytes(r.nested()?)?;
            let more = BitVector::from_bytes(r.nested()?)?;
            if symbols.len() != expected || more.len() != expected || expected == 0 {
                return Err(Error::encoding(format!(
                    "DAC level {depth} holds {} symbols, expected {expected}",
                    symbols.len()
                )));
            }
            expected = more.count_ones();
            levels.push(Level { symbols, more });
        }
        r.finish("Dac")?;
        if expected != 0 {
            return Err(Error::encoding("DAC continues past its last level"));
        }
        Ok(Self { nonempty, levels })
    }
}

/// Symbol iterator over one sequence of a [`Dac`].
#[derive(Debug, Clone)]
pub struct Symbols<'a> {
    dac: &'a Dac,
    level: usize,
    pos: Option<usize>,
}

impl Iterator for Symbols<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let pos = self.pos?;
        let level = self.dac.levels.get(self.level)?;
        let symbol = level.symbols.get(pos)?;
        self.pos = level.more.get(pos).then(|| level.more.rank1(pos));
        self.level += 1;
        Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_length_access() {
        let seqs: Vec<Vec<u64>> = vec![vec![5, 6, 7], vec![], vec![300], vec![1, 2], vec![9, 9, 9, 9]];
        let dac = Dac::new(&seqs);
        assert_eq!(dac.len(), 5);
        assert_eq!(dac.max_len(), 4);
        assert_eq!(dac.max_symbol(), Some(300));
        for (i, s) in seqs.iter().enumerate() {
            assert_eq!(&dac.get(i).unwrap().collect::<Vec<_>>(), s);
        }
        assert!(dac.get(5).is_none());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let seqs: Vec<Vec<u64>> = (0..40).map(|i| (0..i % 7).map(|j| j * i).collect()).collect();
        let dac = Dac::from_bytes(&Dac::new(&seqs).to_bytes()).unwrap();
        for (i, s) in seqs.iter().enumerate() {
            assert_eq!(&dac.get(i).unwrap().collect::<Vec<_>>(), s);
        }
    }

    #[test]
    fn test_all_empty() {
        let dac = Dac::new(&[Vec::<u64>::new(), Vec::new()]);
        assert_eq!(dac.max_len(), 0);
        assert_eq!(dac.get(1).unwrap().count(), 0);
        assert!(Dac::from_bytes(&dac.to_bytes()).is_ok());
    }
}
