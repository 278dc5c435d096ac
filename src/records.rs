//! Grammar-compressed record store with random access.
//!
//! Records are compressed together with [`repair`](crate::repair) and each
//! record's symbol sequence is kept in a [`Dac`], so record `i` is decoded by
//! walking its sequence and expanding rules on the fly. Comparisons against a
//! query stop at the first differing byte, which keeps header probes during a
//! binary search cheap.

use std::cmp::Ordering;

use crate::codec::{ByteReader, ByteWriter};
use crate::dac::{Dac, Symbols};
use crate::error::{Error, Result};
use crate::repair::{self, Expand, Grammar};

const MAGIC: &[u8; 8] = b"RKRECS01";

/// Lazy byte iterator over one record.
pub type RecordBytes<'a> = Expand<'a, Symbols<'a>>;

/// RePair grammar plus DAC-addressed rule sequences, one per record.
#[derive(Debug, Clone)]
pub struct RecordStore {
    grammar: Grammar,
    seqs: Dac,
}

impl RecordStore {
    /// Compress `records`, keeping their order.
    pub fn new<R: AsRef<[u8]>>(records: &[R]) -> Self {
        let (grammar, seqs) = repair::induce(records);
        Self {
            grammar,
            seqs: Dac::new(&seqs),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    /// Returns whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// Number of grammar rules.
    pub fn num_rules(&self) -> usize {
        self.grammar.num_rules()
    }

    /// Lazily decode record `i`.
    pub fn bytes(&self, i: usize) -> Option<RecordBytes<'_>> {
        Some(self.grammar.expand(self.seqs.get(i)?))
    }

    /// Decode record `i` into an owned buffer.
    pub fn get(&self, i: usize) -> Option<Vec<u8>> {
        Some(self.bytes(i)?.collect())
    }

    /// Compare record `i` with `key`.
    ///
    /// Out-of-range records compare as `Greater`.
    pub fn compare(&self, i: usize, key: &[u8]) -> Ordering {
        match self.bytes(i) {
            Some(bytes) => bytes.cmp(key.iter().copied()),
            None => Ordering::Greater,
        }
    }

    /// Compare record `i`, truncated to `prefix.len()` bytes, with `prefix`.
    ///
    /// `Equal` means the record starts with `prefix`. A record that is a proper
    /// prefix of `prefix` is `Less`.
    pub fn compare_prefix(&self, i: usize, prefix: &[u8]) -> Ordering {
        match self.bytes(i) {
            Some(bytes) => {
                let mut bytes = bytes;
                for &p in prefix {
                    match bytes.next() {
                        None => return Ordering::Less,
                        Some(b) if b != p => return b.cmp(&p),
                        Some(_) => {}
                    }
                }
                Ordering::Equal
            }
            None => Ordering::Greater,
        }
    }

    /// Returns whether record `i` starts with `prefix`.
    pub fn starts_with(&self, i: usize, prefix: &[u8]) -> bool {
        self.compare_prefix(i, prefix) == Ordering::Equal
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.grammar.size_bytes() + self.seqs.size_bytes()
    }

    /// Serialize: magic `RKRECS01`, grammar (nested), sequences (nested).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.nested(&self.grammar.to_bytes());
        w.nested(&self.seqs.to_bytes());
        w.finish()
    }

    /// Deserialize, rejecting sequences that use undefined symbols.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "RecordStore")?;
        let grammar = Grammar::from_bytes(r.nested()?)?;
        let seqs = Dac::from_bytes(r.nested()?)?;
        r.finish("RecordStore")?;
        if let Some(max) = seqs.max_symbol() {
            if max >= grammar.num_symbols() {
                return Err(Error::encoding(format!(
                    "record symbol {max} undefined in a grammar of {} rules",
                    grammar.num_rules()
                )));
            }
        }
        Ok(Self { grammar, seqs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::new(&["band", "banana", "", "bandana", "cat", "band"])
    }

    #[test]
    fn test_get_and_len() {
        let s = store();
        assert_eq!(s.len(), 6);
        assert_eq!(s.get(3).unwrap(), b"bandana");
        assert_eq!(s.get(2).unwrap(), b"");
        assert!(s.get(6).is_none());
    }

    #[test]
    fn test_compare() {
        let s = store();
        assert_eq!(s.compare(0, b"band"), Ordering::Equal);
        assert_eq!(s.compare(0, b"bandana"), Ordering::Less);
        assert_eq!(s.compare(3, b"band"), Ordering::Greater);
        assert_eq!(s.compare(1, b"band"), Ordering::Less);
        assert_eq!(s.compare(2, b""), Ordering::Equal);
        assert_eq!(s.compare(9, b"a"), Ordering::Greater);
    }

    #[test]
    fn test_compare_prefix() {
        let s = store();
        assert_eq!(s.compare_prefix(3, b"band"), Ordering::Equal);
        assert_eq!(s.compare_prefix(0, b"bandana"), Ordering::Less);
        assert_eq!(s.compare_prefix(4, b"ba"), Ordering::Greater);
        assert_eq!(s.compare_prefix(1, b"bana"), Ordering::Equal);
        assert!(s.starts_with(2, b""));
        assert!(!s.starts_with(2, b"b"));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let s = store();
        let decoded = RecordStore::from_bytes(&s.to_bytes()).unwrap();
        for i in 0..s.len() {
            assert_eq!(decoded.get(i), s.get(i));
        }
    }
}
