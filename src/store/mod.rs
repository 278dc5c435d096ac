//! Lexicographically ordered compressed string stores.
//!
//! A store keeps a sorted, duplicate-free set of byte strings and answers
//! queries in terms of 0-based lexicographic positions. The permuted ranked
//! layout wraps one of these and translates positions into rank ids.
//!
//! The set of stores is closed: [`StringStore`] enumerates every
//! implementation and its persisted tag.

use std::ops::Range;

use crate::codec::{ByteReader, ByteWriter};
use crate::config::StoreKind;
use crate::error::{Error, Result};

pub mod front_coding;
pub mod repair_dac;

pub use front_coding::FrontCoded;
pub use repair_dac::RePairDacStore;

const TAG_FRONT_CODED: u32 = 1;
const TAG_REPAIR_DAC: u32 = 2;

/// Locate/extract/prefix capability over a lexicographically sorted string set.
pub trait StringDictionary {
    /// Number of stored strings.
    fn len(&self) -> usize;

    /// Returns whether no strings are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lexicographic position of `key`, if present.
    fn locate(&self, key: &[u8]) -> Option<usize>;

    /// String at lexicographic position `pos`.
    fn extract(&self, pos: usize) -> Option<Vec<u8>>;

    /// Contiguous range of positions whose strings start with `prefix`.
    ///
    /// The range is empty when nothing matches.
    fn locate_prefix(&self, prefix: &[u8]) -> Range<usize>;

    /// Approximate heap memory usage in bytes.
    fn size_bytes(&self) -> usize;
}

/// Every supported string store.
#[derive(Debug, Clone)]
pub enum StringStore {
    /// Plain front coding.
    FrontCoded(FrontCoded),
    /// Lexicographic RePair + DAC.
    RePairDac(RePairDacStore),
}

impl StringStore {
    /// Build a store of `kind` over strictly increasing `sorted` keys.
    pub fn build<K: AsRef<[u8]>>(kind: StoreKind, sorted: &[K], bucket_size: usize) -> Self {
        match kind {
            StoreKind::FrontCoded => Self::FrontCoded(FrontCoded::new(sorted, bucket_size)),
            StoreKind::RePairDac => Self::RePairDac(RePairDacStore::new(sorted)),
        }
    }

    /// Which implementation this is.
    pub fn kind(&self) -> StoreKind {
        match self {
            Self::FrontCoded(_) => StoreKind::FrontCoded,
            Self::RePairDac(_) => StoreKind::RePairDac,
        }
    }

    fn as_dyn(&self) -> &dyn StringDictionary {
        match self {
            Self::FrontCoded(s) => s,
            Self::RePairDac(s) => s,
        }
    }

    /// Write the `u32` tag followed by the nested store.
    pub(crate) fn write(&self, w: &mut ByteWriter) {
        match self {
            Self::FrontCoded(s) => {
                w.u32(TAG_FRONT_CODED);
                w.nested(&s.to_bytes());
            }
            Self::RePairDac(s) => {
                w.u32(TAG_REPAIR_DAC);
                w.nested(&s.to_bytes());
            }
        }
    }

    /// Read a store written by [`StringStore::write`].
    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        match r.u32()? {
            TAG_FRONT_CODED => Ok(Self::FrontCoded(FrontCoded::from_bytes(r.nested()?)?)),
            TAG_REPAIR_DAC => Ok(Self::RePairDac(RePairDacStore::from_bytes(r.nested()?)?)),
            tag => Err(Error::encoding(format!("unknown string store tag {tag}"))),
        }
    }
}

impl StringDictionary for StringStore {
    fn len(&self) -> usize {
        self.as_dyn().len()
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        self.as_dyn().locate(key)
    }

    fn extract(&self, pos: usize) -> Option<Vec<u8>> {
        self.as_dyn().extract(pos)
    }

    fn locate_prefix(&self, prefix: &[u8]) -> Range<usize> {
        self.as_dyn().locate_prefix(prefix)
    }

    fn size_bytes(&self) -> usize {
        self.as_dyn().size_bytes()
    }
}

/// First index in `0..len` for which `pred` is false, assuming `pred` holds
/// on a prefix of the range.
pub(crate) fn partition_point(len: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// `s` truncated to at most `prefix.len()` bytes.
pub(crate) fn truncated<'a>(s: &'a [u8], prefix: &[u8]) -> &'a [u8] {
    &s[..s.len().min(prefix.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 8] = [
        "ideal",
        "ideas",
        "ideology",
        "tea",
        "techie",
        "technology",
        "tie",
        "trie",
    ];

    fn stores() -> Vec<StringStore> {
        vec![
            StringStore::build(StoreKind::FrontCoded, &KEYS, 3),
            StringStore::build(StoreKind::RePairDac, &KEYS, 3),
        ]
    }

    #[test]
    fn test_locate_extract() {
        for store in stores() {
            assert_eq!(store.len(), KEYS.len());
            for (i, key) in KEYS.iter().enumerate() {
                assert_eq!(store.locate(key.as_bytes()), Some(i), "{:?}", store.kind());
                assert_eq!(store.extract(i).unwrap(), key.as_bytes());
            }
            assert_eq!(store.locate(b"idea"), None);
            assert_eq!(store.locate(b"a"), None);
            assert_eq!(store.locate(b"zzz"), None);
            assert_eq!(store.extract(KEYS.len()), None);
        }
    }

    #[test]
    fn test_locate_prefix() {
        for store in stores() {
            assert_eq!(store.locate_prefix(b"ide"), 0..3);
            assert_eq!(store.locate_prefix(b"tec"), 4..6);
            assert_eq!(store.locate_prefix(b"t"), 3..8);
            assert_eq!(store.locate_prefix(b""), 0..8);
            assert!(store.locate_prefix(b"x").is_empty());
            assert!(store.locate_prefix(b"ideologyy").is_empty());
        }
    }

    #[test]
    fn test_tagged_roundtrip() {
        for store in stores() {
            let mut w = ByteWriter::new();
            store.write(&mut w);
            let bytes = w.finish();
            let mut r = ByteReader::new(&bytes);
            let decoded = StringStore::read(&mut r).unwrap();
            assert_eq!(decoded.kind(), store.kind());
            for i in 0..KEYS.len() {
                assert_eq!(decoded.extract(i), store.extract(i));
            }
        }
    }

    #[test]
    fn test_partition_point() {
        assert_eq!(partition_point(10, |i| i < 4), 4);
        assert_eq!(partition_point(0, |_| true), 0);
        assert_eq!(partition_point(5, |_| true), 5);
    }
}
