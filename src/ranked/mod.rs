//! Ranked string dictionaries.
//!
//! A ranked dictionary maps between byte strings and *rank ids*: the 1-based
//! position of each string in the order it was given at construction time.
//! Besides exact `locate`/`extract` it answers prefix and lexicographic
//! interval queries, and returns the `k` smallest rank ids among their matches
//! without enumerating them all.
//!
//! Two layouts are provided:
//!
//! - [`PermutedDictionary`]: a lexicographic [`StringStore`] plus a
//!   [`Permutation`] between rank ids and lexicographic positions.
//! - [`BucketedDictionary`]: buckets of lexicographically adjacent strings,
//!   stored inside each bucket in rank order, with a wavelet tree mapping rank
//!   ids to buckets.
//!
//! [`RankedDictionary`] is the closed set of both, with a tagged binary
//! format.
//!
//! [`StringStore`]: crate::store::StringStore
//! [`Permutation`]: crate::permutation::Permutation

use std::io::{Read, Write};
use std::ops::Range;

use tracing::debug;

use crate::codec::{ByteReader, ByteWriter};
use crate::config::{BuildConfig, Layout};
use crate::error::{Error, Result};

pub mod aux_tree;
pub mod bucketed;
pub mod permuted;
pub mod topk;

pub use bucketed::BucketedDictionary;
pub use permuted::PermutedDictionary;

const TAG_PERMUTED: u32 = 1;
const TAG_BUCKETED: u32 = 2;

/// Queries answered by every ranked dictionary.
///
/// Rank ids are 1-based and dense over `[1, len()]`. Lexicographic ranks used
/// by [`locate_rank`](Self::locate_rank) and the interval queries are 1-based
/// positions in sorted order. Absent strings and out-of-range ids give `None`
/// or an empty result, never an error.
pub trait RankedStringDictionary {
    /// Number of strings.
    fn len(&self) -> usize;

    /// Returns whether the dictionary holds no strings.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the longest string plus one.
    fn max_length(&self) -> usize;

    /// Rank id of `key`.
    fn locate(&self, key: &[u8]) -> Option<usize>;

    /// String with rank id `id`.
    fn extract(&self, id: usize) -> Option<Vec<u8>>;

    /// Rank ids of all strings starting with `prefix`, in no particular order.
    fn locate_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = usize> + 'a;

    /// All strings starting with `prefix`, in no particular order.
    fn extract_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = Vec<u8>> + 'a;

    /// Rank id of the string at 1-based lexicographic rank `rank`.
    fn locate_rank(&self, rank: usize) -> Option<usize>;

    /// String at 1-based lexicographic rank `rank`.
    fn extract_rank(&self, rank: usize) -> Option<Vec<u8>>;

    /// The `k` smallest rank ids among strings starting with `prefix`,
    /// smallest first.
    fn locate_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<usize>;

    /// Strings for [`locate_ranked_prefix`](Self::locate_ranked_prefix).
    fn extract_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<Vec<u8>>;

    /// The `k` smallest rank ids among the strings at lexicographic ranks
    /// `[beginning, beginning + len)`, smallest first. The interval is
    /// clamped to `[1, len()]`.
    ///
    /// The interval selects positions in sorted order, not rank ids: with
    /// `k = len` the result is the sorted set of rank ids of the strings at
    /// lexicographic positions `[beginning, beginning + len)`.
    fn locate_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<usize>;

    /// Strings for [`locate_ranked_interval`](Self::locate_ranked_interval).
    fn extract_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<Vec<u8>>;

    /// Substring location is not supported by either layout.
    fn locate_substr(&self, _pattern: &[u8]) -> Result<Vec<usize>> {
        Err(Error::Unsupported("substring location"))
    }

    /// Substring extraction is not supported by either layout.
    fn extract_substr(&self, _pattern: &[u8]) -> Result<Vec<Vec<u8>>> {
        Err(Error::Unsupported("substring extraction"))
    }

    /// Whole-table extraction is not supported by either layout.
    fn extract_table(&self) -> Result<Vec<Vec<u8>>> {
        Err(Error::Unsupported("table extraction"))
    }

    /// Approximate heap memory usage in bytes.
    fn size_bytes(&self) -> usize;
}

/// Either ranked layout, selected at build time and recorded in the
/// persisted tag.
#[derive(Debug, Clone)]
pub enum RankedDictionary {
    /// String store plus permutation.
    Permuted(PermutedDictionary),
    /// Bucketed RePair + DAC records.
    Bucketed(BucketedDictionary),
}

impl RankedDictionary {
    /// Build a dictionary over `strings`; the string at index `i` gets rank
    /// id `i + 1`.
    ///
    /// Fails with [`Error::InvalidParameter`] for an invalid `config`, an
    /// empty input or duplicate strings.
    pub fn build<S: AsRef<[u8]>>(strings: &[S], config: &BuildConfig) -> Result<Self> {
        config.validate()?;
        match config.layout {
            Layout::Permuted(kind) => Ok(Self::Permuted(PermutedDictionary::build(
                strings,
                kind,
                config.bucket_size,
            )?)),
            Layout::Bucketed => Ok(Self::Bucketed(BucketedDictionary::build(
                strings,
                config.bucket_size,
            )?)),
        }
    }

    /// Layout of this dictionary.
    pub fn layout(&self) -> Layout {
        match self {
            Self::Permuted(d) => Layout::Permuted(d.store_kind()),
            Self::Bucketed(_) => Layout::Bucketed,
        }
    }

    /// Serialize to a stable binary encoding (little-endian).
    ///
    /// Format: tag u32 (`1` permuted, `2` bucketed), elements u64,
    /// max length u32, then the layout's payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        let tag = match self {
            Self::Permuted(_) => TAG_PERMUTED,
            Self::Bucketed(_) => TAG_BUCKETED,
        };
        w.u32(tag);
        w.usize(self.len());
        w.u32(self.max_length() as u32);
        match self {
            Self::Permuted(d) => d.write_payload(&mut w),
            Self::Bucketed(d) => d.write_payload(&mut w),
        }
        w.finish()
    }

    /// Deserialize from `to_bytes()` output, validating every structure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let tag = r.u32()?;
        let elements = r.usize()?;
        let max_length = r.u32()? as usize;
        if elements == 0 {
            return Err(Error::encoding("dictionary holds no elements"));
        }
        let dict = match tag {
            TAG_PERMUTED => Self::Permuted(PermutedDictionary::read_payload(
                &mut r, elements, max_length,
            )?),
            TAG_BUCKETED => Self::Bucketed(BucketedDictionary::read_payload(
                &mut r, elements, max_length,
            )?),
            tag => return Err(Error::encoding(format!("unknown dictionary tag {tag}"))),
        };
        r.finish("RankedDictionary")?;
        debug!(layout = ?dict.layout(), elements, "ranked dictionary loaded");
        Ok(dict)
    }

    /// Write [`to_bytes`](Self::to_bytes) output to `out`.
    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read everything from `input` and decode it.
    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

impl RankedStringDictionary for RankedDictionary {
    fn len(&self) -> usize {
        match self {
            Self::Permuted(d) => d.len(),
            Self::Bucketed(d) => d.len(),
        }
    }

    fn max_length(&self) -> usize {
        match self {
            Self::Permuted(d) => d.max_length(),
            Self::Bucketed(d) => d.max_length(),
        }
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        match self {
            Self::Permuted(d) => d.locate(key),
            Self::Bucketed(d) => d.locate(key),
        }
    }

    fn extract(&self, id: usize) -> Option<Vec<u8>> {
        match self {
            Self::Permuted(d) => d.extract(id),
            Self::Bucketed(d) => d.extract(id),
        }
    }

    fn locate_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        let iter: Box<dyn Iterator<Item = usize> + 'a> = match self {
            Self::Permuted(d) => Box::new(d.locate_prefix(prefix)),
            Self::Bucketed(d) => Box::new(d.locate_prefix(prefix)),
        };
        iter
    }

    fn extract_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = Vec<u8>> + 'a {
        let iter: Box<dyn Iterator<Item = Vec<u8>> + 'a> = match self {
            Self::Permuted(d) => Box::new(d.extract_prefix(prefix)),
            Self::Bucketed(d) => Box::new(d.extract_prefix(prefix)),
        };
        iter
    }

    fn locate_rank(&self, rank: usize) -> Option<usize> {
        match self {
            Self::Permuted(d) => d.locate_rank(rank),
            Self::Bucketed(d) => d.locate_rank(rank),
        }
    }

    fn extract_rank(&self, rank: usize) -> Option<Vec<u8>> {
        match self {
            Self::Permuted(d) => d.extract_rank(rank),
            Self::Bucketed(d) => d.extract_rank(rank),
        }
    }

    fn locate_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<usize> {
        match self {
            Self::Permuted(d) => d.locate_ranked_prefix(prefix, k),
            Self::Bucketed(d) => d.locate_ranked_prefix(prefix, k),
        }
    }

    fn extract_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<Vec<u8>> {
        match self {
            Self::Permuted(d) => d.extract_ranked_prefix(prefix, k),
            Self::Bucketed(d) => d.extract_ranked_prefix(prefix, k),
        }
    }

    fn locate_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<usize> {
        match self {
            Self::Permuted(d) => d.locate_ranked_interval(beginning, len, k),
            Self::Bucketed(d) => d.locate_ranked_interval(beginning, len, k),
        }
    }

    fn extract_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<Vec<u8>> {
        match self {
            Self::Permuted(d) => d.extract_ranked_interval(beginning, len, k),
            Self::Bucketed(d) => d.extract_ranked_interval(beginning, len, k),
        }
    }

    fn size_bytes(&self) -> usize {
        match self {
            Self::Permuted(d) => d.size_bytes(),
            Self::Bucketed(d) => d.size_bytes(),
        }
    }
}

/// Split NUL-terminated records, the plain-text input format of the
/// dictionary builders. A missing final terminator is tolerated.
pub fn strings_from_nul_delimited(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    body.split(|&b| b == 0).collect()
}

/// Sort rank positions lexicographically: `order[lex_pos] = rank_pos`.
///
/// Rejects empty input, duplicate strings and strings too long for the
/// persisted 32-bit max length.
pub(crate) fn lexicographic_order<S: AsRef<[u8]>>(strings: &[S]) -> Result<Vec<usize>> {
    if strings.is_empty() {
        return Err(Error::InvalidParameter(
            "cannot build a dictionary over no strings".to_string(),
        ));
    }
    let mut order: Vec<usize> = (0..strings.len()).collect();
    order.sort_unstable_by(|&a, &b| strings[a].as_ref().cmp(strings[b].as_ref()));
    if let Some(w) = order
        .windows(2)
        .find(|w| strings[w[0]].as_ref() == strings[w[1]].as_ref())
    {
        return Err(Error::InvalidParameter(format!(
            "duplicate string at positions {} and {}",
            w[0].min(w[1]) + 1,
            w[0].max(w[1]) + 1
        )));
    }
    if u32::try_from(max_length(strings)).is_err() {
        return Err(Error::InvalidParameter(
            "a string is too long to persist".to_string(),
        ));
    }
    Ok(order)
}

/// Length of the longest string plus one.
pub(crate) fn max_length<S: AsRef<[u8]>>(strings: &[S]) -> usize {
    strings
        .iter()
        .map(|s| s.as_ref().len())
        .max()
        .unwrap_or(0)
        + 1
}

/// 0-based lexicographic positions of the 1-based interval
/// `[beginning, beginning + len)` clamped to `[1, n]`.
pub(crate) fn lex_interval(beginning: usize, len: usize, n: usize) -> Range<usize> {
    let start = beginning.max(1) - 1;
    let end = beginning.saturating_add(len).min(n + 1).saturating_sub(1);
    start.min(end)..end
}
