//! Bucketed RePair + DAC ranked dictionary.
//!
//! Strings are sorted and cut into buckets of `bucket_size` lexicographically
//! adjacent strings. Inside a bucket they are stored by ascending rank id, so
//! the physical record of the string at offset `o` of bucket `b` is
//! `b * bucket_size + o`. Three structures tie this together:
//!
//! - `buckets` (a wavelet tree over rank positions): `buckets[id - 1]` is the
//!   bucket of rank id `id`. Because records inside a bucket follow rank
//!   order, the offset of that id is its rank among the bucket's symbols, and
//!   `select(b, o) + 1` recovers the id from a record.
//! - `headers`: for each bucket, the offset of its lexicographically smallest
//!   string. Binary searches probe only these header records.
//! - `records`: every string, grammar-compressed with RePair and addressed
//!   through DACs, in physical order.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::codec::{bit_width, ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use crate::ranked::aux_tree::AuxTree;
use crate::ranked::topk::{self, BucketCursor, Candidate, Filter, Source};
use crate::ranked::{lex_interval, lexicographic_order, max_length, RankedStringDictionary};
use crate::records::RecordStore;
use crate::store::partition_point;
use crate::wavelet::WaveletTree;

/// Range of buckets that may hold matches of a prefix. Every bucket strictly
/// between `first` and `last` matches entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BucketSpan {
    first: usize,
    last: usize,
}

/// Ranked dictionary over rank-ordered buckets of grammar-compressed records.
#[derive(Debug, Clone)]
pub struct BucketedDictionary {
    records: RecordStore,
    buckets: WaveletTree,
    headers: IntVector,
    bucket_size: usize,
    num_buckets: usize,
    len: usize,
    max_length: usize,
}

impl BucketedDictionary {
    /// Build over `strings`; the string at index `i` gets rank id `i + 1`.
    pub fn build<S: AsRef<[u8]>>(strings: &[S], bucket_size: usize) -> Result<Self> {
        if bucket_size == 0 || u32::try_from(bucket_size).is_err() {
            return Err(Error::InvalidParameter(format!(
                "bucket_size {bucket_size} out of range"
            )));
        }
        let order = lexicographic_order(strings)?;
        let n = order.len();
        let num_buckets = n.div_ceil(bucket_size);
        if u32::try_from(num_buckets).is_err() {
            return Err(Error::InvalidParameter(format!(
                "{num_buckets} buckets do not fit in 32 bits"
            )));
        }
        debug!(elements = n, num_buckets, "strings sorted");

        let mut bucket_of = vec![0u32; n];
        let mut headers = IntVector::with_len(bit_width(bucket_size as u64), num_buckets);
        let mut physical: Vec<&[u8]> = Vec::with_capacity(n);
        for (b, members) in order.chunks(bucket_size).enumerate() {
            let mut by_rank = members.to_vec();
            by_rank.sort_unstable();
            let header = by_rank.partition_point(|&r| r < members[0]);
            headers.set(b, header as u64);
            for &r in &by_rank {
                bucket_of[r] = b as u32;
                physical.push(strings[r].as_ref());
            }
        }
        let buckets = WaveletTree::new(&bucket_of, num_buckets as u32);
        debug!(height = buckets.height(), "bucket sequence built");

        let records = RecordStore::new(&physical);
        let dict = Self {
            records,
            buckets,
            headers,
            bucket_size,
            num_buckets,
            len: n,
            max_length: max_length(strings),
        };
        info!(
            elements = n,
            bucket_size,
            num_buckets,
            rules = dict.records.num_rules(),
            bytes = dict.size_bytes(),
            "bucketed dictionary built"
        );
        Ok(dict)
    }

    /// Strings per bucket.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    pub(crate) fn bucket_len(&self, bucket: usize) -> usize {
        if bucket >= self.num_buckets {
            return 0;
        }
        self.bucket_size.min(self.len - bucket * self.bucket_size)
    }

    fn record(&self, bucket: usize, offset: usize) -> usize {
        bucket * self.bucket_size + offset
    }

    fn header_offset(&self, bucket: usize) -> usize {
        self.headers.get(bucket).unwrap_or(0) as usize
    }

    fn header_record(&self, bucket: usize) -> usize {
        self.record(bucket, self.header_offset(bucket))
    }

    /// Rank id of the record at `offset` in `bucket`.
    pub(crate) fn id_of(&self, bucket: usize, offset: usize) -> Option<usize> {
        Some(self.buckets.select(bucket as u32, offset)? + 1)
    }

    pub(crate) fn record_starts_with(&self, bucket: usize, offset: usize, prefix: &[u8]) -> bool {
        self.records.starts_with(self.record(bucket, offset), prefix)
    }

    fn get(&self, bucket: usize, offset: usize) -> Option<Vec<u8>> {
        self.records.get(self.record(bucket, offset))
    }

    /// Offsets of `bucket` in lexicographic order.
    fn bucket_lex_order(&self, bucket: usize) -> Vec<usize> {
        let mut entries: Vec<(Vec<u8>, usize)> = (0..self.bucket_len(bucket))
            .filter_map(|o| Some((self.get(bucket, o)?, o)))
            .collect();
        entries.sort_unstable();
        entries.into_iter().map(|(_, o)| o).collect()
    }

    /// `(bucket, offset)` of the string at 0-based lexicographic position.
    fn lex_position(&self, pos: usize) -> Option<(usize, usize)> {
        if pos >= self.len {
            return None;
        }
        let bucket = pos / self.bucket_size;
        let offset = *self.bucket_lex_order(bucket).get(pos % self.bucket_size)?;
        Some((bucket, offset))
    }

    /// Buckets that can hold strings starting with `prefix`.
    fn prefix_span(&self, prefix: &[u8]) -> Option<BucketSpan> {
        let cmp = |b: usize| self.records.compare_prefix(self.header_record(b), prefix);

        let (mut lo, mut hi) = (0, self.num_buckets);
        let mut hit = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match cmp(mid) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    hit = Some(mid);
                    break;
                }
            }
        }

        match hit {
            Some(m) => {
                let first_match = partition_point(m, |b| cmp(b) == Ordering::Less);
                let last_match = m + partition_point(self.num_buckets - m, |i| {
                    cmp(m + i) == Ordering::Equal
                }) - 1;
                Some(BucketSpan {
                    first: first_match.saturating_sub(1),
                    last: last_match,
                })
            }
            None => {
                let candidate = lo.checked_sub(1)?;
                Some(BucketSpan {
                    first: candidate,
                    last: candidate,
                })
            }
        }
    }

    /// Merge the streams of `first..=last`, boundary buckets filtered.
    fn top_k<'q>(
        &self,
        first: usize,
        last: usize,
        first_filter: Filter<'q>,
        last_filter: Filter<'q>,
        k: usize,
    ) -> Vec<Candidate> {
        let first_source = Source::Bucket(BucketCursor::new(self, first, first_filter));
        let last_source = if last > first {
            Source::Bucket(BucketCursor::new(self, last, last_filter))
        } else {
            Source::Exhausted
        };
        let middle = match last.saturating_sub(first) {
            0 | 1 => Source::Exhausted,
            2 => Source::Bucket(BucketCursor::new(self, first + 1, Filter::All)),
            _ => Source::Tree(AuxTree::new(
                &self.buckets,
                first + 1,
                last - 1,
                self.bucket_size,
            )),
        };
        topk::merge(self, [first_source, last_source, middle], k)
    }

    fn ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<Candidate> {
        if k == 0 {
            return Vec::new();
        }
        match self.prefix_span(prefix) {
            Some(span) => self.top_k(
                span.first,
                span.last,
                Filter::Prefix(prefix),
                Filter::Prefix(prefix),
                k,
            ),
            None => Vec::new(),
        }
    }

    fn ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<Candidate> {
        let range = lex_interval(beginning, len, self.len);
        if k == 0 || range.is_empty() {
            return Vec::new();
        }
        let first = range.start / self.bucket_size;
        let last = (range.end - 1) / self.bucket_size;
        let mask = |bucket: usize| {
            let mut mask = vec![false; self.bucket_len(bucket)];
            for (j, o) in self.bucket_lex_order(bucket).into_iter().enumerate() {
                mask[o] = range.contains(&(bucket * self.bucket_size + j));
            }
            Filter::Mask(mask)
        };
        let last_filter = if last > first { mask(last) } else { Filter::All };
        self.top_k(first, last, mask(first), last_filter, k)
    }

    pub(crate) fn write_payload(&self, w: &mut ByteWriter) {
        w.u32(self.bucket_size as u32);
        w.u32(self.num_buckets as u32);
        w.nested(&self.records.to_bytes());
        w.nested(&self.buckets.to_bytes());
        w.nested(&self.headers.to_bytes());
    }

    pub(crate) fn read_payload(r: &mut ByteReader<'_>, len: usize, max_length: usize) -> Result<Self> {
        let bucket_size = r.u32()? as usize;
        let num_buckets = r.u32()? as usize;
        let records = RecordStore::from_bytes(r.nested()?)?;
        let buckets = WaveletTree::from_bytes(r.nested()?)?;
        let headers = IntVector::from_bytes(r.nested()?)?;

        if bucket_size == 0 || num_buckets != len.div_ceil(bucket_size) {
            return Err(Error::encoding(format!(
                "{num_buckets} buckets of {bucket_size} cannot hold {len} strings"
            )));
        }
        if records.len() != len || buckets.len() != len || headers.len() != num_buckets {
            return Err(Error::encoding("bucketed dictionary parts disagree in length"));
        }
        if buckets.sigma() as usize != num_buckets {
            return Err(Error::encoding("bucket sequence alphabet does not match bucket count"));
        }
        let dict = Self {
            records,
            buckets,
            headers,
            bucket_size,
            num_buckets,
            len,
            max_length,
        };
        for b in 0..num_buckets {
            let size = dict.bucket_len(b);
            if dict.buckets.count(b as u32) != size || dict.header_offset(b) >= size {
                return Err(Error::encoding(format!("bucket {b} is inconsistent")));
            }
        }
        debug!(elements = len, num_buckets, "bucketed dictionary decoded");
        Ok(dict)
    }
}

impl RankedStringDictionary for BucketedDictionary {
    fn len(&self) -> usize {
        self.len
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        let (mut lo, mut hi) = (0, self.num_buckets);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.records.compare(self.header_record(mid), key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return self.id_of(mid, self.header_offset(mid)),
            }
        }
        let bucket = lo.checked_sub(1)?;
        let header = self.header_offset(bucket);
        (0..self.bucket_len(bucket))
            .filter(|&o| o != header)
            .find(|&o| self.records.compare(self.record(bucket, o), key) == Ordering::Equal)
            .and_then(|o| self.id_of(bucket, o))
    }

    fn extract(&self, id: usize) -> Option<Vec<u8>> {
        if id == 0 || id > self.len {
            return None;
        }
        let (bucket, offset) = self.buckets.access_rank(id - 1);
        self.get(bucket as usize, offset)
    }

    fn locate_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        self.prefix_matches(prefix)
            .filter_map(move |(b, o)| self.id_of(b, o))
    }

    fn extract_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = Vec<u8>> + 'a {
        self.prefix_matches(prefix)
            .filter_map(move |(b, o)| self.get(b, o))
    }

    fn locate_rank(&self, rank: usize) -> Option<usize> {
        let (bucket, offset) = self.lex_position(rank.checked_sub(1)?)?;
        self.id_of(bucket, offset)
    }

    fn extract_rank(&self, rank: usize) -> Option<Vec<u8>> {
        let (bucket, offset) = self.lex_position(rank.checked_sub(1)?)?;
        self.get(bucket, offset)
    }

    fn locate_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<usize> {
        self.ranked_prefix(prefix, k).into_iter().map(|c| c.id).collect()
    }

    fn extract_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<Vec<u8>> {
        self.ranked_prefix(prefix, k)
            .into_iter()
            .filter_map(|c| self.get(c.bucket, c.offset))
            .collect()
    }

    fn locate_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<usize> {
        self.ranked_interval(beginning, len, k)
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    fn extract_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<Vec<u8>> {
        self.ranked_interval(beginning, len, k)
            .into_iter()
            .filter_map(|c| self.get(c.bucket, c.offset))
            .collect()
    }

    fn size_bytes(&self) -> usize {
        self.records.size_bytes() + self.buckets.size_bytes() + self.headers.size_bytes()
    }
}

impl BucketedDictionary {
    /// `(bucket, offset)` of every string starting with `prefix`, in
    /// physical order.
    fn prefix_matches<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let span = self.prefix_span(prefix);
        span.into_iter().flat_map(move |span| {
            (span.first..=span.last).flat_map(move |b| {
                let boundary = b == span.first || b == span.last;
                (0..self.bucket_len(b))
                    .filter(move |&o| !boundary || self.record_starts_with(b, o, prefix))
                    .map(move |o| (b, o))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRUIT: [&str; 5] = ["apple", "banana", "band", "bandana", "cat"];

    #[test]
    fn test_layout_of_small_dictionary() {
        // Rank order differs from lexicographic order.
        let strings = ["cat", "band", "apple", "bandana", "banana"];
        let d = BucketedDictionary::build(&strings, 2).unwrap();
        assert_eq!(d.num_buckets(), 3);
        // Bucket 0 = {apple(3), banana(5)}, 1 = {band(2), bandana(4)}, 2 = {cat(1)}.
        assert_eq!(d.get(0, 0).unwrap(), b"apple");
        assert_eq!(d.get(0, 1).unwrap(), b"banana");
        assert_eq!(d.get(1, 0).unwrap(), b"band");
        assert_eq!(d.id_of(1, 1), Some(4));
        assert_eq!(d.header_offset(0), 0);
        assert_eq!(d.bucket_len(2), 1);
    }

    #[test]
    fn test_header_is_lexicographic_minimum() {
        let strings = ["zeta", "beta", "alpha", "gamma"];
        let d = BucketedDictionary::build(&strings, 4).unwrap();
        // Physical order is rank order: zeta, beta, alpha, gamma.
        assert_eq!(d.header_offset(0), 2);
        assert_eq!(d.records.get(d.header_record(0)).unwrap(), b"alpha");
    }

    #[test]
    fn test_locate_and_extract() {
        let d = BucketedDictionary::build(&FRUIT, 2).unwrap();
        for (i, s) in FRUIT.iter().enumerate() {
            assert_eq!(d.locate(s.as_bytes()), Some(i + 1));
            assert_eq!(d.extract(i + 1).unwrap(), s.as_bytes());
        }
        assert_eq!(d.locate(b"ban"), None);
        assert_eq!(d.locate(b"aardvark"), None);
        assert_eq!(d.locate(b"dog"), None);
        assert_eq!(d.extract(0), None);
        assert_eq!(d.extract(6), None);
    }

    #[test]
    fn test_prefix_span() {
        let d = BucketedDictionary::build(&FRUIT, 2).unwrap();
        // Headers: apple, band, cat.
        assert_eq!(d.prefix_span(b"ban"), Some(BucketSpan { first: 0, last: 1 }));
        assert_eq!(d.prefix_span(b"c"), Some(BucketSpan { first: 1, last: 2 }));
        assert_eq!(d.prefix_span(b"bana"), Some(BucketSpan { first: 0, last: 0 }));
        assert_eq!(d.prefix_span(b"aa"), None);
    }

    #[test]
    fn test_ranked_prefix_and_interval() {
        let d = BucketedDictionary::build(&FRUIT, 2).unwrap();
        assert_eq!(
            d.extract_ranked_prefix(b"ban", 2),
            vec![b"banana".to_vec(), b"band".to_vec()]
        );
        assert_eq!(d.locate_ranked_prefix(b"ban", 10), vec![2, 3, 4]);
        assert_eq!(d.locate_ranked_interval(1, 5, 3), vec![1, 2, 3]);
        assert_eq!(d.locate_ranked_interval(2, 2, 5), vec![2, 3]);
        assert!(d.locate_ranked_prefix(b"dog", 3).is_empty());
    }

    #[test]
    fn test_many_middle_buckets_use_the_tree() {
        // 40 strings "k00".."k39" given in reverse order, buckets of 3.
        let strings: Vec<String> = (0..40).rev().map(|i| format!("k{i:02}")).collect();
        let d = BucketedDictionary::build(&strings, 3).unwrap();
        let all: Vec<usize> = (1..=40).collect();
        assert_eq!(d.locate_ranked_prefix(b"k", 40), all);
        assert_eq!(d.locate_ranked_prefix(b"k", 5), vec![1, 2, 3, 4, 5]);
        // "k1" matches k10..k19, ranks 21..=30.
        assert_eq!(d.locate_ranked_prefix(b"k1", 4), vec![21, 22, 23, 24]);
        // Lexicographic ranks 5..=20 hold k04..k19, rank ids 21..=36.
        assert_eq!(d.locate_ranked_interval(5, 16, 100), (21..=36).collect::<Vec<_>>());
    }

    #[test]
    fn test_lexicographic_rank() {
        let strings = ["cat", "band", "apple", "bandana", "banana"];
        let d = BucketedDictionary::build(&strings, 2).unwrap();
        assert_eq!(d.locate_rank(1), Some(3));
        assert_eq!(d.extract_rank(2).unwrap(), b"banana");
        assert_eq!(d.extract_rank(5).unwrap(), b"cat");
        assert_eq!(d.locate_rank(0), None);
        assert_eq!(d.locate_rank(6), None);
    }

    #[test]
    fn test_rejects_duplicates() {
        assert!(BucketedDictionary::build(&["a", "b", "a"], 2).is_err());
        assert!(BucketedDictionary::build(&["a"], 0).is_err());
    }
}
