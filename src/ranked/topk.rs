//! Top-k merge over bucket streams.
//!
//! A ranked prefix or interval query over the bucketed layout touches a run
//! of buckets `first..=last`. Inside one bucket records are stored in rank
//! order, so every bucket is already a sorted stream of rank ids. The query
//! merges three streams:
//!
//! - the first bucket, filtered (it may hold non-matching records),
//! - the last bucket, filtered likewise,
//! - every bucket strictly in between, which matches entirely.
//!
//! The middle stream is one plain bucket when there is a single middle
//! bucket, and an [`AuxTree`] walk when there are more. The three heads are
//! kept sorted by id with a fixed sorting network, so producing `k` results
//! costs `k` advances plus `O(k)` comparisons.

use crate::ranked::aux_tree::AuxTree;
use crate::ranked::bucketed::BucketedDictionary;
use crate::ranked::RankedStringDictionary;

/// Which records of a boundary bucket take part in the merge.
#[derive(Debug, Clone)]
pub(crate) enum Filter<'q> {
    /// Every record.
    All,
    /// Records starting with the prefix.
    Prefix(&'q [u8]),
    /// Records whose within-bucket offset is marked.
    Mask(Vec<bool>),
}

/// Ascending walk over the records of one bucket.
#[derive(Debug)]
pub(crate) struct BucketCursor<'a, 'q> {
    dict: &'a BucketedDictionary,
    bucket: usize,
    offset: usize,
    filter: Filter<'q>,
}

impl<'a, 'q> BucketCursor<'a, 'q> {
    pub(crate) fn new(dict: &'a BucketedDictionary, bucket: usize, filter: Filter<'q>) -> Self {
        Self {
            dict,
            bucket,
            offset: 0,
            filter,
        }
    }

    fn next(&mut self) -> Option<(usize, usize)> {
        while self.offset < self.dict.bucket_len(self.bucket) {
            let offset = self.offset;
            self.offset += 1;
            let keep = match &self.filter {
                Filter::All => true,
                Filter::Prefix(p) => self.dict.record_starts_with(self.bucket, offset, p),
                Filter::Mask(mask) => mask.get(offset).copied().unwrap_or(false),
            };
            if keep {
                return Some((self.bucket, offset));
            }
        }
        None
    }
}

/// One of the three merged streams.
#[derive(Debug)]
pub(crate) enum Source<'a, 'q> {
    /// No records.
    Exhausted,
    /// A single bucket.
    Bucket(BucketCursor<'a, 'q>),
    /// Two or more whole buckets.
    Tree(AuxTree<'a>),
}

impl Source<'_, '_> {
    fn next(&mut self) -> Option<(usize, usize)> {
        match self {
            Source::Exhausted => None,
            Source::Bucket(cursor) => cursor.next(),
            Source::Tree(tree) => tree.next_mid_bucket(),
        }
    }
}

/// Head of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Rank id, or `len + 1` once the stream is exhausted.
    pub(crate) id: usize,
    /// Bucket holding the record.
    pub(crate) bucket: usize,
    /// Offset of the record inside its bucket.
    pub(crate) offset: usize,
    source: usize,
}

/// Sort three candidates by id with a fixed three-comparator network.
fn reorder(heads: &mut [Candidate; 3]) {
    if heads[0].id > heads[1].id {
        heads.swap(0, 1);
    }
    if heads[1].id > heads[2].id {
        heads.swap(1, 2);
    }
    if heads[0].id > heads[1].id {
        heads.swap(0, 1);
    }
}

/// Merge the streams and return at most `k` candidates, smallest id first.
pub(crate) fn merge(
    dict: &BucketedDictionary,
    mut sources: [Source<'_, '_>; 3],
    k: usize,
) -> Vec<Candidate> {
    let exhausted = dict.len() + 1;
    let mut pull = |source: usize| -> Candidate {
        sources[source]
            .next()
            .and_then(|(bucket, offset)| {
                dict.id_of(bucket, offset).map(|id| Candidate {
                    id,
                    bucket,
                    offset,
                    source,
                })
            })
            .unwrap_or(Candidate {
                id: exhausted,
                bucket: 0,
                offset: 0,
                source,
            })
    };

    let mut heads = [pull(0), pull(1), pull(2)];
    reorder(&mut heads);

    let mut out = Vec::with_capacity(k.min(dict.len()));
    while out.len() < k && heads[0].id != exhausted {
        out.push(heads[0]);
        heads[0] = pull(heads[0].source);
        reorder(&mut heads);
    }
    out
}

/// The `k` smallest values of `ids`, ascending, by bounded insertion.
pub(crate) fn smallest_k(ids: impl Iterator<Item = usize>, k: usize) -> Vec<usize> {
    let mut best: Vec<usize> = Vec::with_capacity(k.saturating_add(1).min(1024));
    if k == 0 {
        return best;
    }
    for id in ids {
        if best.len() == k && best.last().is_some_and(|&worst| id >= worst) {
            continue;
        }
        let at = best.partition_point(|&x| x < id);
        best.insert(at, id);
        best.truncate(k);
    }
    best
}
