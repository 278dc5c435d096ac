//! Ranked dictionary as a string store plus a permutation.
//!
//! The strings live in a lexicographic [`StringStore`]. A [`Permutation`]
//! maps each rank position (`id - 1`) to the string's lexicographic position,
//! and its inverse maps back. Exact queries translate one position; prefix
//! and interval top-k queries translate every match and keep the `k`
//! smallest ids, so their cost grows with the number of matches.

use tracing::{debug, info};

use crate::codec::{ByteReader, ByteWriter};
use crate::config::StoreKind;
use crate::error::{Error, Result};
use crate::permutation::Permutation;
use crate::ranked::topk::smallest_k;
use crate::ranked::{lex_interval, lexicographic_order, max_length, RankedStringDictionary};
use crate::store::{StringDictionary, StringStore};

/// Lexicographic string store addressed through a rank permutation.
#[derive(Debug, Clone)]
pub struct PermutedDictionary {
    store: StringStore,
    perm: Permutation,
    max_length: usize,
}

impl PermutedDictionary {
    /// Build over `strings`; the string at index `i` gets rank id `i + 1`.
    pub fn build<S: AsRef<[u8]>>(strings: &[S], kind: StoreKind, bucket_size: usize) -> Result<Self> {
        if bucket_size == 0 {
            return Err(Error::InvalidParameter("bucket_size must be at least 1".to_string()));
        }
        let order = lexicographic_order(strings)?;
        let mut image = vec![0usize; order.len()];
        for (lex, &rank) in order.iter().enumerate() {
            image[rank] = lex;
        }
        let perm = Permutation::new(&image)?;
        debug!(elements = order.len(), step = perm.step(), "rank permutation built");

        let sorted: Vec<&[u8]> = order.iter().map(|&r| strings[r].as_ref()).collect();
        let store = StringStore::build(kind, &sorted, bucket_size);
        let dict = Self {
            store,
            perm,
            max_length: max_length(strings),
        };
        info!(
            elements = dict.len(),
            store = ?kind,
            bytes = dict.size_bytes(),
            "permuted dictionary built"
        );
        Ok(dict)
    }

    /// Kind of the wrapped string store.
    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    fn id_at(&self, lex: usize) -> Option<usize> {
        Some(self.perm.inverse(lex)? + 1)
    }

    pub(crate) fn write_payload(&self, w: &mut ByteWriter) {
        w.nested(&self.perm.to_bytes());
        self.store.write(w);
    }

    pub(crate) fn read_payload(r: &mut ByteReader<'_>, len: usize, max_length: usize) -> Result<Self> {
        let perm = Permutation::from_bytes(r.nested()?)?;
        let store = StringStore::read(r)?;
        if perm.len() != len || store.len() != len {
            return Err(Error::encoding(format!(
                "permutation holds {} and store {} strings, header says {len}",
                perm.len(),
                store.len()
            )));
        }
        debug!(elements = len, store = ?store.kind(), "permuted dictionary decoded");
        Ok(Self {
            store,
            perm,
            max_length,
        })
    }
}

impl RankedStringDictionary for PermutedDictionary {
    fn len(&self) -> usize {
        self.perm.len()
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        self.id_at(self.store.locate(key)?)
    }

    fn extract(&self, id: usize) -> Option<Vec<u8>> {
        let lex = self.perm.forward(id.checked_sub(1)?)?;
        self.store.extract(lex)
    }

    fn locate_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        self.store
            .locate_prefix(prefix)
            .filter_map(move |lex| self.id_at(lex))
    }

    fn extract_prefix<'a>(&'a self, prefix: &'a [u8]) -> impl Iterator<Item = Vec<u8>> + 'a {
        self.store
            .locate_prefix(prefix)
            .filter_map(move |lex| self.store.extract(lex))
    }

    fn locate_rank(&self, rank: usize) -> Option<usize> {
        self.id_at(rank.checked_sub(1)?)
    }

    fn extract_rank(&self, rank: usize) -> Option<Vec<u8>> {
        self.store.extract(rank.checked_sub(1)?)
    }

    fn locate_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<usize> {
        smallest_k(self.locate_prefix(prefix), k)
    }

    fn extract_ranked_prefix(&self, prefix: &[u8], k: usize) -> Vec<Vec<u8>> {
        self.locate_ranked_prefix(prefix, k)
            .into_iter()
            .filter_map(|id| self.extract(id))
            .collect()
    }

    fn locate_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<usize> {
        let range = lex_interval(beginning, len, self.len());
        smallest_k(range.filter_map(|lex| self.id_at(lex)), k)
    }

    fn extract_ranked_interval(&self, beginning: usize, len: usize, k: usize) -> Vec<Vec<u8>> {
        self.locate_ranked_interval(beginning, len, k)
            .into_iter()
            .filter_map(|id| self.extract(id))
            .collect()
    }

    fn size_bytes(&self) -> usize {
        self.store.size_bytes() + self.perm.size_bytes()
    }
}
