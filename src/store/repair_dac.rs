//! Lexicographic RePair + DAC string store.
//!
//! The sorted strings are kept in order in a [`RecordStore`]; every query is a
//! binary search whose probes decode only as many bytes as the comparison
//! needs.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::Result;
use crate::records::RecordStore;
use crate::store::{partition_point, StringDictionary};

/// Grammar-compressed sorted string set.
#[derive(Debug, Clone)]
pub struct RePairDacStore {
    records: RecordStore,
}

impl RePairDacStore {
    /// Compress strictly increasing `sorted` keys.
    pub fn new<K: AsRef<[u8]>>(sorted: &[K]) -> Self {
        Self {
            records: RecordStore::new(sorted),
        }
    }

    /// Serialize as the underlying record store.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.records.to_bytes()
    }

    /// Deserialize from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            records: RecordStore::from_bytes(bytes)?,
        })
    }
}

impl StringDictionary for RePairDacStore {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        let pos = partition_point(self.len(), |i| {
            self.records.compare(i, key) == Ordering::Less
        });
        (pos < self.len() && self.records.compare(pos, key) == Ordering::Equal).then_some(pos)
    }

    fn extract(&self, pos: usize) -> Option<Vec<u8>> {
        self.records.get(pos)
    }

    fn locate_prefix(&self, prefix: &[u8]) -> Range<usize> {
        let lower = partition_point(self.len(), |i| {
            self.records.compare_prefix(i, prefix) == Ordering::Less
        });
        let upper = partition_point(self.len(), |i| {
            self.records.compare_prefix(i, prefix) != Ordering::Greater
        });
        lower..upper.max(lower)
    }

    fn size_bytes(&self) -> usize {
        self.records.size_bytes()
    }
}
