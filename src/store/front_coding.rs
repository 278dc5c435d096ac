//! Plain front coding (PFC).
//!
//! Sorted strings are cut into buckets of `bucket_size`. The first string of
//! each bucket (its header) is stored verbatim; every other string stores the
//! length of the prefix it shares with its predecessor and the remaining
//! suffix. Bucket start offsets live in an [`EliasFano`] sequence, so locating
//! a string is a binary search over headers plus one bucket decode.
//!
//! Layout of one bucket:
//!
//! ```text
//! vbyte(len) header | vbyte(lcp) vbyte(len) suffix | ...
//! ```

use std::cmp::Ordering;
use std::ops::Range;

use crate::codec::{read_vbyte, write_vbyte, ByteReader, ByteWriter};
use crate::elias_fano::EliasFano;
use crate::error::{Error, Result};
use crate::store::{partition_point, truncated, StringDictionary};

const MAGIC: &[u8; 8] = b"RKPFCS01";

/// Front-coded string set.
#[derive(Debug, Clone)]
pub struct FrontCoded {
    serialized: Vec<u8>,
    pointers: EliasFano,
    len: usize,
    bucket_size: usize,
}

impl FrontCoded {
    /// Encode strictly increasing `sorted` keys.
    pub fn new<K: AsRef<[u8]>>(sorted: &[K], bucket_size: usize) -> Self {
        let bucket_size = bucket_size.max(1);
        let mut serialized = Vec::new();
        let mut pointers = Vec::with_capacity(sorted.len().div_ceil(bucket_size));
        let mut last: &[u8] = &[];

        for (i, key) in sorted.iter().enumerate() {
            let key = key.as_ref();
            if i % bucket_size == 0 {
                pointers.push(serialized.len() as u64);
                write_vbyte(&mut serialized, key.len());
                serialized.extend_from_slice(key);
            } else {
                let lcp = common_prefix(last, key);
                write_vbyte(&mut serialized, lcp);
                write_vbyte(&mut serialized, key.len() - lcp);
                serialized.extend_from_slice(&key[lcp..]);
            }
            last = key;
        }

        let universe = serialized.len() as u64;
        Self {
            pointers: EliasFano::new(&pointers, universe),
            serialized,
            len: sorted.len(),
            bucket_size,
        }
    }

    /// Strings per bucket.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.pointers.len()
    }

    fn bucket_len(&self, bi: usize) -> usize {
        self.bucket_size.min(self.len.saturating_sub(bi * self.bucket_size))
    }

    fn header(&self, bi: usize) -> Option<&[u8]> {
        let mut pos = self.pointers.get(bi).ok()? as usize;
        let len = read_vbyte(&self.serialized, &mut pos)?;
        self.serialized.get(pos..pos.checked_add(len)?)
    }

    /// Decode the entry at `*pos` into `cur`, which holds its predecessor.
    fn decode_entry(&self, first: bool, pos: &mut usize, cur: &mut Vec<u8>) -> Option<()> {
        let lcp = if first {
            0
        } else {
            read_vbyte(&self.serialized, pos)?
        };
        if lcp > cur.len() {
            return None;
        }
        let len = read_vbyte(&self.serialized, pos)?;
        let suffix = self.serialized.get(*pos..pos.checked_add(len)?)?;
        *pos += len;
        cur.truncate(lcp);
        cur.extend_from_slice(suffix);
        Some(())
    }

    /// Decode bucket `bi` in order, calling `visit(offset, string)` until it
    /// returns false.
    fn scan_bucket(&self, bi: usize, mut visit: impl FnMut(usize, &[u8]) -> bool) {
        let Ok(start) = self.pointers.get(bi) else {
            return;
        };
        let mut pos = start as usize;
        let mut cur = Vec::new();
        for off in 0..self.bucket_len(bi) {
            if self.decode_entry(off == 0, &mut pos, &mut cur).is_none() || !visit(off, &cur) {
                return;
            }
        }
    }

    /// Number of strings satisfying `pred`, which must hold on a prefix of
    /// the sorted order.
    fn partition(&self, mut pred: impl FnMut(&[u8]) -> bool) -> usize {
        let b = partition_point(self.num_buckets(), |bi| {
            self.header(bi).is_some_and(|h| pred(h))
        });
        if b == 0 {
            return 0;
        }
        let bi = b - 1;
        let mut count = 0;
        self.scan_bucket(bi, |_, s| {
            let inside = pred(s);
            count += usize::from(inside);
            inside
        });
        bi * self.bucket_size + count
    }

    /// Serialize: magic `RKPFCS01`, len u64, bucket_size u32, encoded buckets
    /// (nested), bucket offsets (nested).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.usize(self.len);
        w.u32(self.bucket_size as u32);
        w.nested(&self.serialized);
        w.nested(&self.pointers.to_bytes());
        w.finish()
    }

    /// Deserialize and decode every bucket once to check it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "FrontCoded")?;
        let len = r.usize()?;
        let bucket_size = r.u32()? as usize;
        let serialized = r.nested()?.to_vec();
        let pointers = EliasFano::from_bytes(r.nested()?)?;
        r.finish("FrontCoded")?;
        if bucket_size == 0 {
            return Err(Error::encoding("front coding bucket size is 0"));
        }
        let store = Self {
            serialized,
            pointers,
            len,
            bucket_size,
        };
        store.validate()?;
        Ok(store)
    }

    fn validate(&self) -> Result<()> {
        let nb = self.len.div_ceil(self.bucket_size);
        if self.pointers.len() != nb {
            return Err(Error::encoding(format!(
                "front coding has {} bucket offsets for {nb} buckets",
                self.pointers.len()
            )));
        }
        let mut prev: Option<Vec<u8>> = None;
        for bi in 0..nb {
            let mut pos = self.pointers.get(bi)? as usize;
            let end = if bi + 1 < nb {
                self.pointers.get(bi + 1)? as usize
            } else {
                self.serialized.len()
            };
            let mut cur = Vec::new();
            for off in 0..self.bucket_len(bi) {
                self.decode_entry(off == 0, &mut pos, &mut cur)
                    .ok_or_else(|| Error::encoding(format!("corrupt entry in bucket {bi}")))?;
                if prev.as_deref().is_some_and(|p| p >= cur.as_slice()) {
                    return Err(Error::encoding("front-coded strings are not strictly increasing"));
                }
                prev = Some(cur.clone());
            }
            if pos != end {
                return Err(Error::encoding(format!("bucket {bi} does not end at the next offset")));
            }
        }
        Ok(())
    }
}

impl StringDictionary for FrontCoded {
    fn len(&self) -> usize {
        self.len
    }

    fn locate(&self, key: &[u8]) -> Option<usize> {
        let b = partition_point(self.num_buckets(), |bi| {
            self.header(bi).is_some_and(|h| h <= key)
        });
        let bi = b.checked_sub(1)?;
        let mut found = None;
        self.scan_bucket(bi, |off, s| match s.cmp(key) {
            Ordering::Less => true,
            Ordering::Equal => {
                found = Some(bi * self.bucket_size + off);
                false
            }
            Ordering::Greater => false,
        });
        found
    }

    fn extract(&self, pos: usize) -> Option<Vec<u8>> {
        if pos >= self.len {
            return None;
        }
        let (bi, target) = (pos / self.bucket_size, pos % self.bucket_size);
        let mut out = None;
        self.scan_bucket(bi, |off, s| {
            if off == target {
                out = Some(s.to_vec());
                return false;
            }
            true
        });
        out
    }

    fn locate_prefix(&self, prefix: &[u8]) -> Range<usize> {
        let lower = self.partition(|s| s < prefix);
        let upper = self.partition(|s| truncated(s, prefix) <= prefix);
        lower..upper.max(lower)
    }

    fn size_bytes(&self) -> usize {
        self.serialized.capacity() + self.pointers.size_bytes()
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
