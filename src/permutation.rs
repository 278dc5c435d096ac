//! Succinct permutations with shortcut pointers.
//!
//! A permutation $\pi: [0,n) \to [0,n)$ stored as its forward image only,
//! plus a sparse set of back pointers that make the inverse cheap.
//!
//! # Theory
//!
//! Following the cycle structure of $\pi$: $\pi^{-1}(j)$ is the element just
//! before $j$ on its cycle, so walking $j, \pi(j), \pi(\pi(j)), \ldots$ until
//! the walk returns to $j$ always finds it, in time proportional to the cycle
//! length. On every cycle longer than $t$, every $t$-th element is sampled and
//! stores a pointer to the previous sample. The inverse walks forward until it
//! meets a sample, jumps back once, and walks forward again, which bounds the
//! walk by $O(t)$ steps (Munro, Raman, Raman and Rao).
//!
//! Space: $n \lceil \log_2 n \rceil$ bits for $\pi$, $n + o(n)$ bits for the
//! sample marks and $(n/t) \lceil \log_2 n \rceil$ bits for the back pointers.

use crate::bitvec::BitVector;
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;

const MAGIC: &[u8; 8] = b"RKPERM01";

/// Default shortcut spacing.
pub const DEFAULT_STEP: usize = 8;

/// A permutation with $O(1)$ forward and $O(t)$ inverse.
#[derive(Debug, Clone)]
pub struct Permutation {
    image: IntVector,
    sampled: BitVector,
    back: IntVector,
    step: usize,
}

impl Permutation {
    /// Create a permutation where `perm[i]` is the image of `i`.
    ///
    /// Returns [`Error::InvalidParameter`] if `perm` is not a bijection on
    /// `[0, perm.len())`.
    pub fn new(perm: &[usize]) -> Result<Self> {
        Self::with_step(perm, DEFAULT_STEP)
    }

    /// Same as [`Permutation::new`] with an explicit shortcut spacing.
    pub fn with_step(perm: &[usize], step: usize) -> Result<Self> {
        if step < 2 {
            return Err(Error::InvalidParameter(format!(
                "permutation step must be at least 2, got {step}"
            )));
        }
        if !is_bijection(perm.iter().copied(), perm.len()) {
            return Err(Error::InvalidParameter(
                "input is not a permutation".to_string(),
            ));
        }
        let image = IntVector::from_slice(&perm.iter().map(|&v| v as u64).collect::<Vec<_>>());
        Ok(Self::index(image, step))
    }

    /// Build the sample marks and back pointers for a validated image.
    fn index(image: IntVector, step: usize) -> Self {
        let n = image.len();
        let at = |i: usize| image.get(i).unwrap_or(0) as usize;

        let mut visited = vec![false; n];
        let mut sampled = vec![false; n];
        let mut back_of = vec![0usize; n];
        let mut cycle = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            cycle.clear();
            let mut x = start;
            while !visited[x] {
                visited[x] = true;
                cycle.push(x);
                x = at(x);
            }
            if cycle.len() <= step {
                continue;
            }
            let samples: Vec<usize> = (0..cycle.len()).step_by(step).collect();
            for (s, &pos) in samples.iter().enumerate() {
                let prev = samples[(s + samples.len() - 1) % samples.len()];
                sampled[cycle[pos]] = true;
                back_of[cycle[pos]] = cycle[prev];
            }
        }

        let back: Vec<u64> = (0..n)
            .filter(|&i| sampled[i])
            .map(|i| back_of[i] as u64)
            .collect();

        Self {
            image,
            sampled: BitVector::from_bools(sampled),
            back: IntVector::from_slice(&back),
            step,
        }
    }

    /// Returns the number of elements in the permutation.
    pub fn len(&self) -> usize {
        self.image.len()
    }

    /// Returns whether the permutation is empty.
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Shortcut spacing $t$.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Return $\pi(i)$.
    pub fn forward(&self, i: usize) -> Option<usize> {
        self.image.get(i).map(|v| v as usize)
    }

    /// Return $\pi^{-1}(j)$.
    pub fn inverse(&self, j: usize) -> Option<usize> {
        if j >= self.len() {
            return None;
        }
        let mut x = j;
        let mut shortcut_taken = false;
        loop {
            let next = self.forward(x)?;
            if next == j {
                return Some(x);
            }
            if !shortcut_taken && self.sampled.get(x) {
                shortcut_taken = true;
                x = self.back.get(self.sampled.rank1(x))? as usize;
            } else {
                x = next;
            }
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.image.size_bytes() + self.sampled.size_bytes() + self.back.size_bytes()
    }

    /// Serialize to a stable binary encoding (little-endian).
    ///
    /// Format: magic `RKPERM01`, step u32, image (nested). Sample marks and
    /// back pointers are rebuilt on load.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.u32(self.step as u32);
        w.nested(&self.image.to_bytes());
        w.finish()
    }

    /// Deserialize from `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "Permutation")?;
        let step = r.u32()? as usize;
        let image = IntVector::from_bytes(r.nested()?)?;
        r.finish("Permutation")?;
        if step < 2 {
            return Err(Error::encoding(format!("permutation step {step} too small")));
        }
        if !is_bijection(image.iter().map(|v| v as usize), image.len()) {
            return Err(Error::encoding("stored image is not a permutation"));
        }
        Ok(Self::index(image, step))
    }
}

fn is_bijection(values: impl Iterator<Item = usize>, n: usize) -> bool {
    let mut seen = vec![false; n];
    for v in values {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let perm = Permutation::new(&[]).unwrap();
        assert!(perm.is_empty());
        assert_eq!(perm.forward(0), None);
        assert_eq!(perm.inverse(0), None);
    }

    #[test]
    fn test_reverse() {
        let perm = Permutation::new(&[4, 3, 2, 1, 0]).unwrap();
        for i in 0..5 {
            assert_eq!(perm.forward(i), Some(4 - i));
            assert_eq!(perm.inverse(4 - i), Some(i));
        }
    }

    #[test]
    fn test_long_cycle_uses_shortcuts() {
        // One cycle of length 100: i -> i + 1.
        let n = 100;
        let image: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
        let perm = Permutation::with_step(&image, 4).unwrap();
        assert_eq!(perm.sampled.count_ones(), 25);
        for j in 0..n {
            assert_eq!(perm.inverse(j), Some((j + n - 1) % n));
        }
    }

    #[test]
    fn test_mixed_cycles() {
        let image = [3, 0, 5, 2, 7, 1, 4, 6, 9, 8, 10];
        let perm = Permutation::with_step(&image, 2).unwrap();
        for (i, &target) in image.iter().enumerate() {
            assert_eq!(perm.forward(i), Some(target));
            assert_eq!(perm.inverse(target), Some(i));
        }
    }

    #[test]
    fn test_rejects_non_permutation() {
        assert!(Permutation::new(&[0, 0]).is_err());
        assert!(Permutation::new(&[0, 2]).is_err());
        assert!(Permutation::with_step(&[0], 1).is_err());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let image: Vec<usize> = (0..50).map(|i| (i * 7) % 50).collect();
        let perm = Permutation::new(&image).unwrap();
        let decoded = Permutation::from_bytes(&perm.to_bytes()).unwrap();
        for j in 0..50 {
            assert_eq!(decoded.inverse(j), perm.inverse(j));
        }
    }

    #[test]
    fn test_from_bytes_rejects_duplicate_images() {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.u32(8);
        w.nested(&IntVector::from_slice(&[1, 1, 0]).to_bytes());
        assert!(Permutation::from_bytes(&w.finish()).is_err());
    }
}
