//! Wavelet Tree for arbitrary alphabets.
//!
//! Generalizes rank and select operations from bit vectors to
//! sequences over larger alphabets $\Sigma$.
//!
//! # Theory
//!
//! A Wavelet Tree for a string $S$ of length $n$ over alphabet $\Sigma$:
//! - Root node partitions $\Sigma$ into two halves $\Sigma_L, \Sigma_R$.
//! - A bit vector at the root marks if $S[i] \in \Sigma_R$.
//! - Left child is Wavelet Tree for $S$ restricted to $\Sigma_L$.
//! - Right child is Wavelet Tree for $S$ restricted to $\Sigma_R$.
//!
//! Total space: $n \log |\Sigma| + o(n \log |\Sigma|)$ bits.
//! Queries `access`, `rank`, `select` take $O(\log |\Sigma|)$ time.
//!
//! # Bit alignment
//!
//! The alphabet is rounded up to a power of two, so the node at height $h$
//! above the leaves that holds symbol $s$ is exactly the node for the bit
//! prefix $s \gg h$. [`WaveletTree::select_in_level`] exposes one upward step
//! of `select`, which lets callers walk a range of symbols level by level.
//! Subtrees with no symbols are pruned to an empty leaf.

use crate::bitvec::BitVector;
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

const MAGIC: &[u8; 8] = b"RKWAVT01";

/// Wavelet Tree node.
#[derive(Debug, Clone)]
pub enum WaveletNode {
    /// Internal node with a bit vector and two children.
    Internal {
        /// Bit vector marking right-half symbols.
        bv: BitVector,
        /// Left child ($\Sigma_L$).
        left: Box<WaveletNode>,
        /// Right child ($\Sigma_R$).
        right: Box<WaveletNode>,
    },
    /// Leaf node representing a single symbol (or an empty subtree).
    Leaf {
        /// The symbol value (the lowest symbol of the subtree when empty).
        symbol: u32,
    },
}

/// Wavelet Tree structure.
#[derive(Debug, Clone)]
pub struct WaveletTree {
    root: WaveletNode,
    len: usize,
    sigma: u32,
    height: usize,
}

fn span_of(sigma: u32) -> u64 {
    (sigma.max(1) as u64).next_power_of_two()
}

impl WaveletTree {
    /// Create a new Wavelet Tree from a sequence of symbols, all `< sigma`.
    pub fn new(data: &[u32], sigma: u32) -> Self {
        let span = span_of(sigma);
        let root = Self::build(data, 0, span);
        Self {
            root,
            len: data.len(),
            sigma,
            height: span.trailing_zeros() as usize,
        }
    }

    fn build(data: &[u32], min: u64, max: u64) -> WaveletNode {
        if min + 1 >= max || data.is_empty() {
            return WaveletNode::Leaf { symbol: min as u32 };
        }

        let mid = min + (max - min) / 2;
        let mut bits = vec![0u64; data.len().div_ceil(64)];
        let mut left_data = Vec::new();
        let mut right_data = Vec::new();

        for (i, &v) in data.iter().enumerate() {
            if v as u64 >= mid {
                bits[i / 64] |= 1 << (i % 64);
                right_data.push(v);
            } else {
                left_data.push(v);
            }
        }

        let bv = BitVector::new(&bits, data.len());
        let left = Box::new(Self::build(&left_data, min, mid));
        let right = Box::new(Self::build(&right_data, mid, max));

        WaveletNode::Internal { bv, left, right }
    }

    /// Return the length of the sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the sequence has length 0.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alphabet size the tree was built for.
    pub fn sigma(&self) -> u32 {
        self.sigma
    }

    /// Number of bit levels between the root and the leaves.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the symbol at index `i`.
    pub fn access(&self, i: usize) -> u32 {
        self.access_rank(i).0
    }

    /// Return the symbol at index `i` together with the number of earlier
    /// occurrences of that symbol (its rank within its own symbol class).
    pub fn access_rank(&self, mut i: usize) -> (u32, usize) {
        let mut curr = &self.root;
        while let WaveletNode::Internal { bv, left, right } = curr {
            if bv.get(i) {
                i = bv.rank1(i);
                curr = right;
            } else {
                i = bv.rank0(i);
                curr = left;
            }
        }
        match curr {
            WaveletNode::Leaf { symbol } => (*symbol, i),
            WaveletNode::Internal { .. } => (0, i),
        }
    }

    /// Return the number of occurrences of `symbol` in the range [0, i).
    pub fn rank(&self, symbol: u32, mut i: usize) -> usize {
        let mut curr = &self.root;
        let mut min = 0u64;
        let mut max = span_of(self.sigma);
        let symbol = symbol as u64;

        while let WaveletNode::Internal { bv, left, right } = curr {
            let mid = min + (max - min) / 2;
            if symbol >= mid {
                i = bv.rank1(i);
                curr = right;
                min = mid;
            } else {
                i = bv.rank0(i);
                curr = left;
                max = mid;
            }
        }
        match curr {
            WaveletNode::Leaf { symbol: leaf } if *leaf as u64 == symbol => i,
            _ => 0,
        }
    }

    /// Return the total number of occurrences of `symbol`.
    pub fn count(&self, symbol: u32) -> usize {
        self.rank(symbol, self.len)
    }

    /// Return the position of the $k$-th occurrence of `symbol` (0-indexed).
    pub fn select(&self, symbol: u32, k: usize) -> Option<usize> {
        if let WaveletNode::Leaf { symbol: only } = &self.root {
            return (*only == symbol && k < self.len).then_some(k);
        }
        Self::select_recursive(&self.root, 0, span_of(self.sigma), symbol as u64, k)
    }

    fn select_recursive(
        node: &WaveletNode,
        min: u64,
        max: u64,
        symbol: u64,
        k: usize,
    ) -> Option<usize> {
        match node {
            WaveletNode::Leaf { symbol: leaf_sym } => {
                if *leaf_sym as u64 == symbol && min + 1 >= max {
                    Some(k)
                } else {
                    None
                }
            }
            WaveletNode::Internal { bv, left, right } => {
                let mid = min + (max - min) / 2;
                if symbol >= mid {
                    let pos = Self::select_recursive(right, mid, max, symbol, k)?;
                    bv.select1(pos)
                } else {
                    let pos = Self::select_recursive(left, min, mid, symbol, k)?;
                    bv.select0(pos)
                }
            }
        }
    }

    /// One upward step of `select`.
    ///
    /// `k` is a 0-indexed position inside the node at height `level - 1`
    /// (leaves are height 0) on the root-to-leaf path of `symbol`. Returns the
    /// position of that same element inside the parent node at height
    /// `level`, or `None` when the position or level does not exist.
    pub fn select_in_level(&self, symbol: u32, k: usize, level: usize) -> Option<usize> {
        if level == 0 || level > self.height {
            return None;
        }
        let depth = self.height - level;
        let symbol = symbol as u64;
        let mut curr = &self.root;
        let mut min = 0u64;
        let mut max = span_of(self.sigma);

        for _ in 0..depth {
            let WaveletNode::Internal { left, right, .. } = curr else {
                return None;
            };
            let mid = min + (max - min) / 2;
            if symbol >= mid {
                curr = right;
                min = mid;
            } else {
                curr = left;
                max = mid;
            }
        }

        let WaveletNode::Internal { bv, .. } = curr else {
            return None;
        };
        let mid = min + (max - min) / 2;
        if symbol >= mid {
            bv.select1(k)
        } else {
            bv.select0(k)
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        fn node_bytes(node: &WaveletNode) -> usize {
            match node {
                WaveletNode::Leaf { .. } => std::mem::size_of::<WaveletNode>(),
                WaveletNode::Internal { bv, left, right } => {
                    std::mem::size_of::<WaveletNode>()
                        + bv.size_bytes()
                        + node_bytes(left)
                        + node_bytes(right)
                }
            }
        }
        node_bytes(&self.root)
    }

    /// Serialize to a stable binary encoding (little-endian).
    ///
    /// Format: magic `RKWAVT01`, len u64, sigma u32, then the nodes in
    /// preorder: tag `0` + symbol u32 for a leaf, tag `1` + nested bit vector
    /// followed by both children for an internal node.
    pub fn to_bytes(&self) -> Vec<u8> {
        fn write_node(w: &mut ByteWriter, node: &WaveletNode) {
            match node {
                WaveletNode::Leaf { symbol } => {
                    w.u8(0);
                    w.u32(*symbol);
                }
                WaveletNode::Internal { bv, left, right } => {
                    w.u8(1);
                    w.nested(&bv.to_bytes());
                    write_node(w, left);
                    write_node(w, right);
                }
            }
        }

        let mut w = ByteWriter::with_magic(MAGIC);
        w.usize(self.len);
        w.u32(self.sigma);
        write_node(&mut w, &self.root);
        w.finish()
    }

    /// Deserialize from `to_bytes()` output, checking that every node's bit
    /// vector agrees with its parent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "WaveletTree")?;
        let len = r.usize()?;
        let sigma = r.u32()?;
        let span = span_of(sigma);
        let root = Self::read_node(&mut r, 0, span, len)?;
        r.finish("WaveletTree")?;
        Ok(Self {
            root,
            len,
            sigma,
            height: span.trailing_zeros() as usize,
        })
    }

    fn read_node(r: &mut ByteReader<'_>, min: u64, max: u64, expected: usize) -> Result<WaveletNode> {
        match r.u8()? {
            0 => {
                let symbol = r.u32()?;
                if symbol as u64 != min {
                    return Err(Error::encoding("wavelet leaf symbol outside its subtree"));
                }
                if expected > 0 && min + 1 < max {
                    return Err(Error::encoding("wavelet tree pruned a non-empty subtree"));
                }
                Ok(WaveletNode::Leaf { symbol })
            }
            1 => {
                if min + 1 >= max {
                    return Err(Error::encoding("wavelet tree deeper than its alphabet"));
                }
                let bv = BitVector::from_bytes(r.nested()?)?;
                if bv.len() != expected {
                    return Err(Error::encoding(format!(
                        "wavelet node holds {} bits, expected {expected}",
                        bv.len()
                    )));
                }
                let mid = min + (max - min) / 2;
                let ones = bv.count_ones();
                let left = Box::new(Self::read_node(r, min, mid, expected - ones)?);
                let right = Box::new(Self::read_node(r, mid, max, ones)?);
                Ok(WaveletNode::Internal { bv, left, right })
            }
            tag => Err(Error::encoding(format!("unknown wavelet node tag {tag}"))),
        }
    }
}
