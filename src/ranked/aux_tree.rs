//! Auxiliary tree for walking a range of buckets in rank order.
//!
//! The buckets wavelet tree maps rank positions to bucket numbers. Every
//! wavelet node at height `h` covers the buckets sharing the bit prefix
//! `b >> h`, and its bit vector is ordered by rank position. For a bucket
//! range `[first, last]` the tree built here mirrors the part of the wavelet
//! tree covering that range: leaves are buckets, and internal nodes exist at
//! every height up to the lowest common ancestor of `first` and `last`.
//!
//! Each node caches, per child, the smallest not yet emitted position of the
//! child's elements mapped into the node's own bit vector (one
//! [`WaveletTree::select_in_level`] step). Positions in a node are ordered
//! like rank ids, so descending towards the smaller cached position always
//! reaches the bucket holding the next smallest rank id. After a record is
//! emitted only the nodes on its leaf-to-root path are refreshed.
//!
//! Nodes live in one arena and link to each other by index; the tree belongs
//! to a single query.

use crate::wavelet::WaveletTree;

#[derive(Debug, Clone)]
struct AuxNode {
    parent: Option<usize>,
    children: [Option<usize>; 2],
    /// 1-based position in this node of each child's next element, 0 if none.
    next: [usize; 2],
    /// 1-based position of this node's next element, 0 once exhausted. For a
    /// leaf this is the within-bucket offset plus one.
    ptr: usize,
    prefix: usize,
    level: usize,
}

/// Rank-ordered walk over every record of the full buckets `first..=last`.
#[derive(Debug)]
pub(crate) struct AuxTree<'a> {
    buckets: &'a WaveletTree,
    bucket_len: usize,
    nodes: Vec<AuxNode>,
    root: usize,
}

impl<'a> AuxTree<'a> {
    /// Build the tree over buckets `first..=last`, each holding `bucket_len`
    /// records.
    pub(crate) fn new(buckets: &'a WaveletTree, first: usize, last: usize, bucket_len: usize) -> Self {
        let nodes = (first..=last.max(first))
            .map(|b| AuxNode {
                parent: None,
                children: [None; 2],
                next: [0; 2],
                ptr: usize::from(bucket_len > 0),
                prefix: b,
                level: 0,
            })
            .collect::<Vec<_>>();
        let mut tree = Self {
            buckets,
            bucket_len,
            root: 0,
            nodes,
        };

        let mut current: Vec<usize> = (0..tree.nodes.len()).collect();
        let mut level = 0;
        while current.len() > 1 {
            let mut parents: Vec<usize> = Vec::new();
            for &child in &current {
                let prefix = tree.nodes[child].prefix >> 1;
                let parent = match parents.last() {
                    Some(&p) if tree.nodes[p].prefix == prefix => p,
                    _ => {
                        tree.nodes.push(AuxNode {
                            parent: None,
                            children: [None; 2],
                            next: [0; 2],
                            ptr: 0,
                            prefix,
                            level: level + 1,
                        });
                        parents.push(tree.nodes.len() - 1);
                        tree.nodes.len() - 1
                    }
                };
                let side = tree.nodes[child].prefix & 1;
                tree.nodes[parent].children[side] = Some(child);
                tree.nodes[child].parent = Some(parent);
            }
            for &p in &parents {
                tree.refresh(p);
            }
            current = parents;
            level += 1;
        }
        tree.root = current.first().copied().unwrap_or(0);
        tree
    }

    /// Position of `child`'s next element inside its parent, 1-based.
    fn lift(&self, child: usize) -> usize {
        let node = &self.nodes[child];
        if node.ptr == 0 {
            return 0;
        }
        let symbol = (node.prefix << node.level) as u32;
        self.buckets
            .select_in_level(symbol, node.ptr - 1, node.level + 1)
            .map_or(0, |pos| pos + 1)
    }

    fn refresh(&mut self, p: usize) {
        let next = self.nodes[p].children.map(|c| c.map_or(0, |c| self.lift(c)));
        let ptr = next.iter().copied().filter(|&x| x != 0).min().unwrap_or(0);
        let node = &mut self.nodes[p];
        node.next = next;
        node.ptr = ptr;
    }

    /// Emit `(bucket, offset)` of the record with the next smallest rank id.
    pub(crate) fn next_mid_bucket(&mut self) -> Option<(usize, usize)> {
        let mut node = self.root;
        if self.nodes.get(node)?.ptr == 0 {
            return None;
        }
        while self.nodes[node].level > 0 {
            let n = &self.nodes[node];
            let side = match n.next {
                [0, _] => 1,
                [_, 0] => 0,
                [l, r] => usize::from(r < l),
            };
            node = n.children[side]?;
        }

        let leaf = &mut self.nodes[node];
        let (bucket, offset) = (leaf.prefix, leaf.ptr - 1);
        leaf.ptr = if offset + 1 < self.bucket_len { offset + 2 } else { 0 };

        let mut up = self.nodes[node].parent;
        while let Some(p) = up {
            self.refresh(p);
            up = self.nodes[p].parent;
        }
        Some((bucket, offset))
    }
}
