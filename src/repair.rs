//! RePair grammar compression over a set of records.
//!
//! RePair repeatedly replaces the most frequent adjacent pair of symbols with
//! a fresh nonterminal until no pair occurs twice (Larsson and Moffat). Each
//! record is compressed as its own sequence, so a rule never spans a record
//! boundary and any record can be expanded on its own.
//!
//! Symbols `0..256` are the byte terminals; rule `i` is symbol `256 + i` and
//! only references symbols below it, which keeps the grammar acyclic.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;

const MAGIC: &[u8; 8] = b"RKRPGR01";

/// Number of terminal symbols (one per byte value).
pub const TERMINALS: u64 = 256;

type Pair = (u32, u32);

/// The rule set of a RePair grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    left: IntVector,
    right: IntVector,
}

impl Grammar {
    fn from_rules(rules: &[Pair]) -> Self {
        let left: Vec<u64> = rules.iter().map(|&(l, _)| l as u64).collect();
        let right: Vec<u64> = rules.iter().map(|&(_, r)| r as u64).collect();
        Self {
            left: IntVector::from_slice(&left),
            right: IntVector::from_slice(&right),
        }
    }

    /// Number of nonterminals.
    pub fn num_rules(&self) -> usize {
        self.left.len()
    }

    /// Size of the symbol alphabet: terminals plus nonterminals.
    pub fn num_symbols(&self) -> u64 {
        TERMINALS + self.num_rules() as u64
    }

    /// Right-hand side of nonterminal `symbol`, or `None` for a terminal.
    pub fn rule(&self, symbol: u64) -> Option<(u64, u64)> {
        let r = usize::try_from(symbol.checked_sub(TERMINALS)?).ok()?;
        Some((self.left.get(r)?, self.right.get(r)?))
    }

    /// Lazily expand a symbol sequence into bytes.
    pub fn expand<I: Iterator<Item = u64>>(&self, symbols: I) -> Expand<'_, I> {
        Expand {
            grammar: self,
            symbols,
            stack: Vec::new(),
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.left.size_bytes() + self.right.size_bytes()
    }

    /// Serialize: magic `RKRPGR01`, left sides (nested), right sides (nested).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_magic(MAGIC);
        w.nested(&self.left.to_bytes());
        w.nested(&self.right.to_bytes());
        w.finish()
    }

    /// Deserialize, rejecting rules that reference themselves or later rules.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::with_magic(bytes, MAGIC, "Grammar")?;
        let left = IntVector::from_bytes(r.nested()?)?;
        let right = IntVector::from_bytes(r.nested()?)?;
        r.finish("Grammar")?;
        if left.len() != right.len() {
            return Err(Error::encoding("grammar rule sides differ in length"));
        }
        for (i, (l, rr)) in left.iter().zip(right.iter()).enumerate() {
            let limit = TERMINALS + i as u64;
            if l >= limit || rr >= limit {
                return Err(Error::encoding(format!("rule {i} references a later symbol")));
            }
        }
        Ok(Self { left, right })
    }
}

/// Byte iterator produced by [`Grammar::expand`].
#[derive(Debug, Clone)]
pub struct Expand<'a, I> {
    grammar: &'a Grammar,
    symbols: I,
    stack: Vec<u64>,
}

impl<I: Iterator<Item = u64>> Iterator for Expand<'_, I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            let symbol = match self.stack.pop() {
                Some(s) => s,
                None => self.symbols.next()?,
            };
            if symbol < TERMINALS {
                return Some(symbol as u8);
            }
            let (left, right) = self.grammar.rule(symbol)?;
            self.stack.push(right);
            self.stack.push(left);
        }
    }
}

/// Compress `records` into a grammar plus one symbol sequence per record.
pub fn induce<R: AsRef<[u8]>>(records: &[R]) -> (Grammar, Vec<Vec<u64>>) {
    let mut seqs: Vec<Vec<u32>> = records
        .iter()
        .map(|r| r.as_ref().iter().map(|&b| b as u32).collect())
        .collect();

    let mut counts: HashMap<Pair, usize> = HashMap::new();
    let mut occurrences: HashMap<Pair, Vec<usize>> = HashMap::new();
    for (r, seq) in seqs.iter().enumerate() {
        for w in seq.windows(2) {
            add_pair(&mut counts, &mut occurrences, (w[0], w[1]), r);
        }
    }

    let mut heap: BinaryHeap<(usize, Reverse<Pair>)> = counts
        .iter()
        .filter(|&(_, &c)| c >= 2)
        .map(|(&p, &c)| (c, Reverse(p)))
        .collect();

    let mut rules: Vec<Pair> = Vec::new();
    let mut touched_by = vec![usize::MAX; seqs.len()];
    let mut changed: Vec<Pair> = Vec::new();

    while let Some((count, Reverse(pair))) = heap.pop() {
        if counts.get(&pair).copied().unwrap_or(0) != count {
            continue;
        }
        let Ok(symbol) = u32::try_from(TERMINALS as usize + rules.len()) else {
            break;
        };
        let rule_id = rules.len();
        rules.push(pair);

        for r in occurrences.remove(&pair).unwrap_or_default() {
            if touched_by[r] == rule_id {
                continue;
            }
            touched_by[r] = rule_id;
            let seq = &mut seqs[r];
            if !seq.windows(2).any(|w| (w[0], w[1]) == pair) {
                continue;
            }

            changed.clear();
            for w in seq.windows(2) {
                let p = (w[0], w[1]);
                if let Some(c) = counts.get_mut(&p) {
                    *c -= 1;
                    if *c == 0 {
                        counts.remove(&p);
                    }
                }
                changed.push(p);
            }
            replace_pair(seq, pair, symbol);
            for w in seq.windows(2) {
                let p = (w[0], w[1]);
                add_pair(&mut counts, &mut occurrences, p, r);
                changed.push(p);
            }
            for p in changed.drain(..) {
                if let Some(&c) = counts.get(&p) {
                    if c >= 2 {
                        heap.push((c, Reverse(p)));
                    }
                }
            }
        }
    }

    debug!(
        records = seqs.len(),
        rules = rules.len(),
        symbols = seqs.iter().map(Vec::len).sum::<usize>(),
        "repair grammar induced"
    );

    let seqs = seqs
        .into_iter()
        .map(|s| s.into_iter().map(u64::from).collect())
        .collect();
    (Grammar::from_rules(&rules), seqs)
}

fn add_pair(
    counts: &mut HashMap<Pair, usize>,
    occurrences: &mut HashMap<Pair, Vec<usize>>,
    pair: Pair,
    record: usize,
) {
    *counts.entry(pair).or_insert(0) += 1;
    let list = occurrences.entry(pair).or_default();
    if list.last() != Some(&record) {
        list.push(record);
    }
}

/// Replace non-overlapping occurrences of `pair`, left to right.
fn replace_pair(seq: &mut Vec<u32>, pair: Pair, symbol: u32) {
    let mut out = 0;
    let mut i = 0;
    while i < seq.len() {
        if i + 1 < seq.len() && (seq[i], seq[i + 1]) == pair {
            seq[out] = symbol;
            i += 2;
        } else {
            seq[out] = seq[i];
            i += 1;
        }
        out += 1;
    }
    seq.truncate(out);
}
