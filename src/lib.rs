//! # Ranked String Dictionaries
//!
//! *Compressed string sets that answer "which k best-ranked strings start with
//! this prefix?" without decompressing them.*
//!
//! ## Intuition First
//!
//! Picture an autocomplete box over a few million product names. Every name
//! has a popularity rank, and typing `ban` should show the five most popular
//! names starting with `ban`. A sorted, compressed list finds the matching
//! *range* quickly, but the range is sorted by spelling, not popularity: the
//! best-ranked matches could be anywhere in it.
//!
//! A ranked dictionary keeps both orders at once. Strings are identified by
//! their rank id (1 = most important), stored compactly, and the structures
//! in between let a query walk matches in rank order and stop after `k`.
//!
//! ## The Problem
//!
//! - **Sorted array + permutation**: exact lookups are cheap, but a top-k
//!   prefix query must translate *every* match before picking the best `k`.
//! - **Rank-ordered array**: top-k is trivial, but finding a string requires
//!   a full scan.
//!
//! The bucketed layout sits in between: buckets of lexicographically adjacent
//! strings, each stored internally in rank order. A binary search over bucket
//! headers finds the matching buckets, and a merge over bucket streams yields
//! ids smallest first.
//!
//! ## Historical Context
//!
//! ```text
//! 1989  Jacobson     Succinct rank/select
//! 2000  Larsson      RePair: offline grammar compression by pair replacement
//! 2003  Grossi       Wavelet trees over arbitrary alphabets
//! 2003  Munro        Succinct permutations with shortcut pointers
//! 2013  Brisaboa     Directly addressable codes
//! 2015  Martinez-Prieto  Practical compressed string dictionaries
//! ```
//!
//! ## Layouts
//!
//! - **Permuted**: a lexicographic [`StringStore`] (front coding or RePair +
//!   DAC) plus a [`Permutation`]. `locate` and `extract` are one store query
//!   and one permutation step. Ranked prefix queries cost time linear in the
//!   number of matches.
//! - **Bucketed**: a [`WaveletTree`] maps rank ids to buckets, a packed array
//!   stores each bucket's header offset, and all strings are RePair + DAC
//!   records. Ranked queries merge the first bucket, the last bucket and the
//!   middle buckets, the latter through a small per-query tree over the
//!   wavelet tree levels, and stop after `k` results.
//!
//! ## Usage
//!
//! ```
//! use rankdict::{BuildConfig, RankedDictionary, RankedStringDictionary};
//!
//! let names = ["apple", "banana", "band", "bandana", "cat"];
//! let dict = RankedDictionary::build(&names, &BuildConfig::bucketed(2))?;
//!
//! assert_eq!(dict.locate(b"band"), Some(3));
//! assert_eq!(dict.extract(2).as_deref(), Some(&b"banana"[..]));
//! assert_eq!(dict.locate_ranked_prefix(b"ban", 2), vec![2, 3]);
//!
//! let restored = RankedDictionary::from_bytes(&dict.to_bytes())?;
//! assert_eq!(restored.locate(b"cat"), Some(5));
//! # Ok::<(), rankdict::Error>(())
//! ```
//!
//! ## What Could Go Wrong
//!
//! 1. **Static**: every structure is built once. Adding a string means
//!    rebuilding the dictionary.
//! 2. **Bucket size**: larger buckets compress better but every boundary
//!    bucket is scanned linearly, and lexicographic rank queries sort a whole
//!    bucket.
//! 3. **Substrings**: neither layout indexes substrings; those queries return
//!    [`Error::Unsupported`].
//!
//! ## References
//!
//! - Larsson, N. J., & Moffat, A. (2000). "Off-line dictionary-based compression."
//! - Munro, J. I., Raman, R., Raman, V., & Rao, S. S. (2003). "Succinct representations of permutations."
//! - Brisaboa, N. R., Ladra, S., & Navarro, G. (2013). "DACs: Bringing direct access to variable-length codes."
//! - Martinez-Prieto, M. A., et al. (2016). "Practical compressed string dictionaries."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitvec;
mod codec;
pub mod config;
pub mod dac;
pub mod elias_fano;
pub mod error;
pub mod int_vector;
pub mod permutation;
pub mod ranked;
pub mod records;
pub mod repair;
pub mod store;
pub mod wavelet;

pub use bitvec::BitVector;
pub use config::{BuildConfig, Layout, StoreKind};
pub use elias_fano::EliasFano;
pub use error::{Error, Result};
pub use permutation::Permutation;
pub use ranked::{
    strings_from_nul_delimited, BucketedDictionary, PermutedDictionary, RankedDictionary,
    RankedStringDictionary,
};
pub use store::{StringDictionary, StringStore};
pub use wavelet::WaveletTree;
