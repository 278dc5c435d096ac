use proptest::prelude::*;
use rankdict::bitvec::BitVector;

proptest! {
    #[test]
    fn test_bitvector_rank_property(
        bits in prop::collection::vec(any::<u64>(), 1..100),
        len_mult in 0..64usize,
    ) {
        let len = (bits.len() * 64).saturating_sub(len_mult);
        let bv = BitVector::new(&bits, len);
        let bit = |i: usize| (bits[i / 64] >> (i % 64)) & 1 == 1;

        let expected_total = (0..len).filter(|&i| bit(i)).count();
        prop_assert_eq!(bv.rank1(len), expected_total);

        for i in (0..len).step_by(13) {
            let expected_rank = (0..i).filter(|&j| bit(j)).count();
            prop_assert_eq!(bv.rank1(i), expected_rank);
            prop_assert_eq!(bv.rank0(i), i - expected_rank);
        }

        let mut count = 0;
        let mut count0 = 0;
        for i in 0..len {
            if bit(i) {
                prop_assert_eq!(bv.select1(count), Some(i));
                count += 1;
            } else {
                prop_assert_eq!(bv.select0(count0), Some(i));
                count0 += 1;
            }
        }
        prop_assert_eq!(bv.select1(count), None);
        prop_assert_eq!(bv.select0(count0), None);
    }
}

use rankdict::dac::Dac;
use rankdict::elias_fano::EliasFano;
use rankdict::permutation::Permutation;
use rankdict::repair::induce;
use rankdict::wavelet::WaveletTree;

proptest! {
    #[test]
    fn test_elias_fano_property(
        mut values in prop::collection::vec(0..10000u64, 1..100),
    ) {
        values.sort();
        values.dedup();

        let universe_size = values.last().copied().unwrap() + 100;
        let ef = EliasFano::new(&values, universe_size);

        prop_assert_eq!(ef.len(), values.len());
        for (i, &expected) in values.iter().enumerate() {
            prop_assert_eq!(ef.get(i).unwrap(), expected);
        }
    }

    #[test]
    fn test_wavelet_tree_property(
        input in prop::collection::vec(0..100u32, 1..100),
    ) {
        let sigma = input.iter().max().copied().unwrap_or(0) + 1;
        let wt = WaveletTree::new(&input, sigma);

        prop_assert_eq!(wt.len(), input.len());

        for (i, &expected) in input.iter().enumerate() {
            prop_assert_eq!(wt.access(i), expected);
            let seen = input[..i].iter().filter(|&&v| v == expected).count();
            prop_assert_eq!(wt.access_rank(i), (expected, seen));
            prop_assert_eq!(wt.select(expected, seen), Some(i));
        }

        for symbol in 0..sigma {
            let mut expected_rank = 0;
            for (i, &v) in input.iter().enumerate() {
                prop_assert_eq!(wt.rank(symbol, i), expected_rank);
                if v == symbol {
                    expected_rank += 1;
                }
            }
            prop_assert_eq!(wt.rank(symbol, input.len()), expected_rank);
            prop_assert_eq!(wt.select(symbol, expected_rank), None);
        }

        let restored = WaveletTree::from_bytes(&wt.to_bytes()).unwrap();
        for i in 0..input.len() {
            prop_assert_eq!(restored.access(i), input[i]);
        }
    }

    #[test]
    fn test_wavelet_select_in_level_climbs_to_root(
        input in prop::collection::vec(0..40u32, 1..120),
    ) {
        let sigma = input.iter().max().copied().unwrap_or(0) + 1;
        let wt = WaveletTree::new(&input, sigma);
        if wt.height() == 0 {
            return Ok(());
        }
        for (i, &symbol) in input.iter().enumerate() {
            // Start from the symbol's leaf-level occurrence index.
            let mut pos = input[..i].iter().filter(|&&v| v == symbol).count();
            for level in 1..=wt.height() {
                pos = wt.select_in_level(symbol, pos, level).unwrap();
            }
            prop_assert_eq!(pos, i);
        }
    }

    #[test]
    fn test_permutation_inverse_property(
        keys in prop::collection::vec(any::<u32>(), 1..300),
        step in 2..12usize,
    ) {
        // Sorting random keys yields a random permutation.
        let mut perm: Vec<usize> = (0..keys.len()).collect();
        perm.sort_by_key(|&i| (keys[i], i));
        let p = Permutation::with_step(&perm, step).unwrap();

        for (i, &j) in perm.iter().enumerate() {
            prop_assert_eq!(p.forward(i), Some(j));
            prop_assert_eq!(p.inverse(j), Some(i));
        }
        prop_assert_eq!(p.forward(perm.len()), None);

        let restored = Permutation::from_bytes(&p.to_bytes()).unwrap();
        for j in 0..perm.len() {
            prop_assert_eq!(restored.inverse(j), p.inverse(j));
        }
    }

    #[test]
    fn test_dac_sequences_property(
        seqs in prop::collection::vec(prop::collection::vec(0..100_000u64, 0..20), 1..60),
    ) {
        let dac = Dac::new(&seqs);
        prop_assert_eq!(dac.len(), seqs.len());
        for (i, seq) in seqs.iter().enumerate() {
            prop_assert_eq!(&dac.get(i).unwrap().collect::<Vec<_>>(), seq);
        }
        prop_assert!(dac.get(seqs.len()).is_none());
    }

    #[test]
    fn test_repair_expands_to_input(
        records in prop::collection::vec(prop::collection::vec(0..4u8, 0..40), 1..40),
    ) {
        let (grammar, seqs) = induce(&records);
        prop_assert_eq!(seqs.len(), records.len());
        for (record, seq) in records.iter().zip(&seqs) {
            prop_assert!(seq.len() <= record.len());
            let expanded: Vec<u8> = grammar.expand(seq.iter().copied()).collect();
            prop_assert_eq!(&expanded, record);
        }
    }
}

use rankdict::{BuildConfig, RankedDictionary, RankedStringDictionary, StoreKind};

/// Distinct strings over a small alphabet so prefixes are shared often.
fn distinct_strings() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::btree_set(prop::collection::vec(b'a'..=b'd', 0..7), 1..80)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

fn configs(bucket_size: usize) -> Vec<BuildConfig> {
    vec![
        BuildConfig::bucketed(bucket_size),
        BuildConfig::permuted(StoreKind::FrontCoded).with_bucket_size(bucket_size),
        BuildConfig::permuted(StoreKind::RePairDac).with_bucket_size(bucket_size),
    ]
}

fn brute_ranked_prefix(strings: &[Vec<u8>], prefix: &[u8], k: usize) -> Vec<usize> {
    (1..=strings.len())
        .filter(|&id| strings[id - 1].starts_with(prefix))
        .take(k)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_dictionary_locate_extract_property(
        strings in distinct_strings(),
        bucket_size in 1..9usize,
        probe in prop::collection::vec(b'a'..=b'e', 0..7),
    ) {
        for config in configs(bucket_size) {
            let dict = RankedDictionary::build(&strings, &config).unwrap();
            prop_assert_eq!(dict.len(), strings.len());
            for (i, s) in strings.iter().enumerate() {
                prop_assert_eq!(dict.locate(s), Some(i + 1));
                prop_assert_eq!(dict.extract(i + 1), Some(s.clone()));
            }
            prop_assert_eq!(dict.extract(0), None);
            prop_assert_eq!(dict.extract(strings.len() + 1), None);

            let expected = strings.iter().position(|s| *s == probe).map(|i| i + 1);
            prop_assert_eq!(dict.locate(&probe), expected);

            // Truncations and one-byte changes of the extreme strings.
            let mut sorted: Vec<&Vec<u8>> = strings.iter().collect();
            sorted.sort();
            for edge in [sorted[0], sorted[sorted.len() - 1]] {
                for cut in 0..=edge.len() {
                    let mut keys = vec![edge[..cut].to_vec()];
                    if cut < edge.len() {
                        for byte in [0u8, b'a', b'c', b'e', 0xFF] {
                            let mut changed = edge[..=cut].to_vec();
                            changed[cut] = byte;
                            keys.push(changed);
                        }
                    }
                    for key in keys {
                        let expected = strings.iter().position(|s| *s == key).map(|i| i + 1);
                        prop_assert_eq!(dict.locate(&key), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_dictionary_ranked_prefix_property(
        strings in distinct_strings(),
        bucket_size in 1..9usize,
        prefix in prop::collection::vec(b'a'..=b'd', 0..4),
        k in 0..12usize,
    ) {
        let expected_all = brute_ranked_prefix(&strings, &prefix, usize::MAX);
        for config in configs(bucket_size) {
            let dict = RankedDictionary::build(&strings, &config).unwrap();
            let ranked = dict.locate_ranked_prefix(&prefix, k);
            prop_assert_eq!(&ranked, &brute_ranked_prefix(&strings, &prefix, k));

            let extracted = dict.extract_ranked_prefix(&prefix, k);
            let expected_strings: Vec<Vec<u8>> =
                ranked.iter().map(|&id| strings[id - 1].clone()).collect();
            prop_assert_eq!(extracted, expected_strings);

            let mut all: Vec<usize> = dict.locate_prefix(&prefix).collect();
            all.sort_unstable();
            prop_assert_eq!(&all, &expected_all);
            prop_assert_eq!(dict.extract_prefix(&prefix).count(), expected_all.len());
        }
    }

    #[test]
    fn test_dictionary_ranked_interval_property(
        strings in distinct_strings(),
        bucket_size in 1..9usize,
        beginning in 0..90usize,
        len in 0..90usize,
        k in 0..12usize,
    ) {
        let mut sorted: Vec<usize> = (1..=strings.len()).collect();
        sorted.sort_by(|&a, &b| strings[a - 1].cmp(&strings[b - 1]));
        let start = beginning.max(1) - 1;
        let end = beginning.saturating_add(len).min(strings.len() + 1).saturating_sub(1);
        let mut expected: Vec<usize> = sorted[start.min(end)..end].to_vec();
        expected.sort_unstable();
        expected.truncate(k);

        for config in configs(bucket_size) {
            let dict = RankedDictionary::build(&strings, &config).unwrap();
            prop_assert_eq!(dict.locate_ranked_interval(beginning, len, k), expected.clone());

            // The full interval with k = len yields every id in order.
            let n = strings.len();
            prop_assert_eq!(
                dict.locate_ranked_interval(1, n, n),
                (1..=n).collect::<Vec<_>>()
            );
            for (rank, &id) in sorted.iter().enumerate() {
                prop_assert_eq!(dict.locate_rank(rank + 1), Some(id));
            }
        }
    }

    #[test]
    fn test_dictionary_save_load_idempotent(
        strings in distinct_strings(),
        bucket_size in 1..9usize,
    ) {
        for config in configs(bucket_size) {
            let dict = RankedDictionary::build(&strings, &config).unwrap();
            let bytes = dict.to_bytes();
            let restored = RankedDictionary::from_bytes(&bytes).unwrap();
            prop_assert_eq!(restored.layout(), dict.layout());
            prop_assert_eq!(restored.to_bytes(), bytes);
            for id in 1..=strings.len() {
                prop_assert_eq!(restored.extract(id), dict.extract(id));
            }
        }
    }
}
