#![no_main]
use libfuzzer_sys::fuzz_target;
use rankdict::{BuildConfig, RankedDictionary, RankedStringDictionary, StoreKind};

fuzz_target!(|data: (Vec<Vec<u8>>, Vec<u8>, u8, u8)| {
    let (raw, prefix, bucket_raw, k_raw) = data;
    let mut seen = std::collections::HashSet::new();
    let strings: Vec<Vec<u8>> = raw.into_iter().filter(|s| seen.insert(s.clone())).collect();
    if strings.is_empty() {
        return;
    }
    let bucket_size = 1 + (bucket_raw % 32) as usize;
    let k = k_raw as usize % 16;

    let expected: Vec<usize> = (1..=strings.len())
        .filter(|&id| strings[id - 1].starts_with(&prefix))
        .take(k)
        .collect();

    for config in [
        BuildConfig::bucketed(bucket_size),
        BuildConfig::permuted(StoreKind::FrontCoded).with_bucket_size(bucket_size),
        BuildConfig::permuted(StoreKind::RePairDac).with_bucket_size(bucket_size),
    ] {
        let dict = RankedDictionary::build(&strings, &config).unwrap();
        for (i, s) in strings.iter().enumerate() {
            assert_eq!(dict.locate(s), Some(i + 1));
            assert_eq!(dict.extract(i + 1).as_ref(), Some(s));
        }
        assert_eq!(dict.locate_ranked_prefix(&prefix, k), expected);

        let restored = RankedDictionary::from_bytes(&dict.to_bytes()).unwrap();
        assert_eq!(restored.locate_ranked_prefix(&prefix, k), expected);
    }
});
