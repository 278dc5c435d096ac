use rankdict::{
    strings_from_nul_delimited, BuildConfig, Error, Layout, RankedDictionary,
    RankedStringDictionary, StoreKind,
};

const FRUIT: [&str; 5] = ["apple", "banana", "band", "bandana", "cat"];

fn all_layouts() -> Vec<BuildConfig> {
    vec![
        BuildConfig::bucketed(2),
        BuildConfig::permuted(StoreKind::FrontCoded).with_bucket_size(2),
        BuildConfig::permuted(StoreKind::RePairDac).with_bucket_size(2),
    ]
}

fn bytes(strings: &[&str]) -> Vec<Vec<u8>> {
    strings.iter().map(|s| s.as_bytes().to_vec()).collect()
}

#[test]
fn test_fruit_scenario_every_layout() {
    for config in all_layouts() {
        let dict = RankedDictionary::build(&FRUIT, &config).unwrap();
        assert_eq!(dict.layout(), config.layout);
        assert_eq!(dict.len(), 5);
        assert_eq!(dict.max_length(), 8);

        assert_eq!(dict.locate(b"band"), Some(3));
        assert_eq!(dict.locate(b"ban"), None);
        assert_eq!(dict.extract(4).unwrap(), b"bandana");

        assert_eq!(
            dict.extract_ranked_prefix(b"ban", 2),
            bytes(&["banana", "band"]),
            "{config:?}"
        );
        assert_eq!(dict.locate_ranked_prefix(b"ban", 10), vec![2, 3, 4]);
        assert_eq!(dict.locate_ranked_prefix(b"", 2), vec![1, 2]);
        assert!(dict.locate_ranked_prefix(b"zebra", 3).is_empty());
        assert!(dict.locate_ranked_prefix(b"ban", 0).is_empty());

        assert_eq!(dict.locate_ranked_interval(1, 5, 3), vec![1, 2, 3]);
        assert_eq!(
            dict.extract_ranked_interval(3, 3, 3),
            bytes(&["band", "bandana", "cat"])
        );
        assert!(dict.locate_ranked_interval(6, 4, 3).is_empty());

        assert_eq!(dict.locate_rank(5), Some(5));
        assert_eq!(dict.extract_rank(1).unwrap(), b"apple");
    }
}

#[test]
fn test_rank_order_differs_from_sorted_order() {
    let strings = ["pear", "peach", "plum", "apricot", "apple", "pecan"];
    for config in all_layouts() {
        let dict = RankedDictionary::build(&strings, &config).unwrap();
        assert_eq!(dict.locate_ranked_prefix(b"pe", 5), vec![1, 2, 6]);
        assert_eq!(dict.locate_ranked_prefix(b"ap", 1), vec![4]);
        assert_eq!(
            dict.extract_ranked_prefix(b"p", 2),
            bytes(&["pear", "peach"])
        );
        // Sorted: apple apricot peach pear pecan plum.
        assert_eq!(dict.locate_ranked_interval(2, 3, 2), vec![1, 2]);
        assert_eq!(dict.locate_ranked_interval(1, 2, 5), vec![4, 5]);
        let mut all: Vec<usize> = dict.locate_prefix(b"p").collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 6]);
    }
}

#[test]
fn test_save_and_load_through_io() {
    for config in all_layouts() {
        let dict = RankedDictionary::build(&FRUIT, &config).unwrap();
        let mut buf = Vec::new();
        dict.save(&mut buf).unwrap();
        let loaded = RankedDictionary::load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.layout(), dict.layout());
        assert_eq!(loaded.max_length(), dict.max_length());
        for (i, s) in FRUIT.iter().enumerate() {
            assert_eq!(loaded.locate(s.as_bytes()), Some(i + 1));
        }
        assert_eq!(loaded.locate_ranked_prefix(b"ban", 2), vec![2, 3]);
    }
}

#[test]
fn test_rejects_corrupt_input() {
    for config in all_layouts() {
        let bytes = RankedDictionary::build(&FRUIT, &config)
            .unwrap()
            .to_bytes();

        for cut in [0, 3, 4, 12, 16, bytes.len() / 2, bytes.len() - 1] {
            let err = RankedDictionary::from_bytes(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, Error::InvalidEncoding(_)), "cut {cut}: {err:?}");
        }

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(RankedDictionary::from_bytes(&trailing).is_err());

        let mut unknown = bytes.clone();
        unknown[0] = 9;
        assert!(matches!(
            RankedDictionary::from_bytes(&unknown),
            Err(Error::InvalidEncoding(_))
        ));

        let mut empty = bytes.clone();
        empty[4..12].copy_from_slice(&0u64.to_le_bytes());
        assert!(RankedDictionary::from_bytes(&empty).is_err());

        let mut wrong_count = bytes;
        wrong_count[4..12].copy_from_slice(&6u64.to_le_bytes());
        assert!(RankedDictionary::from_bytes(&wrong_count).is_err());
    }
}

#[test]
fn test_unsupported_queries() {
    for config in all_layouts() {
        let dict = RankedDictionary::build(&FRUIT, &config).unwrap();
        assert!(matches!(dict.locate_substr(b"an"), Err(Error::Unsupported(_))));
        assert!(matches!(dict.extract_substr(b"an"), Err(Error::Unsupported(_))));
        assert!(matches!(dict.extract_table(), Err(Error::Unsupported(_))));
    }
}

#[test]
fn test_invalid_parameters() {
    let none: [&str; 0] = [];
    for config in all_layouts() {
        assert!(matches!(
            RankedDictionary::build(&none, &config),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            RankedDictionary::build(&["a", "b", "a"], &config),
            Err(Error::InvalidParameter(_))
        ));
        let zero = BuildConfig {
            bucket_size: 0,
            ..config
        };
        assert!(matches!(
            RankedDictionary::build(&FRUIT, &zero),
            Err(Error::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_single_string_and_bucket_sizes() {
    for bucket_size in [1, 2, 3, 7, 64] {
        for layout in [
            Layout::Bucketed,
            Layout::Permuted(StoreKind::FrontCoded),
            Layout::Permuted(StoreKind::RePairDac),
        ] {
            let config = BuildConfig {
                layout,
                bucket_size,
            };
            let one = RankedDictionary::build(&["solo"], &config).unwrap();
            assert_eq!(one.locate(b"solo"), Some(1));
            assert_eq!(one.locate_ranked_prefix(b"so", 3), vec![1]);
            assert!(one.locate_ranked_prefix(b"x", 3).is_empty());

            let dict = RankedDictionary::build(&FRUIT, &config).unwrap();
            assert_eq!(dict.locate_ranked_prefix(b"b", 2), vec![2, 3]);
            assert_eq!(dict.locate_ranked_prefix(b"c", 2), vec![5]);
        }
    }
}

#[test]
fn test_build_from_nul_delimited_file() {
    let raw = b"cherry\0apple\0\0banana\0";
    let strings = strings_from_nul_delimited(raw);
    assert_eq!(strings.len(), 4);
    let dict = RankedDictionary::build(&strings, &BuildConfig::default()).unwrap();
    assert_eq!(dict.locate(b""), Some(3));
    assert_eq!(dict.locate(b"banana"), Some(4));
    assert_eq!(dict.extract_rank(1).unwrap(), b"");
    assert_eq!(dict.max_length(), 7);
}

#[test]
fn test_interval_selects_lexicographic_positions() {
    // Sorted: apple(5) apricot(4) peach(2) pear(1) pecan(6) plum(3).
    let strings = ["pear", "peach", "plum", "apricot", "apple", "pecan"];
    for config in all_layouts() {
        let dict = RankedDictionary::build(&strings, &config).unwrap();
        assert_eq!(dict.locate_ranked_interval(3, 3, 3), vec![1, 2, 6]);
        assert_eq!(
            dict.extract_ranked_interval(3, 3, 3),
            bytes(&["pear", "peach", "pecan"])
        );
        assert_eq!(dict.locate_ranked_interval(1, 2, 2), vec![4, 5]);
    }
}
