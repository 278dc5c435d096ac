#![no_main]
use libfuzzer_sys::fuzz_target;
use rankdict::{RankedDictionary, RankedStringDictionary};

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must decode or fail cleanly; a decoded dictionary
    // must answer queries without panicking.
    let Ok(dict) = RankedDictionary::from_bytes(data) else {
        return;
    };
    let n = dict.len();
    for id in [0, 1, n / 2, n, n + 1] {
        if let Some(s) = dict.extract(id) {
            let _ = dict.locate(&s);
        }
        let _ = dict.locate_rank(id);
    }
    let _ = dict.locate_ranked_prefix(b"a", 4);
    let _ = dict.locate_ranked_interval(1, n, 4);
});
