#![no_main]

use fadors_harness::harness::AllowList;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(list) = AllowList::parse(text) {
            // Every parsed entry must be retrievable with the code it was parsed with
            for (name, expected) in list.iter() {
                assert_eq!(list.expected(name), Some(expected));
            }
        }
    }
});
