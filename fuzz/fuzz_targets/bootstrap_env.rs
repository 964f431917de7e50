#![no_main]

use fadors_harness::harness::Environment;
use fadors_harness::harness::environment::{parse_env_lines, parse_env_nul};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Bootstrap output is decoded lossily, so any bytes are fair input
    let text = String::from_utf8_lossy(data);
    let pairs: Vec<_> = parse_env_lines(&text).collect();
    for (key, _) in &pairs {
        assert!(!key.is_empty());
    }

    let mut env = Environment::new();
    let applied = env.merge_lines(&text);
    assert_eq!(applied, pairs.len());
    assert!(env.len() <= applied);

    let records: Vec<_> = parse_env_nul(&text).collect();
    for (key, _) in &records {
        assert!(!key.is_empty() && !key.contains('\0'));
    }
    let mut env = Environment::new();
    assert_eq!(env.merge_nul_separated(&text), records.len());
});
