//! Property-based tests for the harness
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::PathBuf;

use fadors_core::{normalize, parse_status};
use fadors_harness::harness::environment::parse_env_lines;
use fadors_harness::harness::{AllowList, TestSelector};
use proptest::prelude::*;

// =============================================================================
// Exit code normalization
// =============================================================================

proptest! {
    /// Every value in the signed 32-bit range is its own normal form.
    #[test]
    fn normalize_is_identity_on_i32(code in any::<i32>()) {
        prop_assert_eq!(normalize(i64::from(code)), code);
    }

    /// The unsigned view of a status normalizes to the same code as the signed view.
    #[test]
    fn unsigned_and_signed_views_agree(code in any::<i32>()) {
        prop_assert_eq!(normalize(i64::from(code as u32)), code);
    }

    /// Normalization only looks at the low 32 bits and is idempotent.
    #[test]
    fn normalize_keeps_low_bits(raw in any::<i64>()) {
        let n = normalize(raw);
        prop_assert_eq!(n as u32, raw as u32);
        prop_assert_eq!(normalize(i64::from(n)), n);
    }

    /// Hex and decimal spellings of a status parse to the same normalized code.
    #[test]
    fn hex_and_decimal_agree(status in any::<u32>()) {
        let hex = parse_status(&format!("0x{status:X}")).map(normalize);
        let dec = parse_status(&status.to_string()).map(normalize);
        prop_assert_eq!(hex, dec);
        prop_assert_eq!(hex, Some(status as i32));
    }
}

// =============================================================================
// Selection
// =============================================================================

fn names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z0-9_]{1,12}", 0..max)
        .prop_map(|set| set.into_iter().map(|n| format!("{n}.c")).collect())
}

proptest! {
    /// Selection is exactly the allow-listed candidates, in candidate order, with their listed codes.
    #[test]
    fn selection_is_ordered_intersection(
        candidates in names(16),
        listed in names(16),
        codes in prop::collection::vec(any::<i32>(), 16),
    ) {
        let manifest: String = listed
            .iter()
            .zip(&codes)
            .map(|(name, code)| format!("{name} {code}\n"))
            .collect();
        let allow = AllowList::parse(&manifest).unwrap();
        let paths: Vec<PathBuf> = candidates.iter().map(|n| PathBuf::from("tests").join(n)).collect();

        let selected = TestSelector::new(&allow).select(&paths);
        let expected: Vec<&String> = candidates.iter().filter(|c| listed.contains(c)).collect();

        prop_assert_eq!(selected.len(), expected.len());
        for (case, name) in selected.iter().zip(expected) {
            prop_assert_eq!(&case.name, name);
            prop_assert_eq!(Some(case.expected_exit_code), allow.expected(name));
        }
    }

    /// Nothing outside the allow-list is ever selected, whatever the keyword.
    #[test]
    fn unlisted_candidates_are_never_selected(
        candidates in names(16),
        keyword in proptest::option::of("[a-z0-9_]{0,3}"),
    ) {
        let allow = AllowList::parse("01_return.c 42\n").unwrap();
        let paths: Vec<PathBuf> = candidates.iter().map(PathBuf::from).collect();

        for case in TestSelector::new(&allow).with_keyword(keyword.as_deref()).select(&paths) {
            prop_assert_eq!(case.name.as_str(), "01_return.c");
        }
    }
}

// =============================================================================
// Bootstrap output parsing
// =============================================================================

proptest! {
    /// Well-formed `KEY=VALUE` lines survive parsing intact, even when the value contains `=`.
    #[test]
    fn env_lines_round_trip(
        pairs in prop::collection::vec(("[A-Za-z_][A-Za-z0-9_]{0,15}", "[ -~]{0,30}"), 0..10),
    ) {
        let text: String = pairs.iter().map(|(k, v)| format!("{k}={v}\r\n")).collect();
        let parsed: Vec<(String, String)> = parse_env_lines(&text)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        prop_assert_eq!(parsed, pairs);
    }
}
