//! Exit code verification
//!
//! Normalization itself lives in [`fadors_core::exit_code`]; this module applies it to what the execute stage
//! reported and turns a disagreement into a [`FailReason::Mismatch`].

use super::model::FailReason;

/// Normalize `raw` and compare it with `expected`.
///
/// ## Returns
/// - `Ok(actual)`: the normalized code equals `expected`.
/// - `Err(FailReason::Mismatch)`: both values, normalized, for the report.
pub fn verify_exit_code(raw: i64, expected: i32) -> Result<i32, FailReason> {
    let actual = fadors_core::normalize(raw);
    if actual == expected {
        Ok(actual)
    } else {
        Err(FailReason::Mismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fadors_core::STATUS_ACCESS_VIOLATION;

    #[test]
    fn test_exact_match() {
        assert_eq!(verify_exit_code(42, 42), Ok(42));
        assert_eq!(verify_exit_code(0, 0), Ok(0));
    }

    #[test]
    fn test_crash_never_matches_zero() {
        assert_eq!(
            verify_exit_code(i64::from(STATUS_ACCESS_VIOLATION), 0),
            Err(FailReason::Mismatch {
                expected: 0,
                actual: -1_073_741_819
            })
        );
    }

    #[test]
    fn test_unsigned_status_matches_negative_expectation() {
        assert_eq!(verify_exit_code(0xFFFF_FFFF, -1), Ok(-1));
    }

    #[test]
    fn test_wrong_code() {
        assert_eq!(
            verify_exit_code(3, 45),
            Err(FailReason::Mismatch { expected: 45, actual: 3 })
        );
    }
}
