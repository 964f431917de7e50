//! Normalize raw process termination statuses into comparable signed 32-bit exit codes.
//!
//! Some platforms report abnormal termination as a wide unsigned status. Windows, for example, reports an access
//! violation as `0xC0000005`. A test program that is expected to return `0` must never "match" such a status, and a
//! test expecting a small negative code must be able to see it as negative. Every observed status is therefore
//! masked to 32 bits and reinterpreted as two's complement before comparison.
//!
//! ## Examples
//! ```rust
//! use fadors_core::exit_code::{normalize, STATUS_ACCESS_VIOLATION};
//!
//! assert_eq!(normalize(42), 42);
//! assert_eq!(normalize(-1), -1);
//! assert_eq!(normalize(i64::from(STATUS_ACCESS_VIOLATION)), -1_073_741_819);
//! ```

/// Windows `STATUS_ACCESS_VIOLATION`, the most common crash status seen from miscompiled test programs.
pub const STATUS_ACCESS_VIOLATION: u32 = 0xC000_0005;

const LOW_32_BITS: i64 = 0xFFFF_FFFF;

/// Normalize a raw termination status to a signed 32-bit exit code.
///
/// ## Parameters
/// - `raw`: the status as reported by the OS, widened to `i64` so both unsigned 32-bit statuses and already-signed
///   codes are representable.
///
/// ## Returns
/// - (`i32`): the low 32 bits of `raw`, reinterpreted as two's complement.
///
/// ## Notes
/// - Identity on every value already in `i32` range.
/// - Bits above the low 32 are discarded.
#[inline]
pub fn normalize(raw: i64) -> i32 {
    let masked = (raw & LOW_32_BITS) as u32;
    masked as i32
}

/// Parse a status written by a human: decimal (optionally signed) or `0x`-prefixed hexadecimal.
///
/// ## Returns
/// - `Some(raw)` when the text is a valid number, `None` otherwise. The value is not normalized.
///
/// ## Examples
/// ```rust
/// use fadors_core::exit_code::parse_status;
///
/// assert_eq!(parse_status("42"), Some(42));
/// assert_eq!(parse_status("-3"), Some(-3));
/// assert_eq!(parse_status("0xC0000005"), Some(0xC000_0005));
/// assert_eq!(parse_status("forty-two"), None);
/// ```
pub fn parse_status(text: &str) -> Option<i64> {
    let text = text.trim();
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"));
    match hex {
        Some(digits) => i64::from_str_radix(digits, 16).ok(),
        None => text.parse::<i64>().ok(),
    }
}
