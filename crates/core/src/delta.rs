//! How many file numbers a field value consumes, and where it lands when
//! re-placed after a running bound.
//!
//! A range counts both ends: `0001-0003` is three files. Placement keeps
//! that count fixed, so `span(place_after(v, n)) == span(v)` for any value
//! that stays inside `i64`. Arithmetic saturates at the edges instead of
//! overflowing.

use crate::field_value::FieldValue;

/// Number of file numbers `value` occupies in its channel.
///
/// - `Blank`  -> 0
/// - `Single` -> 1
/// - `Range`  -> `upper - lower + 1`
pub fn span(value: &FieldValue) -> i64 {
    match *value {
        FieldValue::Blank => 0,
        FieldValue::Single(_) => 1,
        FieldValue::Range { lower, upper } => upper.saturating_sub(lower).saturating_add(1),
    }
}

/// Move `value` so its first file number is `last_upper + 1`.
///
/// Single stays single and range stays range; blank stays blank.
pub fn place_after(value: &FieldValue, last_upper: i64) -> FieldValue {
    let lower = last_upper.saturating_add(1);
    match *value {
        FieldValue::Blank => FieldValue::Blank,
        FieldValue::Single(_) => FieldValue::Single(lower),
        FieldValue::Range { .. } => FieldValue::Range {
            lower,
            upper: lower.saturating_add(span(value) - 1),
        },
    }
}
