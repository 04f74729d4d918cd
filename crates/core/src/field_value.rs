//! Parsing and writing of per-take file-number fields.
//!
//! A channel's value is stored one of three ways:
//!
//! - a `<key>_from` / `<key>_to` pair (range mode on the logging form),
//! - an inline `"0001-0003"` string under `<key>`,
//! - a single `"0004"` string under `<key>`.
//!
//! Reading tries those in that order and falls through on anything that
//! does not parse. Nothing here returns an error: bad input reads as
//! [`FieldValue::Blank`], which the sequencer skips.

use crate::channel::range_keys;
use crate::take::FieldMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parsed numeric content of a channel field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// Empty, waste, or unparseable.
    Blank,
    Single(i64),
    /// Inclusive range with `lower <= upper`.
    Range { lower: i64, upper: i64 },
}

impl FieldValue {
    /// Build a range from two bounds in either order.
    pub fn range(a: i64, b: i64) -> Self {
        Self::Range {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }

    pub fn lower(&self) -> Option<i64> {
        match *self {
            Self::Blank => None,
            Self::Single(n) => Some(n),
            Self::Range { lower, .. } => Some(lower),
        }
    }

    pub fn upper(&self) -> Option<i64> {
        match *self {
            Self::Blank => None,
            Self::Single(n) => Some(n),
            Self::Range { upper, .. } => Some(upper),
        }
    }

    /// Whether either bound equals `number`.
    pub fn touches(&self, number: i64) -> bool {
        self.lower() == Some(number) || self.upper() == Some(number)
    }
}

/// How a value was laid out in the field map. Writes preserve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Pair,
    Inline,
    Single,
    Absent,
}

/// A parsed value together with the layout it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredField {
    pub value: FieldValue,
    pub representation: Representation,
}

impl StoredField {
    const BLANK: Self = Self {
        value: FieldValue::Blank,
        representation: Representation::Absent,
    };
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Longest file number accepted, ignoring leading zeros.
pub const MAX_FILE_NUMBER_DIGITS: usize = 9;

/// Parse a bare file number. Only ASCII digits are accepted, and no more
/// than [`MAX_FILE_NUMBER_DIGITS`] significant ones.
fn parse_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if trimmed.trim_start_matches('0').len() > MAX_FILE_NUMBER_DIGITS {
        return None;
    }
    trimmed.parse().ok()
}

/// Parse `"lower-upper"`.
fn parse_inline_range(raw: &str) -> Option<(i64, i64)> {
    let (a, b) = raw.split_once('-')?;
    Some((parse_number(a)?, parse_number(b)?))
}

/// Read the value stored under `key`.
pub fn read_field(data: &FieldMap, key: &str) -> StoredField {
    let (from_key, to_key) = range_keys(key);
    let from = data.get(&from_key).and_then(|v| parse_number(v));
    let to = data.get(&to_key).and_then(|v| parse_number(v));
    if let (Some(from), Some(to)) = (from, to) {
        return StoredField {
            value: FieldValue::range(from, to),
            representation: Representation::Pair,
        };
    }

    let Some(raw) = data.get(key) else {
        return StoredField::BLANK;
    };
    if let Some((a, b)) = parse_inline_range(raw) {
        return StoredField {
            value: FieldValue::range(a, b),
            representation: Representation::Inline,
        };
    }
    match parse_number(raw) {
        Some(n) => StoredField {
            value: FieldValue::Single(n),
            representation: Representation::Single,
        },
        None => StoredField::BLANK,
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Zero-pad a file number to four digits.
pub fn format_file_number(n: i64) -> String {
    format!("{n:04}")
}

/// Write `value` under `key` using `representation`.
///
/// Blank values are never written. A range read from a single field is
/// written inline; a single value read from a pair writes both bounds.
pub fn write_field(
    data: &mut FieldMap,
    key: &str,
    value: FieldValue,
    representation: Representation,
) {
    let (lower, upper) = match (value.lower(), value.upper()) {
        (Some(lower), Some(upper)) => (lower, upper),
        _ => return,
    };

    if representation == Representation::Pair {
        let (from_key, to_key) = range_keys(key);
        data.insert(from_key, format_file_number(lower));
        data.insert(to_key, format_file_number(upper));
        return;
    }

    let text = match value {
        FieldValue::Range { lower, upper } => {
            format!("{}-{}", format_file_number(lower), format_file_number(upper))
        }
        _ => format_file_number(lower),
    };
    data.insert(key.to_string(), text);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
