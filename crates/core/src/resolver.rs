//! Insertion-point resolution: which take seeds the running file number.
//!
//! Strategies are tried in order and the first hit wins:
//!
//! 1. an explicit anchor id, when it is in scope;
//! 2. a take with a bound equal to `from_number`;
//! 3. a take with a bound equal to `from_number - 1`.
//!
//! For 2 and 3 the lowest take number wins, ties going to the earliest
//! take in sequence. No hit means the caller seeds from `from_number`.

use serde::Serialize;

use crate::field_value::read_field;
use crate::take::TakeRecord;
use crate::types::TakeId;

/// Which strategy located the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStrategy {
    Explicit,
    ExactMatch,
    PreviousNumber,
}

/// A resolved anchor take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub take_id: TakeId,
    /// Index of the anchor within the candidate slice.
    pub index: usize,
    pub strategy: AnchorStrategy,
}

/// Resolve the anchor among `candidates`, which must already be in
/// sequence order and restricted to the shift scope.
pub fn resolve_anchor(
    candidates: &[&TakeRecord],
    key: &str,
    explicit_id: Option<TakeId>,
    from_number: i64,
) -> Option<Anchor> {
    if let Some(id) = explicit_id {
        if let Some(index) = candidates.iter().position(|t| t.id == id) {
            return Some(Anchor {
                take_id: id,
                index,
                strategy: AnchorStrategy::Explicit,
            });
        }
        tracing::debug!(anchor_id = %id, "Explicit anchor not in scope, matching by value");
    }

    if let Some(index) = lowest_take_touching(candidates, key, from_number) {
        return Some(Anchor {
            take_id: candidates[index].id,
            index,
            strategy: AnchorStrategy::ExactMatch,
        });
    }

    lowest_take_touching(candidates, key, from_number.saturating_sub(1)).map(|index| Anchor {
        take_id: candidates[index].id,
        index,
        strategy: AnchorStrategy::PreviousNumber,
    })
}

/// Index of the candidate whose value has a bound equal to `number`,
/// preferring the lowest take number and then the earliest position.
fn lowest_take_touching(candidates: &[&TakeRecord], key: &str, number: i64) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, t)| read_field(&t.data, key).value.touches(number))
        .min_by_key(|(index, t)| (t.take_number, *index))
        .map(|(index, _)| index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
