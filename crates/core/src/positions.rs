//! Project-local sequence positions.
//!
//! Every take in a project carries a `sequence_position` and the positions
//! form the permutation `1..=count`. Each operation here keeps it that way.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::take::TakeRecord;
use crate::types::TakeId;

/// Position an appended take should receive.
pub fn next_position(takes: &[TakeRecord]) -> i32 {
    takes
        .iter()
        .filter_map(|t| t.sequence_position)
        .max()
        .unwrap_or(0)
        + 1
}

/// Make room for a take inserted before `anchor_position`.
///
/// Every take at or after the anchor moves down one slot. Returns the
/// position the new take must use; out-of-range anchors clamp to
/// `1..=next_position`.
pub fn open_position(takes: &mut [TakeRecord], anchor_position: i32) -> i32 {
    let target = anchor_position.clamp(1, next_position(takes));
    for take in takes.iter_mut() {
        if let Some(p) = take.sequence_position.as_mut() {
            if *p >= target {
                *p += 1;
            }
        }
    }
    target
}

/// Close the slot left by a removed take.
pub fn close_position(takes: &mut [TakeRecord], removed_position: i32) {
    for take in takes.iter_mut() {
        if let Some(p) = take.sequence_position.as_mut() {
            if *p > removed_position {
                *p -= 1;
            }
        }
    }
}

/// Move a take so it sits directly before whatever is at `target_position`.
///
/// Moving earlier shifts `[target, old)` up by one. Moving later shifts
/// `(old, target)` down by one and lands the take at `target - 1`. A
/// target past the end moves the take last. Returns the final position.
pub fn move_before(
    takes: &mut [TakeRecord],
    moving_id: TakeId,
    target_position: i32,
) -> Result<i32, CoreError> {
    let next = next_position(takes);
    let index = takes
        .iter()
        .position(|t| t.id == moving_id)
        .ok_or(CoreError::NotFound {
            entity: "take",
            id: moving_id,
        })?;
    // An unpositioned take moves as if it were appended.
    let old = takes[index].sequence_position.unwrap_or(next);
    let target = target_position.clamp(1, next);

    let new_position = if target <= old {
        for (i, take) in takes.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            if let Some(p) = take.sequence_position.as_mut() {
                if *p >= target && *p < old {
                    *p += 1;
                }
            }
        }
        target
    } else {
        for (i, take) in takes.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            if let Some(p) = take.sequence_position.as_mut() {
                if *p > old && *p < target {
                    *p -= 1;
                }
            }
        }
        target - 1
    };

    takes[index].sequence_position = Some(new_position);
    tracing::debug!(take_id = %moving_id, old, new_position, "Moved take");
    Ok(new_position)
}

/// Reassign positions `1..=n` in current sequence order. Returns the ids
/// whose position changed.
pub fn normalize_positions(takes: &mut [TakeRecord]) -> Vec<TakeId> {
    let mut order: Vec<usize> = (0..takes.len()).collect();
    order.sort_by(|&a, &b| takes[a].cmp_sequence(&takes[b]));

    let mut changed = Vec::new();
    for (rank, index) in order.into_iter().enumerate() {
        let position = rank as i32 + 1;
        let take = &mut takes[index];
        if take.sequence_position != Some(position) {
            take.sequence_position = Some(position);
            changed.push(take.id);
        }
    }
    changed
}

/// Whether positions are exactly `{1, ..., count}`.
pub fn is_dense(takes: &[TakeRecord]) -> bool {
    let positions: BTreeSet<i32> = takes.iter().filter_map(|t| t.sequence_position).collect();
    positions.len() == takes.len()
        && positions.first().map_or(true, |&p| p == 1)
        && positions.last().map_or(true, |&p| p == takes.len() as i32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
