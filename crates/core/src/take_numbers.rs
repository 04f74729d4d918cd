//! Take-number renumbering within a scene/shot group.
//!
//! Take numbers are per group and should run 1, 2, 3... Inserting a take
//! at an occupied number pushes the later ones up; deleting a take closes
//! the gap it leaves.

use crate::take::{ShotGroup, TakeRecord};
use crate::types::TakeId;

/// Parameters for bumping take numbers in one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeNumberShift {
    pub group: ShotGroup,
    /// Lowest take number affected (inclusive).
    pub from: i32,
    /// Highest take number affected (inclusive), if bounded.
    pub max: Option<i32>,
    pub increment: i32,
    pub exclude_id: Option<TakeId>,
}

impl TakeNumberShift {
    pub fn new(group: ShotGroup, from: i32, increment: i32) -> Self {
        Self {
            group,
            from,
            max: None,
            increment,
            exclude_id: None,
        }
    }

    pub fn up_to(mut self, max: i32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn excluding(mut self, id: TakeId) -> Self {
        self.exclude_id = Some(id);
        self
    }
}

/// Add `shift.increment` to every take number in `[from, max]` within the
/// group, skipping the excluded take. Returns the ids that changed.
pub fn renumber_take_numbers(takes: &mut [TakeRecord], shift: &TakeNumberShift) -> Vec<TakeId> {
    if shift.increment == 0 {
        return Vec::new();
    }
    let mut changed = Vec::new();
    for take in takes.iter_mut() {
        if Some(take.id) == shift.exclude_id || !take.in_group(&shift.group) {
            continue;
        }
        let in_range = take.take_number >= shift.from
            && shift.max.map_or(true, |max| take.take_number <= max);
        if in_range {
            take.take_number += shift.increment;
            changed.push(take.id);
        }
    }
    tracing::debug!(
        group = %shift.group,
        from = shift.from,
        max = ?shift.max,
        increment = shift.increment,
        count = changed.len(),
        "Renumbered take numbers"
    );
    changed
}

/// Decrement every take number above `deleted_number` in the group.
pub fn close_take_number_gap(
    takes: &mut [TakeRecord],
    group: &ShotGroup,
    deleted_number: i32,
) -> Vec<TakeId> {
    renumber_take_numbers(
        takes,
        &TakeNumberShift::new(group.clone(), deleted_number + 1, -1),
    )
}

/// The number a new take appended to `group` should get.
pub fn next_take_number(takes: &[TakeRecord], group: &ShotGroup) -> i32 {
    takes
        .iter()
        .filter(|t| t.in_group(group))
        .map(|t| t.take_number)
        .max()
        .unwrap_or(0)
        + 1
}

/// Whether `number` is already used in `group`, ignoring `exclude_id`.
pub fn is_take_number_taken(
    takes: &[TakeRecord],
    group: &ShotGroup,
    number: i32,
    exclude_id: Option<TakeId>,
) -> bool {
    takes
        .iter()
        .any(|t| Some(t.id) != exclude_id && t.in_group(group) && t.take_number == number)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn take(scene: &str, shot: &str, number: i32) -> TakeRecord {
        TakeRecord::new(uuid::Uuid::nil(), scene, shot, number, Utc::now())
    }

    fn numbers(takes: &[TakeRecord]) -> Vec<i32> {
        takes.iter().map(|t| t.take_number).collect()
    }

    #[test]
    fn deleting_take_two_closes_the_gap() {
        // Take 2 has already been removed from the collection.
        let mut takes = vec![take("1", "1", 1), take("1", "1", 3)];
        let changed = close_take_number_gap(&mut takes, &ShotGroup::new("1", "1"), 2);
        assert_eq!(numbers(&takes), vec![1, 2]);
        assert_eq!(changed, vec![takes[1].id]);
    }

    #[test]
    fn gap_close_ignores_other_groups() {
        let mut takes = vec![take("1", "1", 3), take("1", "2", 3)];
        close_take_number_gap(&mut takes, &ShotGroup::new("1", "1"), 2);
        assert_eq!(numbers(&takes), vec![2, 3]);
    }

    #[test]
    fn insert_bumps_numbers_from_target() {
        let mut takes = vec![take("1", "1", 1), take("1", "1", 2), take("1", "1", 3)];
        let inserted = take("1", "1", 2);
        takes.push(inserted.clone());

        let shift = TakeNumberShift::new(ShotGroup::new("1", "1"), 2, 1).excluding(inserted.id);
        renumber_take_numbers(&mut takes, &shift);

        assert_eq!(numbers(&takes), vec![1, 3, 4, 2]);
    }

    #[test]
    fn max_bounds_the_shift() {
        let mut takes = vec![take("1", "1", 2), take("1", "1", 3), take("1", "1", 5)];
        let shift = TakeNumberShift::new(ShotGroup::new("1", "1"), 2, 1).up_to(3);
        renumber_take_numbers(&mut takes, &shift);
        assert_eq!(numbers(&takes), vec![3, 4, 5]);
    }

    #[test]
    fn zero_increment_changes_nothing() {
        let mut takes = vec![take("1", "1", 2)];
        let shift = TakeNumberShift::new(ShotGroup::new("1", "1"), 1, 0);
        assert!(renumber_take_numbers(&mut takes, &shift).is_empty());
    }

    #[test]
    fn next_number_follows_group_max() {
        let takes = vec![take("1", "1", 4), take("1", "1", 2), take("2", "1", 9)];
        assert_eq!(next_take_number(&takes, &ShotGroup::new("1", "1")), 5);
        assert_eq!(next_take_number(&takes, &ShotGroup::new("3", "1")), 1);
    }

    #[test]
    fn taken_number_respects_exclusion() {
        let takes = vec![take("1", "1", 2)];
        let group = ShotGroup::new("1", "1");
        assert!(is_take_number_taken(&takes, &group, 2, None));
        assert!(!is_take_number_taken(&takes, &group, 2, Some(takes[0].id)));
        assert!(!is_take_number_taken(&takes, &group, 3, None));
    }
}
