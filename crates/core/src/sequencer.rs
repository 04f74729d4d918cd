//! File-number sequencer.
//!
//! Keeps each channel's file numbers contiguous after a take is inserted,
//! moved or edited. One call handles one channel: it resolves an anchor,
//! seeds a running upper bound from it, then walks the takes that follow
//! in sequence order and re-places every non-blank value directly after
//! the bound. Blank fields, and values lying wholly below the shifted
//! material, are skipped and leave the bound where it was.
//!
//! Sound runs across the whole project. A camera channel only walks the
//! scene/shot group of its anchor (or the group named in the request).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::channel::Channel;
use crate::delta::place_after;
use crate::field_value::{read_field, write_field};
use crate::resolver::{resolve_anchor, Anchor};
use crate::take::{ShotGroup, TakeRecord};
use crate::types::TakeId;

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// Parameters of one channel shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRequest {
    pub channel: Channel,
    /// First file number of the inserted or edited material.
    pub from_number: i64,
    /// How many file numbers that material occupies. Only used when no
    /// anchor resolves.
    pub increment: i64,
    /// Take that is never rewritten (usually the one just inserted or edited).
    pub exclude_id: Option<TakeId>,
    /// Take whose upper bound seeds the walk, when the caller knows it.
    pub anchor_id: Option<TakeId>,
    /// Without an anchor, only walk takes at or after this position.
    pub anchor_position_hint: Option<i32>,
    /// Shot group for camera shifts without an explicit anchor.
    pub group: Option<ShotGroup>,
}

impl ShiftRequest {
    pub fn new(channel: Channel, from_number: i64) -> Self {
        Self {
            channel,
            from_number,
            increment: 1,
            exclude_id: None,
            anchor_id: None,
            anchor_position_hint: None,
            group: None,
        }
    }

    pub fn with_increment(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }

    pub fn excluding(mut self, id: TakeId) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn anchored_at(mut self, id: TakeId) -> Self {
        self.anchor_id = Some(id);
        self
    }

    pub fn with_position_hint(mut self, position: i32) -> Self {
        self.anchor_position_hint = Some(position);
        self
    }

    pub fn in_group(mut self, group: ShotGroup) -> Self {
        self.group = Some(group);
        self
    }
}

/// Result of a single channel shift.
#[derive(Debug, Clone)]
pub struct ShiftOutcome {
    /// The full collection with shifted values written in.
    pub takes: Vec<TakeRecord>,
    /// Takes whose stored value changed, in walk order.
    pub changed: Vec<TakeId>,
    pub anchor: Option<Anchor>,
    /// Initial running bound; `None` when the shift was skipped.
    pub seed: Option<i64>,
}

impl ShiftOutcome {
    fn skipped(takes: Vec<TakeRecord>) -> Self {
        Self {
            takes,
            changed: Vec::new(),
            anchor: None,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Scope {
    Project,
    Group(ShotGroup),
}

impl Scope {
    fn contains(&self, take: &TakeRecord) -> bool {
        match self {
            Self::Project => true,
            Self::Group(group) => take.in_group(group),
        }
    }
}

fn scope_for(takes: &[TakeRecord], request: &ShiftRequest) -> Option<Scope> {
    if !request.channel.is_camera() {
        return Some(Scope::Project);
    }
    request
        .anchor_id
        .and_then(|id| takes.iter().find(|t| t.id == id))
        .map(TakeRecord::group)
        .or_else(|| request.group.clone())
        .map(Scope::Group)
}

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

/// Shift one channel of a project's takes so its numbering is contiguous
/// again after the material starting at `request.from_number`.
///
/// `takes` must all belong to one project. The input is not modified; the
/// returned collection replaces it. Values are only rewritten when their
/// numbers actually change, so repeating a shift is a no-op.
pub fn shift_file_numbers(
    takes: &[TakeRecord],
    camera_count: u8,
    request: &ShiftRequest,
) -> ShiftOutcome {
    let mut updated = takes.to_vec();

    if let Channel::Camera(n) = request.channel {
        if n > camera_count.max(1) {
            tracing::warn!(
                channel = %request.channel,
                camera_count,
                "Camera is not configured for this project, skipping shift"
            );
            return ShiftOutcome::skipped(updated);
        }
    }

    let Some(scope) = scope_for(takes, request) else {
        tracing::warn!(
            channel = %request.channel,
            "Camera shift has neither an anchor nor a shot group, skipping"
        );
        return ShiftOutcome::skipped(updated);
    };

    let key = request.channel.field_key(camera_count);

    let mut indexed: Vec<(usize, &TakeRecord)> = takes
        .iter()
        .enumerate()
        .filter(|(_, t)| scope.contains(t))
        .collect();
    indexed.sort_by(|(_, a), (_, b)| a.cmp_sequence(b));
    let ordered: Vec<&TakeRecord> = indexed.iter().map(|(_, t)| *t).collect();

    let anchor = resolve_anchor(&ordered, &key, request.anchor_id, request.from_number);
    let (seed, start) = match anchor {
        Some(a) => (anchor_seed(&ordered, a.index, &key, request), a.index + 1),
        None => (
            request
                .from_number
                .saturating_add(request.increment.max(1) - 1),
            hint_start(&ordered, request.anchor_position_hint),
        ),
    };

    tracing::debug!(
        channel = %request.channel,
        from_number = request.from_number,
        seed,
        strategy = ?anchor.map(|a| a.strategy),
        scope = ?scope,
        "Resolved shift seed"
    );

    let mut last_upper = seed;
    let mut changed = Vec::new();

    for &(slot, take) in &indexed[start..] {
        if request.exclude_id == Some(take.id) {
            continue;
        }

        let stored = read_field(&take.data, &key);
        let Some(upper) = stored.value.upper() else {
            tracing::trace!(take_id = %take.id, "Blank field, bound unchanged");
            continue;
        };

        // Wholly before the shifted material: untouched, bound unchanged.
        if upper < request.from_number {
            tracing::trace!(take_id = %take.id, upper, "Below from_number, left alone");
            continue;
        }

        let placed = place_after(&stored.value, last_upper);
        if let Some(new_upper) = placed.upper() {
            last_upper = new_upper;
        }

        if placed != stored.value {
            tracing::debug!(
                take_id = %take.id,
                take_number = take.take_number,
                before = ?stored.value,
                after = ?placed,
                "Renumbered take"
            );
            write_field(&mut updated[slot].data, &key, placed, stored.representation);
            changed.push(take.id);
        }
    }

    ShiftOutcome {
        takes: updated,
        changed,
        anchor,
        seed: Some(seed),
    }
}

/// Upper bound of the anchor, or of the nearest non-blank take before it
/// when the anchor itself is blank.
fn anchor_seed(ordered: &[&TakeRecord], index: usize, key: &str, request: &ShiftRequest) -> i64 {
    if let Some(upper) = read_field(&ordered[index].data, key).value.upper() {
        return upper;
    }
    ordered[..index]
        .iter()
        .rev()
        .filter(|t| request.exclude_id != Some(t.id))
        .find_map(|t| read_field(&t.data, key).value.upper())
        .unwrap_or(request.from_number.saturating_sub(1))
}

fn hint_start(ordered: &[&TakeRecord], hint: Option<i32>) -> usize {
    match hint {
        None => 0,
        Some(h) => ordered
            .iter()
            .position(|t| t.sequence_position.map_or(true, |p| p >= h))
            .unwrap_or(ordered.len()),
    }
}

/// Apply several shifts in order, each one against the output of the
/// previous. Returns the final collection and every changed take id.
pub fn shift_channels(
    takes: Vec<TakeRecord>,
    camera_count: u8,
    requests: &[ShiftRequest],
) -> (Vec<TakeRecord>, Vec<TakeId>) {
    let mut current = takes;
    let mut changed: Vec<TakeId> = Vec::new();
    for request in requests {
        let outcome = shift_file_numbers(&current, camera_count, request);
        for id in outcome.changed {
            if !changed.contains(&id) {
                changed.push(id);
            }
        }
        current = outcome.takes;
    }
    (current, changed)
}

// ---------------------------------------------------------------------------
// Contiguity check
// ---------------------------------------------------------------------------

/// A take whose lower bound does not follow the previous non-blank take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContiguityBreak {
    pub channel: Channel,
    pub group: Option<ShotGroup>,
    pub take_id: TakeId,
    pub expected_lower: i64,
    pub actual_lower: i64,
}

/// List every break in `channel`'s numbering. Camera channels are checked
/// per shot group.
pub fn contiguity_breaks(
    takes: &[TakeRecord],
    camera_count: u8,
    channel: Channel,
) -> Vec<ContiguityBreak> {
    let key = channel.field_key(camera_count);
    let scopes: Vec<Option<ShotGroup>> = if channel.is_camera() {
        let groups: BTreeSet<ShotGroup> = takes
            .iter()
            .map(|t| ShotGroup::new(t.scene.trim(), t.shot.trim()))
            .collect();
        groups.into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    let mut breaks = Vec::new();
    for group in scopes {
        let ordered = crate::take::in_sequence(
            takes
                .iter()
                .filter(|t| group.as_ref().map_or(true, |g| t.in_group(g))),
        );
        let mut previous_upper: Option<i64> = None;
        for take in ordered {
            let value = read_field(&take.data, &key).value;
            let (Some(lower), Some(upper)) = (value.lower(), value.upper()) else {
                continue;
            };
            if let Some(prev) = previous_upper {
                let expected = prev.saturating_add(1);
                if lower != expected {
                    breaks.push(ContiguityBreak {
                        channel,
                        group: group.clone(),
                        take_id: take.id,
                        expected_lower: expected,
                        actual_lower: lower,
                    });
                }
            }
            previous_upper = Some(upper);
        }
    }
    breaks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
