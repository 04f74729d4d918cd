//! In-memory project store.
//!
//! Single writer: every mutating method takes `&mut self`, reads the
//! current take collection, computes the next one with `slate-core`, and
//! swaps it in before returning. A dependent series of shifts (sound, then
//! camera 1, then camera 2 ...) therefore always sees the output of the
//! previous step.

use std::collections::BTreeMap;

use chrono::Utc;
use slate_core::channel::{migrate_camera_one_fields, Channel};
use slate_core::delta::span;
use slate_core::error::CoreError;
use slate_core::field_value::read_field;
use slate_core::positions;
use slate_core::project::ProjectSettings;
use slate_core::sequencer::{contiguity_breaks, shift_channels, ContiguityBreak, ShiftRequest};
use slate_core::take::{in_sequence, ShotGroup, TakeRecord};
use slate_core::take_numbers::{
    close_take_number_gap, is_take_number_taken, next_take_number, renumber_take_numbers,
    TakeNumberShift,
};
use slate_core::types::{ProjectId, TakeId, Timestamp};
use validator::Validate;

use crate::error::StoreResult;
use crate::models::project::CreateProject;
use crate::models::take::{CreateTake, UpdateTake};
use crate::persistence::{PersistHandle, Snapshot};

/// Owns every project and its takes.
#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: BTreeMap<ProjectId, ProjectSettings>,
    takes: BTreeMap<ProjectId, Vec<TakeRecord>>,
    persist: Option<PersistHandle>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a loaded snapshot. Takes whose project is
    /// unknown are dropped with a warning.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for project in snapshot.projects {
            store.takes.entry(project.id).or_default();
            store.projects.insert(project.id, project);
        }
        for take in snapshot.takes {
            match store.takes.get_mut(&take.project_id) {
                Some(list) => list.push(take),
                None => tracing::warn!(
                    take_id = %take.id,
                    project_id = %take.project_id,
                    "Dropping take for unknown project"
                ),
            }
        }
        store
    }

    /// Attach a persistence sink notified after every mutation.
    pub fn with_persistence(mut self, handle: PersistHandle) -> Self {
        self.persist = Some(handle);
        self
    }

    /// Full state as a snapshot, takes in per-project sequence order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.values().cloned().collect(),
            takes: self
                .takes
                .values()
                .flat_map(|list| in_sequence(list).into_iter().cloned())
                .collect(),
            ..Snapshot::default()
        }
    }

    fn commit(&self) {
        if let Some(handle) = &self.persist {
            handle.submit(self.snapshot());
        }
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn create_project(&mut self, input: CreateProject) -> StoreResult<ProjectSettings> {
        let settings =
            ProjectSettings::new(input.name, input.camera_configuration.unwrap_or(1), Utc::now())?;
        self.projects.insert(settings.id, settings.clone());
        self.takes.entry(settings.id).or_default();
        tracing::info!(project_id = %settings.id, name = %settings.name, "Project created");
        self.commit();
        Ok(settings)
    }

    pub fn project(&self, id: ProjectId) -> StoreResult<&ProjectSettings> {
        self.projects
            .get(&id)
            .ok_or_else(|| CoreError::NotFound { entity: "project", id }.into())
    }

    pub fn projects(&self) -> Vec<&ProjectSettings> {
        self.projects.values().collect()
    }

    /// Change the camera count. Camera 1's fields are renamed when the
    /// project crosses between one camera and several.
    pub fn set_camera_configuration(
        &mut self,
        id: ProjectId,
        camera_configuration: u8,
    ) -> StoreResult<ProjectSettings> {
        let mut settings = self.project(id)?.clone();
        let previous = settings.camera_configuration;
        settings.camera_configuration = camera_configuration;
        settings.check()?;

        let now = Utc::now();
        let list = self.takes.entry(id).or_default();
        let migrated: Vec<TakeId> = list
            .iter_mut()
            .filter_map(|take| {
                migrate_camera_one_fields(&mut take.data, previous, camera_configuration)
                    .then_some(take.id)
            })
            .collect();
        touch(list, &migrated, now);

        tracing::info!(
            project_id = %id,
            previous,
            camera_configuration,
            migrated = migrated.len(),
            "Camera configuration changed"
        );
        self.projects.insert(id, settings.clone());
        self.commit();
        Ok(settings)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A project's takes in sequence order.
    pub fn takes(&self, project_id: ProjectId) -> StoreResult<Vec<&TakeRecord>> {
        self.project(project_id)?;
        Ok(self
            .takes
            .get(&project_id)
            .map(|list| in_sequence(list))
            .unwrap_or_default())
    }

    pub fn take(&self, id: TakeId) -> StoreResult<&TakeRecord> {
        self.takes
            .values()
            .flatten()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound { entity: "take", id }.into())
    }

    /// Breaks in every channel's numbering for a project.
    pub fn contiguity_report(&self, project_id: ProjectId) -> StoreResult<Vec<ContiguityBreak>> {
        let settings = self.project(project_id)?;
        let list = self.project_takes(project_id);
        Ok(settings
            .channels()
            .into_iter()
            .flat_map(|channel| contiguity_breaks(list, settings.camera_configuration, channel))
            .collect())
    }

    fn project_takes(&self, project_id: ProjectId) -> &[TakeRecord] {
        self.takes.get(&project_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn project_of(&self, take_id: TakeId) -> StoreResult<ProjectId> {
        Ok(self.take(take_id)?.project_id)
    }

    // -----------------------------------------------------------------------
    // Take lifecycle
    // -----------------------------------------------------------------------

    /// Log a take at the end of the project.
    pub fn append_take(
        &mut self,
        project_id: ProjectId,
        input: CreateTake,
    ) -> StoreResult<TakeRecord> {
        input.validate()?;
        self.project(project_id)?;
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let group = ShotGroup::new(input.scene.clone(), input.shot.clone());
        let take_number = input
            .take_number
            .unwrap_or_else(|| next_take_number(list, &group));
        let record = build_take(project_id, input, take_number, now)
            .with_position(positions::next_position(list));
        make_room_for_take_number(list, &record, now);
        list.push(record.clone());

        tracing::info!(
            take_id = %record.id,
            group = %group,
            take_number,
            position = ?record.sequence_position,
            "Take appended"
        );
        self.commit();
        Ok(record)
    }

    /// Insert a take before the one at `anchor_position` and renumber
    /// everything after it: positions, take numbers in its group, and file
    /// numbers on every channel where the new take holds a value.
    pub fn insert_before(
        &mut self,
        project_id: ProjectId,
        anchor_position: i32,
        input: CreateTake,
    ) -> StoreResult<TakeRecord> {
        input.validate()?;
        let camera_count = self.project(project_id)?.camera_configuration;
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let group = ShotGroup::new(input.scene.clone(), input.shot.clone());
        let position = positions::open_position(list, anchor_position);
        let take_number = match input.take_number {
            Some(n) => n,
            None => displaced_take_number(list, &group, position)
                .unwrap_or_else(|| next_take_number(list, &group)),
        };
        let record = build_take(project_id, input, take_number, now).with_position(position);
        make_room_for_take_number(list, &record, now);
        list.push(record.clone());

        let requests = shifts_for(&record, camera_count);
        let (updated, changed) = shift_channels(std::mem::take(list), camera_count, &requests);
        *list = updated;
        touch(list, &changed, now);

        tracing::info!(
            take_id = %record.id,
            group = %group,
            take_number,
            position,
            shifted = changed.len(),
            "Take inserted"
        );
        self.commit();
        Ok(record)
    }

    /// Move a take so it sits before the one at `target_position`.
    ///
    /// Only positions change; file numbers are left for the caller to
    /// re-shift, since a move alone does not say which numbering is right.
    pub fn move_before(
        &mut self,
        project_id: ProjectId,
        moving_id: TakeId,
        target_position: i32,
    ) -> StoreResult<i32> {
        self.project(project_id)?;
        if self.project_of(moving_id)? != project_id {
            return Err(CoreError::Conflict(format!(
                "take {moving_id} belongs to a different project"
            ))
            .into());
        }
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();
        if !positions::is_dense(list) {
            positions::normalize_positions(list);
        }
        let position = positions::move_before(list, moving_id, target_position)?;
        touch(list, &[moving_id], now);
        self.commit();
        Ok(position)
    }

    /// Apply field edits to a take, then shift downstream file numbers on
    /// every channel whose value changed.
    pub fn update_take(&mut self, id: TakeId, input: UpdateTake) -> StoreResult<TakeRecord> {
        input.validate()?;
        let project_id = self.project_of(id)?;
        let camera_count = self.project(project_id)?.camera_configuration;
        let channels = Channel::all_for(camera_count);
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let Some(take) = list.iter_mut().find(|t| t.id == id) else {
            return Err(CoreError::NotFound { entity: "take", id }.into());
        };
        let before: Vec<_> = channels
            .iter()
            .map(|c| read_field(&take.data, &c.field_key(camera_count)).value)
            .collect();

        if let Some(scene) = input.scene {
            take.scene = scene;
        }
        if let Some(shot) = input.shot {
            take.shot = shot;
        }
        if let Some(classification) = input.classification {
            take.classification = classification;
        }
        let renumbered = input.take_number.filter(|n| *n != take.take_number);
        if let Some(n) = renumbered {
            take.take_number = n;
        }
        for (key, value) in input.fields {
            if value.trim().is_empty() {
                take.data.remove(&key);
            } else {
                take.data.insert(key, value);
            }
        }
        take.updated_at = now;
        let record = take.clone();

        if renumbered.is_some() {
            make_room_for_take_number(list, &record, now);
        }

        let requests: Vec<ShiftRequest> = shifts_for(&record, camera_count)
            .into_iter()
            .filter(|request| {
                let index = channels.iter().position(|c| *c == request.channel);
                let after = read_field(&record.data, &request.channel.field_key(camera_count)).value;
                index.map_or(true, |i| before[i] != after)
            })
            .collect();
        let (updated, changed) = shift_channels(std::mem::take(list), camera_count, &requests);
        *list = updated;
        touch(list, &changed, now);

        tracing::info!(take_id = %id, shifted = changed.len(), "Take updated");
        self.commit();
        Ok(record)
    }

    /// Remove a take, compacting positions and closing the take-number gap
    /// in its group.
    pub fn delete_take(&mut self, id: TakeId) -> StoreResult<TakeRecord> {
        let project_id = self.project_of(id)?;
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let index = list
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::NotFound { entity: "take", id })?;
        let removed = list.remove(index);

        if let Some(position) = removed.sequence_position {
            positions::close_position(list, position);
        }
        let renumbered = close_take_number_gap(list, &removed.group(), removed.take_number);
        touch(list, &renumbered, now);

        tracing::info!(
            take_id = %id,
            group = %removed.group(),
            take_number = removed.take_number,
            renumbered = renumbered.len(),
            "Take deleted"
        );
        self.commit();
        Ok(removed)
    }

    /// Reassign dense positions in current sequence order.
    pub fn normalize_positions(&mut self, project_id: ProjectId) -> StoreResult<Vec<TakeId>> {
        self.project(project_id)?;
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();
        let changed = positions::normalize_positions(list);
        touch(list, &changed, now);
        if !changed.is_empty() {
            self.commit();
        }
        Ok(changed)
    }

    // -----------------------------------------------------------------------
    // Collaborator interface
    // -----------------------------------------------------------------------

    /// Shift one channel forward from `from_number`.
    ///
    /// The excluded take doubles as the explicit anchor when its value on
    /// this channel starts or ends at `from_number`. Camera shifts take
    /// their shot group from the excluded take, or else from the take at
    /// `anchor_position_hint`.
    pub fn shift_file_numbers(
        &mut self,
        project_id: ProjectId,
        channel: Channel,
        from_number: i64,
        increment: i64,
        exclude_id: Option<TakeId>,
        anchor_position_hint: Option<i32>,
    ) -> StoreResult<Vec<TakeId>> {
        let camera_count = self.project(project_id)?.camera_configuration;
        if let Channel::Camera(n) = channel {
            if n > camera_count {
                return Err(CoreError::Validation(format!(
                    "Camera {n} is not configured; project has {camera_count} camera(s)"
                ))
                .into());
            }
        }
        let key = channel.field_key(camera_count);
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let excluded = exclude_id.and_then(|id| list.iter().find(|t| t.id == id));
        let mut request = ShiftRequest::new(channel, from_number).with_increment(increment);
        if let Some(take) = excluded {
            request = request.excluding(take.id);
            if read_field(&take.data, &key).value.touches(from_number) {
                request = request.anchored_at(take.id);
            }
        }
        if let Some(hint) = anchor_position_hint {
            request = request.with_position_hint(hint);
        }
        if channel.is_camera() {
            let group = excluded.map(TakeRecord::group).or_else(|| {
                anchor_position_hint.and_then(|hint| {
                    list.iter()
                        .find(|t| t.sequence_position == Some(hint))
                        .map(TakeRecord::group)
                })
            });
            match group {
                Some(group) => request = request.in_group(group),
                None => {
                    return Err(CoreError::Validation(
                        "Camera shift needs an excluded take or a position hint to find its shot group"
                            .to_string(),
                    )
                    .into())
                }
            }
        }

        let (updated, changed) = shift_channels(std::mem::take(list), camera_count, &[request]);
        *list = updated;
        touch(list, &changed, now);
        if !changed.is_empty() {
            self.commit();
        }
        Ok(changed)
    }

    /// Bump take numbers in one scene/shot group.
    #[allow(clippy::too_many_arguments)]
    pub fn renumber_take_numbers(
        &mut self,
        project_id: ProjectId,
        scene: &str,
        shot: &str,
        from_take_number: i32,
        increment: i32,
        exclude_id: Option<TakeId>,
        max_take_number: Option<i32>,
    ) -> StoreResult<Vec<TakeId>> {
        self.project(project_id)?;
        let now = Utc::now();
        let list = self.takes.entry(project_id).or_default();

        let mut shift = TakeNumberShift::new(ShotGroup::new(scene, shot), from_take_number, increment);
        if let Some(id) = exclude_id {
            shift = shift.excluding(id);
        }
        if let Some(max) = max_take_number {
            shift = shift.up_to(max);
        }
        let changed = renumber_take_numbers(list, &shift);
        touch(list, &changed, now);
        if !changed.is_empty() {
            self.commit();
        }
        Ok(changed)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_take(project_id: ProjectId, input: CreateTake, take_number: i32, now: Timestamp) -> TakeRecord {
    let mut record = TakeRecord::new(project_id, input.scene, input.shot, take_number, now)
        .with_classification(input.classification);
    record.data = input.data;
    record
}

/// Take number of the first take in `group` at or after `position`, i.e.
/// the one a take inserted at `position` pushes back.
fn displaced_take_number(list: &[TakeRecord], group: &ShotGroup, position: i32) -> Option<i32> {
    in_sequence(list.iter().filter(|t| t.in_group(group)))
        .into_iter()
        .find(|t| t.sequence_position.map_or(false, |p| p >= position))
        .map(|t| t.take_number)
}

/// If `record`'s take number is already used in its group, push that take
/// and every later one up by one.
fn make_room_for_take_number(list: &mut [TakeRecord], record: &TakeRecord, now: Timestamp) {
    let group = record.group();
    if !is_take_number_taken(list, &group, record.take_number, Some(record.id)) {
        return;
    }
    let shift = TakeNumberShift::new(group, record.take_number, 1).excluding(record.id);
    let changed = renumber_take_numbers(list, &shift);
    touch(list, &changed, now);
}

/// One shift per channel on which `record` holds a value, anchored at and
/// excluding `record`.
fn shifts_for(record: &TakeRecord, camera_count: u8) -> Vec<ShiftRequest> {
    Channel::all_for(camera_count)
        .into_iter()
        .filter_map(|channel| {
            let value = read_field(&record.data, &channel.field_key(camera_count)).value;
            value.lower().map(|lower| {
                ShiftRequest::new(channel, lower)
                    .with_increment(span(&value))
                    .anchored_at(record.id)
                    .excluding(record.id)
            })
        })
        .collect()
}

fn touch(list: &mut [TakeRecord], ids: &[TakeId], now: Timestamp) {
    for take in list.iter_mut().filter(|t| ids.contains(&t.id)) {
        take.updated_at = now;
    }
}
