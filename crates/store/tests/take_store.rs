//! Integration tests for the project store.
//!
//! Exercises the collaborator-facing operations end to end:
//! - inserting before an existing take shifts file numbers on every channel
//! - deleting a take closes its take-number gap and compacts positions
//! - moving keeps positions a dense permutation
//! - explicit shift / renumber calls behave as the logging screens expect
//! - snapshots survive a round trip through the background writer

mod common;

use assert_matches::assert_matches;
use slate_core::channel::Channel;
use slate_core::error::CoreError;
use slate_core::positions::is_dense;
use slate_core::take::Classification;
use slate_store::models::take::UpdateTake;
use slate_store::persistence::{load_snapshot, SnapshotWriter};
use slate_store::{ProjectStore, StoreError};

use common::{field, new_take, positions, store_with_project};

// ---------------------------------------------------------------------------
// Test: append
// ---------------------------------------------------------------------------

#[test]
fn append_assigns_next_position_and_take_number() {
    let (mut store, project) = store_with_project(1);
    let a = store.append_take(project, new_take("1", "1", &[])).unwrap();
    let b = store.append_take(project, new_take("1", "1", &[])).unwrap();
    let c = store.append_take(project, new_take("2", "1", &[])).unwrap();

    assert_eq!(a.take_number, 1);
    assert_eq!(b.take_number, 2);
    assert_eq!(c.take_number, 1);
    assert_eq!(positions(&store, project), vec![1, 2, 3]);
}

#[test]
fn append_to_unknown_project_is_not_found() {
    let mut store = ProjectStore::new();
    assert_matches!(
        store.append_take(uuid::Uuid::now_v7(), new_take("1", "1", &[])),
        Err(StoreError::Core(CoreError::NotFound { entity: "project", .. }))
    );
}

#[test]
fn append_rejects_empty_scene() {
    let (mut store, project) = store_with_project(1);
    assert_matches!(
        store.append_take(project, new_take("", "1", &[])),
        Err(StoreError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Test: insert before
// ---------------------------------------------------------------------------

/// Inserting a single sound file before an existing one pushes it and
/// everything after it along by one.
#[test]
fn insert_before_shifts_sound_files() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0006")]))
        .unwrap();

    let new = store
        .insert_before(project, 1, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();

    assert_eq!(field(&store, a.id, "soundFile").as_deref(), Some("0006"));
    assert_eq!(field(&store, b.id, "soundFile").as_deref(), Some("0007"));
    assert_eq!(field(&store, new.id, "soundFile").as_deref(), Some("0005"));
    assert_eq!(new.sequence_position, Some(1));
    assert_eq!(positions(&store, project), vec![1, 2, 3]);
}

/// The inserted take takes over the displaced take's number.
#[test]
fn insert_before_renumbers_takes_in_group() {
    let (mut store, project) = store_with_project(1);
    let a = store.append_take(project, new_take("1", "1", &[])).unwrap();
    let b = store.append_take(project, new_take("1", "1", &[])).unwrap();

    let new = store
        .insert_before(project, 2, new_take("1", "1", &[]))
        .unwrap();

    assert_eq!(new.take_number, 2);
    assert_eq!(store.take(a.id).unwrap().take_number, 1);
    assert_eq!(store.take(b.id).unwrap().take_number, 3);
}

/// A range inserted ahead of a range, a waste take and a single: the range
/// moves as a block, the waste take stays blank and the single continues
/// from the range's new upper bound.
#[test]
fn insert_before_shifts_camera_range_past_waste() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(
            project,
            new_take("1", "1", &[("cameraFile_from", "0001"), ("cameraFile_to", "0003")]),
        )
        .unwrap();
    let mut waste = new_take("1", "1", &[]);
    waste.classification = Classification::Waste;
    let b = store.append_take(project, waste).unwrap();
    let c = store
        .append_take(project, new_take("1", "1", &[("cameraFile", "0004")]))
        .unwrap();

    store
        .insert_before(
            project,
            1,
            new_take("1", "1", &[("cameraFile_from", "0001"), ("cameraFile_to", "0002")]),
        )
        .unwrap();

    assert_eq!(field(&store, a.id, "cameraFile_from").as_deref(), Some("0003"));
    assert_eq!(field(&store, a.id, "cameraFile_to").as_deref(), Some("0005"));
    assert!(store.take(b.id).unwrap().data.is_empty());
    assert_eq!(field(&store, c.id, "cameraFile").as_deref(), Some("0006"));
    assert!(store.contiguity_report(project).unwrap().is_empty());
}

/// Camera numbering in other shot groups is left alone; sound is not.
#[test]
fn insert_before_scopes_cameras_to_group() {
    let (mut store, project) = store_with_project(2);
    let other = store
        .append_take(
            project,
            new_take("9", "1", &[("cameraFile1", "0001"), ("soundFile", "0001")]),
        )
        .unwrap();

    store
        .insert_before(
            project,
            1,
            new_take("1", "1", &[("cameraFile1", "0001"), ("soundFile", "0001")]),
        )
        .unwrap();

    assert_eq!(field(&store, other.id, "cameraFile1").as_deref(), Some("0001"));
    assert_eq!(field(&store, other.id, "soundFile").as_deref(), Some("0002"));
}

// ---------------------------------------------------------------------------
// Test: update
// ---------------------------------------------------------------------------

#[test]
fn editing_a_file_number_shifts_followers() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0006")]))
        .unwrap();

    let mut edit = UpdateTake::default();
    edit.fields.insert("soundFile".to_string(), "0005-0007".to_string());
    store.update_take(a.id, edit).unwrap();

    assert_eq!(field(&store, a.id, "soundFile").as_deref(), Some("0005-0007"));
    assert_eq!(field(&store, b.id, "soundFile").as_deref(), Some("0008"));
}

#[test]
fn raising_a_file_number_leaves_lower_followers() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0006")]))
        .unwrap();

    let mut edit = UpdateTake::default();
    edit.fields.insert("soundFile".to_string(), "0010".to_string());
    store.update_take(a.id, edit).unwrap();

    assert_eq!(field(&store, a.id, "soundFile").as_deref(), Some("0010"));
    assert_eq!(field(&store, b.id, "soundFile").as_deref(), Some("0006"));
    assert_eq!(store.contiguity_report(project).unwrap().len(), 1);
}

#[test]
fn editing_other_fields_does_not_shift() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0009")]))
        .unwrap();

    let edit = UpdateTake {
        classification: Some(Classification::Insert),
        ..UpdateTake::default()
    };
    store.update_take(a.id, edit).unwrap();

    assert_eq!(field(&store, b.id, "soundFile").as_deref(), Some("0009"));
    assert_eq!(store.take(a.id).unwrap().classification, Classification::Insert);
}

#[test]
fn empty_field_value_clears_the_key() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0005")]))
        .unwrap();

    let mut edit = UpdateTake::default();
    edit.fields.insert("soundFile".to_string(), String::new());
    store.update_take(a.id, edit).unwrap();

    assert_eq!(field(&store, a.id, "soundFile"), None);
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[test]
fn deleting_take_two_renumbers_take_three() {
    let (mut store, project) = store_with_project(1);
    let one = store.append_take(project, new_take("1", "1", &[])).unwrap();
    let two = store.append_take(project, new_take("1", "1", &[])).unwrap();
    let three = store.append_take(project, new_take("1", "1", &[])).unwrap();

    store.delete_take(two.id).unwrap();

    assert_eq!(store.take(one.id).unwrap().take_number, 1);
    assert_eq!(store.take(three.id).unwrap().take_number, 2);
    assert_eq!(positions(&store, project), vec![1, 2]);
    assert_matches!(
        store.take(two.id),
        Err(StoreError::Core(CoreError::NotFound { entity: "take", .. }))
    );
}

// ---------------------------------------------------------------------------
// Test: move
// ---------------------------------------------------------------------------

#[test]
fn move_keeps_positions_dense() {
    let (mut store, project) = store_with_project(1);
    let ids: Vec<_> = (0..4)
        .map(|_| store.append_take(project, new_take("1", "1", &[])).unwrap().id)
        .collect();

    assert_eq!(store.move_before(project, ids[3], 1).unwrap(), 1);
    assert_eq!(store.take(ids[3]).unwrap().sequence_position, Some(1));
    assert_eq!(store.take(ids[0]).unwrap().sequence_position, Some(2));

    assert_eq!(store.move_before(project, ids[3], 5).unwrap(), 4);
    let takes: Vec<_> = store.takes(project).unwrap().into_iter().cloned().collect();
    assert!(is_dense(&takes));
    assert_eq!(takes.last().unwrap().id, ids[3]);
}

#[test]
fn move_across_projects_is_a_conflict() {
    let (mut store, project) = store_with_project(1);
    let other = store
        .create_project(slate_store::models::project::CreateProject {
            name: "Other".to_string(),
            camera_configuration: None,
        })
        .unwrap();
    let take = store.append_take(other.id, new_take("1", "1", &[])).unwrap();

    assert_matches!(
        store.move_before(project, take.id, 1),
        Err(StoreError::Core(CoreError::Conflict(_)))
    );
}

// ---------------------------------------------------------------------------
// Test: collaborator interface
// ---------------------------------------------------------------------------

#[test]
fn shift_file_numbers_anchors_on_excluded_take() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0001")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("soundFile", "0001")]))
        .unwrap();

    let changed = store
        .shift_file_numbers(project, Channel::Sound, 1, 1, Some(a.id), None)
        .unwrap();
    assert_eq!(changed, vec![b.id]);
    assert_eq!(field(&store, b.id, "soundFile").as_deref(), Some("0002"));

    // Already contiguous: nothing more to do.
    let again = store
        .shift_file_numbers(project, Channel::Sound, 1, 1, Some(a.id), None)
        .unwrap();
    assert!(again.is_empty());
}

#[test]
fn camera_shift_uses_position_hint_for_group() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("4", "2", &[("cameraFile", "0007")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("4", "2", &[("cameraFile", "0007")]))
        .unwrap();

    store
        .shift_file_numbers(project, Channel::Camera(1), 7, 1, None, Some(1))
        .unwrap();

    assert_eq!(field(&store, a.id, "cameraFile").as_deref(), Some("0007"));
    assert_eq!(field(&store, b.id, "cameraFile").as_deref(), Some("0008"));
}

#[test]
fn camera_shift_without_group_is_rejected() {
    let (mut store, project) = store_with_project(1);
    assert_matches!(
        store.shift_file_numbers(project, Channel::Camera(1), 1, 1, None, None),
        Err(StoreError::Core(CoreError::Validation(_)))
    );
}

#[test]
fn shift_on_unconfigured_camera_is_rejected() {
    let (mut store, project) = store_with_project(2);
    assert_matches!(
        store.shift_file_numbers(project, Channel::Camera(3), 1, 1, None, Some(1)),
        Err(StoreError::Core(CoreError::Validation(_)))
    );
}

#[test]
fn renumber_take_numbers_bumps_range() {
    let (mut store, project) = store_with_project(1);
    let takes: Vec<_> = (0..3)
        .map(|_| store.append_take(project, new_take("1", "1", &[])).unwrap())
        .collect();

    let changed = store
        .renumber_take_numbers(project, "1", "1", 2, 1, None, None)
        .unwrap();

    assert_eq!(changed.len(), 2);
    let numbers: Vec<_> = takes
        .iter()
        .map(|t| store.take(t.id).unwrap().take_number)
        .collect();
    assert_eq!(numbers, vec![1, 3, 4]);
}

#[test]
fn camera_configuration_is_validated() {
    let (mut store, project) = store_with_project(1);
    assert!(store.set_camera_configuration(project, 4).is_ok());
    assert!(store.set_camera_configuration(project, 0).is_err());
    assert_eq!(store.project(project).unwrap().camera_configuration, 4);
}

#[test]
fn camera_one_fields_follow_camera_count_changes() {
    let (mut store, project) = store_with_project(1);
    let a = store
        .append_take(project, new_take("1", "1", &[("cameraFile", "0003")]))
        .unwrap();
    let b = store
        .append_take(project, new_take("1", "1", &[("cameraFile", "0003")]))
        .unwrap();

    store.set_camera_configuration(project, 2).unwrap();
    assert_eq!(field(&store, a.id, "cameraFile1").as_deref(), Some("0003"));
    assert_eq!(field(&store, a.id, "cameraFile"), None);

    // The renamed field is what the sequencer now walks.
    store
        .shift_file_numbers(project, Channel::Camera(1), 3, 1, Some(a.id), None)
        .unwrap();
    assert_eq!(field(&store, b.id, "cameraFile1").as_deref(), Some("0004"));

    store.set_camera_configuration(project, 1).unwrap();
    assert_eq!(field(&store, b.id, "cameraFile").as_deref(), Some("0004"));
    assert_eq!(field(&store, b.id, "cameraFile1"), None);
}

// ---------------------------------------------------------------------------
// Test: persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_round_trips_through_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slate.json");
    let (handle, task) = SnapshotWriter::spawn(path.clone());

    let (store, project) = store_with_project(2);
    let mut store = store.with_persistence(handle);
    store
        .append_take(project, new_take("1", "1", &[("soundFile", "0001")]))
        .unwrap();
    store
        .insert_before(project, 1, new_take("1", "1", &[("soundFile", "0001")]))
        .unwrap();
    let expected = store.snapshot();

    drop(store);
    task.await.unwrap();

    let loaded = load_snapshot(&path).await.unwrap();
    assert_eq!(loaded, expected);
    assert_eq!(ProjectStore::from_snapshot(loaded).snapshot(), expected);
}
