use slate_core::take::FieldMap;
use slate_core::types::{ProjectId, TakeId};
use slate_store::models::project::CreateProject;
use slate_store::models::take::CreateTake;
use slate_store::ProjectStore;

/// Build a store holding one project with `cameras` cameras.
pub fn store_with_project(cameras: u8) -> (ProjectStore, ProjectId) {
    let mut store = ProjectStore::new();
    let project = store
        .create_project(CreateProject {
            name: "Test Feature".to_string(),
            camera_configuration: Some(cameras),
        })
        .expect("project should be created");
    (store, project.id)
}

/// A new take in `scene`/`shot` with the given field values.
pub fn new_take(scene: &str, shot: &str, fields: &[(&str, &str)]) -> CreateTake {
    CreateTake {
        scene: scene.to_string(),
        shot: shot.to_string(),
        data: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<FieldMap>(),
        ..CreateTake::default()
    }
}

/// Raw stored string of `key` on take `id`.
pub fn field(store: &ProjectStore, id: TakeId, key: &str) -> Option<String> {
    store
        .take(id)
        .expect("take should exist")
        .data
        .get(key)
        .cloned()
}

/// Positions of a project's takes in sequence order.
pub fn positions(store: &ProjectStore, project_id: ProjectId) -> Vec<i32> {
    store
        .takes(project_id)
        .expect("project should exist")
        .iter()
        .map(|t| t.sequence_position.expect("position should be set"))
        .collect()
}
