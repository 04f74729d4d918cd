//! Subcommand dispatch. Each arm maps onto one store operation and returns
//! the JSON printed to stdout.

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use slate_core::take::{Classification, FieldMap};
use slate_store::models::project::CreateProject;
use slate_store::models::take::{CreateTake, UpdateTake};
use slate_store::ProjectStore;

use crate::{Command, TakeArgs};

pub fn run(store: &mut ProjectStore, command: Command) -> Result<Value> {
    match command {
        Command::InitProject { name, cameras } => to_json(store.create_project(CreateProject {
            name,
            camera_configuration: Some(cameras),
        })?),
        Command::SetCameras { project, cameras } => {
            to_json(store.set_camera_configuration(project, cameras)?)
        }
        Command::List { project: None } => to_json(store.projects()),
        Command::List {
            project: Some(project),
        } => to_json(store.takes(project)?),
        Command::Append { project, take } => to_json(store.append_take(project, create_take(take))?),
        Command::InsertBefore {
            project,
            position,
            take,
        } => to_json(store.insert_before(project, position, create_take(take))?),
        Command::MoveBefore {
            project,
            take,
            position,
        } => {
            let position = store.move_before(project, take, position)?;
            Ok(json!({ "take_id": take, "sequence_position": position }))
        }
        Command::Edit {
            take,
            scene,
            shot,
            take_number,
            classification,
            fields,
        } => {
            let input = UpdateTake {
                scene,
                shot,
                take_number,
                classification: classification.as_deref().map(Classification::from_label),
                fields: fields.into_iter().collect(),
            };
            to_json(store.update_take(take, input)?)
        }
        Command::Delete { take } => to_json(store.delete_take(take)?),
        Command::Shift {
            project,
            channel,
            from,
            increment,
            exclude,
            position_hint,
        } => {
            let changed =
                store.shift_file_numbers(project, channel, from, increment, exclude, position_hint)?;
            Ok(json!({ "channel": channel, "changed": changed }))
        }
        Command::RenumberTakes {
            project,
            scene,
            shot,
            from,
            increment,
            exclude,
            max,
        } => {
            let changed =
                store.renumber_take_numbers(project, &scene, &shot, from, increment, exclude, max)?;
            Ok(json!({ "changed": changed }))
        }
        Command::Normalize { project } => {
            let changed = store.normalize_positions(project)?;
            Ok(json!({ "changed": changed }))
        }
        Command::Check { project } => {
            let breaks = store.contiguity_report(project)?;
            Ok(json!({ "contiguous": breaks.is_empty(), "breaks": breaks }))
        }
    }
}

fn create_take(args: TakeArgs) -> CreateTake {
    CreateTake {
        scene: args.scene,
        shot: args.shot,
        take_number: args.take_number,
        classification: args
            .classification
            .as_deref()
            .map(Classification::from_label)
            .unwrap_or_default(),
        data: args.fields.into_iter().collect::<FieldMap>(),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
