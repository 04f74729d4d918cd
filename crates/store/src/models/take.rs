//! Take DTOs.

use serde::Deserialize;
use slate_core::take::{Classification, FieldMap};
use validator::Validate;

/// DTO for logging a new take.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTake {
    #[validate(length(min = 1, max = 50))]
    pub scene: String,
    #[validate(length(min = 1, max = 50))]
    pub shot: String,
    /// Defaults to the next free number in the group (append) or the number
    /// of the take being displaced (insert).
    #[validate(range(min = 1))]
    pub take_number: Option<i32>,
    #[serde(default)]
    pub classification: Classification,
    /// Initial field values, e.g. `soundFile` or `cameraFile2_from`.
    #[serde(default)]
    pub data: FieldMap,
}

/// DTO for editing a take. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTake {
    #[validate(length(min = 1, max = 50))]
    pub scene: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub shot: Option<String>,
    #[validate(range(min = 1))]
    pub take_number: Option<i32>,
    pub classification: Option<Classification>,
    /// Field edits merged into the take's data. An empty value removes the key.
    #[serde(default)]
    pub fields: FieldMap,
}
