//! Project DTOs.

use serde::Deserialize;

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    /// Defaults to a single camera if omitted.
    pub camera_configuration: Option<u8>,
}
