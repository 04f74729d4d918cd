//! Project settings consumed by the sequencer.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::channel::Channel;
use crate::error::CoreError;
use crate::types::{ProjectId, Timestamp};

/// Per-project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProjectSettings {
    pub id: ProjectId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Number of cameras rolling on this project.
    #[validate(range(min = 1, max = 10))]
    pub camera_configuration: u8,
    pub created_at: Timestamp,
}

impl ProjectSettings {
    /// Build and validate new settings with a fresh v7 id.
    pub fn new(
        name: impl Into<String>,
        camera_configuration: u8,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let settings = Self {
            id: uuid::Uuid::now_v7(),
            name: name.into(),
            camera_configuration,
            created_at: now,
        };
        settings.check()?;
        Ok(settings)
    }

    /// Run field validation, mapping failures to [`CoreError::Validation`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }

    /// Every channel this project numbers: sound, then each camera.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::all_for(self.camera_configuration)
    }
}
