//! Take record model shared by every sequencing pass.
//!
//! A take is the unit of work on set: one attempt at a shot, carrying the
//! camera and sound file numbers that were rolled for it. File fields live
//! in a free-form string map because the logging forms store them as text.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, TakeId, Timestamp};

/// Per-take field data keyed by form field name (`soundFile`, `cameraFile2_from`, ...).
pub type FieldMap = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Take classification as marked by the script supervisor.
///
/// Waste, ambience and SFX takes routinely leave camera and/or sound fields
/// empty. The sequencer treats any empty field as a skip, whatever the
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    None,
    Waste,
    Insert,
    Ambience,
    Sfx,
}

impl Classification {
    /// Parse a classification label as the logging forms write it.
    ///
    /// Matching is case-insensitive; unknown labels map to [`Classification::None`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "waste" => Self::Waste,
            "insert" => Self::Insert,
            "ambience" => Self::Ambience,
            "sfx" => Self::Sfx,
            _ => Self::None,
        }
    }

    /// Display label used on the logging forms.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Waste => "Waste",
            Self::Insert => "Insert",
            Self::Ambience => "Ambience",
            Self::Sfx => "SFX",
        }
    }
}

// ---------------------------------------------------------------------------
// ShotGroup
// ---------------------------------------------------------------------------

/// A scene + shot pair. Camera file sequences are scoped to one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShotGroup {
    pub scene: String,
    pub shot: String,
}

impl ShotGroup {
    pub fn new(scene: impl Into<String>, shot: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            shot: shot.into(),
        }
    }
}

impl fmt::Display for ShotGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scene, self.shot)
    }
}

// ---------------------------------------------------------------------------
// TakeRecord
// ---------------------------------------------------------------------------

/// One logged take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeRecord {
    pub id: TakeId,
    pub project_id: ProjectId,
    /// Project-local ordering index. Dense `1..=count` once normalized;
    /// legacy records may lack one.
    #[serde(default)]
    pub sequence_position: Option<i32>,
    pub scene: String,
    pub shot: String,
    pub take_number: i32,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub data: FieldMap,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TakeRecord {
    /// Create a take with a fresh v7 id and no position or field data.
    pub fn new(
        project_id: ProjectId,
        scene: impl Into<String>,
        shot: impl Into<String>,
        take_number: i32,
        now: Timestamp,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7(),
            project_id,
            sequence_position: None,
            scene: scene.into(),
            shot: shot.into(),
            take_number,
            classification: Classification::None,
            data: FieldMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_position(mut self, position: i32) -> Self {
        self.sequence_position = Some(position);
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn group(&self) -> ShotGroup {
        ShotGroup::new(self.scene.clone(), self.shot.clone())
    }

    /// Whether this take belongs to `group`. Labels are compared trimmed,
    /// since hand-typed scene numbers often carry stray whitespace.
    pub fn in_group(&self, group: &ShotGroup) -> bool {
        self.scene.trim() == group.scene.trim() && self.shot.trim() == group.shot.trim()
    }

    /// Ordering used by every walk: position (absent sorts last), then take
    /// number, then creation time, then id.
    pub fn cmp_sequence(&self, other: &Self) -> Ordering {
        let position = |t: &Self| t.sequence_position.unwrap_or(i32::MAX);
        position(self)
            .cmp(&position(other))
            .then(self.take_number.cmp(&other.take_number))
            .then(self.created_at.cmp(&other.created_at))
            .then(self.id.cmp(&other.id))
    }
}

/// Collect `takes` into a vector sorted by [`TakeRecord::cmp_sequence`].
pub fn in_sequence<'a>(takes: impl IntoIterator<Item = &'a TakeRecord>) -> Vec<&'a TakeRecord> {
    let mut ordered: Vec<&TakeRecord> = takes.into_iter().collect();
    ordered.sort_by(|a, b| a.cmp_sequence(b));
    ordered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
