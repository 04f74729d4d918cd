//! File-number channels: the project-wide sound roll and one roll per camera.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::take::FieldMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of cameras a project can be configured with.
pub const MAX_CAMERAS: u8 = 10;

/// Field key holding the sound file number.
pub const SOUND_FIELD: &str = "soundFile";

/// Field key prefix for camera file numbers.
pub const CAMERA_FIELD: &str = "cameraFile";

/// Suffix of the lower-bound companion field of a range.
pub const RANGE_FROM_SUFFIX: &str = "_from";

/// Suffix of the upper-bound companion field of a range.
pub const RANGE_TO_SUFFIX: &str = "_to";

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A sequence of file numbers maintained independently of the others.
///
/// Sound numbering runs across the whole project. Each camera's numbering
/// runs within a single scene/shot group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Channel {
    Sound,
    /// 1-based camera index.
    Camera(u8),
}

impl Channel {
    /// Build a camera channel, rejecting indices outside `1..=MAX_CAMERAS`.
    pub fn camera(index: u8) -> Result<Self, CoreError> {
        if index == 0 || index > MAX_CAMERAS {
            return Err(CoreError::Validation(format!(
                "Camera index must be between 1 and {MAX_CAMERAS}, got {index}"
            )));
        }
        Ok(Self::Camera(index))
    }

    /// Sound first, then every configured camera in index order.
    pub fn all_for(camera_count: u8) -> Vec<Self> {
        std::iter::once(Self::Sound)
            .chain((1..=camera_count.min(MAX_CAMERAS)).map(Self::Camera))
            .collect()
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, Self::Camera(_))
    }

    /// The field key this channel is stored under.
    ///
    /// Single-camera projects use the bare `cameraFile` key; multi-camera
    /// projects number every camera, including the first.
    pub fn field_key(&self, camera_count: u8) -> String {
        match self {
            Self::Sound => SOUND_FIELD.to_string(),
            Self::Camera(_) if camera_count <= 1 => CAMERA_FIELD.to_string(),
            Self::Camera(n) => format!("{CAMERA_FIELD}{n}"),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sound => f.write_str("sound"),
            Self::Camera(n) => write!(f, "camera:{n}"),
        }
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    /// Accepts `"sound"`, `"camera:<n>"`, and bare `"camera"` for camera 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("sound") {
            return Ok(Self::Sound);
        }
        if s.eq_ignore_ascii_case("camera") {
            return Ok(Self::Camera(1));
        }
        let index = s
            .strip_prefix("camera:")
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid channel '{s}'. Expected 'sound' or 'camera:<n>'"
                ))
            })?
            .parse::<u8>()
            .map_err(|_| CoreError::Validation(format!("Invalid camera index in '{s}'")))?;
        Self::camera(index)
    }
}

impl TryFrom<String> for Channel {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

/// Companion keys (`<key>_from`, `<key>_to`) holding a range's bounds.
pub fn range_keys(key: &str) -> (String, String) {
    (
        format!("{key}{RANGE_FROM_SUFFIX}"),
        format!("{key}{RANGE_TO_SUFFIX}"),
    )
}

/// Move camera 1's fields to the key used under `new_count` cameras.
///
/// Camera 1 is stored as `cameraFile` on single-camera projects and as
/// `cameraFile1` otherwise, so changing the camera count across that line
/// renames the main field and its range companions. A value already present
/// under the new key is kept. Returns whether anything moved.
pub fn migrate_camera_one_fields(data: &mut FieldMap, old_count: u8, new_count: u8) -> bool {
    let old_key = Channel::Camera(1).field_key(old_count);
    let new_key = Channel::Camera(1).field_key(new_count);
    if old_key == new_key {
        return false;
    }
    let (old_from, old_to) = range_keys(&old_key);
    let (new_from, new_to) = range_keys(&new_key);

    let mut moved = false;
    for (from, to) in [(old_key, new_key), (old_from, new_from), (old_to, new_to)] {
        if data.contains_key(&to) {
            continue;
        }
        if let Some(value) = data.remove(&from) {
            data.insert(to, value);
            moved = true;
        }
    }
    moved
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
