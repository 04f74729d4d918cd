/// Stable identifier of a take record.
pub type TakeId = uuid::Uuid;

/// Identifier of a project.
pub type ProjectId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
