use slate_core::error::CoreError;

/// Error type for store operations.
///
/// Wraps [`CoreError`] for domain errors and adds snapshot I/O variants.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error from `slate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Convenience alias for store return values.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Core(CoreError::Validation(errors.to_string()))
    }
}
