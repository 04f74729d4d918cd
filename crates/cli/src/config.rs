use std::path::PathBuf;

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "slate-data.json";

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; everything else is plain text.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// CLI configuration loaded from environment variables.
///
/// A `.env` file in the working directory is read first, so either works
/// for local use.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// JSON file holding every project and take.
    pub data_file: PathBuf,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default            |
    /// |--------------------|--------------------|
    /// | `SLATE_DATA_FILE`  | `slate-data.json`  |
    /// | `SLATE_LOG_FORMAT` | `text`             |
    ///
    /// Log filtering itself follows `RUST_LOG`.
    pub fn from_env() -> Self {
        let data_file = std::env::var("SLATE_DATA_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.into());

        let log_format = std::env::var("SLATE_LOG_FORMAT")
            .map(|s| LogFormat::from_label(&s))
            .unwrap_or_default();

        Self {
            data_file: PathBuf::from(data_file),
            log_format,
        }
    }
}
