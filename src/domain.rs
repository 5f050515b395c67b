use derive_setters::Setters;
use polars::error::PolarsError;
use std::fmt;
use std::io::Error;

/// Column holding the row creation timestamp. It is never displayed and
/// drives the elapsed time derivation.
pub const CREATED_ON_COLUMN: &str = "createdon";

pub const ELAPSED_TIME_FIELD: &str = "elapsedtime";
pub const ELAPSED_TIME_LABEL: &str = "Elapsed Time";
pub const ELAPSED_TIME_MIN_WIDTH: u32 = 100;

// Returned by the duration formatter for NaN/infinite input.
pub const INVALID_DURATION: &str = "∅";
pub const NULL_VALUE: &str = "∅";

pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

#[derive(Debug)]
pub enum DVError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    MissingRecord(String),
    DuplicateColumn(String),
    DuplicateRecord(String),
    UnknownColumn(String),
}

impl fmt::Display for DVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DVError::IoError(e) => write!(f, "io error: {e}"),
            DVError::PolarsError(e) => write!(f, "polars error: {e}"),
            DVError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            DVError::FileNotFound => write!(f, "file not found"),
            DVError::PermissionDenied => write!(f, "permission denied"),
            DVError::UnknownFileType => write!(f, "unknown file type"),
            DVError::MissingRecord(id) => write!(f, "no record for id \"{id}\""),
            DVError::DuplicateColumn(name) => write!(f, "duplicate column \"{name}\""),
            DVError::DuplicateRecord(id) => write!(f, "record id \"{id}\" listed twice"),
            DVError::UnknownColumn(name) => write!(f, "unknown column \"{name}\""),
        }
    }
}

impl std::error::Error for DVError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DVError::IoError(e) => Some(e),
            DVError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for DVError {
    fn from(err: Error) -> Self {
        DVError::IoError(err)
    }
}

impl From<PolarsError> for DVError {
    fn from(err: PolarsError) -> Self {
        DVError::PolarsError(err)
    }
}

/// Settings of the `dsview` host. The projection itself has no knobs.
#[derive(Debug, Clone, Setters)]
pub struct ViewerConfig {
    /// Column providing record ids. Row numbers are used when unset.
    pub id_column: Option<String>,
    pub max_column_width: usize,
    /// Print at most this many rows.
    pub limit: Option<usize>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            id_column: None,
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_override_defaults() {
        let cfg = ViewerConfig::default()
            .id_column(Some("ticket".to_string()))
            .max_column_width(12);
        assert_eq!(cfg.id_column.as_deref(), Some("ticket"));
        assert_eq!(cfg.max_column_width, 12);
        assert_eq!(cfg.limit, None);
    }

    #[test]
    fn errors_render_the_offending_name() {
        let err = DVError::MissingRecord("r7".into());
        assert_eq!(err.to_string(), "no record for id \"r7\"");
        let err = DVError::DuplicateColumn("title".into());
        assert_eq!(err.to_string(), "duplicate column \"title\"");
    }
}
