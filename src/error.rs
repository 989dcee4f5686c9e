// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the calibration toolkit.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for calibration operations.
pub type Result<T> = std::result::Result<T, CalibError>;

/// Main error type for the calibration toolkit.
#[derive(Debug)]
pub enum CalibError {
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// A label table contained a value that failed to parse as a number.
    ParseError(String),
    /// A label table row does not match the `5 + 3 * point_count` layout.
    SchemaMismatch {
        /// File that failed the shape check.
        path: PathBuf,
        /// Expected number of columns.
        expected: usize,
        /// Number of columns actually found.
        actual: usize,
    },
    /// Threshold report file missing or unusable.
    ReportError(String),
}

impl fmt::Display for CalibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::SchemaMismatch {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Schema mismatch in {}: expected {expected} columns, got {actual}",
                path.display()
            ),
            Self::ReportError(msg) => write!(f, "Report error: {msg}"),
        }
    }
}

impl std::error::Error for CalibError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CalibError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
