//! Error types for SchemaParity

use std::path::PathBuf;
use thiserror::Error;

use crate::sources::SourceKind;

/// Result type for SchemaParity operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SchemaParity
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read {source_kind} from {}: {source}", path.display())]
    SourceReadError {
        source_kind: SourceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to {}: {source}", path.display())]
    ReportWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether the run can still complete after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::ReportWriteError { .. })
    }
}

/// Convert TOML deserialization errors to SchemaParity errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
