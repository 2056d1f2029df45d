use crate::record::RecordId;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PharmaTrackError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record not found: {id}")]
    NotFound { id: RecordId },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No data to export")]
    NothingToExport,

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse error category, as surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input the user can correct.
    Validation,
    /// The referenced record no longer exists.
    NotFound,
    /// Storage unavailable or a write failed.
    Persistence,
    /// Bad or unreadable configuration.
    Config,
}

impl PharmaTrackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PharmaTrackError::Validation(_) => ErrorKind::Validation,
            PharmaTrackError::NotFound { .. } => ErrorKind::NotFound,
            PharmaTrackError::Sqlite(_)
            | PharmaTrackError::Io(_)
            | PharmaTrackError::Csv(_)
            | PharmaTrackError::NothingToExport => ErrorKind::Persistence,
            PharmaTrackError::Yaml(_) | PharmaTrackError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, PharmaTrackError>;
