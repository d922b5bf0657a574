//! Error type shared by the loader, config and report layers

use std::path::PathBuf;

/// Everything that can abort an operation.
///
/// Absent columns and empty filtered views are data states, not errors, so they
/// never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Spreadsheet not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read spreadsheet {}: {source}", path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Unknown dashboard '{0}'. Run 'evalmatrix dashboards' to list profiles.")]
    UnknownDashboard(String),

    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller supplied a bad value, as opposed to the data source failing
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::UnknownDashboard(_) | Error::UnknownEntity(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
