// ⚠️ Error types for report decoding, export and upload handling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    UnsupportedFile(String),

    #[error("Unknown report kind: {0}")]
    UnknownKind(String),

    #[error("No report loaded")]
    NoReport,

    #[error("Upstream analysis failed: {0}")]
    Upstream(String),
}

impl Error {
    /// True when the caller sent something we cannot use (as opposed to a
    /// failure on our side or upstream).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Json(_) | Error::UnsupportedFile(_) | Error::UnknownKind(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
