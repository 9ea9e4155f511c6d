//! Error types for cubby

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in store operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {file_id}/{name}")]
    NotFound { file_id: String, name: String },

    #[error("Invalid file id: {0}")]
    InvalidId(String),
}

impl Error {
    /// True if this is the typed absence of a stored file, as opposed to an
    /// unexpected filesystem failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
