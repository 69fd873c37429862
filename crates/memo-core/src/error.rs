//! Error types for memo-core

use thiserror::Error;

/// Result type alias using memo-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in memo-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note or folder not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the underlying storage failed (disk, permissions, corrupt data).
    ///
    /// These are never retried by the core and must reach the user.
    pub const fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::LibSql(_) | Self::Io(_) | Self::Serialization(_)
        )
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Short, dismissible message suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "This memo no longer exists.".to_string(),
            Self::InvalidInput(reason) => reason.clone(),
            Self::Database(_) | Self::LibSql(_) | Self::Io(_) | Self::Serialization(_) => {
                "Your changes could not be saved. Please try again.".to_string()
            }
        }
    }
}
