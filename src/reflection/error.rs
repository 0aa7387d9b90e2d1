//! Reflection adapter error types.

use std::io;
use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors a backend can raise while reflecting its metadata.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The backend could not be reached or dropped the connection.
    #[error("connection to {backend} failed: {message}")]
    Connectivity { backend: String, message: String },

    /// The request did not complete in time.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The credentials lack access to the object.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The metadata query itself failed.
    #[error("query failed: {0}")]
    Query(String),

    /// The schema or table does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Failed to read a catalog snapshot.
    #[error("failed to read snapshot: {0}")]
    SnapshotRead(#[source] io::Error),

    /// Failed to parse a catalog snapshot.
    #[error("failed to parse snapshot: {0}")]
    SnapshotParse(#[source] serde_json::Error),
}

impl AdapterError {
    /// Create a connectivity error for a backend.
    pub fn connectivity(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connectivity {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the backend itself is unreachable, as
    /// opposed to one object being unreadable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Timeout(_))
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        self.is_connectivity()
    }
}

impl From<io::Error> for AdapterError {
    fn from(err: io::Error) -> Self {
        Self::SnapshotRead(err)
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::SnapshotParse(err)
    }
}
