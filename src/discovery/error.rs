//! Discovery error types.

use thiserror::Error;

use crate::reflection::AdapterError;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Failures that end a discovery pass.
///
/// Problems confined to one table or column never surface here; they are
/// logged and recorded in the [`DiscoveryReport`](super::DiscoveryReport).
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The schema list could not be read.
    #[error("failed to list schemas: {0}")]
    ListSchemas(#[source] AdapterError),

    /// The table list of a schema could not be read.
    #[error("failed to list tables in schema {schema}: {source}")]
    ListTables {
        schema: String,
        #[source]
        source: AdapterError,
    },

    /// Too many tables in a row failed with connectivity errors.
    #[error("lost connection while discovering schema {schema} ({failures} consecutive table failures): {source}")]
    ConnectivityLost {
        schema: String,
        failures: usize,
        #[source]
        source: AdapterError,
    },

    /// A schema or table filter is not a valid regular expression.
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl DiscoveryError {
    /// Check if the failure came from losing the backend.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::ListSchemas(source) | Self::ListTables { source, .. } => source.is_connectivity(),
            Self::ConnectivityLost { .. } => true,
            Self::InvalidPattern { .. } => false,
        }
    }
}
