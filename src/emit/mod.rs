//! Metadata emitter boundary.
//!
//! Discovered tables leave the crate through a [`MetadataSink`]. The crate
//! ships a JSON-lines sink; catalog publishers implement the trait
//! themselves.

mod json_lines;

pub use json_lines::JsonLinesSink;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::discovery::{DiscoveryError, DiscoveryPass, DiscoveryReport};
use crate::model::TableDescriptor;
use crate::reflection::ReflectionAdapter;

/// Errors raised by a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A downstream catalog refused the table.
    #[error("rejected by sink: {0}")]
    Rejected(String),
}

/// Errors from [`publish_all`].
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to publish {table}: {source}")]
    Sink {
        table: String,
        #[source]
        source: SinkError,
    },
}

/// Consumer of discovered tables.
#[async_trait]
pub trait MetadataSink: Send {
    async fn publish(&mut self, table: &TableDescriptor) -> Result<(), SinkError>;

    /// Called once after the last table of a pass.
    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Collects descriptors in memory.
#[async_trait]
impl MetadataSink for Vec<TableDescriptor> {
    async fn publish(&mut self, table: &TableDescriptor) -> Result<(), SinkError> {
        self.push(table.clone());
        Ok(())
    }
}

/// Drain a pass into a sink, returning the pass report.
///
/// Stops at the first sink error; tables already published stay published.
pub async fn publish_all<A, S>(
    mut pass: DiscoveryPass<'_, A>,
    sink: &mut S,
) -> Result<DiscoveryReport, PublishError>
where
    A: ReflectionAdapter + ?Sized,
    S: MetadataSink + ?Sized,
{
    while let Some(table) = pass.next_table().await {
        let table = table?;
        debug!(table = %table.full_name(), "publishing table");
        sink.publish(&table)
            .await
            .map_err(|source| PublishError::Sink {
                table: table.full_name(),
                source,
            })?;
    }

    sink.flush().await.map_err(|source| PublishError::Sink {
        table: pass.schema().to_string(),
        source,
    })?;

    Ok(pass.into_report())
}
