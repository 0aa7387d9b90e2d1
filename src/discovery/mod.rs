//! Discovery orchestrator.
//!
//! Drives a [`ReflectionAdapter`] table by table and turns its raw rows into
//! [`TableDescriptor`](crate::model::TableDescriptor)s.
//!
//! # Flow
//!
//! ```text
//! Discoverer::discover("sales")
//!        │
//!        ▼
//! DiscoveryPass ── next_table() ──► list_tables   (once, sorted, filtered)
//!        │                              │
//!        │                              ▼
//!        │                         list_columns   ──► TypeNormalizer
//!        │                              │
//!        │                              ▼
//!        │                     get_view_definition (views only)
//!        │                              │
//!        ▼                              ▼
//! DiscoveryReport  ◄── skipped / degraded / dropped ── TableDescriptor
//! ```
//!
//! # Example
//!
//! ```
//! use schemascope::discovery::Discoverer;
//! use schemascope::reflection::SnapshotAdapter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let adapter = SnapshotAdapter::from_json(r#"{"schemas": [{"name": "sales", "tables": [
//!     {"name": "orders", "columns": [{"name": "id", "type": "bigint"}]}
//! ]}]}"#).unwrap();
//!
//! let discoverer = Discoverer::new(adapter);
//! let inventory = discoverer.discover("sales").collect().await.unwrap();
//! assert_eq!(inventory.tables[0].full_name(), "sales.orders");
//! # }
//! ```

mod error;
mod options;
mod pass;
mod report;

pub use error::{DiscoveryError, DiscoveryResult};
pub use options::{DiscoveryOptions, FilterPattern};
pub use pass::{DiscoveryPass, SchemaInventory};
pub use report::{
    ColumnIssue, DiscoveryReport, DropReason, DroppedColumn, MissingViewDefinition, SkippedTable,
};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::reflection::ReflectionAdapter;

/// A schema whose pass ended in an error.
#[derive(Debug)]
pub struct SchemaFailure {
    pub schema: String,
    pub error: DiscoveryError,
}

/// Result of [`Discoverer::discover_all`].
#[derive(Debug, Default)]
pub struct DatabaseInventory {
    pub schemas: Vec<SchemaInventory>,
    pub failures: Vec<SchemaFailure>,
}

impl DatabaseInventory {
    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Entry point for discovering schemas through an adapter.
pub struct Discoverer<A> {
    adapter: A,
    options: DiscoveryOptions,
    cancel: CancellationToken,
}

impl<A: ReflectionAdapter> Discoverer<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            options: DiscoveryOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop every pass, current and future, when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this discoverer's passes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// List schemas that pass the schema filter, sorted by name.
    pub async fn list_schemas(&self) -> DiscoveryResult<Vec<String>> {
        let mut schemas = self
            .adapter
            .list_schemas()
            .await
            .map_err(DiscoveryError::ListSchemas)?;

        schemas.sort();
        schemas.dedup();
        schemas.retain(|schema| self.options.schema_filter.matches(schema));
        Ok(schemas)
    }

    /// Start a pass over one schema. Nothing is read until the first pull.
    pub fn discover(&self, schema: &str) -> DiscoveryPass<'_, A> {
        DiscoveryPass::new(&self.adapter, &self.options, self.cancel.clone(), schema)
    }

    /// Discover every schema that passes the schema filter.
    ///
    /// A schema-level failure is recorded and the next schema is tried,
    /// except for a lost connection, which stops the walk.
    pub async fn discover_all(&self) -> DiscoveryResult<DatabaseInventory> {
        let schemas = self.list_schemas().await?;
        info!(
            backend = self.adapter.backend(),
            schemas = schemas.len(),
            "discovering database"
        );

        let mut inventory = DatabaseInventory::default();
        for schema in schemas {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.discover(&schema).collect().await {
                Ok(schema_inventory) => inventory.schemas.push(schema_inventory),
                Err(error) => {
                    warn!(schema = %schema, error = %error, "schema discovery failed");
                    let connectivity_lost = matches!(error, DiscoveryError::ConnectivityLost { .. });
                    inventory.failures.push(SchemaFailure { schema, error });
                    if connectivity_lost {
                        break;
                    }
                }
            }
        }

        Ok(inventory)
    }
}
