//! SnapshotAdapter: a reflection backend over a metastore snapshot.
//!
//! The snapshot is laid out the way a Hive/Glue style metastore stores
//! tables: ordinary columns and partition keys are separate lists, and a
//! view's definition is kept as the rows `SHOW CREATE VIEW` returns.
//!
//! ```json
//! {
//!   "backend": "athena",
//!   "default_table_kind": "EXTERNAL_TABLE",
//!   "schemas": [{
//!     "name": "sales",
//!     "tables": [{
//!       "name": "orders",
//!       "columns": [{"name": "id", "type": "bigint"}],
//!       "partition_keys": [{"name": "dt", "type": "string"}]
//!     }, {
//!       "name": "recent_orders",
//!       "kind": "VIEW",
//!       "view_definition": ["CREATE VIEW recent_orders AS", "SELECT * FROM orders"]
//!     }]
//!   }]
//! }
//! ```
//!
//! # Table kind policy
//!
//! A table without an explicit `kind` takes the snapshot's
//! `default_table_kind`, which is `EXTERNAL_TABLE` unless set. Engines that
//! only query externally mapped storage have no base tables, so their
//! snapshots leave the kind out.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adapter::ReflectionAdapter;
use super::error::{AdapterError, AdapterResult};
use super::types::{RawColumn, RawTable};
use crate::model::TableKind;

fn default_backend() -> String {
    "snapshot".to_string()
}

/// Root of a catalog snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Backend name reported in logs.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Kind for tables that do not state one.
    #[serde(default)]
    pub default_table_kind: Option<TableKind>,

    #[serde(default)]
    pub schemas: Vec<SnapshotSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSchema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<SnapshotTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub name: String,
    #[serde(default)]
    pub kind: Option<TableKind>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<SnapshotColumn>,
    #[serde(default)]
    pub partition_keys: Vec<SnapshotColumn>,
    /// Output rows of `SHOW CREATE VIEW`, one per line.
    #[serde(default)]
    pub view_definition: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
}

impl SnapshotColumn {
    fn to_raw(&self, is_partition_column: bool) -> RawColumn {
        RawColumn {
            name: self.name.clone(),
            native_type: self.data_type.clone(),
            comment: self.comment.clone(),
            is_partition_column,
            nullable: self.nullable,
            autoincrement: None,
        }
    }
}

/// ReflectionAdapter over an in-memory [`CatalogSnapshot`].
///
/// # Example
///
/// ```
/// use schemascope::reflection::SnapshotAdapter;
///
/// let adapter = SnapshotAdapter::from_json(r#"{"schemas": [{"name": "sales"}]}"#).unwrap();
/// assert_eq!(adapter.snapshot().schemas.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    snapshot: CatalogSnapshot,
}

impl SnapshotAdapter {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> AdapterResult<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    /// Load a snapshot from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> AdapterResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading catalog snapshot");
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn table_kind(&self, table: &SnapshotTable) -> TableKind {
        table
            .kind
            .or(self.snapshot.default_table_kind)
            .unwrap_or(TableKind::ExternalTable)
    }

    fn schema(&self, schema: &str) -> AdapterResult<&SnapshotSchema> {
        self.snapshot
            .schemas
            .iter()
            .find(|s| s.name == schema)
            .ok_or_else(|| AdapterError::NotFound(format!("schema {}", schema)))
    }

    fn table(&self, schema: &str, table: &str) -> AdapterResult<&SnapshotTable> {
        self.schema(schema)?
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| AdapterError::NotFound(format!("table {}.{}", schema, table)))
    }
}

#[async_trait]
impl ReflectionAdapter for SnapshotAdapter {
    fn backend(&self) -> &str {
        &self.snapshot.backend
    }

    async fn list_schemas(&self) -> AdapterResult<Vec<String>> {
        Ok(self.snapshot.schemas.iter().map(|s| s.name.clone()).collect())
    }

    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>> {
        Ok(self
            .schema(schema)?
            .tables
            .iter()
            .map(|t| RawTable {
                name: t.name.clone(),
                kind: self.table_kind(t),
                comment: t.comment.clone(),
            })
            .collect())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>> {
        let table = self.table(schema, table)?;

        let columns = table
            .columns
            .iter()
            .map(|c| c.to_raw(false))
            .chain(table.partition_keys.iter().map(|c| c.to_raw(true)))
            .collect();

        Ok(columns)
    }

    async fn get_view_definition(
        &self,
        schema: &str,
        view: &str,
    ) -> AdapterResult<Option<String>> {
        let Ok(table) = self.table(schema, view) else {
            return Ok(None);
        };

        if !self.table_kind(table).is_view() || table.view_definition.is_empty() {
            return Ok(None);
        }

        Ok(Some(table.view_definition.join("\n")))
    }
}
