//! Column and table descriptors produced by a discovery pass.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::canonical::CanonicalType;

/// How a table is backed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableKind {
    /// Table whose storage the engine manages.
    BaseTable,
    /// Table mapped onto storage outside the engine.
    ExternalTable,
    View,
}

impl TableKind {
    /// Parse a table kind, accepting the common spellings engines use.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "base_table" | "base" | "table" | "managed_table" | "regular" => {
                Some(TableKind::BaseTable)
            }
            "external_table" | "external" => Some(TableKind::ExternalTable),
            "view" | "virtual_view" => Some(TableKind::View),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::BaseTable => "BASE_TABLE",
            TableKind::ExternalTable => "EXTERNAL_TABLE",
            TableKind::View => "VIEW",
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, TableKind::View)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values applied when a backend cannot report a column attribute.
///
/// Engines serving externally mapped storage have no NOT NULL constraints
/// and no identity columns, so by default every column is nullable and
/// nothing is auto-incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefaults {
    pub nullable: bool,
    pub autoincrement: bool,
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        Self {
            nullable: true,
            autoincrement: false,
        }
    }
}

/// A normalized column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub canonical_type: CanonicalType,
    /// The type string exactly as the backend reported it.
    pub native_type: String,
    pub nullable: bool,
    pub autoincrement: bool,
    pub comment: Option<String>,
    pub is_partition_column: bool,
    pub is_complex: bool,
}

/// A discovered table or view with its normalized columns.
///
/// Ordinary columns always precede partition columns and column names are
/// unique; the discovery pass is the only producer and upholds both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDescriptor>,
    pub view_definition: Option<String>,
    pub comment: Option<String>,
}

impl TableDescriptor {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Columns that are not partition columns, in order.
    pub fn ordinary_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.is_partition_column)
    }

    pub fn partition_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_partition_column)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// SHA-256 over the serialized descriptor.
    ///
    /// Two passes over an unchanged backend produce the same fingerprint, so
    /// a sink can skip republishing tables that did not change.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
