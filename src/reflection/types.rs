//! Raw rows returned by a reflection adapter, before normalization.

use serde::{Deserialize, Serialize};

use crate::model::TableKind;

/// One entry of `list_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub kind: TableKind,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One entry of `list_columns`.
///
/// `nullable` and `autoincrement` are `None` when the backend has no way to
/// express them; the discovery pass fills them from
/// [`ColumnDefaults`](crate::model::ColumnDefaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub native_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_partition_column: bool,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub autoincrement: Option<bool>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            comment: None,
            is_partition_column: false,
            nullable: None,
            autoincrement: None,
        }
    }

    /// Mark the column as a partition key.
    pub fn partition(mut self) -> Self {
        self.is_partition_column = true;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }
}
