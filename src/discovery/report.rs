//! Per-pass record of everything that was absorbed instead of failing.

use std::fmt;

use serde::Serialize;

use crate::normalize::TypeIssue;

/// A table that was left out of the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
    /// The failure looked like a lost connection rather than a bad table.
    pub connectivity: bool,
}

/// A column kept with a degraded or defaulted type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnIssue {
    pub table: String,
    pub column: String,
    pub issue: TypeIssue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// The type was rejected by [`MalformedPolicy::Reject`](crate::normalize::MalformedPolicy::Reject).
    Rejected { issue: TypeIssue },
    /// An earlier column already used the name.
    Duplicate,
}

/// A column left out of its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedColumn {
    pub table: String,
    pub column: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// A view yielded without its definition text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingViewDefinition {
    pub view: String,
    /// `None` when the backend simply had no definition.
    pub error: Option<String>,
}

/// Summary of one discovery pass over a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub schema: String,
    pub tables_discovered: usize,
    /// Tables left out by the kind toggles or the table filter.
    pub tables_filtered: usize,
    pub skipped_tables: Vec<SkippedTable>,
    pub degraded_columns: Vec<ColumnIssue>,
    pub dropped_columns: Vec<DroppedColumn>,
    pub missing_view_definitions: Vec<MissingViewDefinition>,
    pub cancelled: bool,
}

impl DiscoveryReport {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Default::default()
        }
    }

    /// True when nothing was skipped, degraded, dropped or missing.
    pub fn is_clean(&self) -> bool {
        self.skipped_tables.is_empty()
            && self.degraded_columns.is_empty()
            && self.dropped_columns.is_empty()
            && self.missing_view_definitions.is_empty()
            && !self.cancelled
    }
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} tables discovered, {} filtered, {} skipped, {} degraded columns, {} dropped columns, {} missing view definitions",
            self.schema,
            self.tables_discovered,
            self.tables_filtered,
            self.skipped_tables.len(),
            self.degraded_columns.len(),
            self.dropped_columns.len(),
            self.missing_view_definitions.len(),
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
