//! Scripted reflection backend shared by the discovery tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use schemascope::model::TableKind;
use schemascope::reflection::{AdapterError, AdapterResult, RawColumn, RawTable, ReflectionAdapter};

/// How a table answers `list_columns`.
pub enum Columns {
    Rows(Vec<RawColumn>),
    /// Fails like a dropped connection.
    Unreachable,
    /// Fails like a missing grant.
    Denied,
    /// Never answers.
    Hang,
}

/// How a view answers `get_view_definition`.
pub enum Definition {
    Text(String),
    Missing,
    Fails,
}

/// A backend whose every answer is set up by the test.
#[derive(Default)]
pub struct ScriptedAdapter {
    schemas: Vec<String>,
    tables: HashMap<String, Vec<RawTable>>,
    columns: HashMap<String, Columns>,
    definitions: HashMap<String, Definition>,
    unlistable: Vec<String>,
    column_calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, schema: &str, name: &str, columns: Columns) -> Self {
        self.add(schema, RawTable::new(name, TableKind::BaseTable));
        self.columns.insert(key(schema, name), columns);
        self
    }

    pub fn view(mut self, schema: &str, name: &str, definition: Definition) -> Self {
        self.add(schema, RawTable::new(name, TableKind::View));
        self.columns.insert(
            key(schema, name),
            Columns::Rows(vec![RawColumn::new("id", "bigint")]),
        );
        self.definitions.insert(key(schema, name), definition);
        self
    }

    /// A schema whose table list cannot be read.
    pub fn unlistable(mut self, schema: &str) -> Self {
        self.schemas.push(schema.to_string());
        self.unlistable.push(schema.to_string());
        self
    }

    pub fn column_calls(&self) -> usize {
        self.column_calls.load(Ordering::SeqCst)
    }

    fn add(&mut self, schema: &str, table: RawTable) {
        if !self.schemas.iter().any(|s| s == schema) {
            self.schemas.push(schema.to_string());
        }
        self.tables.entry(schema.to_string()).or_default().push(table);
    }
}

fn key(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

#[async_trait]
impl ReflectionAdapter for ScriptedAdapter {
    fn backend(&self) -> &str {
        "scripted"
    }

    async fn list_schemas(&self) -> AdapterResult<Vec<String>> {
        Ok(self.schemas.clone())
    }

    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>> {
        if self.unlistable.iter().any(|s| s == schema) {
            return Err(AdapterError::connectivity("scripted", "connection reset"));
        }
        Ok(self.tables.get(schema).cloned().unwrap_or_default())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>> {
        self.column_calls.fetch_add(1, Ordering::SeqCst);
        match self.columns.get(&key(schema, table)) {
            Some(Columns::Rows(rows)) => Ok(rows.clone()),
            Some(Columns::Unreachable) => {
                Err(AdapterError::connectivity("scripted", "connection reset"))
            }
            Some(Columns::Denied) => Err(AdapterError::PermissionDenied(key(schema, table))),
            Some(Columns::Hang) => std::future::pending().await,
            None => Err(AdapterError::NotFound(key(schema, table))),
        }
    }

    async fn get_view_definition(
        &self,
        schema: &str,
        view: &str,
    ) -> AdapterResult<Option<String>> {
        match self.definitions.get(&key(schema, view)) {
            Some(Definition::Text(text)) => Ok(Some(text.clone())),
            Some(Definition::Fails) => Err(AdapterError::Query("SHOW CREATE VIEW failed".into())),
            Some(Definition::Missing) | None => Ok(None),
        }
    }
}
