//! In-memory reflection cache.
//!
//! Backends are often asked for the same table from several code paths
//! during one pass. [`CachedAdapter`] wraps any [`ReflectionAdapter`] and
//! memoizes successful answers.
//!
//! # Design
//!
//! - Simple key-value map of reflection results, shared across tasks
//! - Only successes are cached; an error is retried on the next call
//! - No TTL - entries live until [`CachedAdapter::clear`] or an
//!   `invalidate_*` call. Reusing one wrapper across passes is the owner's
//!   decision, as is any staleness that follows
//!
//! # Key Format
//!
//! ```text
//! schemas                     -> [schema, ...]
//! tables:{schema}             -> [RawTable, ...]
//! columns:{schema}.{table}    -> [RawColumn, ...]
//! view:{schema}.{view}        -> Option<String>
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use crate::reflection::{AdapterResult, RawColumn, RawTable, ReflectionAdapter};

/// A cached reflection answer.
#[derive(Debug, Clone)]
enum CachedValue {
    Schemas(Vec<String>),
    Tables(Vec<RawTable>),
    Columns(Vec<RawColumn>),
    ViewDefinition(Option<String>),
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in the cache.
    pub entry_count: usize,
    /// Calls answered from the cache.
    pub hits: u64,
    /// Calls forwarded to the wrapped adapter.
    pub misses: u64,
}

/// Helper for generating cache keys.
pub struct CacheKey;

impl CacheKey {
    /// Key for list of schemas.
    pub fn schemas() -> String {
        "schemas".to_string()
    }

    /// Key for list of tables in a schema.
    pub fn tables(schema: &str) -> String {
        format!("tables:{}", schema)
    }

    /// Key for the columns of a table.
    pub fn columns(schema: &str, table: &str) -> String {
        format!("columns:{}.{}", schema, table)
    }

    /// Key for a view definition.
    pub fn view_definition(schema: &str, view: &str) -> String {
        format!("view:{}.{}", schema, view)
    }
}

/// ReflectionAdapter wrapper that memoizes successful calls.
///
/// # Example
///
/// ```ignore
/// let adapter = CachedAdapter::new(SnapshotAdapter::from_path("catalog.json")?);
/// let first = adapter.list_columns("sales", "orders").await?;
/// let second = adapter.list_columns("sales", "orders").await?; // from cache
/// assert_eq!(adapter.stats().hits, 1);
/// ```
pub struct CachedAdapter<A> {
    inner: A,
    entries: DashMap<String, CachedValue>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A: ReflectionAdapter> CachedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwrap, dropping every cached entry.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop the entries of one table (columns and view definition).
    pub fn invalidate_table(&self, schema: &str, table: &str) {
        self.entries.remove(&CacheKey::columns(schema, table));
        self.entries.remove(&CacheKey::view_definition(schema, table));
    }

    /// Drop the table list of a schema and every entry of its tables.
    pub fn invalidate_schema(&self, schema: &str) {
        let columns_prefix = format!("columns:{}.", schema);
        let view_prefix = format!("view:{}.", schema);
        self.entries.remove(&CacheKey::tables(schema));
        self.entries
            .retain(|key, _| !key.starts_with(&columns_prefix) && !key.starts_with(&view_prefix));
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &str) -> Option<CachedValue> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        match value {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key, "reflection cache hit");
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn store(&self, key: String, value: CachedValue) {
        self.entries.insert(key, value);
    }
}

#[async_trait]
impl<A: ReflectionAdapter> ReflectionAdapter for CachedAdapter<A> {
    fn backend(&self) -> &str {
        self.inner.backend()
    }

    async fn list_schemas(&self) -> AdapterResult<Vec<String>> {
        let key = CacheKey::schemas();
        if let Some(CachedValue::Schemas(schemas)) = self.lookup(&key) {
            return Ok(schemas);
        }

        let schemas = self.inner.list_schemas().await?;
        self.store(key, CachedValue::Schemas(schemas.clone()));
        Ok(schemas)
    }

    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>> {
        let key = CacheKey::tables(schema);
        if let Some(CachedValue::Tables(tables)) = self.lookup(&key) {
            return Ok(tables);
        }

        let tables = self.inner.list_tables(schema).await?;
        self.store(key, CachedValue::Tables(tables.clone()));
        Ok(tables)
    }

    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>> {
        let key = CacheKey::columns(schema, table);
        if let Some(CachedValue::Columns(columns)) = self.lookup(&key) {
            return Ok(columns);
        }

        let columns = self.inner.list_columns(schema, table).await?;
        self.store(key, CachedValue::Columns(columns.clone()));
        Ok(columns)
    }

    async fn get_view_definition(
        &self,
        schema: &str,
        view: &str,
    ) -> AdapterResult<Option<String>> {
        let key = CacheKey::view_definition(schema, view);
        if let Some(CachedValue::ViewDefinition(definition)) = self.lookup(&key) {
            return Ok(definition);
        }

        let definition = self.inner.get_view_definition(schema, view).await?;
        self.store(key, CachedValue::ViewDefinition(definition.clone()));
        Ok(definition)
    }
}
