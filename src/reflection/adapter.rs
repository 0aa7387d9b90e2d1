//! ReflectionAdapter trait definition.
//!
//! The ReflectionAdapter trait is the one seam every backend plugs into.
//! The discovery pass depends on nothing else about a backend, so a new
//! engine is supported by implementing these four calls.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::AdapterResult;
use super::types::{RawColumn, RawTable};

/// Trait for reflecting a backend's structural metadata.
///
/// # Contract
///
/// - `list_columns` returns ordinary columns first and partition columns
///   after them, each group in the engine's natural order.
/// - `get_view_definition` returns `Ok(None)` when the view does not exist
///   or the definition query yields nothing. It never errors for "not
///   found".
/// - Implementations may cache per `(schema, table)` within one pass; any
///   staleness across passes is theirs to manage (see
///   [`CachedAdapter`](crate::cache::CachedAdapter)).
/// - Each backend documents how it assigns [`TableKind`](crate::model::TableKind)
///   when the engine has no notion of external tables.
///
/// # Example
///
/// ```ignore
/// use schemascope::reflection::ReflectionAdapter;
///
/// async fn example(adapter: &impl ReflectionAdapter) -> AdapterResult<()> {
///     for schema in adapter.list_schemas().await? {
///         for table in adapter.list_tables(&schema).await? {
///             let columns = adapter.list_columns(&schema, &table.name).await?;
///             println!("{}.{}: {} columns", schema, table.name, columns.len());
///         }
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ReflectionAdapter: Send + Sync {
    /// Backend identifier used in logs (e.g. "athena", "snapshot").
    fn backend(&self) -> &str;

    /// List all schemas (databases) the backend exposes.
    async fn list_schemas(&self) -> AdapterResult<Vec<String>>;

    /// List tables and views in a schema.
    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>>;

    /// List the columns of a table, partition columns last.
    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>>;

    /// Get the definition text of a view.
    async fn get_view_definition(&self, schema: &str, view: &str)
        -> AdapterResult<Option<String>>;
}

#[async_trait]
impl<A: ReflectionAdapter + ?Sized> ReflectionAdapter for Arc<A> {
    fn backend(&self) -> &str {
        (**self).backend()
    }

    async fn list_schemas(&self) -> AdapterResult<Vec<String>> {
        (**self).list_schemas().await
    }

    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>> {
        (**self).list_tables(schema).await
    }

    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>> {
        (**self).list_columns(schema, table).await
    }

    async fn get_view_definition(
        &self,
        schema: &str,
        view: &str,
    ) -> AdapterResult<Option<String>> {
        (**self).get_view_definition(schema, view).await
    }
}

#[async_trait]
impl<A: ReflectionAdapter + ?Sized> ReflectionAdapter for Box<A> {
    fn backend(&self) -> &str {
        (**self).backend()
    }

    async fn list_schemas(&self) -> AdapterResult<Vec<String>> {
        (**self).list_schemas().await
    }

    async fn list_tables(&self, schema: &str) -> AdapterResult<Vec<RawTable>> {
        (**self).list_tables(schema).await
    }

    async fn list_columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<RawColumn>> {
        (**self).list_columns(schema, table).await
    }

    async fn get_view_definition(
        &self,
        schema: &str,
        view: &str,
    ) -> AdapterResult<Option<String>> {
        (**self).get_view_definition(schema, view).await
    }
}
