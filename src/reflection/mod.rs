//! Reflection adapter module.
//!
//! This module defines the capability interface every backend implements
//! to expose its structural metadata, plus a reference backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Discoverer / DiscoveryPass                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │  (trait calls only)
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      ReflectionAdapter                          │
//! │  - list_schemas()                                               │
//! │  - list_tables(schema)           -> [RawTable]                  │
//! │  - list_columns(schema, table)   -> [RawColumn]                 │
//! │  - get_view_definition(schema, view)                            │
//! └─────────────────────────────────────────────────────────────────┘
//!          │                         │                      │
//!          ▼                         ▼                      ▼
//!   SnapshotAdapter          CachedAdapter<A>        (engine connectors)
//! ```

mod adapter;
mod error;
mod snapshot;
mod types;

pub use adapter::ReflectionAdapter;
pub use error::{AdapterError, AdapterResult};
pub use snapshot::{CatalogSnapshot, SnapshotAdapter, SnapshotColumn, SnapshotSchema, SnapshotTable};
pub use types::{RawColumn, RawTable};
