//! # schemascope
//!
//! Backend-agnostic schema discovery with column type normalization.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        ReflectionAdapter (one per backend engine)        │
//! │   list_schemas / list_tables / list_columns / views      │
//! └─────────────────────────────────────────────────────────┘
//!                          │ raw rows
//!                          ▼ [discovery]
//! ┌─────────────────────────────────────────────────────────┐
//! │          DiscoveryPass (pull, one table at a time)       │
//! │          + TypeNormalizer (native -> canonical)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │ TableDescriptor
//!                          ▼ [emit]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     MetadataSink                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod model;
pub mod normalize;
pub mod reflection;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::CachedAdapter;
    pub use crate::discovery::{
        Discoverer, DiscoveryError, DiscoveryOptions, DiscoveryPass, DiscoveryReport,
        DiscoveryResult, FilterPattern, SchemaInventory,
    };
    pub use crate::emit::{publish_all, JsonLinesSink, MetadataSink};
    pub use crate::model::{
        CanonicalType, ColumnDefaults, ColumnDescriptor, TableDescriptor, TableKind, TypeKind,
    };
    pub use crate::normalize::{normalize_type, MalformedPolicy, TypeIssue, TypeNormalizer};
    pub use crate::reflection::{
        AdapterError, AdapterResult, RawColumn, RawTable, ReflectionAdapter, SnapshotAdapter,
    };
}

// Also export at crate root for convenience
pub use discovery::{Discoverer, DiscoveryPass};
pub use model::{CanonicalType, TableDescriptor};
pub use normalize::normalize_type;
pub use reflection::ReflectionAdapter;
