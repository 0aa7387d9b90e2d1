//! Canonical types and the descriptors a discovery pass hands to a sink.

pub mod canonical;
pub mod descriptor;

pub use canonical::{CanonicalType, TypeKind};
pub use descriptor::{ColumnDefaults, ColumnDescriptor, TableDescriptor, TableKind};
