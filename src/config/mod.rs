//! Configuration module for schemascope.
//!
//! Handles source definitions, discovery knobs, and environment variable
//! expansion.

mod settings;
mod source;

pub use settings::{
    expand_env_vars, DiscoverySettings, FilterSettings, NormalizerSettings, Settings,
    SettingsError,
};
pub use source::{SourceKind, SourceSettings};
