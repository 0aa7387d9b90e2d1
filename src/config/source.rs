//! Reflection source configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::{expand_env_vars, SettingsError};
use crate::reflection::{ReflectionAdapter, SnapshotAdapter};

/// Supported source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A catalog snapshot file read by [`SnapshotAdapter`].
    Snapshot,
}

impl SourceKind {
    /// Parse a source kind from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "snapshot" | "json" | "catalog_snapshot" => Ok(SourceKind::Snapshot),
            other => Err(SettingsError::UnsupportedSource(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Snapshot => "snapshot",
        }
    }
}

/// One `[sources.<name>]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSettings {
    /// Source kind (snapshot).
    pub kind: String,

    /// Snapshot file path (supports ${ENV_VAR} expansion).
    #[serde(default)]
    pub path: Option<String>,
}

impl SourceSettings {
    pub fn source_kind(&self) -> Result<SourceKind, SettingsError> {
        SourceKind::from_str(&self.kind)
    }

    /// Get the path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self.path.as_deref().ok_or_else(|| {
            SettingsError::InvalidConfig(format!("{} source requires a path", self.kind))
        })?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }

    /// Build the adapter this source describes.
    pub fn open(&self) -> Result<Box<dyn ReflectionAdapter>, SettingsError> {
        match self.source_kind()? {
            SourceKind::Snapshot => {
                let adapter = SnapshotAdapter::from_path(self.resolved_path()?)?;
                Ok(Box::new(adapter))
            }
        }
    }
}
