//! TOML-based configuration for schemascope.
//!
//! Supports a config file (schemascope.toml) with environment variable
//! expansion in source paths.
//!
//! Example configuration:
//! ```toml
//! [sources.warehouse]
//! kind = "snapshot"
//! path = "${CATALOG_DIR}/warehouse.json"
//!
//! [discovery]
//! schemas = ["sales"]          # empty = every schema
//! include_views = true
//! max_consecutive_failures = 10  # 0 = no early abort
//! cache = true
//!
//! [discovery.table_filter]
//! excludes = ["^tmp_"]
//!
//! [normalizer]
//! malformed_arguments = "lenient"  # or "reject"
//!
//! [columns]
//! nullable = true
//! autoincrement = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::source::SourceSettings;
use crate::cache::CachedAdapter;
use crate::discovery::{DiscoveryError, DiscoveryOptions, FilterPattern};
use crate::model::ColumnDefaults;
use crate::normalize::MalformedPolicy;
use crate::reflection::{AdapterError, ReflectionAdapter};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Unsupported source kind: {0}")]
    UnsupportedSource(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] DiscoveryError),

    #[error("Failed to open source: {0}")]
    OpenSource(#[from] AdapterError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named reflection sources.
    pub sources: HashMap<String, SourceSettings>,

    pub discovery: DiscoverySettings,

    pub normalizer: NormalizerSettings,

    /// Column attributes applied when a backend cannot report them.
    pub columns: ColumnDefaults,
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Schemas to discover; empty means every schema the filter admits.
    pub schemas: Vec<String>,

    pub include_tables: bool,

    pub include_views: bool,

    /// Consecutive connectivity failures before a schema is abandoned.
    /// Zero disables the check.
    pub max_consecutive_failures: usize,

    /// Wrap sources in the in-memory reflection cache.
    pub cache: bool,

    pub schema_filter: FilterSettings,

    pub table_filter: FilterSettings,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            include_tables: true,
            include_views: true,
            max_consecutive_failures: 10,
            cache: true,
            schema_filter: FilterSettings::default(),
            table_filter: FilterSettings::default(),
        }
    }
}

/// Include/exclude regular expressions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterSettings {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl FilterSettings {
    pub fn compile(&self) -> Result<FilterPattern, SettingsError> {
        Ok(FilterPattern::new(&self.includes, &self.excludes)?)
    }
}

/// Type normalizer configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerSettings {
    pub malformed_arguments: MalformedPolicy,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading settings");
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMASCOPE_CONFIG`
    /// 2. `./schemascope.toml`
    /// 3. `~/.config/schemascope/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SCHEMASCOPE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("schemascope.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schemascope").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Get a source by name.
    pub fn get_source(&self, name: &str) -> Result<&SourceSettings, SettingsError> {
        self.sources
            .get(name)
            .ok_or_else(|| SettingsError::SourceNotFound(name.to_string()))
    }

    /// Get the default source ("default" if defined, else the first by name).
    pub fn default_source(&self) -> Option<(&str, &SourceSettings)> {
        if let Some(source) = self.sources.get("default") {
            return Some(("default", source));
        }
        self.sources
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Open a named source, wrapped in the reflection cache when enabled.
    pub fn open_source(&self, name: &str) -> Result<Box<dyn ReflectionAdapter>, SettingsError> {
        let adapter = self.get_source(name)?.open()?;
        if self.discovery.cache {
            return Ok(Box::new(CachedAdapter::new(adapter)));
        }
        Ok(adapter)
    }

    /// Build discovery options from the `[discovery]`, `[normalizer]` and
    /// `[columns]` tables.
    pub fn discovery_options(&self) -> Result<DiscoveryOptions, SettingsError> {
        let discovery = &self.discovery;
        let limit = match discovery.max_consecutive_failures {
            0 => None,
            n => Some(n),
        };

        Ok(DiscoveryOptions::default()
            .with_schema_filter(discovery.schema_filter.compile()?)
            .with_table_filter(discovery.table_filter.compile()?)
            .with_tables(discovery.include_tables)
            .with_views(discovery.include_views)
            .with_column_defaults(self.columns)
            .with_malformed_policy(self.normalizer.malformed_arguments)
            .with_max_consecutive_failures(limit))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            if chars.next_if_eq(&'}').is_none() {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated variable in '{}'",
                    s
                )));
            }
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
