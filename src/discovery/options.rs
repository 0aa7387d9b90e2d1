//! Discovery options and name filters.

use regex::Regex;

use super::error::{DiscoveryError, DiscoveryResult};
use crate::model::ColumnDefaults;
use crate::normalize::MalformedPolicy;

/// Include/exclude regular expressions over object names.
///
/// A name passes when it matches no exclude and either there are no
/// includes or it matches at least one. Excludes win.
#[derive(Debug, Clone, Default)]
pub struct FilterPattern {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl FilterPattern {
    /// Compile a filter from pattern strings.
    pub fn new<I, E>(includes: I, excludes: E) -> DiscoveryResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    /// A filter that lets everything through.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.excludes.iter().any(|re| re.is_match(name)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(name))
    }
}

fn compile<I>(patterns: I) -> DiscoveryResult<Vec<Regex>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

/// Knobs for a discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Which schemas `discover_all` visits.
    pub schema_filter: FilterPattern,

    /// Which tables and views a pass yields.
    pub table_filter: FilterPattern,

    /// Yield base and external tables.
    pub include_tables: bool,

    /// Yield views.
    pub include_views: bool,

    /// Values for column attributes the backend cannot report.
    pub column_defaults: ColumnDefaults,

    /// Handling of unreadable type arguments.
    pub malformed_policy: MalformedPolicy,

    /// Abort the pass after this many consecutive tables fail with a
    /// connectivity error. `None` (or zero) never aborts.
    pub max_consecutive_failures: Option<usize>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            schema_filter: FilterPattern::allow_all(),
            table_filter: FilterPattern::allow_all(),
            include_tables: true,
            include_views: true,
            column_defaults: ColumnDefaults::default(),
            malformed_policy: MalformedPolicy::default(),
            max_consecutive_failures: Some(10),
        }
    }
}

impl DiscoveryOptions {
    pub fn with_table_filter(mut self, filter: FilterPattern) -> Self {
        self.table_filter = filter;
        self
    }

    pub fn with_schema_filter(mut self, filter: FilterPattern) -> Self {
        self.schema_filter = filter;
        self
    }

    pub fn with_column_defaults(mut self, defaults: ColumnDefaults) -> Self {
        self.column_defaults = defaults;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    pub fn with_max_consecutive_failures(mut self, limit: Option<usize>) -> Self {
        self.max_consecutive_failures = limit;
        self
    }

    pub fn with_views(mut self, include: bool) -> Self {
        self.include_views = include;
        self
    }

    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }
}
