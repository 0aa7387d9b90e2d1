//! DiscoveryPass: the pull-based walk over one schema.

use std::collections::HashSet;
use std::future::Future;
use std::vec;

use futures::stream::{self, Stream};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{DiscoveryError, DiscoveryResult};
use super::options::DiscoveryOptions;
use super::report::{
    ColumnIssue, DiscoveryReport, DropReason, DroppedColumn, MissingViewDefinition, SkippedTable,
};
use crate::model::{ColumnDescriptor, TableDescriptor};
use crate::normalize::TypeNormalizer;
use crate::reflection::{AdapterError, RawColumn, RawTable, ReflectionAdapter};

/// Every table of one schema plus the pass report.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInventory {
    pub schema: String,
    pub tables: Vec<TableDescriptor>,
    pub report: DiscoveryReport,
}

enum PassState {
    /// `list_tables` has not been called yet.
    Pending,
    Listed(vec::IntoIter<RawTable>),
    Done,
}

/// Outcome of assembling one table.
enum Step {
    Yield(TableDescriptor),
    Skipped,
    Cancelled,
    Abort(DiscoveryError),
}

/// A finite, non-restartable sequence of table descriptors.
///
/// Nothing is read from the backend until the first call to
/// [`next_table`](Self::next_table). Tables come out sorted by name. A table
/// whose columns cannot be read is skipped and recorded in the
/// [`report`](Self::report); the pass only ends early when the table list
/// cannot be read, when the backend looks unreachable, or when cancelled.
/// A schema in which every table failed to connect ends with
/// [`DiscoveryError::ConnectivityLost`] even below the failure limit.
pub struct DiscoveryPass<'a, A: ?Sized> {
    adapter: &'a A,
    options: &'a DiscoveryOptions,
    normalizer: TypeNormalizer,
    cancel: CancellationToken,
    schema: String,
    state: PassState,
    report: DiscoveryReport,
    consecutive_failures: usize,
    /// Most recent connectivity error, kept for an all-unreachable schema.
    last_connectivity_error: Option<AdapterError>,
}

impl<'a, A: ReflectionAdapter + ?Sized> DiscoveryPass<'a, A> {
    pub(crate) fn new(
        adapter: &'a A,
        options: &'a DiscoveryOptions,
        cancel: CancellationToken,
        schema: &str,
    ) -> Self {
        Self {
            adapter,
            options,
            normalizer: TypeNormalizer::new(options.malformed_policy),
            cancel,
            schema: schema.to_string(),
            state: PassState::Pending,
            report: DiscoveryReport::new(schema),
            consecutive_failures: 0,
            last_connectivity_error: None,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// What has been absorbed so far.
    pub fn report(&self) -> &DiscoveryReport {
        &self.report
    }

    pub fn into_report(self) -> DiscoveryReport {
        self.report
    }

    /// Produce the next table descriptor.
    ///
    /// Returns `None` once the schema is exhausted or the pass was
    /// cancelled. After an `Err` the pass is finished.
    pub async fn next_table(&mut self) -> Option<DiscoveryResult<TableDescriptor>> {
        loop {
            if matches!(self.state, PassState::Done) {
                return None;
            }

            if self.cancel.is_cancelled() {
                self.mark_cancelled();
                return None;
            }

            if matches!(self.state, PassState::Pending) {
                if let Err(err) = self.list().await {
                    return Some(Err(err));
                }
                continue;
            }

            let next = match &mut self.state {
                PassState::Listed(tables) => tables.next(),
                _ => return None,
            };

            let Some(raw) = next else {
                if let Some(err) = self.unreachable() {
                    self.state = PassState::Done;
                    return Some(Err(err));
                }
                self.finish();
                return None;
            };

            match self.assemble(raw).await {
                Step::Yield(table) => return Some(Ok(table)),
                Step::Skipped => continue,
                Step::Cancelled => {
                    self.mark_cancelled();
                    return None;
                }
                Step::Abort(err) => {
                    self.state = PassState::Done;
                    return Some(Err(err));
                }
            }
        }
    }

    /// Adapt the pass into a [`Stream`]. The report is dropped with it; use
    /// [`next_table`](Self::next_table) or [`collect`](Self::collect) when it
    /// matters.
    pub fn into_stream(self) -> impl Stream<Item = DiscoveryResult<TableDescriptor>> + 'a {
        stream::unfold(self, |mut pass| async move {
            let item = pass.next_table().await?;
            Some((item, pass))
        })
    }

    /// Drain the pass.
    pub async fn collect(mut self) -> DiscoveryResult<SchemaInventory> {
        let mut tables = Vec::new();
        while let Some(table) = self.next_table().await {
            tables.push(table?);
        }

        Ok(SchemaInventory {
            schema: self.schema,
            tables,
            report: self.report,
        })
    }

    async fn list(&mut self) -> DiscoveryResult<()> {
        info!(
            schema = %self.schema,
            backend = self.adapter.backend(),
            "discovering schema"
        );

        let listed = cancellable(&self.cancel, self.adapter.list_tables(&self.schema)).await;
        match listed {
            None => {
                self.mark_cancelled();
                Ok(())
            }
            Some(Ok(tables)) => {
                let tables = self.select_tables(tables);
                debug!(schema = %self.schema, tables = tables.len(), "listed tables");
                self.state = PassState::Listed(tables.into_iter());
                Ok(())
            }
            Some(Err(source)) => {
                warn!(schema = %self.schema, error = %source, "failed to list tables");
                self.state = PassState::Done;
                Err(DiscoveryError::ListTables {
                    schema: self.schema.clone(),
                    source,
                })
            }
        }
    }

    /// Sort, de-duplicate and filter the raw table list.
    fn select_tables(&mut self, mut tables: Vec<RawTable>) -> Vec<RawTable> {
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables.dedup_by(|later, earlier| later.name == earlier.name);

        let total = tables.len();
        let options = self.options;
        tables.retain(|table| {
            let wanted = if table.kind.is_view() {
                options.include_views
            } else {
                options.include_tables
            };
            wanted && options.table_filter.matches(&table.name)
        });
        self.report.tables_filtered = total - tables.len();

        tables
    }

    async fn assemble(&mut self, raw: RawTable) -> Step {
        debug!(schema = %self.schema, table = %raw.name, kind = %raw.kind, "reflecting table");

        let listed = cancellable(
            &self.cancel,
            self.adapter.list_columns(&self.schema, &raw.name),
        )
        .await;
        let columns = match listed {
            None => return Step::Cancelled,
            Some(Ok(columns)) => columns,
            Some(Err(err)) => return self.table_failed(&raw.name, err),
        };
        self.consecutive_failures = 0;

        let columns = self.normalize_columns(&raw.name, columns);

        let view_definition = if raw.kind.is_view() {
            let fetched = cancellable(
                &self.cancel,
                self.adapter.get_view_definition(&self.schema, &raw.name),
            )
            .await;
            match fetched {
                None => return Step::Cancelled,
                Some(Ok(Some(text))) if !text.trim().is_empty() => Some(text),
                Some(Ok(_)) => {
                    debug!(schema = %self.schema, table = %raw.name, "view has no definition");
                    self.report
                        .missing_view_definitions
                        .push(MissingViewDefinition {
                            view: raw.name.clone(),
                            error: None,
                        });
                    None
                }
                Some(Err(err)) => {
                    warn!(
                        schema = %self.schema,
                        table = %raw.name,
                        error = %err,
                        "failed to read view definition"
                    );
                    self.report
                        .missing_view_definitions
                        .push(MissingViewDefinition {
                            view: raw.name.clone(),
                            error: Some(err.to_string()),
                        });
                    None
                }
            }
        } else {
            None
        };

        self.report.tables_discovered += 1;

        Step::Yield(TableDescriptor {
            schema: self.schema.clone(),
            name: raw.name,
            kind: raw.kind,
            columns,
            view_definition,
            comment: raw.comment,
        })
    }

    fn table_failed(&mut self, table: &str, err: AdapterError) -> Step {
        let connectivity = err.is_connectivity();
        warn!(schema = %self.schema, table, error = %err, "skipping table");

        self.report.skipped_tables.push(SkippedTable {
            table: table.to_string(),
            reason: err.to_string(),
            connectivity,
        });

        if !connectivity {
            self.consecutive_failures = 0;
            return Step::Skipped;
        }

        self.consecutive_failures += 1;
        match self.options.max_consecutive_failures {
            Some(limit) if limit > 0 && self.consecutive_failures >= limit => {
                warn!(
                    schema = %self.schema,
                    failures = self.consecutive_failures,
                    "backend unreachable, abandoning schema"
                );
                Step::Abort(DiscoveryError::ConnectivityLost {
                    schema: self.schema.clone(),
                    failures: self.consecutive_failures,
                    source: err,
                })
            }
            _ => {
                self.last_connectivity_error = Some(err);
                Step::Skipped
            }
        }
    }

    /// At the end of the listing: every table failed on connectivity and
    /// nothing was discovered.
    fn unreachable(&mut self) -> Option<DiscoveryError> {
        let all_unreachable = self.consecutive_failures > 0
            && self.report.tables_discovered == 0
            && self.report.skipped_tables.iter().all(|s| s.connectivity);
        if !all_unreachable {
            return None;
        }

        let source = self.last_connectivity_error.take()?;
        warn!(
            schema = %self.schema,
            failures = self.consecutive_failures,
            "every table failed to connect, abandoning schema"
        );
        Some(DiscoveryError::ConnectivityLost {
            schema: self.schema.clone(),
            failures: self.consecutive_failures,
            source,
        })
    }

    /// Normalize raw columns, partition columns last, first name wins.
    fn normalize_columns(&mut self, table: &str, raw: Vec<RawColumn>) -> Vec<ColumnDescriptor> {
        let defaults = self.options.column_defaults;
        let (ordinary, partition): (Vec<_>, Vec<_>) =
            raw.into_iter().partition(|c| !c.is_partition_column);

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(ordinary.len() + partition.len());

        for raw in ordinary.into_iter().chain(partition) {
            if seen.contains(&raw.name) {
                warn!(schema = %self.schema, table, column = %raw.name, "dropping duplicate column");
                self.report.dropped_columns.push(DroppedColumn {
                    table: table.to_string(),
                    column: raw.name,
                    reason: DropReason::Duplicate,
                });
                continue;
            }

            let resolution = match self.normalizer.resolve(&raw.native_type) {
                Ok(resolution) => resolution,
                Err(issue) => {
                    warn!(schema = %self.schema, table, column = %raw.name, "dropping rejected column");
                    self.report.dropped_columns.push(DroppedColumn {
                        table: table.to_string(),
                        column: raw.name,
                        reason: DropReason::Rejected { issue },
                    });
                    continue;
                }
            };

            for issue in resolution.issues {
                self.report.degraded_columns.push(ColumnIssue {
                    table: table.to_string(),
                    column: raw.name.clone(),
                    issue,
                });
            }

            seen.insert(raw.name.clone());
            let canonical = resolution.canonical;
            columns.push(ColumnDescriptor {
                name: raw.name,
                is_complex: canonical.is_complex(),
                canonical_type: canonical,
                native_type: raw.native_type,
                nullable: raw.nullable.unwrap_or(defaults.nullable),
                autoincrement: raw.autoincrement.unwrap_or(defaults.autoincrement),
                comment: raw.comment,
                is_partition_column: raw.is_partition_column,
            });
        }

        columns
    }

    fn mark_cancelled(&mut self) {
        if !self.report.cancelled {
            info!(
                schema = %self.schema,
                discovered = self.report.tables_discovered,
                "discovery cancelled"
            );
        }
        self.report.cancelled = true;
        self.state = PassState::Done;
    }

    fn finish(&mut self) {
        self.state = PassState::Done;
        info!(
            schema = %self.schema,
            discovered = self.report.tables_discovered,
            skipped = self.report.skipped_tables.len(),
            "schema discovery finished"
        );
    }
}

/// Race a future against cancellation. `None` means cancelled first.
async fn cancellable<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = fut => Some(output),
    }
}
