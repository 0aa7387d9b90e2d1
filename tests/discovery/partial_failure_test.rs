//! Integration tests for per-table failure handling.

mod common;

use common::{Columns, ScriptedAdapter};
use schemascope::discovery::{Discoverer, DiscoveryError, DiscoveryOptions};
use schemascope::reflection::RawColumn;

fn healthy() -> Columns {
    Columns::Rows(vec![RawColumn::new("id", "bigint")])
}

#[tokio::test]
async fn test_one_failing_one_healthy_table() {
    let adapter = ScriptedAdapter::new()
        .table("s", "broken", Columns::Denied)
        .table("s", "healthy", healthy());
    let inventory = Discoverer::new(adapter).discover("s").collect().await.unwrap();

    assert_eq!(inventory.tables.len(), 1);
    assert_eq!(inventory.tables[0].name, "healthy");

    assert_eq!(inventory.report.skipped_tables.len(), 1);
    let skipped = &inventory.report.skipped_tables[0];
    assert_eq!(skipped.table, "broken");
    assert!(!skipped.connectivity);
    assert!(skipped.reason.contains("permission denied"));
}

#[tokio::test]
async fn test_scattered_connectivity_failures_do_not_abort() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", Columns::Unreachable)
        .table("s", "b", healthy())
        .table("s", "c", Columns::Unreachable)
        .table("s", "d", healthy());
    let options = DiscoveryOptions::default().with_max_consecutive_failures(Some(2));
    let inventory = Discoverer::new(adapter)
        .with_options(options)
        .discover("s")
        .collect()
        .await
        .unwrap();

    let names: Vec<_> = inventory.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["b", "d"]);
    assert_eq!(inventory.report.skipped_tables.len(), 2);
    assert!(inventory.report.skipped_tables.iter().all(|s| s.connectivity));
}

#[tokio::test]
async fn test_consecutive_connectivity_failures_abort() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", healthy())
        .table("s", "b", Columns::Unreachable)
        .table("s", "c", Columns::Unreachable)
        .table("s", "d", healthy());
    let options = DiscoveryOptions::default().with_max_consecutive_failures(Some(2));
    let discoverer = Discoverer::new(adapter).with_options(options);
    let mut pass = discoverer.discover("s");

    let first = pass.next_table().await.unwrap().unwrap();
    assert_eq!(first.name, "a");

    let err = pass.next_table().await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::ConnectivityLost { failures: 2, ref schema, .. } if schema == "s"
    ));
    assert!(err.is_connectivity());

    assert!(pass.next_table().await.is_none());
    assert_eq!(pass.report().skipped_tables.len(), 2);
    // "d" was never reached.
    assert_eq!(discoverer.adapter().column_calls(), 3);
}

#[tokio::test]
async fn test_other_failures_break_the_streak() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", Columns::Unreachable)
        .table("s", "b", Columns::Denied)
        .table("s", "c", Columns::Unreachable)
        .table("s", "d", healthy());
    let options = DiscoveryOptions::default().with_max_consecutive_failures(Some(2));
    let inventory = Discoverer::new(adapter)
        .with_options(options)
        .discover("s")
        .collect()
        .await
        .unwrap();

    assert_eq!(inventory.tables.len(), 1);
    assert_eq!(inventory.report.skipped_tables.len(), 3);
}

#[tokio::test]
async fn test_limit_disabled_still_visits_every_table() {
    let mut adapter = ScriptedAdapter::new();
    for name in ["a", "b", "c", "d", "e"] {
        adapter = adapter.table("s", name, Columns::Unreachable);
    }
    adapter = adapter.table("s", "f", healthy());
    let options = DiscoveryOptions::default().with_max_consecutive_failures(None);
    let discoverer = Discoverer::new(adapter).with_options(options);
    let inventory = discoverer.discover("s").collect().await.unwrap();

    assert_eq!(inventory.tables.len(), 1);
    assert_eq!(inventory.report.skipped_tables.len(), 5);
    assert_eq!(discoverer.adapter().column_calls(), 6);
}

#[tokio::test]
async fn test_every_table_unreachable_below_limit() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", Columns::Unreachable)
        .table("s", "b", Columns::Unreachable)
        .table("s", "c", Columns::Unreachable);
    let discoverer = Discoverer::new(adapter);
    let mut pass = discoverer.discover("s");

    let err = pass.next_table().await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::ConnectivityLost { failures: 3, ref schema, .. } if schema == "s"
    ));
    assert!(pass.next_table().await.is_none());
    assert_eq!(pass.report().skipped_tables.len(), 3);
    assert_eq!(discoverer.adapter().column_calls(), 3);
}

#[tokio::test]
async fn test_every_table_unreachable_with_limit_disabled() {
    let mut adapter = ScriptedAdapter::new();
    for name in ["a", "b", "c", "d", "e"] {
        adapter = adapter.table("s", name, Columns::Unreachable);
    }
    let options = DiscoveryOptions::default().with_max_consecutive_failures(None);
    let discoverer = Discoverer::new(adapter).with_options(options);

    let result = discoverer.discover("s").collect().await;
    assert!(matches!(
        result,
        Err(DiscoveryError::ConnectivityLost { failures: 5, .. })
    ));
    assert_eq!(discoverer.adapter().column_calls(), 5);
}

#[tokio::test]
async fn test_mixed_failures_without_discoveries_stay_ok() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", Columns::Unreachable)
        .table("s", "b", Columns::Denied);
    let inventory = Discoverer::new(adapter).discover("s").collect().await.unwrap();

    assert!(inventory.tables.is_empty());
    assert_eq!(inventory.report.skipped_tables.len(), 2);
}

#[tokio::test]
async fn test_connectivity_loss_stops_discover_all() {
    let adapter = ScriptedAdapter::new()
        .table("a", "t1", Columns::Unreachable)
        .table("a", "t2", Columns::Unreachable)
        .table("b", "t", healthy());
    let options = DiscoveryOptions::default().with_max_consecutive_failures(Some(2));
    let inventory = Discoverer::new(adapter)
        .with_options(options)
        .discover_all()
        .await
        .unwrap();

    assert!(inventory.schemas.is_empty());
    assert_eq!(inventory.failures.len(), 1);
    assert!(matches!(
        inventory.failures[0].error,
        DiscoveryError::ConnectivityLost { .. }
    ));
}
