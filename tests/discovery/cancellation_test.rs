//! Integration tests for cancelling a discovery pass.

mod common;

use std::time::Duration;

use common::{Columns, ScriptedAdapter};
use schemascope::discovery::Discoverer;
use schemascope::reflection::RawColumn;
use tokio_util::sync::CancellationToken;

fn healthy() -> Columns {
    Columns::Rows(vec![RawColumn::new("id", "bigint")])
}

#[tokio::test]
async fn test_cancel_before_first_pull() {
    let adapter = ScriptedAdapter::new().table("s", "a", healthy());
    let discoverer = Discoverer::new(adapter);
    discoverer.cancellation_token().cancel();

    let inventory = discoverer.discover("s").collect().await.unwrap();
    assert!(inventory.tables.is_empty());
    assert!(inventory.report.cancelled);
    assert_eq!(discoverer.adapter().column_calls(), 0);
}

#[tokio::test]
async fn test_cancel_between_tables_keeps_yielded_descriptors() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", healthy())
        .table("s", "b", healthy());
    let token = CancellationToken::new();
    let discoverer = Discoverer::new(adapter).with_cancellation(token.clone());
    let mut pass = discoverer.discover("s");

    let first = pass.next_table().await.unwrap().unwrap();
    token.cancel();

    assert!(pass.next_table().await.is_none());
    assert!(pass.next_table().await.is_none());
    assert!(pass.report().cancelled);
    assert_eq!(pass.report().tables_discovered, 1);
    assert_eq!(first.name, "a");
    assert_eq!(first.columns.len(), 1);
    assert_eq!(discoverer.adapter().column_calls(), 1);
}

#[tokio::test]
async fn test_cancel_interrupts_in_flight_request() {
    let adapter = ScriptedAdapter::new()
        .table("s", "a", healthy())
        .table("s", "b", Columns::Hang)
        .table("s", "c", healthy());
    let discoverer = Discoverer::new(adapter);
    let token = discoverer.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let inventory = tokio::time::timeout(
        Duration::from_secs(5),
        discoverer.discover("s").collect(),
    )
    .await
    .expect("cancellation did not interrupt the hanging request")
    .unwrap();

    let names: Vec<_> = inventory.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a"]);
    assert!(inventory.report.cancelled);
}

#[tokio::test]
async fn test_cancel_stops_discover_all() {
    let adapter = ScriptedAdapter::new()
        .table("a", "t", healthy())
        .table("b", "t", healthy());
    let discoverer = Discoverer::new(adapter);
    discoverer.cancellation_token().cancel();

    let inventory = discoverer.discover_all().await.unwrap();
    assert!(inventory.schemas.is_empty());
    assert!(!inventory.has_failures());
}
