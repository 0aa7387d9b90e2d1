//! Integration tests for the snapshot reflection backend.

use std::env;
use std::fs;

use schemascope::model::TableKind;
use schemascope::reflection::{AdapterError, RawColumn, ReflectionAdapter, SnapshotAdapter};

const CATALOG: &str = r#"{
    "backend": "glue",
    "default_table_kind": "BASE_TABLE",
    "schemas": [
        {"name": "sales", "tables": [
            {
                "name": "orders",
                "columns": [
                    {"name": "id", "type": "bigint", "nullable": false},
                    {"name": "tags", "type": "array<string>"}
                ],
                "partition_keys": [{"name": "dt", "type": "string", "comment": "load date"}]
            },
            {"name": "clicks", "kind": "EXTERNAL_TABLE"},
            {"name": "daily", "kind": "VIEW", "view_definition": ["SELECT 1"]}
        ]},
        {"name": "empty"}
    ]
}"#;

#[tokio::test]
async fn test_lists_schemas_in_file_order() {
    let adapter = SnapshotAdapter::from_json(CATALOG).unwrap();
    assert_eq!(adapter.backend(), "glue");
    assert_eq!(
        adapter.list_schemas().await.unwrap(),
        vec!["sales".to_string(), "empty".to_string()]
    );
    assert!(adapter.list_tables("empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_default_table_kind_applies() {
    let adapter = SnapshotAdapter::from_json(CATALOG).unwrap();
    let kinds: Vec<_> = adapter
        .list_tables("sales")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![TableKind::BaseTable, TableKind::ExternalTable, TableKind::View]
    );
}

#[tokio::test]
async fn test_columns_then_partition_keys() {
    let adapter = SnapshotAdapter::from_json(CATALOG).unwrap();
    let columns = adapter.list_columns("sales", "orders").await.unwrap();

    assert_eq!(
        columns,
        vec![
            RawColumn::new("id", "bigint").with_nullable(false),
            RawColumn::new("tags", "array<string>"),
            RawColumn::new("dt", "string").partition().with_comment("load date"),
        ]
    );
}

#[tokio::test]
async fn test_view_definition_only_for_views() {
    let adapter = SnapshotAdapter::from_json(CATALOG).unwrap();
    assert_eq!(
        adapter.get_view_definition("sales", "daily").await.unwrap(),
        Some("SELECT 1".to_string())
    );
    assert_eq!(adapter.get_view_definition("sales", "orders").await.unwrap(), None);
}

#[tokio::test]
async fn test_from_path() {
    let path = env::temp_dir().join(format!("schemascope-snapshot-{}.json", std::process::id()));
    fs::write(&path, CATALOG).unwrap();

    let adapter = SnapshotAdapter::from_path(&path).unwrap();
    assert_eq!(adapter.list_tables("sales").await.unwrap().len(), 3);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_from_missing_path() {
    let err = SnapshotAdapter::from_path("/nonexistent/schemascope.json").unwrap_err();
    assert!(matches!(err, AdapterError::SnapshotRead(_)));
    assert!(!err.is_connectivity());
}
