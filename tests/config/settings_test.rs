//! Integration tests for TOML settings.

use std::env;
use std::fs;
use std::path::PathBuf;

use schemascope::config::{Settings, SettingsError, SourceKind};
use schemascope::discovery::Discoverer;
use schemascope::normalize::MalformedPolicy;

const CATALOG: &str = r#"{"schemas": [
    {"name": "sales", "tables": [
        {"name": "orders", "columns": [{"name": "price", "type": "decimal(10)"}]},
        {"name": "tmp_orders", "columns": [{"name": "id", "type": "int"}]}
    ]},
    {"name": "staging"}
]}"#;

fn scratch(name: &str) -> PathBuf {
    env::temp_dir().join(format!("schemascope-{}-{}", std::process::id(), name))
}

#[test]
fn test_parse_full_config() {
    let toml = r#"
[sources.warehouse]
kind = "snapshot"
path = "./warehouse.json"

[discovery]
schemas = ["sales"]
include_views = false
max_consecutive_failures = 3
cache = false

[discovery.schema_filter]
includes = ["^sales"]

[discovery.table_filter]
excludes = ["^tmp_"]

[normalizer]
malformed_arguments = "reject"

[columns]
nullable = false
"#;

    let settings: Settings = toml::from_str(toml).unwrap();

    let source = settings.get_source("warehouse").unwrap();
    assert_eq!(source.source_kind().unwrap(), SourceKind::Snapshot);
    assert_eq!(settings.discovery.schemas, vec!["sales".to_string()]);
    assert!(!settings.discovery.cache);
    assert_eq!(settings.normalizer.malformed_arguments, MalformedPolicy::Reject);
    assert!(!settings.columns.nullable);
    assert!(!settings.columns.autoincrement);

    let options = settings.discovery_options().unwrap();
    assert!(!options.include_views);
    assert!(options.include_tables);
    assert_eq!(options.max_consecutive_failures, Some(3));
    assert!(options.schema_filter.matches("sales"));
    assert!(!options.schema_filter.matches("staging"));
    assert!(!options.table_filter.matches("tmp_orders"));
}

#[test]
fn test_invalid_filter_pattern() {
    let settings: Settings = toml::from_str(
        r#"
[discovery.table_filter]
includes = ["(unclosed"]
"#,
    )
    .unwrap();

    assert!(matches!(
        settings.discovery_options(),
        Err(SettingsError::InvalidFilter(_))
    ));
}

#[test]
fn test_unknown_policy_is_parse_error() {
    let result: Result<Settings, _> = toml::from_str(
        r#"
[normalizer]
malformed_arguments = "sometimes"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_from_missing_file() {
    assert!(matches!(
        Settings::from_file("/nonexistent/schemascope.toml"),
        Err(SettingsError::FileNotFound(_))
    ));
}

#[tokio::test]
async fn test_open_source_and_discover() {
    let catalog = scratch("catalog.json");
    fs::write(&catalog, CATALOG).unwrap();

    let config = scratch("config.toml");
    env::set_var("SCHEMASCOPE_TEST_CATALOG", &catalog);
    fs::write(
        &config,
        r#"
[sources.default]
kind = "snapshot"
path = "${SCHEMASCOPE_TEST_CATALOG}"

[discovery.table_filter]
excludes = ["^tmp_"]
"#,
    )
    .unwrap();

    let settings = Settings::from_file(&config).unwrap();
    let (name, _) = settings.default_source().unwrap();
    assert_eq!(name, "default");

    let adapter = settings.open_source(name).unwrap();
    let discoverer = Discoverer::new(adapter).with_options(settings.discovery_options().unwrap());

    assert_eq!(
        discoverer.list_schemas().await.unwrap(),
        vec!["sales".to_string(), "staging".to_string()]
    );

    let inventory = discoverer.discover("sales").collect().await.unwrap();
    assert_eq!(inventory.tables.len(), 1);
    let price = &inventory.tables[0].columns[0];
    assert_eq!(price.canonical_type.scale(), Some(0));
    assert_eq!(inventory.report.degraded_columns.len(), 1);

    env::remove_var("SCHEMASCOPE_TEST_CATALOG");
    fs::remove_file(&catalog).unwrap();
    fs::remove_file(&config).unwrap();
}
