//! schemascope CLI - discover schemas and normalize column types
//!
//! Usage:
//!   schemascope normalize <TYPE>... [--json] [--strict]
//!   schemascope schemas [--source <name>]
//!   schemascope discover [--source <name>] [--schema <name>]... [--fingerprints]
//!
//! Examples:
//!   schemascope normalize "decimal(10,2)" "array<string>"
//!   schemascope discover --source warehouse --schema sales > sales.jsonl
//!
//! Logs go to stderr and honor `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use serde::Serialize;
use schemascope::config::{Settings, SettingsError};
use schemascope::discovery::{DiscoveryError, Discoverer};
use schemascope::emit::{publish_all, JsonLinesSink, PublishError};
use schemascope::model::CanonicalType;
use schemascope::normalize::{MalformedPolicy, TypeIssue, TypeNormalizer};
use schemascope::reflection::ReflectionAdapter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemascope")]
#[command(about = "schemascope - Discover database schemas and normalize column types")]
#[command(version)]
struct Cli {
    /// Path to a schemascope.toml (default: SCHEMASCOPE_CONFIG, ./schemascope.toml, user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize native type strings
    Normalize {
        /// Native type descriptors, e.g. "varchar(255)"
        #[arg(required = true)]
        types: Vec<String>,

        /// Print one JSON object per type
        #[arg(long)]
        json: bool,

        /// Reject malformed arguments instead of degrading them
        #[arg(long)]
        strict: bool,
    },

    /// List the schemas a source exposes
    Schemas {
        /// Source name from the config (default source if omitted)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Discover tables and write them as JSON lines to stdout
    Discover {
        /// Source name from the config (default source if omitted)
        #[arg(short, long)]
        source: Option<String>,

        /// Schema to discover (repeatable; default: config, else every schema)
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Wrap each line with the descriptor's SHA-256 fingerprint
        #[arg(long)]
        fingerprints: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize {
            types,
            json,
            strict,
        } => cmd_normalize(types, json, strict),
        Commands::Schemas { source } => {
            let settings = match load_settings(cli.config) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            cmd_schemas(&settings, source).await
        }
        Commands::Discover {
            source,
            schemas,
            fingerprints,
        } => {
            let settings = match load_settings(cli.config) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            cmd_discover(&settings, source, schemas, fingerprints).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn fail(e: impl std::fmt::Display) -> ExitCode {
    error!("{}", e);
    ExitCode::FAILURE
}

fn open_source(
    settings: &Settings,
    source: Option<String>,
) -> Result<Box<dyn ReflectionAdapter>, SettingsError> {
    let name = match source {
        Some(name) => name,
        None => settings
            .default_source()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| SettingsError::InvalidConfig("no sources configured".to_string()))?,
    };
    info!(source = %name, "opening source");
    settings.open_source(&name)
}

#[derive(Serialize)]
struct NormalizedLine<'a> {
    native: &'a str,
    canonical: &'a CanonicalType,
    issues: &'a [TypeIssue],
}

fn cmd_normalize(types: Vec<String>, json: bool, strict: bool) -> ExitCode {
    let policy = if strict {
        MalformedPolicy::Reject
    } else {
        MalformedPolicy::Lenient
    };
    let normalizer = TypeNormalizer::new(policy);
    let mut status = ExitCode::SUCCESS;

    for native in &types {
        match normalizer.resolve(native) {
            Ok(resolution) if json => {
                let line = NormalizedLine {
                    native,
                    canonical: &resolution.canonical,
                    issues: &resolution.issues,
                };
                match serde_json::to_string(&line) {
                    Ok(line) => println!("{}", line),
                    Err(e) => return fail(e),
                }
            }
            Ok(resolution) => println!("{} -> {}", native, resolution.canonical),
            Err(issue) => {
                eprintln!("{}: {}", native, issue);
                status = ExitCode::FAILURE;
            }
        }
    }

    status
}

async fn cmd_schemas(settings: &Settings, source: Option<String>) -> ExitCode {
    let adapter = match open_source(settings, source) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let options = match settings.discovery_options() {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    let discoverer = Discoverer::new(adapter).with_options(options);
    match discoverer.list_schemas().await {
        Ok(schemas) => {
            for schema in schemas {
                println!("{}", schema);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

async fn cmd_discover(
    settings: &Settings,
    source: Option<String>,
    schemas: Vec<String>,
    fingerprints: bool,
) -> ExitCode {
    let adapter = match open_source(settings, source) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let options = match settings.discovery_options() {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    let discoverer = Discoverer::new(adapter).with_options(options);

    let cancel = discoverer.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping discovery");
            cancel.cancel();
        }
    });

    let schemas = if !schemas.is_empty() {
        schemas
    } else if !settings.discovery.schemas.is_empty() {
        settings.discovery.schemas.clone()
    } else {
        match discoverer.list_schemas().await {
            Ok(s) => s,
            Err(e) => return fail(e),
        }
    };

    let mut sink =
        JsonLinesSink::new(io::BufWriter::new(io::stdout())).with_fingerprints(fingerprints);
    let mut status = ExitCode::SUCCESS;

    for schema in &schemas {
        match publish_all(discoverer.discover(schema), &mut sink).await {
            Ok(report) => {
                eprintln!("{}", report);
                if report.cancelled {
                    status = ExitCode::FAILURE;
                    break;
                }
            }
            Err(PublishError::Discovery(e)) => {
                error!(schema = %schema, "{}", e);
                status = ExitCode::FAILURE;
                if matches!(e, DiscoveryError::ConnectivityLost { .. }) {
                    break;
                }
            }
            Err(e @ PublishError::Sink { .. }) => return fail(e),
        }
    }

    status
}
