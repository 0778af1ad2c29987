//! Grid indexer.
//!
//! Reads a manifest of decoded grid records, synthesizes the shared
//! coordinate structure and writes the resulting dataset schema as JSON.

mod manifest;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use grid_index::{
    build_lookup_for_model, build_lookup_from_path, DatasetSchema, Diagnostic, SynthesisConfig,
    Synthesizer,
};
use grid_record::{GridFormat, TableLookup};

#[derive(Parser, Debug)]
#[command(name = "grid-indexer")]
#[command(about = "Synthesize a shared-coordinate dataset schema from grid records")]
struct Args {
    /// Record manifest (JSON or YAML)
    manifest: PathBuf,

    /// Source format of the records
    #[arg(short, long, env = "GRID_FORMAT", default_value = "grib2")]
    format: GridFormat,

    /// Model whose tables extend the built-ins (CONFIG_DIR/models/<model>.yaml)
    #[arg(short, long, env = "GRID_MODEL", conflicts_with = "tables")]
    model: Option<String>,

    /// Explicit table file extending the built-ins
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Output file for the schema (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include diagnostics alongside the schema
    #[arg(long)]
    with_diagnostics: bool,

    /// Emit 2-D lat/lon fields for every projected grid
    #[arg(long)]
    add_lat_lon_2d: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long, env = "GRID_JSON_LOGS")]
    json_logs: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    schema: &'a DatasetSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<&'a [Diagnostic]>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let lookup = match (&args.model, &args.tables) {
        (Some(model), _) => build_lookup_for_model(model, args.format)?,
        (None, Some(path)) => build_lookup_from_path(path, args.format)?,
        (None, None) => TableLookup::for_format(args.format),
    };

    let mut config = SynthesisConfig::from_env();
    config.add_lat_lon_2d |= args.add_lat_lon_2d;

    let index = manifest::load_manifest(&args.manifest)?;
    info!(
        manifest = %args.manifest.display(),
        format = %args.format,
        definitions = index.definitions.len(),
        records = index.records.len(),
        "Starting synthesis"
    );

    let synthesizer = Synthesizer::new(Arc::new(lookup), config)?;
    let dataset = synthesizer.synthesize(&index);

    if !dataset.diagnostics.is_empty() {
        warn!(
            count = dataset.diagnostics.len(),
            dropped = dataset.dropped_records(),
            "Synthesis finished with diagnostics"
        );
    }

    let report = Report {
        schema: &dataset.schema,
        diagnostics: args.with_diagnostics.then_some(dataset.diagnostics.as_slice()),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write schema to {}", path.display()))?;
            info!(path = %path.display(), "Wrote schema");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so the schema can be piped from stdout.
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
