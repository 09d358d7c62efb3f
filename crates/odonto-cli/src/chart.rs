//! # Chart Subcommands
//!
//! - `new` allocates a chart id and saves an empty first version.
//! - `show` prints a chart snapshot as JSON.
//! - `history` lists saved versions.

use anyhow::{Context, Result};
use clap::Args;

use odonto_core::ChartId;
use odonto_state::ChartState;
use odonto_store::{FileStore, SnapshotStore};

use crate::config::Settings;
use crate::OutputFormat;

/// Arguments for the `odonto new` subcommand.
#[derive(Args, Debug)]
pub struct NewArgs {}

/// Arguments for the `odonto show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Chart identifier.
    #[arg(long)]
    pub chart: ChartId,
    /// Version to show instead of the latest.
    #[arg(long)]
    pub version: Option<u64>,
}

/// Arguments for the `odonto history` subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Chart identifier.
    #[arg(long)]
    pub chart: ChartId,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute the new subcommand.
pub fn run_new(_args: &NewArgs, settings: &Settings) -> Result<u8> {
    let store = FileStore::new(&settings.store_root);
    let chart_id = ChartId::new();
    let meta = store
        .save(chart_id, &ChartState::new())
        .with_context(|| format!("cannot create chart under {}", settings.store_root.display()))?;
    tracing::info!(chart_id = %chart_id, version = meta.version, "chart created");
    println!("{chart_id}");
    Ok(0)
}

/// Execute the show subcommand.
pub fn run_show(args: &ShowArgs, settings: &Settings) -> Result<u8> {
    let store = FileStore::new(&settings.store_root);
    let chart = match args.version {
        Some(version) => store.load_version(args.chart, version),
        None => store.load(args.chart),
    }
    .with_context(|| format!("cannot load chart {}", args.chart))?;
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(0)
}

/// Execute the history subcommand.
pub fn run_history(args: &HistoryArgs, settings: &Settings) -> Result<u8> {
    let store = FileStore::new(&settings.store_root);
    let history = store
        .history(args.chart)
        .with_context(|| format!("cannot read history of chart {}", args.chart))?;
    if history.is_empty() {
        tracing::warn!(chart_id = %args.chart, "chart has no saved versions");
        return Ok(1);
    }
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        OutputFormat::Text => {
            for meta in &history {
                println!(
                    "v{:<4} {}  {:>2} teeth  {}",
                    meta.version, meta.saved_at, meta.teeth, meta.digest
                );
            }
        }
    }
    Ok(0)
}
