//! # odonto CLI entry point
//!
//! Parses command-line arguments, resolves settings and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use odonto_cli::catalog::{run_catalog, CatalogArgs};
use odonto_cli::chart::{run_history, run_new, run_show, HistoryArgs, NewArgs, ShowArgs};
use odonto_cli::config::{ConfigFile, LogFormat, Overrides, Settings};
use odonto_cli::plan::{run_plan, PlanArgs};
use odonto_cli::script::{run_apply, ApplyArgs};

/// Odontogram chart engine.
///
/// Places clinical findings on an FDI dental chart, keeps versioned
/// snapshots and derives the treatment plan.
#[derive(Parser, Debug)]
#[command(name = "odonto", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot store directory.
    #[arg(long = "store", global = true)]
    store_root: Option<PathBuf>,

    /// Service catalog YAML file.
    #[arg(long, global = true)]
    services: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the finding catalog.
    Catalog(CatalogArgs),

    /// Create a chart with an empty first version.
    New(NewArgs),

    /// Replay a placement script against a chart and save the result.
    Apply(ApplyArgs),

    /// Print a chart snapshot.
    Show(ShowArgs),

    /// Print the treatment plan of a chart.
    Plan(PlanArgs),

    /// List the saved versions of a chart.
    History(HistoryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let file = cli.config.as_deref().map(ConfigFile::load).transpose();
    let overrides = Overrides {
        store_root: cli.store_root.clone(),
        services: cli.services.clone(),
        log_format: cli.log_format,
    };
    let (settings, config_error) = match file {
        Ok(file) => (Settings::resolve(file.unwrap_or_default(), overrides), None),
        Err(e) => (Settings::resolve(ConfigFile::default(), overrides), Some(e)),
    };

    init_tracing(cli.verbose, settings.log_format);

    if let Some(e) = config_error {
        tracing::error!("{e:#}");
        return ExitCode::from(2);
    }
    tracing::debug!(store_root = %settings.store_root.display(), "settings resolved");

    match dispatch(&cli.command, &settings) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(command: &Commands, settings: &Settings) -> Result<u8> {
    match command {
        Commands::Catalog(args) => run_catalog(args),
        Commands::New(args) => run_new(args, settings),
        Commands::Apply(args) => run_apply(args, settings),
        Commands::Show(args) => run_show(args, settings),
        Commands::Plan(args) => run_plan(args, settings),
        Commands::History(args) => run_history(args, settings),
    }
}

/// `RUST_LOG` wins when set; otherwise the level follows `-v`.
fn init_tracing(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_catalog() {
        let cli = Cli::try_parse_from(["odonto", "catalog", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog(_)));
    }

    #[test]
    fn cli_parse_apply() {
        let id = "6f1c2f4e-8d2a-4b8e-9c51-2f0d6f1a7b3c";
        let cli = Cli::try_parse_from([
            "odonto", "apply", "--chart", id, "--script", "edits.yaml", "--dry-run",
        ])
        .unwrap();
        if let Commands::Apply(args) = cli.command {
            assert_eq!(args.chart.to_string(), id);
            assert_eq!(args.script, PathBuf::from("edits.yaml"));
            assert!(args.dry_run);
        } else {
            panic!("expected apply");
        }
    }

    #[test]
    fn cli_parse_show_version() {
        let cli = Cli::try_parse_from([
            "odonto", "show", "--chart", "6f1c2f4e-8d2a-4b8e-9c51-2f0d6f1a7b3c", "--version", "3",
        ])
        .unwrap();
        if let Commands::Show(args) = cli.command {
            assert_eq!(args.version, Some(3));
        } else {
            panic!("expected show");
        }
    }

    #[test]
    fn cli_parse_plan_assignments() {
        let cli = Cli::try_parse_from([
            "odonto",
            "plan",
            "--chart",
            "6f1c2f4e-8d2a-4b8e-9c51-2f0d6f1a7b3c",
            "--note",
            "15-EXT=urgent",
            "--service",
            "15-EXT=SRV-1",
        ])
        .unwrap();
        if let Commands::Plan(args) = cli.command {
            assert_eq!(args.notes, vec![("15-EXT".to_string(), "urgent".to_string())]);
            assert_eq!(args.assignments.len(), 1);
        } else {
            panic!("expected plan");
        }
    }

    #[test]
    fn cli_parse_plan_catalog_file_and_assignments() {
        let cli = Cli::try_parse_from([
            "odonto",
            "plan",
            "--chart",
            "6f1c2f4e-8d2a-4b8e-9c51-2f0d6f1a7b3c",
            "--services",
            "services.yaml",
            "--service",
            "15-EXT=SRV-1",
            "--service",
            "16-LCD-cara-O=SRV-2",
        ])
        .unwrap();
        assert_eq!(cli.services, Some(PathBuf::from("services.yaml")));
        if let Commands::Plan(args) = cli.command {
            assert_eq!(
                args.assignments,
                vec![
                    ("15-EXT".to_string(), "SRV-1".to_string()),
                    ("16-LCD-cara-O".to_string(), "SRV-2".to_string()),
                ]
            );
        } else {
            panic!("expected plan");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "odonto", "-vv", "new", "--store", "/tmp/charts", "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.store_root, Some(PathBuf::from("/tmp/charts")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn cli_rejects_bad_chart_id() {
        assert!(Cli::try_parse_from(["odonto", "show", "--chart", "nope"]).is_err());
    }
}
