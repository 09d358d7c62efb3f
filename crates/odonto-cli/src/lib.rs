//! # odonto-cli: Odontogram Command-Line Interface
//!
//! Drives the chart engine against a filesystem snapshot store.
//!
//! ## Subcommands
//!
//! - `catalog`: list the finding catalog
//! - `new`: allocate a chart and save its empty first version
//! - `apply`: replay a YAML placement script and save a new version
//! - `show`: print a chart snapshot
//! - `plan`: print the derived treatment plan
//! - `history`: list saved versions
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in each subcommand module next to its handler.
//! - Handlers delegate to the domain crates; no chart logic here.
//! - Handlers return an exit code; errors are reported once, by `main`.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod plan;
pub mod script;

use clap::ValueEnum;

/// Output format shared by listing subcommands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}
