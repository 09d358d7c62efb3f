//! # Catalog Subcommand
//!
//! Prints the finding catalog: index, `tipo` code, name, placement category,
//! color policy and detail options.

use anyhow::Result;
use clap::Args;

use odonto_core::{catalog, ColorPolicy, FindingDefinition, PlacementCategory};

use crate::OutputFormat;

/// Arguments for the `odonto catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Execute the catalog subcommand.
pub fn run_catalog(args: &CatalogArgs) -> Result<u8> {
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog::all())?),
        OutputFormat::Text => {
            for (index, def) in catalog::all().iter().enumerate() {
                println!("{}", describe(index, def));
            }
        }
    }
    Ok(0)
}

fn category_name(category: PlacementCategory) -> &'static str {
    match category {
        PlacementCategory::WholeTooth => "whole-tooth",
        PlacementCategory::FaceTargeted => "face",
        PlacementCategory::PairEndpoints => "pair",
        PlacementCategory::RangeFill => "range",
    }
}

fn describe(index: usize, def: &FindingDefinition) -> String {
    let color = match def.color {
        ColorPolicy::Fixed(color) => color.to_string(),
        ColorPolicy::UserChoice => "choice".to_string(),
    };
    let mut line = format!(
        "{index:>2}  {:<5} {:<12} {:<7} {}",
        def.code,
        category_name(def.category),
        color,
        def.name
    );
    if def.directional {
        line.push_str(" [direction]");
    }
    if !def.details.is_empty() {
        let details: Vec<String> = def
            .details
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{i}:{}", d.abbreviation))
            .collect();
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    line
}
