//! # Plan Subcommand
//!
//! Derives the treatment plan of a chart's latest snapshot. Notes and
//! services can be attached for the printout with repeated `--note` and
//! `--service` flags (`KEY=VALUE`); services are checked against the
//! configured service catalog.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use clap::Args;

use odonto_core::{ChartId, ServiceId};
use odonto_plan::{ServiceCatalog, ServiceRef, TreatmentPlan, TreatmentPlanLine, YamlServiceCatalog};
use odonto_store::{FileStore, SnapshotStore};

use crate::config::Settings;
use crate::OutputFormat;

/// Arguments for the `odonto plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Chart identifier.
    #[arg(long)]
    pub chart: ChartId,
    /// Attach a note to a line (`KEY=TEXT`).
    #[arg(long = "note", value_parser = parse_assignment)]
    pub notes: Vec<(String, String)>,
    /// Assign a service to a line (`KEY=SERVICE_ID`).
    #[arg(long = "service", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Split `KEY=VALUE`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Execute the plan subcommand.
pub fn run_plan(args: &PlanArgs, settings: &Settings) -> Result<u8> {
    let store = FileStore::new(&settings.store_root);
    let chart = store
        .load(args.chart)
        .with_context(|| format!("cannot load chart {}", args.chart))?;
    let mut plan = TreatmentPlan::from_chart(&chart);

    for (key, note) in &args.notes {
        plan.annotate(key, note.as_str())?;
    }

    let catalog = settings.services.as_ref().map(YamlServiceCatalog::new);
    if !args.assignments.is_empty() {
        let Some(catalog) = &catalog else {
            bail!("--service needs a service catalog (set `services` in the config or pass --services)");
        };
        for (key, service) in &args.assignments {
            plan.assign_service(key, ServiceId::new(service.as_str()), catalog)?;
        }
    }

    let labels: HashMap<ServiceId, String> = match &catalog {
        Some(catalog) => catalog
            .list_services()?
            .into_iter()
            .map(|ServiceRef { id, label }| (id, label))
            .collect(),
        None => HashMap::new(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => {
            if plan.is_empty() {
                println!("(no findings)");
            }
            for line in plan.lines() {
                println!("{}", render_line(line, &labels));
            }
        }
    }
    Ok(0)
}

/// One text row of the plan.
pub fn render_line(line: &TreatmentPlanLine, services: &HashMap<ServiceId, String>) -> String {
    let mut row = format!("{:<8} {:<6} {}", line.label, line.finding.code, line.finding.name);
    if let Some(face) = line.face {
        row.push_str(&format!(" [{}]", face.label()));
    }
    if let Some(service) = &line.service {
        let label = services.get(service).map_or(service.as_str(), String::as_str);
        row.push_str(&format!(" -> {label}"));
    }
    if !line.note.is_empty() {
        row.push_str(&format!(" \"{}\"", line.note));
    }
    row
}
