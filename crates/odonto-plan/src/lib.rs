//! # odonto-plan: Treatment Plan Derivation
//!
//! Summarizes a chart as annotatable treatment plan lines.
//!
//! - `derive.rs`: the pure `ChartState → Vec<TreatmentPlanLine>` function,
//!   group-key canonicalization and annotation carry-over.
//! - `plan.rs`: `TreatmentPlan`, the lines of the current chart plus the
//!   user's notes and chosen services.
//! - `services.rs`: the `ServiceCatalog` collaborator and its static and YAML
//!   file implementations.
//!
//! Derivation never mutates the chart. Re-deriving an unchanged chart yields
//! an equal list.

pub mod derive;
pub mod error;
pub mod plan;
pub mod services;

pub use derive::{carry_annotations, derive, group_key, TreatmentPlanLine};
pub use error::PlanError;
pub use plan::TreatmentPlan;
pub use services::{ServiceCatalog, ServiceRef, StaticServiceCatalog, YamlServiceCatalog};
