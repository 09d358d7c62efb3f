//! # odonto-state: Chart State and Placement Engine
//!
//! Holds the live odontogram and the state machine that edits it.
//!
//! ## Components
//!
//! - **Chart** (`chart.rs`): the sparse `tooth → tipo → FindingInstance` map
//!   plus the per-tooth headline buffer. Empty teeth are never stored.
//!   Grouped instances are written to and removed from every member together.
//!
//! - **Findings** (`finding.rs`): the placed instance type, serialized with
//!   the chart snapshot field names.
//!
//! - **Placement engine** (`engine.rs`): `Idle → Armed → AwaitingFace` and
//!   `AwaitingGroupDeleteConfirm`, dispatching clicks by placement category.
//!
//! ## Design
//!
//! Chart mutators are crate-private. Outside this crate a chart can be read,
//! serialized and validated, but only changed through the engine, so group
//! consistency and the headline rule are enforced in one place.

pub mod chart;
pub mod engine;
pub mod finding;

// ─── Chart re-exports ───────────────────────────────────────────────

pub use chart::{ChartError, ChartMap, ChartState, Headline, ToothFindings};

// ─── Finding re-exports ─────────────────────────────────────────────

pub use finding::{AppliedDetail, FaceFinding, FindingInstance};

// ─── Engine re-exports ──────────────────────────────────────────────

pub use engine::{
    ArmOptions, ArmedFinding, ClickOutcome, PartRemoval, PlacementEngine, PlacementError,
    PlacementMode, RangeBuffer, RangeEntry, RemovalOutcome,
};
