//! # Chart Session
//!
//! One open chart: its store, the placement engine editing it, and the
//! treatment plan derived from it.
//!
//! ## Failure Policy
//!
//! - A failed load (`reload`, `load_version`) leaves the in-memory chart,
//!   plan and version untouched.
//! - A failed save keeps every in-memory edit; retrying is up to the caller.
//! - Saving is refused while a face selection or group delete confirmation
//!   is pending, so a face-targeted base is never persisted without its face.

use odonto_core::ChartId;
use odonto_plan::TreatmentPlan;
use odonto_state::{ChartState, PlacementEngine};

use crate::envelope::{SnapshotEnvelope, SnapshotMeta};
use crate::error::StoreError;
use crate::store::SnapshotStore;

/// An open chart bound to a snapshot store.
#[derive(Debug)]
pub struct ChartSession<S> {
    chart_id: ChartId,
    store: S,
    engine: PlacementEngine,
    plan: TreatmentPlan,
    version: Option<u64>,
}

impl<S: SnapshotStore> ChartSession<S> {
    /// Open the latest snapshot of a chart, or an empty chart if none exists.
    pub fn open(store: S, chart_id: ChartId) -> Result<Self, StoreError> {
        let (chart, version) = match store.fetch_latest(chart_id) {
            Ok(envelope) => {
                let version = envelope.version;
                (envelope.open()?, Some(version))
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(chart_id = %chart_id, "no snapshot yet, starting empty chart");
                (ChartState::new(), None)
            }
            Err(e) => return Err(e),
        };
        let plan = TreatmentPlan::from_chart(&chart);
        Ok(Self {
            chart_id,
            store,
            engine: PlacementEngine::with_chart(chart),
            plan,
            version,
        })
    }

    /// Chart identifier.
    pub fn chart_id(&self) -> ChartId {
        self.chart_id
    }

    /// Version the in-memory chart was loaded from or last saved as.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// The store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current chart.
    pub fn chart(&self) -> &ChartState {
        self.engine.chart()
    }

    /// The placement engine.
    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    /// The placement engine, for edits.
    pub fn engine_mut(&mut self) -> &mut PlacementEngine {
        &mut self.engine
    }

    /// The treatment plan as of the last refresh.
    pub fn plan(&self) -> &TreatmentPlan {
        &self.plan
    }

    /// The treatment plan, for annotations.
    pub fn plan_mut(&mut self) -> &mut TreatmentPlan {
        &mut self.plan
    }

    /// Re-derive the plan from the current chart, keeping annotations.
    pub fn refresh_plan(&mut self) -> &TreatmentPlan {
        self.plan.refresh(self.engine.chart());
        &self.plan
    }

    /// Replace the in-memory chart with the latest saved version.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let envelope = self.store.fetch_latest(self.chart_id)?;
        self.install(envelope)
    }

    /// Replace the in-memory chart with a historical version.
    pub fn load_version(&mut self, version: u64) -> Result<(), StoreError> {
        let envelope = self.store.fetch(self.chart_id, version)?;
        self.install(envelope)
    }

    fn install(&mut self, envelope: SnapshotEnvelope) -> Result<(), StoreError> {
        let version = envelope.version;
        let chart = envelope.open()?;
        self.engine.load(chart);
        self.plan.refresh(self.engine.chart());
        self.version = Some(version);
        tracing::debug!(chart_id = %self.chart_id, version, "snapshot loaded into session");
        Ok(())
    }

    /// Save the current chart as a new version.
    pub fn save(&mut self) -> Result<SnapshotMeta, StoreError> {
        let mode = self.engine.mode();
        if mode.is_interaction_pending() {
            tracing::warn!(chart_id = %self.chart_id, mode = mode.name(), "save refused, interaction pending");
            return Err(StoreError::InteractionPending { mode: mode.name() });
        }
        match self.store.save(self.chart_id, self.engine.chart()) {
            Ok(meta) => {
                self.version = Some(meta.version);
                Ok(meta)
            }
            Err(e) => {
                tracing::warn!(chart_id = %self.chart_id, error = %e, "save failed, edits kept in memory");
                Err(e)
            }
        }
    }

    /// Close the session, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
