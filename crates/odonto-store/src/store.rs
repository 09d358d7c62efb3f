//! # Snapshot Store Contract
//!
//! Persistence is all-or-nothing: a store is handed a complete chart on save
//! and hands back a complete chart on load. Every save appends a new
//! immutable version; older versions stay loadable.

use odonto_core::ChartId;
use odonto_state::ChartState;

use crate::envelope::{SnapshotEnvelope, SnapshotMeta};
use crate::error::StoreError;

/// A versioned chart snapshot store.
pub trait SnapshotStore {
    /// Append a new version of the chart.
    fn save(&self, chart_id: ChartId, chart: &ChartState) -> Result<SnapshotMeta, StoreError>;

    /// All saved versions, oldest first. Empty if the chart was never saved.
    fn history(&self, chart_id: ChartId) -> Result<Vec<SnapshotMeta>, StoreError>;

    /// The raw envelope of one version, not yet verified.
    fn fetch(&self, chart_id: ChartId, version: u64) -> Result<SnapshotEnvelope, StoreError>;

    /// The envelope of the latest version, not yet verified.
    fn fetch_latest(&self, chart_id: ChartId) -> Result<SnapshotEnvelope, StoreError> {
        let latest = self
            .history(chart_id)?
            .last()
            .map(|meta| meta.version)
            .ok_or(StoreError::NotFound(chart_id))?;
        self.fetch(chart_id, latest)
    }

    /// Verified chart of one version.
    fn load_version(&self, chart_id: ChartId, version: u64) -> Result<ChartState, StoreError> {
        self.fetch(chart_id, version)?.open()
    }

    /// Verified chart of the latest version.
    fn load(&self, chart_id: ChartId) -> Result<ChartState, StoreError> {
        self.fetch_latest(chart_id)?.open()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn save(&self, chart_id: ChartId, chart: &ChartState) -> Result<SnapshotMeta, StoreError> {
        (**self).save(chart_id, chart)
    }

    fn history(&self, chart_id: ChartId) -> Result<Vec<SnapshotMeta>, StoreError> {
        (**self).history(chart_id)
    }

    fn fetch(&self, chart_id: ChartId, version: u64) -> Result<SnapshotEnvelope, StoreError> {
        (**self).fetch(chart_id, version)
    }

    fn fetch_latest(&self, chart_id: ChartId) -> Result<SnapshotEnvelope, StoreError> {
        (**self).fetch_latest(chart_id)
    }
}
