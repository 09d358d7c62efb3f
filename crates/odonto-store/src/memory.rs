//! # In-Memory Store
//!
//! Thread-safe, cloneable snapshot store. Clones share the same data.
//! The lock is `parking_lot`, so a panicking writer does not poison it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use odonto_core::ChartId;
use odonto_state::ChartState;

use crate::envelope::{SnapshotEnvelope, SnapshotMeta};
use crate::error::StoreError;
use crate::store::SnapshotStore;

/// Snapshot store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    charts: Arc<RwLock<HashMap<ChartId, Vec<SnapshotEnvelope>>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of charts with at least one version.
    pub fn chart_count(&self) -> usize {
        self.charts.read().len()
    }

    /// Replace a stored envelope in place. Test hook for corruption scenarios.
    #[cfg(test)]
    pub(crate) fn overwrite(&self, envelope: SnapshotEnvelope) {
        let mut guard = self.charts.write();
        if let Some(slot) = guard
            .get_mut(&envelope.chart_id)
            .and_then(|versions| versions.iter_mut().find(|e| e.version == envelope.version))
        {
            *slot = envelope;
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, chart_id: ChartId, chart: &ChartState) -> Result<SnapshotMeta, StoreError> {
        let mut guard = self.charts.write();
        let versions = guard.entry(chart_id).or_default();
        let version = versions.last().map_or(1, |e| e.version + 1);
        let envelope = SnapshotEnvelope::seal(chart_id, version, chart)?;
        let meta = envelope.meta();
        versions.push(envelope);
        tracing::debug!(chart_id = %chart_id, version, "snapshot saved in memory");
        Ok(meta)
    }

    fn history(&self, chart_id: ChartId) -> Result<Vec<SnapshotMeta>, StoreError> {
        Ok(self
            .charts
            .read()
            .get(&chart_id)
            .map(|versions| versions.iter().map(SnapshotEnvelope::meta).collect())
            .unwrap_or_default())
    }

    fn fetch(&self, chart_id: ChartId, version: u64) -> Result<SnapshotEnvelope, StoreError> {
        let guard = self.charts.read();
        let versions = guard.get(&chart_id).ok_or(StoreError::NotFound(chart_id))?;
        versions
            .iter()
            .find(|e| e.version == version)
            .cloned()
            .ok_or(StoreError::VersionNotFound { chart_id, version })
    }
}
