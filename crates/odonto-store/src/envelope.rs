//! # Snapshot Envelope
//!
//! A saved chart plus its identity, version, save time and content digest.
//! The digest is SHA-256 over the canonical bytes of the chart alone, so the
//! same chart saved twice has the same digest at different versions.
//!
//! ## Opening
//!
//! [`SnapshotEnvelope::open`] is the only way to get a chart out of an
//! envelope. It recomputes the digest and validates the group invariant
//! before handing the chart back.

use serde::{Deserialize, Serialize};

use odonto_core::{sha256_digest, CanonicalBytes, ChartId, ContentDigest, Timestamp};
use odonto_state::ChartState;

use crate::error::StoreError;

/// Summary of one saved version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Chart identifier.
    pub chart_id: ChartId,
    /// Version number, starting at 1.
    pub version: u64,
    /// Save time.
    pub saved_at: Timestamp,
    /// Digest of the chart.
    pub digest: ContentDigest,
    /// Number of teeth with findings.
    pub teeth: usize,
}

/// A persisted chart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Chart identifier.
    pub chart_id: ChartId,
    /// Version number, starting at 1.
    pub version: u64,
    /// Save time.
    pub saved_at: Timestamp,
    /// Digest of `chart`.
    pub digest: ContentDigest,
    /// The chart itself, as the plain nested map.
    pub chart: ChartState,
}

/// Digest of a chart's canonical form.
pub fn chart_digest(chart: &ChartState) -> Result<ContentDigest, StoreError> {
    Ok(sha256_digest(&CanonicalBytes::new(chart)?))
}

impl SnapshotEnvelope {
    /// Wrap a chart for saving.
    pub fn seal(chart_id: ChartId, version: u64, chart: &ChartState) -> Result<Self, StoreError> {
        Ok(Self {
            chart_id,
            version,
            saved_at: Timestamp::now(),
            digest: chart_digest(chart)?,
            chart: chart.clone(),
        })
    }

    /// Summary of the envelope.
    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            chart_id: self.chart_id,
            version: self.version,
            saved_at: self.saved_at,
            digest: self.digest,
            teeth: self.chart.tooth_count(),
        }
    }

    /// Verify the digest and group invariant and return the chart.
    pub fn open(self) -> Result<ChartState, StoreError> {
        let computed = chart_digest(&self.chart)?;
        if computed != self.digest {
            tracing::warn!(
                chart_id = %self.chart_id,
                version = self.version,
                "snapshot digest mismatch"
            );
            return Err(StoreError::DigestMismatch {
                chart_id: self.chart_id,
                version: self.version,
                recorded: self.digest,
                computed,
            });
        }
        self.chart.validate()?;
        Ok(self.chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_core::ToothNumber;
    use odonto_state::{ArmOptions, PlacementEngine};

    fn sample_chart() -> ChartState {
        let mut engine = PlacementEngine::new();
        engine.arm("DIA", ArmOptions::default()).unwrap();
        engine.click(ToothNumber::new(11).unwrap()).unwrap();
        engine.click(ToothNumber::new(21).unwrap()).unwrap();
        engine.into_chart()
    }

    #[test]
    fn test_seal_then_open() {
        let chart = sample_chart();
        let envelope = SnapshotEnvelope::seal(ChartId::new(), 1, &chart).unwrap();
        assert_eq!(envelope.meta().teeth, 2);
        assert_eq!(envelope.open().unwrap(), chart);
    }

    #[test]
    fn test_digest_depends_only_on_chart() {
        let chart = sample_chart();
        let a = SnapshotEnvelope::seal(ChartId::new(), 1, &chart).unwrap();
        let b = SnapshotEnvelope::seal(ChartId::new(), 7, &chart).unwrap();
        assert_eq!(a.digest, b.digest);
        assert_ne!(a.digest, chart_digest(&ChartState::new()).unwrap());
    }

    #[test]
    fn test_tampered_chart_rejected() {
        let envelope = SnapshotEnvelope::seal(ChartId::new(), 1, &sample_chart()).unwrap();
        let mut json = serde_json::to_value(&envelope).unwrap();
        json["chart"]["11"]["DIA"]["color"] = serde_json::json!("blue");
        json["chart"]["21"]["DIA"]["color"] = serde_json::json!("blue");
        let tampered: SnapshotEnvelope = serde_json::from_value(json).unwrap();
        assert!(matches!(tampered.open(), Err(StoreError::DigestMismatch { .. })));
    }

    #[test]
    fn test_inconsistent_group_rejected() {
        let envelope = SnapshotEnvelope::seal(ChartId::new(), 1, &sample_chart()).unwrap();
        let mut json = serde_json::to_value(&envelope).unwrap();
        json["chart"]["21"]["DIA"]["color"] = serde_json::json!("blue");
        let mut broken: SnapshotEnvelope = serde_json::from_value(json).unwrap();
        broken.digest = chart_digest(&broken.chart).unwrap();
        assert!(matches!(broken.open(), Err(StoreError::Chart(_))));
    }
}
