//! # Treatment Plan
//!
//! The derived lines of the current chart plus the annotations the user has
//! added to them. Annotations survive re-derivation as long as the line's
//! key still exists.

use serde::{Deserialize, Serialize};

use odonto_core::ServiceId;
use odonto_state::ChartState;

use crate::derive::{carry_annotations, derive, TreatmentPlanLine};
use crate::error::PlanError;
use crate::services::ServiceCatalog;

/// The treatment plan of one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreatmentPlan {
    lines: Vec<TreatmentPlanLine>,
}

impl TreatmentPlan {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan freshly derived from a chart.
    pub fn from_chart(chart: &ChartState) -> Self {
        Self {
            lines: derive(chart),
        }
    }

    /// Re-derive from the chart, keeping annotations on surviving keys.
    pub fn refresh(&mut self, chart: &ChartState) {
        let mut next = derive(chart);
        carry_annotations(&self.lines, &mut next);
        let dropped = self
            .lines
            .iter()
            .filter(|old| (!old.note.is_empty() || old.service.is_some()) && !next.iter().any(|l| l.key == old.key))
            .count();
        if dropped > 0 {
            tracing::debug!(dropped, "annotated plan lines no longer present in chart");
        }
        self.lines = next;
    }

    /// All lines in display order.
    pub fn lines(&self) -> &[TreatmentPlanLine] {
        &self.lines
    }

    /// Line by key.
    pub fn line(&self, key: &str) -> Option<&TreatmentPlanLine> {
        self.lines.iter().find(|l| l.key == key)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the plan has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Set the note of a line.
    pub fn annotate(&mut self, key: &str, note: impl Into<String>) -> Result<(), PlanError> {
        self.line_mut(key)?.note = note.into();
        Ok(())
    }

    /// Assign a billable service to a line. The service must exist in `catalog`.
    pub fn assign_service(
        &mut self,
        key: &str,
        service: ServiceId,
        catalog: &dyn ServiceCatalog,
    ) -> Result<(), PlanError> {
        // A missing key is reported before the catalog is consulted.
        self.line_mut(key)?;
        if catalog.find(&service)?.is_none() {
            return Err(PlanError::UnknownService(service));
        }
        self.line_mut(key)?.service = Some(service);
        Ok(())
    }

    /// Remove the service from a line.
    pub fn clear_service(&mut self, key: &str) -> Result<Option<ServiceId>, PlanError> {
        Ok(self.line_mut(key)?.service.take())
    }

    fn line_mut(&mut self, key: &str) -> Result<&mut TreatmentPlanLine, PlanError> {
        self.lines
            .iter_mut()
            .find(|l| l.key == key)
            .ok_or_else(|| PlanError::LineNotFound(key.to_string()))
    }
}
