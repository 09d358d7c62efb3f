//! # Placement Engine
//!
//! Turns an armed finding plus tooth clicks into chart mutations. The engine
//! owns the [`ChartState`]; every mutation of a live chart goes through it.
//!
//! ## States
//!
//! ```text
//!            arm()                      click() [face-targeted]
//!   Idle ───────────▶ Armed ─────────────────────────────▶ AwaitingFace
//!    ▲  ◀─ disarm() ─   │ ▲                                   │    │
//!    │                  │ └──────── select_face() ────────────┘    │
//!    │                  │ └──────── cancel() (slot restored) ──────┘
//!    │                  │
//!    │   request_removal() [grouped]
//!    │                  ▼
//!    └── resumed ── AwaitingGroupDeleteConfirm ── confirm_removal() / cancel()
//! ```
//!
//! `AwaitingGroupDeleteConfirm` remembers the mode it was entered from and
//! returns to it, so confirming a deletion does not disarm the current tool.
//!
//! ## Category Dispatch (in `Armed`)
//!
//! - **Whole tooth**: written immediately; only a same-`tipo` re-placement
//!   overwrites.
//! - **Face targeted**: the base instance is written, then a face is awaited.
//!   Cancelling puts back exactly what the slot held before the click.
//! - **Pair endpoints / range fill**: the first click is recorded in the
//!   [`RangeBuffer`], the second completes it. Pairs write the two endpoints,
//!   ranges every tooth in between. Endpoints on different arches or
//!   dentitions are rejected and the buffer is reset.
//!
//! A click while `Idle` is a silent no-op.

use serde::Serialize;
use thiserror::Error;

use odonto_core::{
    catalog, layout, Arch, DetailOption, Direction, FaceKey, FindingCode, FindingColor,
    FindingDefinition, OdontoError, PlacementCategory, ToothNumber,
};

use crate::chart::{ChartError, ChartState, Headline};
use crate::finding::{AppliedDetail, FaceFinding, FindingInstance};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by placement engine operations.
///
/// Every error leaves the chart untouched, except `InvalidRange` which also
/// clears the half-captured range.
#[derive(Error, Debug)]
pub enum PlacementError {
    /// No catalog entry for this code or index.
    #[error("unknown finding: {0}")]
    UnknownFinding(String),

    /// The chosen detail index does not exist for the finding.
    #[error("finding {code} has {available} detail options, index {index} is out of range")]
    DetailOutOfRange {
        /// Finding code.
        code: String,
        /// Requested index.
        index: usize,
        /// Number of options.
        available: usize,
    },

    /// The finding leaves the color to the user and none was chosen.
    #[error("finding {code} requires a color choice")]
    ColorRequired {
        /// Finding code.
        code: String,
    },

    /// The finding is drawn with an arrow and no direction was chosen.
    #[error("finding {code} requires a direction")]
    DirectionRequired {
        /// Finding code.
        code: String,
    },

    /// The two range endpoints cannot form a range.
    #[error("invalid range: {0}")]
    InvalidRange(#[from] OdontoError),

    /// Both endpoints of a pair finding are the same tooth.
    #[error("pair finding needs two different teeth, got {tooth} twice")]
    DegeneratePair {
        /// The tooth clicked twice.
        tooth: ToothNumber,
    },

    /// Another two-step interaction must be finished or cancelled first.
    #[error("interaction pending: {mode}")]
    InteractionPending {
        /// Name of the current mode.
        mode: &'static str,
    },

    /// `select_face` or `confirm_removal` without a matching pending step.
    #[error("no pending interaction to complete")]
    NoPendingInteraction,

    /// No finding with this code on the tooth.
    #[error("tooth {tooth} has no finding {code}")]
    FindingNotFound {
        /// The tooth.
        tooth: ToothNumber,
        /// The finding code.
        code: String,
    },

    /// The finding has no detail at this index.
    #[error("finding {code} on tooth {tooth} has no detail at index {index}")]
    DetailNotFound {
        /// The tooth.
        tooth: ToothNumber,
        /// The finding code.
        code: String,
        /// Requested index.
        index: usize,
    },

    /// The finding has no entry for this face.
    #[error("finding {code} on tooth {tooth} has no entry for face {face}")]
    FaceNotFound {
        /// The tooth.
        tooth: ToothNumber,
        /// The finding code.
        code: String,
        /// Requested face.
        face: FaceKey,
    },

    /// A chart-level group operation failed.
    #[error(transparent)]
    Chart(#[from] ChartError),
}

// ─── Armed finding ───────────────────────────────────────────────────

/// Choices made when arming a finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmOptions {
    /// Color, required for user-choice findings, ignored for fixed ones.
    pub color: Option<FindingColor>,
    /// Index into the finding's detail options.
    pub detail: Option<usize>,
    /// Arrow direction, required for directional findings.
    pub direction: Option<Direction>,
}

/// A finding resolved against the catalog and ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedFinding {
    definition: &'static FindingDefinition,
    color: FindingColor,
    detail: Option<usize>,
    direction: Option<Direction>,
}

impl ArmedFinding {
    /// Resolve options against a definition.
    fn resolve(
        definition: &'static FindingDefinition,
        options: ArmOptions,
    ) -> Result<Self, PlacementError> {
        let color = definition
            .color
            .resolve(options.color)
            .ok_or_else(|| PlacementError::ColorRequired {
                code: definition.code.to_string(),
            })?;
        if let Some(index) = options.detail {
            if definition.detail(index).is_none() {
                return Err(PlacementError::DetailOutOfRange {
                    code: definition.code.to_string(),
                    index,
                    available: definition.details.len(),
                });
            }
        }
        if definition.directional && options.direction.is_none() {
            return Err(PlacementError::DirectionRequired {
                code: definition.code.to_string(),
            });
        }
        Ok(Self {
            definition,
            color,
            detail: options.detail,
            direction: options.direction.filter(|_| definition.directional),
        })
    }

    /// The catalog definition.
    pub fn definition(&self) -> &'static FindingDefinition {
        self.definition
    }

    /// Resolved color.
    pub fn color(&self) -> FindingColor {
        self.color
    }

    /// Chosen detail option.
    pub fn detail(&self) -> Option<&'static DetailOption> {
        self.detail.and_then(|i| self.definition.detail(i))
    }

    /// Chosen direction.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    fn code(&self) -> &'static str {
        self.definition.code
    }

    fn applied_detail(&self) -> Option<AppliedDetail> {
        self.detail().map(AppliedDetail::from)
    }

    fn base_instance(&self) -> FindingInstance {
        let mut instance = FindingInstance::from_definition(self.definition, self.color);
        instance.direction = self.direction;
        instance
    }
}

// ─── Range buffer ────────────────────────────────────────────────────

/// One recorded endpoint of a two-click range gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeEntry {
    /// The clicked tooth.
    pub tooth: ToothNumber,
    /// Its arch position.
    pub position: usize,
    /// Its arch.
    pub arch: Arch,
}

impl RangeEntry {
    fn of(tooth: ToothNumber) -> Self {
        let slot = layout::slot(tooth);
        Self {
            tooth,
            position: slot.position,
            arch: slot.arch(),
        }
    }
}

/// Endpoints awaiting completion of a range gesture. Never holds more than two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeBuffer {
    entries: Vec<RangeEntry>,
}

impl RangeBuffer {
    /// Recorded entries.
    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an endpoint. When it is the second one, both are handed back
    /// and the buffer is emptied.
    fn record(&mut self, entry: RangeEntry) -> Option<(RangeEntry, RangeEntry)> {
        self.entries.push(entry);
        if self.entries.len() < 2 {
            return None;
        }
        let end = self.entries.pop()?;
        let start = self.entries.pop()?;
        self.entries.clear();
        Some((start, end))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─── Modes and outcomes ──────────────────────────────────────────────

/// Current state of the placement state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Nothing armed; clicks are ignored.
    #[default]
    Idle,
    /// A finding is armed.
    Armed {
        /// The armed finding.
        finding: ArmedFinding,
        /// Endpoints captured so far for range findings.
        range: RangeBuffer,
    },
    /// A face-targeted base instance was written; waiting for a face.
    AwaitingFace {
        /// The armed finding.
        finding: ArmedFinding,
        /// The clicked tooth.
        tooth: ToothNumber,
        /// What the slot held before the click.
        prior: Option<FindingInstance>,
        /// The tooth headline before the click.
        prior_headline: Option<Headline>,
    },
    /// A grouped finding was selected for removal; waiting for confirmation.
    AwaitingGroupDeleteConfirm {
        /// The tooth the removal was requested on.
        tooth: ToothNumber,
        /// The finding code.
        code: FindingCode,
        /// Every member that will lose the slot.
        members: Vec<ToothNumber>,
        /// Mode to return to afterwards.
        resume: Box<PlacementMode>,
    },
}

impl PlacementMode {
    /// Canonical name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Armed { .. } => "ARMED",
            Self::AwaitingFace { .. } => "AWAITING_FACE",
            Self::AwaitingGroupDeleteConfirm { .. } => "AWAITING_GROUP_DELETE_CONFIRM",
        }
    }

    /// Whether a two-step interaction is waiting for completion.
    pub fn is_interaction_pending(&self) -> bool {
        matches!(
            self,
            Self::AwaitingFace { .. } | Self::AwaitingGroupDeleteConfirm { .. }
        )
    }

    /// The armed finding, in any mode that has one.
    pub fn armed(&self) -> Option<&ArmedFinding> {
        match self {
            Self::Armed { finding, .. } | Self::AwaitingFace { finding, .. } => Some(finding),
            Self::AwaitingGroupDeleteConfirm { resume, .. } => resume.armed(),
            Self::Idle => None,
        }
    }
}

impl std::fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a tooth click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing armed; the click did nothing.
    Ignored,
    /// The finding was written on these teeth.
    Placed {
        /// Teeth written, in arch order for multi-tooth findings.
        teeth: Vec<ToothNumber>,
    },
    /// The base instance was written; a face must be selected next.
    AwaitingFace {
        /// The clicked tooth.
        tooth: ToothNumber,
    },
    /// First endpoint of a range recorded.
    RangeStarted {
        /// The clicked tooth.
        tooth: ToothNumber,
    },
}

/// Result of a removal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The finding was removed from these teeth.
    Removed {
        /// Teeth that lost the slot.
        teeth: Vec<ToothNumber>,
    },
    /// The finding is grouped; confirm or cancel to continue.
    NeedsConfirmation {
        /// Teeth that will lose the slot.
        members: Vec<ToothNumber>,
    },
}

/// Result of removing one detail (or one face entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartRemoval {
    /// The part was removed; the finding stays.
    Removed,
    /// The part was the last thing identifying the finding; the slot was cleared.
    SlotCleared {
        /// Teeth that lost the slot.
        teeth: Vec<ToothNumber>,
    },
}

// ─── Engine ──────────────────────────────────────────────────────────

/// The placement state machine together with the chart it edits.
#[derive(Debug, Clone, Default)]
pub struct PlacementEngine {
    chart: ChartState,
    mode: PlacementMode,
}

impl PlacementEngine {
    /// An idle engine over an empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// An idle engine over an existing chart.
    pub fn with_chart(chart: ChartState) -> Self {
        Self {
            chart,
            mode: PlacementMode::Idle,
        }
    }

    /// The chart being edited.
    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    /// The current mode.
    pub fn mode(&self) -> &PlacementMode {
        &self.mode
    }

    /// Replace the chart wholesale (a snapshot was loaded). Any pending
    /// interaction is dropped and the engine returns to `Idle`.
    pub fn load(&mut self, chart: ChartState) {
        tracing::debug!(teeth = chart.tooth_count(), "chart loaded into placement engine");
        self.chart = chart;
        self.mode = PlacementMode::Idle;
    }

    /// Hand the chart back, consuming the engine.
    pub fn into_chart(self) -> ChartState {
        self.chart
    }

    // ── Arming ───────────────────────────────────────────────────────

    /// Arm a finding by `tipo` code.
    pub fn arm(&mut self, code: &str, options: ArmOptions) -> Result<(), PlacementError> {
        let definition =
            catalog::lookup(code).ok_or_else(|| PlacementError::UnknownFinding(code.to_string()))?;
        self.arm_definition(definition, options)
    }

    /// Arm a finding by catalog index.
    pub fn arm_index(&mut self, index: usize, options: ArmOptions) -> Result<(), PlacementError> {
        let definition = catalog::by_index(index)
            .ok_or_else(|| PlacementError::UnknownFinding(format!("#{index}")))?;
        self.arm_definition(definition, options)
    }

    fn arm_definition(
        &mut self,
        definition: &'static FindingDefinition,
        options: ArmOptions,
    ) -> Result<(), PlacementError> {
        self.require_no_pending()?;
        let finding = ArmedFinding::resolve(definition, options)?;
        tracing::debug!(tipo = definition.code, color = %finding.color, "finding armed");
        self.mode = PlacementMode::Armed {
            finding,
            range: RangeBuffer::default(),
        };
        Ok(())
    }

    /// Return to `Idle`, cancelling any pending interaction first.
    pub fn disarm(&mut self) {
        self.cancel();
        self.mode = PlacementMode::Idle;
    }

    // ── Clicks ───────────────────────────────────────────────────────

    /// Handle a click on a tooth.
    pub fn click(&mut self, tooth: ToothNumber) -> Result<ClickOutcome, PlacementError> {
        let finding = match &self.mode {
            PlacementMode::Idle => return Ok(ClickOutcome::Ignored),
            PlacementMode::Armed { finding, .. } => finding.clone(),
            pending => {
                return Err(PlacementError::InteractionPending {
                    mode: pending.name(),
                })
            }
        };
        match finding.definition.category {
            PlacementCategory::WholeTooth => Ok(self.place_whole_tooth(&finding, tooth)),
            PlacementCategory::FaceTargeted => Ok(self.place_face_base(finding, tooth)),
            PlacementCategory::PairEndpoints | PlacementCategory::RangeFill => {
                self.record_endpoint(&finding, tooth)
            }
        }
    }

    fn place_whole_tooth(&mut self, finding: &ArmedFinding, tooth: ToothNumber) -> ClickOutcome {
        let mut instance = finding.base_instance();
        if finding.definition.accumulates_details {
            if let Some(prior) = self.chart.get(tooth, finding.code()) {
                instance.details = prior.details.clone();
            }
        }
        if let Some(detail) = finding.applied_detail() {
            if !instance.details.contains(&detail) {
                instance.details.push(detail);
            }
        }
        self.chart.set(tooth, instance);
        tracing::debug!(tooth = %tooth, tipo = finding.code(), "whole-tooth finding placed");
        ClickOutcome::Placed { teeth: vec![tooth] }
    }

    fn place_face_base(&mut self, finding: ArmedFinding, tooth: ToothNumber) -> ClickOutcome {
        let prior = self.chart.get(tooth, finding.code()).cloned();
        let prior_headline = self.chart.headline(tooth).cloned();
        let mut base = finding.base_instance();
        if let Some(prior) = &prior {
            base.faces = prior.faces.clone();
        }
        self.chart.set(tooth, base);
        tracing::debug!(tooth = %tooth, tipo = finding.code(), "face-targeted base placed, awaiting face");
        self.mode = PlacementMode::AwaitingFace {
            finding,
            tooth,
            prior,
            prior_headline,
        };
        ClickOutcome::AwaitingFace { tooth }
    }

    fn record_endpoint(
        &mut self,
        finding: &ArmedFinding,
        tooth: ToothNumber,
    ) -> Result<ClickOutcome, PlacementError> {
        let PlacementMode::Armed { range, .. } = &mut self.mode else {
            return Ok(ClickOutcome::Ignored);
        };
        let Some((start, end)) = range.record(RangeEntry::of(tooth)) else {
            tracing::debug!(tooth = %tooth, tipo = finding.code(), "range started");
            return Ok(ClickOutcome::RangeStarted { tooth });
        };

        let members = match self.range_members(finding.definition.category, start, end) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(
                    from = %start.tooth,
                    to = %end.tooth,
                    tipo = finding.code(),
                    error = %e,
                    "range completion rejected; range reset"
                );
                return Err(e);
            }
        };

        let mut instance = finding.base_instance();
        instance.details.extend(finding.applied_detail());
        instance.group = Some(members.clone());
        self.chart.set_group(instance)?;
        tracing::debug!(
            from = %start.tooth,
            to = %end.tooth,
            members = members.len(),
            tipo = finding.code(),
            "multi-tooth finding placed"
        );
        Ok(ClickOutcome::Placed { teeth: members })
    }

    fn range_members(
        &self,
        category: PlacementCategory,
        start: RangeEntry,
        end: RangeEntry,
    ) -> Result<Vec<ToothNumber>, PlacementError> {
        if category == PlacementCategory::RangeFill {
            return Ok(layout::span(start.tooth, end.tooth)?);
        }
        let (lo, hi) = layout::ordered_pair(start.tooth, end.tooth)?;
        if lo.tooth == hi.tooth {
            return Err(PlacementError::DegeneratePair { tooth: lo.tooth });
        }
        Ok(vec![lo.tooth, hi.tooth])
    }

    // ── Face selection ───────────────────────────────────────────────

    /// Commit the pending face-targeted finding onto a face.
    pub fn select_face(&mut self, face: FaceKey) -> Result<(), PlacementError> {
        let (finding, tooth) = match &self.mode {
            PlacementMode::AwaitingFace { finding, tooth, .. } => (finding.clone(), *tooth),
            _ => return Err(PlacementError::NoPendingInteraction),
        };
        let mut instance = self
            .chart
            .get(tooth, finding.code())
            .cloned()
            .unwrap_or_else(|| finding.base_instance());
        instance.faces.insert(
            face,
            FaceFinding {
                face,
                code: instance.code.clone(),
                name: instance.name.clone(),
                color: finding.color,
                detail: finding.applied_detail(),
            },
        );
        self.chart.set(tooth, instance);
        tracing::debug!(tooth = %tooth, tipo = finding.code(), face = %face, "face finding placed");
        self.mode = PlacementMode::Armed {
            finding,
            range: RangeBuffer::default(),
        };
        Ok(())
    }

    // ── Cancellation ─────────────────────────────────────────────────

    /// Cancel whatever is pending. Returns whether anything was pending.
    ///
    /// - Face selection: the slot goes back to exactly what it held before
    ///   the click, and the finding stays armed.
    /// - Group delete confirmation: nothing is deleted; the previous mode resumes.
    /// - A half-captured range: the buffer is cleared; the finding stays armed.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.mode) {
            PlacementMode::Idle => false,
            PlacementMode::Armed { finding, range } => {
                let had_range = !range.is_empty();
                self.mode = PlacementMode::Armed {
                    finding,
                    range: RangeBuffer::default(),
                };
                had_range
            }
            PlacementMode::AwaitingFace {
                finding,
                tooth,
                prior,
                prior_headline,
            } => {
                match prior {
                    Some(prior) => {
                        self.chart.set(tooth, prior);
                    }
                    None => {
                        self.chart.remove(tooth, finding.code());
                    }
                }
                self.chart.restore_headline(tooth, prior_headline);
                tracing::debug!(tooth = %tooth, tipo = finding.code(), "face selection cancelled");
                self.mode = PlacementMode::Armed {
                    finding,
                    range: RangeBuffer::default(),
                };
                true
            }
            PlacementMode::AwaitingGroupDeleteConfirm { resume, code, .. } => {
                tracing::debug!(tipo = %code, "group deletion cancelled");
                self.mode = *resume;
                true
            }
        }
    }

    // ── Removal ──────────────────────────────────────────────────────

    /// Remove a whole finding. Grouped findings need [`confirm_removal`](Self::confirm_removal).
    pub fn request_removal(
        &mut self,
        tooth: ToothNumber,
        code: &str,
    ) -> Result<RemovalOutcome, PlacementError> {
        self.require_no_pending()?;
        let instance = self.require_finding(tooth, code)?;
        if !instance.is_grouped() {
            self.chart.remove(tooth, code);
            tracing::debug!(tooth = %tooth, tipo = code, "finding removed");
            return Ok(RemovalOutcome::Removed { teeth: vec![tooth] });
        }
        let members = instance.members(tooth);
        let resume = std::mem::take(&mut self.mode);
        self.mode = PlacementMode::AwaitingGroupDeleteConfirm {
            tooth,
            code: FindingCode::from(code),
            members: members.clone(),
            resume: Box::new(resume),
        };
        Ok(RemovalOutcome::NeedsConfirmation { members })
    }

    /// Confirm a pending group removal. The slot is removed from every member
    /// or, if the group turns out inconsistent, from none.
    pub fn confirm_removal(&mut self) -> Result<Vec<ToothNumber>, PlacementError> {
        match std::mem::take(&mut self.mode) {
            PlacementMode::AwaitingGroupDeleteConfirm {
                tooth,
                code,
                resume,
                ..
            } => {
                self.mode = *resume;
                let removed = self.chart.remove_group(tooth, code.as_str())?;
                tracing::debug!(tipo = %code, members = removed.len(), "grouped finding removed");
                Ok(removed)
            }
            other => {
                self.mode = other;
                Err(PlacementError::NoPendingInteraction)
            }
        }
    }

    /// Drop one applied detail from a finding.
    ///
    /// When that leaves the finding with no details, no base abbreviation and
    /// no face entries, the slot is cleared and the headline recomputed.
    pub fn remove_detail(
        &mut self,
        tooth: ToothNumber,
        code: &str,
        index: usize,
    ) -> Result<PartRemoval, PlacementError> {
        self.require_no_pending()?;
        let mut updated = self.require_finding(tooth, code)?;
        if index >= updated.details.len() {
            return Err(PlacementError::DetailNotFound {
                tooth,
                code: code.to_string(),
                index,
            });
        }
        updated.details.remove(index);
        tracing::debug!(tooth = %tooth, tipo = code, index, "detail removed");
        self.write_back_or_clear(tooth, updated)
    }

    /// Drop one face entry from a face-targeted finding. Clears the slot when
    /// nothing else identifies the finding.
    pub fn remove_face(
        &mut self,
        tooth: ToothNumber,
        code: &str,
        face: FaceKey,
    ) -> Result<PartRemoval, PlacementError> {
        self.require_no_pending()?;
        let mut updated = self.require_finding(tooth, code)?;
        if updated.faces.remove(&face).is_none() {
            return Err(PlacementError::FaceNotFound {
                tooth,
                code: code.to_string(),
                face,
            });
        }
        tracing::debug!(tooth = %tooth, tipo = code, face = %face, "face entry removed");
        self.write_back_or_clear(tooth, updated)
    }

    fn write_back_or_clear(
        &mut self,
        tooth: ToothNumber,
        updated: FindingInstance,
    ) -> Result<PartRemoval, PlacementError> {
        let code = updated.code.clone();
        let empty =
            updated.details.is_empty() && updated.abbreviation.is_none() && updated.faces.is_empty();
        match (empty, updated.is_grouped()) {
            (true, true) => {
                let teeth = self.chart.remove_group(tooth, code.as_str())?;
                Ok(PartRemoval::SlotCleared { teeth })
            }
            (true, false) => {
                self.chart.remove(tooth, code.as_str());
                tracing::debug!(tooth = %tooth, tipo = %code, "slot cleared");
                Ok(PartRemoval::SlotCleared { teeth: vec![tooth] })
            }
            (false, true) => {
                self.chart.set_group(updated)?;
                Ok(PartRemoval::Removed)
            }
            (false, false) => {
                self.chart.set(tooth, updated);
                Ok(PartRemoval::Removed)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn require_no_pending(&self) -> Result<(), PlacementError> {
        if self.mode.is_interaction_pending() {
            return Err(PlacementError::InteractionPending {
                mode: self.mode.name(),
            });
        }
        Ok(())
    }

    fn require_finding(&self, tooth: ToothNumber, code: &str) -> Result<FindingInstance, PlacementError> {
        self.chart
            .get(tooth, code)
            .cloned()
            .ok_or_else(|| PlacementError::FindingNotFound {
                tooth,
                code: code.to_string(),
            })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    fn detail(index: usize) -> ArmOptions {
        ArmOptions {
            detail: Some(index),
            ..ArmOptions::default()
        }
    }

    fn colored(color: FindingColor) -> ArmOptions {
        ArmOptions {
            color: Some(color),
            ..ArmOptions::default()
        }
    }

    // ── Arming ───────────────────────────────────────────────────────

    #[test]
    fn test_new_engine_is_idle() {
        let engine = PlacementEngine::new();
        assert_eq!(engine.mode(), &PlacementMode::Idle);
        assert!(engine.chart().is_empty());
    }

    #[test]
    fn test_arm_unknown_code() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.arm("NOPE", ArmOptions::default()),
            Err(PlacementError::UnknownFinding(_))
        ));
        assert!(engine.arm_index(999, ArmOptions::default()).is_err());
    }

    #[test]
    fn test_arm_requires_color_for_user_choice() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.arm("AOF", ArmOptions::default()),
            Err(PlacementError::ColorRequired { .. })
        ));
        engine.arm("AOF", colored(FindingColor::Blue)).unwrap();
        assert_eq!(engine.mode().armed().unwrap().color(), FindingColor::Blue);
    }

    #[test]
    fn test_fixed_color_ignores_request() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", colored(FindingColor::Blue)).unwrap();
        assert_eq!(engine.mode().armed().unwrap().color(), FindingColor::Red);
    }

    #[test]
    fn test_arm_validates_detail_index() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.arm("LCD", detail(10)),
            Err(PlacementError::DetailOutOfRange { available: 4, .. })
        ));
    }

    #[test]
    fn test_arm_requires_direction() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.arm("GIR", ArmOptions::default()),
            Err(PlacementError::DirectionRequired { .. })
        ));
        engine
            .arm(
                "GIR",
                ArmOptions {
                    direction: Some(Direction::Clockwise),
                    ..ArmOptions::default()
                },
            )
            .unwrap();
        engine.click(tooth(13)).unwrap();
        assert_eq!(
            engine.chart().get(tooth(13), "GIR").unwrap().direction,
            Some(Direction::Clockwise)
        );
    }

    #[test]
    fn test_arm_index_matches_catalog() {
        let mut engine = PlacementEngine::new();
        let index = catalog::index_of("DA").unwrap();
        engine.arm_index(index, ArmOptions::default()).unwrap();
        assert_eq!(engine.mode().armed().unwrap().definition().code, "DA");
    }

    // ── Whole tooth ──────────────────────────────────────────────────

    #[test]
    fn test_click_while_idle_is_noop() {
        let mut engine = PlacementEngine::new();
        assert_eq!(engine.click(tooth(16)).unwrap(), ClickOutcome::Ignored);
        assert!(engine.chart().is_empty());
    }

    #[test]
    fn test_whole_tooth_placement_and_coexistence() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIS", ArmOptions::default()).unwrap();
        assert_eq!(
            engine.click(tooth(16)).unwrap(),
            ClickOutcome::Placed { teeth: vec![tooth(16)] }
        );
        engine.arm("RR", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        let findings = engine.chart().findings(tooth(16)).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(engine.chart().headline(tooth(16)).unwrap().abbreviation, "RR");
    }

    #[test]
    fn test_same_code_overwrites() {
        let mut engine = PlacementEngine::new();
        engine.arm("TP", ArmOptions { detail: Some(0), color: Some(FindingColor::Red), direction: None }).unwrap();
        engine.click(tooth(36)).unwrap();
        engine.arm("TP", ArmOptions { detail: Some(2), color: Some(FindingColor::Blue), direction: None }).unwrap();
        engine.click(tooth(36)).unwrap();

        let inst = engine.chart().get(tooth(36), "TP").unwrap();
        assert_eq!(inst.color, FindingColor::Blue);
        assert_eq!(inst.details.len(), 1);
        assert_eq!(inst.details[0].abbreviation, "PP");
    }

    #[test]
    fn test_accumulating_details() {
        let mut engine = PlacementEngine::new();
        engine.arm("DDE", detail(0)).unwrap();
        engine.click(tooth(11)).unwrap();
        engine.arm("DDE", detail(4)).unwrap();
        engine.click(tooth(11)).unwrap();
        engine.click(tooth(11)).unwrap();

        let abbrs: Vec<&str> = engine
            .chart()
            .get(tooth(11), "DDE")
            .unwrap()
            .details
            .iter()
            .map(|d| d.abbreviation.as_str())
            .collect();
        assert_eq!(abbrs, vec!["HP", "FL"]);
        assert_eq!(engine.chart().headline(tooth(11)).unwrap().abbreviation, "FL");
    }

    // ── Face targeted ────────────────────────────────────────────────

    #[test]
    fn test_face_targeted_flow() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", detail(1)).unwrap();
        assert_eq!(
            engine.click(tooth(16)).unwrap(),
            ClickOutcome::AwaitingFace { tooth: tooth(16) }
        );
        assert_eq!(engine.mode().name(), "AWAITING_FACE");
        assert!(engine.chart().get(tooth(16), "LCD").is_some());

        engine.select_face(FaceKey::Occlusal).unwrap();
        assert_eq!(engine.mode().name(), "ARMED");
        let inst = engine.chart().get(tooth(16), "LCD").unwrap();
        let face = &inst.faces[&FaceKey::Occlusal];
        assert_eq!(face.detail.as_ref().unwrap().abbreviation, "CE");
        assert_eq!(engine.chart().headline(tooth(16)).unwrap().abbreviation, "CE");
    }

    #[test]
    fn test_faces_accumulate_on_one_instance() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", detail(0)).unwrap();
        engine.click(tooth(46)).unwrap();
        engine.select_face(FaceKey::Mesial).unwrap();
        engine.click(tooth(46)).unwrap();
        engine.select_face(FaceKey::Distal).unwrap();
        assert_eq!(engine.chart().get(tooth(46), "LCD").unwrap().faces.len(), 2);
    }

    #[test]
    fn test_cancel_face_selection_restores_empty_slot() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIS", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        let before = engine.chart().clone();
        let headline_before = engine.chart().headline(tooth(16)).cloned();

        engine.arm("LCD", detail(2)).unwrap();
        engine.click(tooth(16)).unwrap();
        assert!(engine.cancel());

        assert_eq!(engine.chart(), &before);
        assert!(engine.chart().get(tooth(16), "LCD").is_none());
        assert_eq!(engine.chart().headline(tooth(16)).cloned(), headline_before);
        assert_eq!(engine.mode().name(), "ARMED");
    }

    #[test]
    fn test_cancel_face_selection_restores_prior_instance() {
        let mut engine = PlacementEngine::new();
        engine.arm("RD", ArmOptions { color: Some(FindingColor::Blue), detail: Some(1), direction: None }).unwrap();
        engine.click(tooth(26)).unwrap();
        engine.select_face(FaceKey::Occlusal).unwrap();
        let before = engine.chart().clone();

        engine.arm("RD", ArmOptions { color: Some(FindingColor::Red), detail: Some(0), direction: None }).unwrap();
        engine.click(tooth(26)).unwrap();
        assert_eq!(engine.chart().get(tooth(26), "RD").unwrap().color, FindingColor::Red);
        engine.cancel();
        assert_eq!(engine.chart(), &before);
    }

    #[test]
    fn test_click_during_face_selection_rejected() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        assert!(matches!(
            engine.click(tooth(17)),
            Err(PlacementError::InteractionPending { .. })
        ));
        assert!(engine.chart().get(tooth(17), "LCD").is_none());
    }

    #[test]
    fn test_select_face_without_pending() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.select_face(FaceKey::Mesial),
            Err(PlacementError::NoPendingInteraction)
        ));
    }

    #[test]
    fn test_disarm_cancels_face_selection() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        engine.disarm();
        assert_eq!(engine.mode(), &PlacementMode::Idle);
        assert!(engine.chart().is_empty());
    }

    // ── Pair and range ───────────────────────────────────────────────

    #[test]
    fn test_pair_endpoints_ordered_by_arch_position() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIA", ArmOptions::default()).unwrap();
        assert_eq!(
            engine.click(tooth(21)).unwrap(),
            ClickOutcome::RangeStarted { tooth: tooth(21) }
        );
        assert_eq!(
            engine.click(tooth(11)).unwrap(),
            ClickOutcome::Placed { teeth: vec![tooth(11), tooth(21)] }
        );
        let a = engine.chart().get(tooth(11), "DIA").unwrap();
        let b = engine.chart().get(tooth(21), "DIA").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.group, Some(vec![tooth(11), tooth(21)]));
        assert!(engine.chart().findings(tooth(12)).is_none());
    }

    #[test]
    fn test_pair_same_tooth_rejected() {
        let mut engine = PlacementEngine::new();
        engine.arm("FUS", ArmOptions::default()).unwrap();
        engine.click(tooth(31)).unwrap();
        assert!(matches!(
            engine.click(tooth(31)),
            Err(PlacementError::DegeneratePair { .. })
        ));
        assert!(engine.chart().is_empty());
    }

    #[test]
    fn test_range_fill_writes_every_slot() {
        let mut engine = PlacementEngine::new();
        engine.arm("PF", colored(FindingColor::Blue)).unwrap();
        engine.click(tooth(34)).unwrap();
        let outcome = engine.click(tooth(37)).unwrap();
        let expected = vec![tooth(34), tooth(35), tooth(36), tooth(37)];
        assert_eq!(outcome, ClickOutcome::Placed { teeth: expected.clone() });
        for t in &expected {
            assert_eq!(
                engine.chart().get(*t, "PF").unwrap().group.as_ref(),
                Some(&expected)
            );
        }
    }

    #[test]
    fn test_cross_arch_range_rejected_and_reset() {
        let mut engine = PlacementEngine::new();
        engine.arm("AOF", colored(FindingColor::Red)).unwrap();
        engine.click(tooth(14)).unwrap();
        assert!(matches!(
            engine.click(tooth(44)),
            Err(PlacementError::InvalidRange(OdontoError::CrossArch { .. }))
        ));
        assert!(engine.chart().is_empty());
        match engine.mode() {
            PlacementMode::Armed { range, .. } => assert!(range.is_empty()),
            other => panic!("expected Armed, got {other}"),
        }
        // The next click starts a fresh range.
        assert_eq!(
            engine.click(tooth(44)).unwrap(),
            ClickOutcome::RangeStarted { tooth: tooth(44) }
        );
    }

    #[test]
    fn test_mixed_dentition_range_rejected() {
        let mut engine = PlacementEngine::new();
        engine.arm("EDT", ArmOptions::default()).unwrap();
        engine.click(tooth(11)).unwrap();
        assert!(matches!(
            engine.click(tooth(61)),
            Err(PlacementError::InvalidRange(OdontoError::MixedDentition { .. }))
        ));
    }

    #[test]
    fn test_cancel_clears_half_range() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIA", ArmOptions::default()).unwrap();
        engine.click(tooth(11)).unwrap();
        assert!(engine.cancel());
        assert!(!engine.cancel());
        assert_eq!(
            engine.click(tooth(21)).unwrap(),
            ClickOutcome::RangeStarted { tooth: tooth(21) }
        );
    }

    #[test]
    fn test_rearming_discards_half_range() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIA", ArmOptions::default()).unwrap();
        engine.click(tooth(11)).unwrap();
        engine.arm("TRA", ArmOptions::default()).unwrap();
        assert_eq!(
            engine.click(tooth(21)).unwrap(),
            ClickOutcome::RangeStarted { tooth: tooth(21) }
        );
    }

    // ── Removal ──────────────────────────────────────────────────────

    #[test]
    fn test_single_removal_is_immediate() {
        let mut engine = PlacementEngine::new();
        engine.arm("DA", ArmOptions::default()).unwrap();
        engine.click(tooth(18)).unwrap();
        assert_eq!(
            engine.request_removal(tooth(18), "DA").unwrap(),
            RemovalOutcome::Removed { teeth: vec![tooth(18)] }
        );
        assert!(engine.chart().is_empty());
        assert_eq!(engine.mode().name(), "ARMED");
    }

    #[test]
    fn test_remove_missing_finding() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.request_removal(tooth(18), "DA"),
            Err(PlacementError::FindingNotFound { .. })
        ));
    }

    #[test]
    fn test_group_removal_requires_confirmation() {
        let mut engine = PlacementEngine::new();
        engine.arm("AOR", colored(FindingColor::Blue)).unwrap();
        engine.click(tooth(13)).unwrap();
        engine.click(tooth(23)).unwrap();

        let outcome = engine.request_removal(tooth(21), "AOR").unwrap();
        let RemovalOutcome::NeedsConfirmation { members } = outcome else {
            panic!("expected confirmation request");
        };
        assert_eq!(members.len(), 6);
        assert_eq!(engine.chart().tooth_count(), 6);

        let removed = engine.confirm_removal().unwrap();
        assert_eq!(removed, members);
        assert!(engine.chart().is_empty());
        assert_eq!(engine.mode().name(), "ARMED");
    }

    #[test]
    fn test_group_removal_cancel_is_noop() {
        let mut engine = PlacementEngine::new();
        engine.arm("DIA", ArmOptions::default()).unwrap();
        engine.click(tooth(41)).unwrap();
        engine.click(tooth(31)).unwrap();
        engine.disarm();
        let before = engine.chart().clone();

        engine.request_removal(tooth(41), "DIA").unwrap();
        assert!(engine.cancel());
        assert_eq!(engine.chart(), &before);
        assert_eq!(engine.mode(), &PlacementMode::Idle);
    }

    #[test]
    fn test_confirm_without_pending() {
        let mut engine = PlacementEngine::new();
        assert!(matches!(
            engine.confirm_removal(),
            Err(PlacementError::NoPendingInteraction)
        ));
    }

    #[test]
    fn test_remove_last_detail_clears_slot() {
        let mut engine = PlacementEngine::new();
        engine.arm("DDE", detail(0)).unwrap();
        engine.click(tooth(11)).unwrap();
        engine.arm("DDE", detail(1)).unwrap();
        engine.click(tooth(11)).unwrap();

        assert_eq!(engine.remove_detail(tooth(11), "DDE", 0).unwrap(), PartRemoval::Removed);
        assert_eq!(engine.chart().headline(tooth(11)).unwrap().abbreviation, "HM");
        assert_eq!(
            engine.remove_detail(tooth(11), "DDE", 0).unwrap(),
            PartRemoval::SlotCleared { teeth: vec![tooth(11)] }
        );
        assert!(engine.chart().is_empty());
        assert!(engine.chart().headline(tooth(11)).is_none());
    }

    #[test]
    fn test_remove_detail_keeps_slot_with_base_abbreviation() {
        let mut engine = PlacementEngine::new();
        engine.arm("IMPL", ArmOptions { color: Some(FindingColor::Blue), detail: Some(0), direction: None }).unwrap();
        engine.click(tooth(36)).unwrap();
        let mut chart = engine.chart().clone();
        // Give the instance a base abbreviation as an older catalog would have.
        let mut inst = chart.get(tooth(36), "IMPL").unwrap().clone();
        inst.abbreviation = Some("IMP".into());
        chart.set(tooth(36), inst);
        engine.load(chart);

        assert_eq!(engine.remove_detail(tooth(36), "IMPL", 0).unwrap(), PartRemoval::Removed);
        assert!(engine.chart().get(tooth(36), "IMPL").is_some());
        assert_eq!(engine.chart().headline(tooth(36)).unwrap().abbreviation, "IMP");
    }

    #[test]
    fn test_remove_detail_out_of_range() {
        let mut engine = PlacementEngine::new();
        engine.arm("CT", ArmOptions::default()).unwrap();
        engine.click(tooth(11)).unwrap();
        assert!(matches!(
            engine.remove_detail(tooth(11), "CT", 0),
            Err(PlacementError::DetailNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_face_clears_slot_on_last_face() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", detail(0)).unwrap();
        engine.click(tooth(16)).unwrap();
        engine.select_face(FaceKey::Occlusal).unwrap();
        engine.click(tooth(16)).unwrap();
        engine.select_face(FaceKey::Vestibular).unwrap();

        assert_eq!(
            engine.remove_face(tooth(16), "LCD", FaceKey::Occlusal).unwrap(),
            PartRemoval::Removed
        );
        assert!(matches!(
            engine.remove_face(tooth(16), "LCD", FaceKey::Occlusal),
            Err(PlacementError::FaceNotFound { .. })
        ));
        assert_eq!(
            engine.remove_face(tooth(16), "LCD", FaceKey::Vestibular).unwrap(),
            PartRemoval::SlotCleared { teeth: vec![tooth(16)] }
        );
        assert!(engine.chart().is_empty());
    }

    #[test]
    fn test_removal_blocked_while_face_pending() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        assert!(matches!(
            engine.request_removal(tooth(16), "LCD"),
            Err(PlacementError::InteractionPending { .. })
        ));
    }

    #[test]
    fn test_load_resets_mode() {
        let mut engine = PlacementEngine::new();
        engine.arm("LCD", ArmOptions::default()).unwrap();
        engine.click(tooth(16)).unwrap();
        engine.load(ChartState::new());
        assert_eq!(engine.mode(), &PlacementMode::Idle);
        assert!(engine.chart().is_empty());
    }
}
