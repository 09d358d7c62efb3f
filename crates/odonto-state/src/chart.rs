//! # Chart State
//!
//! A two-level sparse map `ToothNumber → tipo → FindingInstance`. A tooth with
//! no findings has no entry at all; every removal prunes empty teeth, so the
//! persisted form never carries `{"16": {}}`.
//!
//! ## Invariants
//!
//! - A grouped instance is stored identically (same `grupo` array, same order)
//!   on every member tooth under the same `tipo`.
//! - Group removal is atomic: the whole group is checked before anything is
//!   deleted, then the slot is removed from every member.
//!
//! Mutators are crate-private: outside this crate the chart changes only
//! through [`crate::PlacementEngine`].
//!
//! ## Headlines
//!
//! Each tooth also carries a transient headline (the abbreviation and color
//! drawn above it). Headlines are a display buffer, never persisted, and are
//! rebuilt from the findings whenever a chart is deserialized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use odonto_core::{FindingCode, FindingColor, ToothNumber};

use crate::finding::FindingInstance;

/// Findings on one tooth, keyed by `tipo`.
pub type ToothFindings = BTreeMap<FindingCode, FindingInstance>;

/// Persisted shape of a chart.
pub type ChartMap = BTreeMap<ToothNumber, ToothFindings>;

/// Errors raised by chart-level group operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// No finding with this code on the tooth.
    #[error("tooth {tooth} has no finding {code}")]
    SlotEmpty {
        /// The tooth.
        tooth: ToothNumber,
        /// The finding code.
        code: FindingCode,
    },

    /// A member of a group does not hold the identical instance.
    #[error("group {code} is inconsistent on tooth {tooth}")]
    GroupMismatch {
        /// The offending member.
        tooth: ToothNumber,
        /// The finding code.
        code: FindingCode,
    },

    /// A grouped instance does not list the tooth it is stored on.
    #[error("tooth {tooth} is not a member of its own {code} group")]
    NotAMember {
        /// The tooth holding the instance.
        tooth: ToothNumber,
        /// The finding code.
        code: FindingCode,
    },

    /// A multi-tooth write was requested without members.
    #[error("finding {code} has no group members")]
    EmptyGroup {
        /// The finding code.
        code: FindingCode,
    },
}

/// Abbreviation and color drawn above a tooth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// Text drawn above the tooth.
    pub abbreviation: String,
    /// Color of the text.
    pub color: FindingColor,
}

/// The sparse per-tooth finding map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ChartMap", into = "ChartMap")]
pub struct ChartState {
    teeth: ChartMap,
    headlines: BTreeMap<ToothNumber, Headline>,
}

impl PartialEq for ChartState {
    fn eq(&self, other: &Self) -> bool {
        self.teeth == other.teeth
    }
}

impl Eq for ChartState {}

impl From<ChartMap> for ChartState {
    fn from(mut teeth: ChartMap) -> Self {
        teeth.retain(|_, findings| !findings.is_empty());
        let mut chart = Self {
            teeth,
            headlines: BTreeMap::new(),
        };
        chart.rebuild_headlines();
        chart
    }
}

impl From<ChartState> for ChartMap {
    fn from(chart: ChartState) -> Self {
        chart.teeth
    }
}

impl ChartState {
    /// An empty chart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no tooth carries any finding.
    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    /// Number of teeth carrying at least one finding.
    pub fn tooth_count(&self) -> usize {
        self.teeth.len()
    }

    /// Teeth carrying findings, in ascending numeric order.
    pub fn teeth(&self) -> impl Iterator<Item = ToothNumber> + '_ {
        self.teeth.keys().copied()
    }

    /// Findings on a tooth, keyed by `tipo`.
    pub fn findings(&self, tooth: ToothNumber) -> Option<&ToothFindings> {
        self.teeth.get(&tooth)
    }

    /// Every `(tooth, instance)` pair, teeth ascending, `tipo` ascending.
    pub fn iter(&self) -> impl Iterator<Item = (ToothNumber, &FindingInstance)> + '_ {
        self.teeth
            .iter()
            .flat_map(|(tooth, findings)| findings.values().map(move |inst| (*tooth, inst)))
    }

    /// The finding with this code on a tooth.
    pub fn get(&self, tooth: ToothNumber, code: &str) -> Option<&FindingInstance> {
        self.teeth.get(&tooth).and_then(|findings| findings.get(code))
    }

    /// The headline drawn above a tooth; `None` means blank.
    pub fn headline(&self, tooth: ToothNumber) -> Option<&Headline> {
        self.headlines.get(&tooth)
    }

    /// Check the group invariant over the whole chart.
    ///
    /// Used when accepting a chart from outside (a loaded snapshot).
    pub fn validate(&self) -> Result<(), ChartError> {
        for (tooth, inst) in self.iter() {
            let Some(group) = inst.group.as_ref() else {
                continue;
            };
            if !group.contains(&tooth) {
                return Err(ChartError::NotAMember {
                    tooth,
                    code: inst.code.clone(),
                });
            }
            for member in group {
                if self.get(*member, inst.code.as_str()) != Some(inst) {
                    return Err(ChartError::GroupMismatch {
                        tooth: *member,
                        code: inst.code.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ── Crate-private mutators ─────────────────────────────────────────

    /// Write a single-tooth instance under its `tipo`, returning the previous one.
    pub(crate) fn set(&mut self, tooth: ToothNumber, instance: FindingInstance) -> Option<FindingInstance> {
        let headline = instance.label().map(|abbr| Headline {
            abbreviation: abbr.to_string(),
            color: instance.color,
        });
        let previous = self
            .teeth
            .entry(tooth)
            .or_default()
            .insert(instance.code.clone(), instance);
        match headline {
            Some(h) => {
                self.headlines.insert(tooth, h);
            }
            None => self.recompute_headline(tooth),
        }
        previous
    }

    /// Write one instance identically on every member of its group.
    ///
    /// Members already holding a different group under the same `tipo` have
    /// that older group detached from all of its members first, so no tooth is
    /// left pointing at a group that no longer matches.
    pub(crate) fn set_group(&mut self, instance: FindingInstance) -> Result<(), ChartError> {
        let members = match instance.group.as_ref() {
            Some(group) if !group.is_empty() => group.clone(),
            _ => {
                return Err(ChartError::EmptyGroup {
                    code: instance.code.clone(),
                })
            }
        };
        for member in &members {
            let stale = self
                .get(*member, instance.code.as_str())
                .filter(|old| old.group != instance.group)
                .map(|old| old.members(*member));
            if let Some(stale_members) = stale {
                for stale_member in stale_members {
                    self.remove(stale_member, instance.code.as_str());
                }
            }
        }
        for member in members {
            self.set(member, instance.clone());
        }
        Ok(())
    }

    /// Remove one slot, pruning the tooth when it becomes empty.
    pub(crate) fn remove(&mut self, tooth: ToothNumber, code: &str) -> Option<FindingInstance> {
        let findings = self.teeth.get_mut(&tooth)?;
        let removed = findings.remove(code);
        if findings.is_empty() {
            self.teeth.remove(&tooth);
        }
        if removed.is_some() {
            self.recompute_headline(tooth);
        }
        removed
    }

    /// Remove a finding from every member of its group, or nothing at all.
    ///
    /// Returns the teeth the slot was removed from.
    pub(crate) fn remove_group(&mut self, tooth: ToothNumber, code: &str) -> Result<Vec<ToothNumber>, ChartError> {
        let instance = self.get(tooth, code).ok_or_else(|| ChartError::SlotEmpty {
            tooth,
            code: FindingCode::from(code),
        })?;
        let members = instance.members(tooth);
        for member in &members {
            if self.get(*member, code) != Some(instance) {
                return Err(ChartError::GroupMismatch {
                    tooth: *member,
                    code: FindingCode::from(code),
                });
            }
        }
        for member in &members {
            self.remove(*member, code);
        }
        Ok(members)
    }

    /// Put back a headline captured before a cancelled interaction.
    pub(crate) fn restore_headline(&mut self, tooth: ToothNumber, headline: Option<Headline>) {
        match headline {
            Some(h) => {
                self.headlines.insert(tooth, h);
            }
            None => {
                self.headlines.remove(&tooth);
            }
        }
    }

    /// Recompute a tooth's headline from its remaining findings: the first
    /// base abbreviation in `tipo` order, else the first detail abbreviation,
    /// else blank.
    pub(crate) fn recompute_headline(&mut self, tooth: ToothNumber) {
        let headline = self.teeth.get(&tooth).and_then(|findings| {
            findings
                .values()
                .find_map(|inst| inst.abbreviation.as_deref().map(|a| (a, inst.color)))
                .or_else(|| {
                    findings
                        .values()
                        .find_map(|inst| inst.any_detail_label().map(|a| (a, inst.color)))
                })
                .map(|(abbreviation, color)| Headline {
                    abbreviation: abbreviation.to_string(),
                    color,
                })
        });
        self.restore_headline(tooth, headline);
    }

    fn rebuild_headlines(&mut self) {
        let teeth: Vec<ToothNumber> = self.teeth.keys().copied().collect();
        for tooth in teeth {
            self.recompute_headline(tooth);
        }
    }
}
