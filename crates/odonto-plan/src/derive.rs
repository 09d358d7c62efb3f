//! # Plan Derivation
//!
//! Pure function from a chart to its treatment plan lines.
//!
//! ## Line Identity
//!
//! | Finding shape        | Key                                  | Label         |
//! |----------------------|--------------------------------------|---------------|
//! | per-face entries     | `{tooth}-{tipo}-cara-{face}`         | `{tooth}`     |
//! | grouped (2+ members) | `{tipo}-grupo-{sorted members}`      | `{first}-{last}` |
//! | single tooth         | `{tooth}-{tipo}`                     | `{tooth}`     |
//!
//! Group keys sort the member numbers, so a group yields the same key no
//! matter which member is scanned first. Each group key is emitted once.
//! Labels use arch order (`first`/`last` of the stored group).
//!
//! Lines are sorted by the lowest tooth number they reference. The sort is
//! stable, so lines on the same tooth keep `tipo` order, then face order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use odonto_core::{FaceKey, ServiceId, ToothNumber};
use odonto_state::{ChartState, FindingInstance};

/// One annotatable row of the treatment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentPlanLine {
    /// Identity key, stable across re-derivations.
    pub key: String,
    /// Display label: a tooth number or a `first-last` range.
    pub label: String,
    /// Lowest tooth number the line refers to.
    pub tooth: ToothNumber,
    /// Face the line refers to, for per-face lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceKey>,
    /// The finding, without its group array.
    pub finding: FindingInstance,
    /// Free-text note.
    #[serde(rename = "nota", default)]
    pub note: String,
    /// Billable service chosen for this line.
    #[serde(rename = "servicio", default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceId>,
}

impl TreatmentPlanLine {
    fn single(tooth: ToothNumber, instance: &FindingInstance) -> Self {
        Self {
            key: format!("{tooth}-{}", instance.code),
            label: tooth.to_string(),
            tooth,
            face: None,
            finding: instance.without_group(),
            note: String::new(),
            service: None,
        }
    }

    fn face(tooth: ToothNumber, instance: &FindingInstance, face: FaceKey) -> Self {
        let mut finding = instance.without_group();
        finding.faces.retain(|k, _| *k == face);
        Self {
            key: format!("{tooth}-{}-cara-{face}", instance.code),
            label: tooth.to_string(),
            tooth,
            face: Some(face),
            finding,
            note: String::new(),
            service: None,
        }
    }

    fn group(key: String, group: &[ToothNumber], instance: &FindingInstance) -> Option<Self> {
        let first = group.first()?;
        let last = group.last()?;
        let label = if first == last {
            first.to_string()
        } else {
            format!("{first}-{last}")
        };
        Some(Self {
            key,
            label,
            tooth: *group.iter().min()?,
            face: None,
            finding: instance.without_group(),
            note: String::new(),
            service: None,
        })
    }
}

/// Canonical key of a grouped finding.
pub fn group_key(code: &str, members: &[ToothNumber]) -> String {
    let mut sorted: Vec<u8> = members.iter().map(|t| t.get()).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let joined: Vec<String> = sorted.iter().map(u8::to_string).collect();
    format!("{code}-grupo-{}", joined.join("-"))
}

/// Derive the treatment plan lines of a chart.
pub fn derive(chart: &ChartState) -> Vec<TreatmentPlanLine> {
    let mut seen_groups = BTreeSet::new();
    let mut lines = Vec::new();

    for (tooth, instance) in chart.iter() {
        if !instance.faces.is_empty() {
            lines.extend(
                instance
                    .faces
                    .keys()
                    .map(|face| TreatmentPlanLine::face(tooth, instance, *face)),
            );
            continue;
        }
        match instance.group.as_deref() {
            Some(group) if instance.is_grouped() => {
                let key = group_key(instance.code.as_str(), group);
                if seen_groups.insert(key.clone()) {
                    lines.extend(TreatmentPlanLine::group(key, group, instance));
                }
            }
            _ => lines.push(TreatmentPlanLine::single(tooth, instance)),
        }
    }

    lines.sort_by_key(|line| line.tooth);
    tracing::debug!(lines = lines.len(), "treatment plan derived");
    lines
}

/// Copy notes and services from `previous` onto lines of `next` with the
/// same key. Lines with no counterpart keep their empty annotations.
pub fn carry_annotations(previous: &[TreatmentPlanLine], next: &mut [TreatmentPlanLine]) {
    let annotations: HashMap<&str, (&str, Option<&ServiceId>)> = previous
        .iter()
        .map(|line| (line.key.as_str(), (line.note.as_str(), line.service.as_ref())))
        .collect();
    for line in next.iter_mut() {
        if let Some((note, service)) = annotations.get(line.key.as_str()) {
            line.note = (*note).to_string();
            line.service = service.cloned();
        }
    }
}
