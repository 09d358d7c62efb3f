//! # Placed Findings
//!
//! `FindingInstance` is what a slot of the chart holds: a finding resolved
//! against the catalog at placement time (color chosen, detail applied,
//! group members enumerated).
//!
//! Instances are persisted with the field names of the chart snapshot format
//! (`tipo`, `detalle`, `grupo`, `direccion`, `cara`). Empty optional parts are
//! omitted so a plain whole-tooth finding serializes compactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use odonto_core::{
    DetailOption, Direction, FaceKey, FindingCode, FindingColor, FindingDefinition, ToothNumber,
};

/// A detail option as applied to a placed finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppliedDetail {
    /// Short code drawn on the chart.
    #[serde(rename = "abreviatura")]
    pub abbreviation: String,
    /// Display label.
    #[serde(rename = "nombre")]
    pub label: String,
}

impl From<&DetailOption> for AppliedDetail {
    fn from(option: &DetailOption) -> Self {
        Self {
            abbreviation: option.abbreviation.to_string(),
            label: option.label.to_string(),
        }
    }
}

/// A finding refined to one face of a tooth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceFinding {
    /// The face this entry targets.
    #[serde(rename = "cara")]
    pub face: FaceKey,
    /// Finding code.
    #[serde(rename = "tipo")]
    pub code: FindingCode,
    /// Finding display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Resolved color.
    pub color: FindingColor,
    /// Detail applied to this face.
    #[serde(rename = "detalle", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<AppliedDetail>,
}

/// A finding placed on the chart.
///
/// Grouped instances (`group` with more than one member) are stored
/// identically on every member tooth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingInstance {
    /// Finding code; also the slot key on the tooth.
    #[serde(rename = "tipo")]
    pub code: FindingCode,
    /// Resolved color.
    pub color: FindingColor,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Base abbreviation, when the finding has one.
    #[serde(rename = "abreviatura", default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    /// Applied details in application order.
    #[serde(rename = "detalle", default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<AppliedDetail>,
    /// Member teeth in arch order, for multi-tooth findings.
    #[serde(rename = "grupo", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<ToothNumber>>,
    /// Arrow direction, for directional findings.
    #[serde(rename = "direccion", default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Per-face entries, for face-targeted findings.
    #[serde(rename = "cara", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub faces: BTreeMap<FaceKey, FaceFinding>,
}

impl FindingInstance {
    /// Build a bare instance from a catalog definition.
    pub fn from_definition(definition: &FindingDefinition, color: FindingColor) -> Self {
        Self {
            code: definition.finding_code(),
            color,
            name: definition.name.to_string(),
            abbreviation: definition.abbreviation.map(str::to_string),
            details: Vec::new(),
            group: None,
            direction: None,
            faces: BTreeMap::new(),
        }
    }

    /// Whether the instance spans more than one tooth.
    pub fn is_grouped(&self) -> bool {
        self.group.as_ref().is_some_and(|g| g.len() > 1)
    }

    /// Member teeth, or just `tooth` for single-tooth findings.
    pub fn members(&self, tooth: ToothNumber) -> Vec<ToothNumber> {
        match &self.group {
            Some(group) if !group.is_empty() => group.clone(),
            _ => vec![tooth],
        }
    }

    /// Copy of the instance without its group, as shown on plan lines.
    pub fn without_group(&self) -> Self {
        Self {
            group: None,
            ..self.clone()
        }
    }

    /// Text drawn on the tooth for this finding: the base abbreviation, else
    /// the most recent detail, else a face detail.
    pub fn label(&self) -> Option<&str> {
        self.abbreviation
            .as_deref()
            .or_else(|| self.details.last().map(|d| d.abbreviation.as_str()))
            .or_else(|| self.face_detail_label())
    }

    /// First detail abbreviation found on the instance or its faces.
    pub(crate) fn any_detail_label(&self) -> Option<&str> {
        self.details
            .first()
            .map(|d| d.abbreviation.as_str())
            .or_else(|| {
                self.faces
                    .values()
                    .find_map(|f| f.detail.as_ref().map(|d| d.abbreviation.as_str()))
            })
    }

    fn face_detail_label(&self) -> Option<&str> {
        self.faces
            .values()
            .rev()
            .find_map(|f| f.detail.as_ref().map(|d| d.abbreviation.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odonto_core::catalog;

    fn caries() -> FindingInstance {
        let def = catalog::lookup("LCD").unwrap();
        FindingInstance::from_definition(def, FindingColor::Red)
    }

    #[test]
    fn test_bare_instance_serializes_compactly() {
        let json = serde_json::to_value(caries()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tipo": "LCD",
                "color": "red",
                "nombre": "Lesión de caries dental",
            })
        );
    }

    #[test]
    fn test_full_instance_uses_snapshot_keys() {
        let mut inst = caries();
        inst.faces.insert(
            FaceKey::Occlusal,
            FaceFinding {
                face: FaceKey::Occlusal,
                code: FindingCode::from("LCD"),
                name: inst.name.clone(),
                color: FindingColor::Red,
                detail: Some(AppliedDetail {
                    abbreviation: "CE".into(),
                    label: "Lesión en esmalte".into(),
                }),
            },
        );
        inst.group = Some(vec![ToothNumber::new(16).unwrap()]);
        let json = serde_json::to_value(&inst).unwrap();
        assert_eq!(json["cara"]["O"]["detalle"]["abreviatura"], "CE");
        assert_eq!(json["grupo"], serde_json::json!([16]));

        let back: FindingInstance = serde_json::from_value(json).unwrap();
        assert_eq!(back, inst);
    }

    #[test]
    fn test_label_precedence() {
        let mut inst = caries();
        assert_eq!(inst.label(), None);

        inst.details.push(AppliedDetail {
            abbreviation: "HP".into(),
            label: "Hipoplasia".into(),
        });
        inst.details.push(AppliedDetail {
            abbreviation: "FL".into(),
            label: "Fluorosis".into(),
        });
        assert_eq!(inst.label(), Some("FL"));
        assert_eq!(inst.any_detail_label(), Some("HP"));

        inst.abbreviation = Some("X".into());
        assert_eq!(inst.label(), Some("X"));
    }

    #[test]
    fn test_grouping_and_members() {
        let t11 = ToothNumber::new(11).unwrap();
        let t21 = ToothNumber::new(21).unwrap();
        let mut inst = caries();
        assert!(!inst.is_grouped());
        assert_eq!(inst.members(t11), vec![t11]);

        inst.group = Some(vec![t11, t21]);
        assert!(inst.is_grouped());
        assert_eq!(inst.members(t21), vec![t11, t21]);
        assert_eq!(inst.without_group().group, None);
    }
}
