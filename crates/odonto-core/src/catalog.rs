//! # Finding Catalog
//!
//! The static table of clinical findings a clinician can mark on the chart.
//! Every finding has a `tipo` code, a display name, a color policy, an
//! ordered list of detail options and a placement category.
//!
//! ## Placement Categories
//!
//! | Category | Target | Examples |
//! |----------|--------|----------|
//! | `WholeTooth` | one tooth, written immediately | missing tooth, crown, pulp treatment |
//! | `FaceTargeted` | one tooth, then one of its five faces | caries, restorations, sealants |
//! | `PairEndpoints` | two clicked teeth only | diastema, fusion, transposition |
//! | `RangeFill` | every tooth between two clicks | orthodontic appliances, prostheses, edentulism |
//!
//! The category is part of the definition; the placement engine never guesses
//! it from the clicked teeth.
//!
//! ## Colors
//!
//! Red marks pathology or a restoration in bad state, blue a sound restoration
//! or a non-pathological condition. Restorative findings leave the choice to
//! the clinician (`ColorPolicy::UserChoice`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// The `tipo` code identifying a finding (e.g. `"LCD"` for caries).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingCode(String);

impl FindingCode {
    /// Wrap a code string. Codes are not validated against the catalog here;
    /// persisted charts may carry codes from older catalogs.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The raw code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The catalog definition for this code, if any.
    pub fn definition(&self) -> Option<&'static FindingDefinition> {
        lookup(&self.0)
    }
}

impl Borrow<str> for FindingCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FindingCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl std::fmt::Display for FindingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved color of a placed finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingColor {
    /// Pathology, or a restoration in bad state.
    Red,
    /// Sound restoration or non-pathological condition.
    Blue,
}

impl FindingColor {
    /// Hex color used by renderers.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Red => "#d32f2f",
            Self::Blue => "#1565c0",
        }
    }
}

impl std::fmt::Display for FindingColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Blue => "blue",
        })
    }
}

/// How the color of a placed finding is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Always drawn in this color.
    Fixed(FindingColor),
    /// The clinician picks red or blue when arming the finding.
    UserChoice,
}

impl ColorPolicy {
    /// Resolve the color for a placement. Fixed policies ignore the request.
    pub fn resolve(&self, requested: Option<FindingColor>) -> Option<FindingColor> {
        match self {
            Self::Fixed(color) => Some(*color),
            Self::UserChoice => requested,
        }
    }
}

/// Which teeth receive the write when a finding is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementCategory {
    /// Written on the clicked tooth immediately.
    WholeTooth,
    /// Written on the clicked tooth, then refined to one face.
    FaceTargeted,
    /// Two clicks; written on both endpoints only.
    PairEndpoints,
    /// Two clicks; written on every tooth between the endpoints inclusive.
    RangeFill,
}

impl PlacementCategory {
    /// Whether placement needs a two-click range gesture.
    pub fn is_range_gesture(&self) -> bool {
        matches!(self, Self::PairEndpoints | Self::RangeFill)
    }
}

/// One selectable refinement of a finding (e.g. caries depth, crown type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DetailOption {
    /// Short code drawn on the chart.
    pub abbreviation: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FindingDefinition {
    /// The `tipo` code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Base abbreviation drawn on the tooth, when the finding has one.
    pub abbreviation: Option<&'static str>,
    /// Default color or user choice.
    pub color: ColorPolicy,
    /// Detail options in display order.
    pub details: &'static [DetailOption],
    /// Placement category.
    pub category: PlacementCategory,
    /// Whether placement requires an arrow direction.
    pub directional: bool,
    /// Whether re-placing the finding adds to the applied details instead of
    /// replacing them.
    pub accumulates_details: bool,
}

impl FindingDefinition {
    /// The code as an owned [`FindingCode`].
    pub fn finding_code(&self) -> FindingCode {
        FindingCode::from(self.code)
    }

    /// Detail option by index.
    pub fn detail(&self, index: usize) -> Option<&'static DetailOption> {
        self.details.get(index)
    }
}

const fn d(abbreviation: &'static str, label: &'static str) -> DetailOption {
    DetailOption {
        abbreviation,
        label,
    }
}

const fn whole(
    code: &'static str,
    name: &'static str,
    abbreviation: Option<&'static str>,
    color: ColorPolicy,
) -> FindingDefinition {
    FindingDefinition {
        code,
        name,
        abbreviation,
        color,
        details: &[],
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    }
}

const fn multi(
    code: &'static str,
    name: &'static str,
    color: ColorPolicy,
    category: PlacementCategory,
) -> FindingDefinition {
    FindingDefinition {
        code,
        name,
        abbreviation: None,
        color,
        details: &[],
        category,
        directional: false,
        accumulates_details: false,
    }
}

const RED: ColorPolicy = ColorPolicy::Fixed(FindingColor::Red);
const BLUE: ColorPolicy = ColorPolicy::Fixed(FindingColor::Blue);
const CHOICE: ColorPolicy = ColorPolicy::UserChoice;

const CARIES_DETAILS: &[DetailOption] = &[
    d("MB", "Mancha blanca"),
    d("CE", "Lesión en esmalte"),
    d("CD", "Lesión en dentina"),
    d("CDP", "Lesión en dentina y pulpa"),
];

const RESTORATION_DETAILS: &[DetailOption] = &[
    d("AM", "Amalgama"),
    d("R", "Resina"),
    d("IV", "Ionómero de vidrio"),
    d("IM", "Incrustación metálica"),
    d("IE", "Incrustación estética"),
    d("C", "Carilla estética"),
];

const CROWN_DETAILS: &[DetailOption] = &[
    d("CM", "Corona metálica"),
    d("CF", "Corona fenestrada"),
    d("CMC", "Corona metal cerámica"),
    d("CV", "Corona veneer"),
    d("CJ", "Corona jacket"),
];

const ENAMEL_DEFECT_DETAILS: &[DetailOption] = &[
    d("HP", "Hipoplasia"),
    d("HM", "Hipomineralización"),
    d("O", "Opacidades"),
    d("D", "Decoloración"),
    d("FL", "Fluorosis"),
];

const PULP_DETAILS: &[DetailOption] = &[
    d("TC", "Tratamiento de conductos"),
    d("PC", "Pulpectomía"),
    d("PP", "Pulpotomía"),
];

const MOBILITY_DETAILS: &[DetailOption] = &[
    d("M1", "Movilidad grado 1"),
    d("M2", "Movilidad grado 2"),
    d("M3", "Movilidad grado 3"),
];

const POSITION_DETAILS: &[DetailOption] = &[
    d("M", "Mesializado"),
    d("D", "Distalizado"),
    d("V", "Vestibularizado"),
    d("P", "Palatinizado"),
    d("L", "Lingualizado"),
];

const IMPLANT_DETAILS: &[DetailOption] = &[
    d("IMP", "Implante"),
    d("IMPC", "Implante con corona"),
];

static CATALOG: &[FindingDefinition] = &[
    // ── Multi-tooth findings ───────────────────────────────────────
    multi("AOF", "Aparato ortodóntico fijo", CHOICE, PlacementCategory::RangeFill),
    multi("AOR", "Aparato ortodóntico removible", CHOICE, PlacementCategory::RangeFill),
    multi("EDT", "Edéntulo total", BLUE, PlacementCategory::RangeFill),
    multi("EM", "Espigo muñón", CHOICE, PlacementCategory::RangeFill),
    multi("PF", "Prótesis fija", CHOICE, PlacementCategory::RangeFill),
    multi("PR", "Prótesis removible", CHOICE, PlacementCategory::RangeFill),
    multi("PT", "Prótesis total", CHOICE, PlacementCategory::RangeFill),
    multi("DIA", "Diastema", RED, PlacementCategory::PairEndpoints),
    multi("FUS", "Fusión", RED, PlacementCategory::PairEndpoints),
    multi("TRA", "Transposición dentaria", RED, PlacementCategory::PairEndpoints),
    // ── Face-targeted findings ─────────────────────────────────────
    FindingDefinition {
        code: "LCD",
        name: "Lesión de caries dental",
        abbreviation: None,
        color: RED,
        details: CARIES_DETAILS,
        category: PlacementCategory::FaceTargeted,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "RD",
        name: "Restauración definitiva",
        abbreviation: None,
        color: CHOICE,
        details: RESTORATION_DETAILS,
        category: PlacementCategory::FaceTargeted,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "RT",
        name: "Restauración temporal",
        abbreviation: None,
        color: RED,
        details: &[],
        category: PlacementCategory::FaceTargeted,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "SEL",
        name: "Sellante",
        abbreviation: None,
        color: CHOICE,
        details: &[],
        category: PlacementCategory::FaceTargeted,
        directional: false,
        accumulates_details: false,
    },
    // ── Whole-tooth findings with details ──────────────────────────
    FindingDefinition {
        code: "CD",
        name: "Corona definitiva",
        abbreviation: None,
        color: CHOICE,
        details: CROWN_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "DDE",
        name: "Defectos de desarrollo del esmalte",
        abbreviation: None,
        color: RED,
        details: ENAMEL_DEFECT_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: true,
    },
    FindingDefinition {
        code: "TP",
        name: "Tratamiento pulpar",
        abbreviation: None,
        color: CHOICE,
        details: PULP_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "MOV",
        name: "Movilidad patológica",
        abbreviation: None,
        color: RED,
        details: MOBILITY_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "POS",
        name: "Posición dentaria",
        abbreviation: None,
        color: RED,
        details: POSITION_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "IMPL",
        name: "Implante dental",
        abbreviation: None,
        color: CHOICE,
        details: IMPLANT_DETAILS,
        category: PlacementCategory::WholeTooth,
        directional: false,
        accumulates_details: false,
    },
    // ── Directional whole-tooth findings ───────────────────────────
    FindingDefinition {
        code: "DEX",
        name: "Diente extruido",
        abbreviation: None,
        color: RED,
        details: &[],
        category: PlacementCategory::WholeTooth,
        directional: true,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "DIN",
        name: "Diente intruido",
        abbreviation: None,
        color: RED,
        details: &[],
        category: PlacementCategory::WholeTooth,
        directional: true,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "GIR",
        name: "Giroversión",
        abbreviation: None,
        color: RED,
        details: &[],
        category: PlacementCategory::WholeTooth,
        directional: true,
        accumulates_details: false,
    },
    FindingDefinition {
        code: "MIG",
        name: "Migración",
        abbreviation: None,
        color: RED,
        details: &[],
        category: PlacementCategory::WholeTooth,
        directional: true,
        accumulates_details: false,
    },
    // ── Plain whole-tooth findings ─────────────────────────────────
    whole("CT", "Corona temporal", Some("CT"), RED),
    whole("DA", "Diente ausente", None, BLUE),
    whole("EXT", "Extracción indicada", None, RED),
    whole("DIS", "Diente discrómico", Some("DIS"), RED),
    whole("DEC", "Diente ectópico", Some("E"), RED),
    whole("DCL", "Diente en clavija", None, RED),
    whole("ERU", "Diente en erupción", None, BLUE),
    whole("FRA", "Fractura", None, RED),
    whole("GEM", "Geminación", None, RED),
    whole("IMP", "Impactación", Some("I"), RED),
    whole("SIM", "Semi-impactación", Some("SI"), RED),
    whole("MAC", "Macrodoncia", Some("MAC"), BLUE),
    whole("MIC", "Microdoncia", Some("MIC"), BLUE),
    whole("RR", "Remanente radicular", Some("RR"), RED),
    whole("DES", "Superficie desgastada", Some("DES"), RED),
    whole("SUP", "Supernumerario", Some("S"), BLUE),
];

/// Number of catalog entries.
pub const FINDING_COUNT: usize = 40;

/// All findings in catalog order.
pub fn all() -> &'static [FindingDefinition] {
    CATALOG
}

/// Look up a finding by `tipo` code.
pub fn lookup(code: &str) -> Option<&'static FindingDefinition> {
    CATALOG.iter().find(|def| def.code == code)
}

/// Finding at a catalog index (the index the UI arms by).
pub fn by_index(index: usize) -> Option<&'static FindingDefinition> {
    CATALOG.get(index)
}

/// Catalog index of a code.
pub fn index_of(code: &str) -> Option<usize> {
    CATALOG.iter().position(|def| def.code == code)
}
