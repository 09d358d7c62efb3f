//! # Tooth Primitives
//!
//! `ToothNumber` wraps a two-digit FDI identifier. The first digit is the
//! quadrant, the second the position counted from the midline:
//!
//! ```text
//!             patient's right │ patient's left
//!   upper     18 .. 11        │ 21 .. 28      permanent
//!   upper         55 .. 51    │ 61 .. 65      primary
//!   lower         85 .. 81    │ 71 .. 75      primary
//!   lower     48 .. 41        │ 31 .. 38      permanent
//! ```
//!
//! Quadrants 1-4 accept units 1-8, quadrants 5-8 accept units 1-5. Anything
//! else is rejected at construction, so a `ToothNumber` always has a slot in
//! the arch layout.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::OdontoError;

/// A validated FDI tooth number.
///
/// Serializes as a plain integer (and as a string when used as a JSON map
/// key), so persisted charts read as `{"16": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// Validate and wrap an FDI number.
    pub fn new(value: u8) -> Result<Self, OdontoError> {
        let quadrant = value / 10;
        let unit = value % 10;
        let max_unit = match quadrant {
            1..=4 => 8,
            5..=8 => 5,
            _ => 0,
        };
        if unit == 0 || unit > max_unit {
            return Err(OdontoError::InvalidTooth(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Wrap a number known to be valid. Only used for the static layout tables.
    pub(crate) const fn from_static(value: u8) -> Self {
        Self(value)
    }

    /// The raw two-digit value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// FDI quadrant (1-8).
    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    /// Position from the midline within the quadrant (1-8).
    pub fn unit(self) -> u8 {
        self.0 % 10
    }

    /// Upper or lower arch.
    pub fn arch(self) -> Arch {
        match self.quadrant() {
            1 | 2 | 5 | 6 => Arch::Upper,
            _ => Arch::Lower,
        }
    }

    /// Permanent or primary dentition.
    pub fn dentition(self) -> Dentition {
        if self.quadrant() <= 4 {
            Dentition::Permanent
        } else {
            Dentition::Primary
        }
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = OdontoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToothNumber> for u8 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.0
    }
}

impl FromStr for ToothNumber {
    type Err = OdontoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| OdontoError::InvalidTooth(s.to_string()))?;
        Self::new(value)
    }
}

impl std::fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper (maxillary) or lower (mandibular) row of teeth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    /// Maxillary arch.
    Upper,
    /// Mandibular arch.
    Lower,
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        })
    }
}

/// Permanent (adult) or primary (deciduous) teeth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dentition {
    /// Quadrants 1-4.
    Permanent,
    /// Quadrants 5-8.
    Primary,
}

impl std::fmt::Display for Dentition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Permanent => "permanent",
            Self::Primary => "primary",
        })
    }
}

/// One of the five tooth surfaces usable as a placement target.
///
/// Serialized as the single-letter key used in persisted charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaceKey {
    /// Surface facing the midline.
    #[serde(rename = "M")]
    Mesial,
    /// Surface facing away from the midline.
    #[serde(rename = "D")]
    Distal,
    /// Chewing surface (incisal edge on anterior teeth).
    #[serde(rename = "O")]
    Occlusal,
    /// Surface near the gum line.
    #[serde(rename = "C")]
    Cervical,
    /// Surface facing the lips or cheek.
    #[serde(rename = "V")]
    Vestibular,
}

impl FaceKey {
    /// All faces in display order.
    pub fn all() -> &'static [FaceKey] {
        &[
            Self::Mesial,
            Self::Distal,
            Self::Occlusal,
            Self::Cervical,
            Self::Vestibular,
        ]
    }

    /// The persisted single-letter key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mesial => "M",
            Self::Distal => "D",
            Self::Occlusal => "O",
            Self::Cervical => "C",
            Self::Vestibular => "V",
        }
    }

    /// Clinical display name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mesial => "Mesial",
            Self::Distal => "Distal",
            Self::Occlusal => "Oclusal",
            Self::Cervical => "Cervical",
            Self::Vestibular => "Vestibular",
        }
    }
}

impl std::fmt::Display for FaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaceKey {
    type Err = OdontoError;

    /// Accepts the single-letter key or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|face| {
                face.as_str().eq_ignore_ascii_case(needle) || face.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| OdontoError::UnknownFace(s.to_string()))
    }
}

/// Arrow direction drawn with directional findings (extrusion, migration,
/// rotation, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward the midline.
    Mesial,
    /// Away from the midline.
    Distal,
    /// Toward the lips or cheek.
    Vestibular,
    /// Toward the palate (upper arch).
    Palatal,
    /// Toward the tongue (lower arch).
    Lingual,
    /// Occlusal displacement, drawn upward.
    Up,
    /// Apical displacement, drawn downward.
    Down,
    /// Rotation clockwise.
    Clockwise,
    /// Rotation counter-clockwise.
    CounterClockwise,
}
