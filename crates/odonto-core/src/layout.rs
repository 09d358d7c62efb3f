//! # Arch Layout
//!
//! The four static tooth rows of the chart, each ordered from the patient's
//! right to left (the order they are drawn on screen). A tooth's index in its
//! row is its *arch position*; multi-tooth findings are ordered and enumerated
//! by that position, never by FDI number.
//!
//! ## Range Rule
//!
//! A range is only meaningful inside one row. Endpoints on different arches
//! are rejected with [`OdontoError::CrossArch`], endpoints that mix permanent
//! and primary teeth with [`OdontoError::MixedDentition`]. Both checks run
//! before any enumeration so callers never see a partial range.

use serde::{Deserialize, Serialize};

use crate::error::OdontoError;
use crate::tooth::{Arch, Dentition, ToothNumber};

const fn t(n: u8) -> ToothNumber {
    ToothNumber::from_static(n)
}

#[rustfmt::skip]
static UPPER_PERMANENT: [ToothNumber; 16] = [
    t(18), t(17), t(16), t(15), t(14), t(13), t(12), t(11),
    t(21), t(22), t(23), t(24), t(25), t(26), t(27), t(28),
];

#[rustfmt::skip]
static UPPER_PRIMARY: [ToothNumber; 10] = [
    t(55), t(54), t(53), t(52), t(51),
    t(61), t(62), t(63), t(64), t(65),
];

#[rustfmt::skip]
static LOWER_PRIMARY: [ToothNumber; 10] = [
    t(85), t(84), t(83), t(82), t(81),
    t(71), t(72), t(73), t(74), t(75),
];

#[rustfmt::skip]
static LOWER_PERMANENT: [ToothNumber; 16] = [
    t(48), t(47), t(46), t(45), t(44), t(43), t(42), t(41),
    t(31), t(32), t(33), t(34), t(35), t(36), t(37), t(38),
];

/// One of the four rows of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchRow {
    /// Teeth 18..11, 21..28.
    UpperPermanent,
    /// Teeth 55..51, 61..65.
    UpperPrimary,
    /// Teeth 85..81, 71..75.
    LowerPrimary,
    /// Teeth 48..41, 31..38.
    LowerPermanent,
}

impl ArchRow {
    /// All rows in drawing order, top to bottom.
    pub fn all() -> &'static [ArchRow] {
        &[
            Self::UpperPermanent,
            Self::UpperPrimary,
            Self::LowerPrimary,
            Self::LowerPermanent,
        ]
    }

    /// The row holding a given arch and dentition.
    pub fn of(arch: Arch, dentition: Dentition) -> Self {
        match (arch, dentition) {
            (Arch::Upper, Dentition::Permanent) => Self::UpperPermanent,
            (Arch::Upper, Dentition::Primary) => Self::UpperPrimary,
            (Arch::Lower, Dentition::Primary) => Self::LowerPrimary,
            (Arch::Lower, Dentition::Permanent) => Self::LowerPermanent,
        }
    }

    /// Teeth of this row in arch order.
    pub fn teeth(&self) -> &'static [ToothNumber] {
        match self {
            Self::UpperPermanent => &UPPER_PERMANENT,
            Self::UpperPrimary => &UPPER_PRIMARY,
            Self::LowerPrimary => &LOWER_PRIMARY,
            Self::LowerPermanent => &LOWER_PERMANENT,
        }
    }

    /// The arch this row belongs to.
    pub fn arch(&self) -> Arch {
        match self {
            Self::UpperPermanent | Self::UpperPrimary => Arch::Upper,
            Self::LowerPrimary | Self::LowerPermanent => Arch::Lower,
        }
    }

    /// The dentition this row belongs to.
    pub fn dentition(&self) -> Dentition {
        match self {
            Self::UpperPermanent | Self::LowerPermanent => Dentition::Permanent,
            Self::UpperPrimary | Self::LowerPrimary => Dentition::Primary,
        }
    }
}

/// A tooth together with its row and arch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchSlot {
    /// The tooth occupying the slot.
    pub tooth: ToothNumber,
    /// Row of the slot.
    pub row: ArchRow,
    /// Zero-based index within the row.
    pub position: usize,
}

impl ArchSlot {
    /// Arch of the slot.
    pub fn arch(&self) -> Arch {
        self.row.arch()
    }
}

/// Locate a tooth in the layout.
///
/// Computed from the FDI digits: right-side quadrants count down toward the
/// midline, left-side quadrants count up away from it.
pub fn slot(tooth: ToothNumber) -> ArchSlot {
    let row = ArchRow::of(tooth.arch(), tooth.dentition());
    let per_side = row.teeth().len() / 2;
    let unit = usize::from(tooth.unit());
    let position = match tooth.quadrant() {
        1 | 4 | 5 | 8 => per_side - unit,
        _ => per_side + unit - 1,
    };
    ArchSlot {
        tooth,
        row,
        position,
    }
}

/// Teeth of a row in arch order.
pub fn row(arch: Arch, dentition: Dentition) -> &'static [ToothNumber] {
    ArchRow::of(arch, dentition).teeth()
}

/// Order two endpoints by arch position.
///
/// # Errors
///
/// Rejects endpoints on different arches or dentitions.
pub fn ordered_pair(a: ToothNumber, b: ToothNumber) -> Result<(ArchSlot, ArchSlot), OdontoError> {
    let (sa, sb) = (slot(a), slot(b));
    check_same_row(&sa, &sb)?;
    if sa.position <= sb.position {
        Ok((sa, sb))
    } else {
        Ok((sb, sa))
    }
}

/// Every tooth between two endpoints inclusive, in arch order.
///
/// The result is the same regardless of which endpoint comes first.
///
/// # Errors
///
/// Rejects endpoints on different arches or dentitions.
pub fn span(a: ToothNumber, b: ToothNumber) -> Result<Vec<ToothNumber>, OdontoError> {
    let (lo, hi) = ordered_pair(a, b)?;
    Ok(lo.row.teeth()[lo.position..=hi.position].to_vec())
}

fn check_same_row(a: &ArchSlot, b: &ArchSlot) -> Result<(), OdontoError> {
    if a.row.arch() != b.row.arch() {
        return Err(OdontoError::CrossArch {
            from: a.tooth,
            to: b.tooth,
        });
    }
    if a.row.dentition() != b.row.dentition() {
        return Err(OdontoError::MixedDentition {
            from: a.tooth,
            to: b.tooth,
        });
    }
    Ok(())
}
