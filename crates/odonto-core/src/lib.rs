//! # odonto-core: Foundational Types for the Odontogram Engine
//!
//! This crate is the leaf of the workspace. It defines the static data and
//! validated primitives every other crate builds on; it depends on nothing
//! internal.
//!
//! ## Contents
//!
//! 1. **Tooth primitives** ([`tooth`]). `ToothNumber` is a validated FDI
//!    number; `Arch`, `Dentition` and `FaceKey` are closed enums. No bare
//!    integers for teeth.
//!
//! 2. **Arch layout** ([`layout`]). The four static tooth rows and the range
//!    enumeration used by multi-tooth findings. Cross-arch and mixed-dentition
//!    ranges are rejected here, once, instead of at every call site.
//!
//! 3. **Finding catalog** ([`catalog`]). The static table of clinical findings
//!    with their placement category, default color and detail options.
//!
//! 4. **Canonical digests** ([`canonical`], [`digest`]). Snapshot integrity
//!    digests are computed only over `CanonicalBytes`.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Static tables are `'static` slices; nothing here mutates.

pub mod canonical;
pub mod catalog;
pub mod digest;
pub mod error;
pub mod identity;
pub mod layout;
pub mod temporal;
pub mod tooth;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use catalog::{
    ColorPolicy, DetailOption, FindingCode, FindingColor, FindingDefinition, PlacementCategory,
    FINDING_COUNT,
};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, OdontoError};
pub use identity::{ChartId, ServiceId};
pub use layout::{ArchRow, ArchSlot};
pub use temporal::Timestamp;
pub use tooth::{Arch, Dentition, Direction, FaceKey, ToothNumber};
