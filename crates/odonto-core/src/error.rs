//! # Error Types
//!
//! Errors raised by the leaf crate. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Range errors carry both endpoints so callers can report exactly which
//! click pair was rejected.

use thiserror::Error;

use crate::tooth::ToothNumber;

/// Top-level error type for core primitives.
#[derive(Error, Debug)]
pub enum OdontoError {
    /// The value is not a valid FDI tooth number.
    #[error("invalid tooth number: {0}")]
    InvalidTooth(String),

    /// No finding with this code exists in the catalog.
    #[error("unknown finding code: {0:?}")]
    UnknownFinding(String),

    /// Unknown tooth face key.
    #[error("unknown face key: {0:?}")]
    UnknownFace(String),

    /// Range endpoints lie on different arches.
    #[error("range endpoints {from} and {to} are on different arches")]
    CrossArch {
        /// First recorded endpoint.
        from: ToothNumber,
        /// Second recorded endpoint.
        to: ToothNumber,
    },

    /// Range endpoints mix permanent and primary teeth.
    #[error("range endpoints {from} and {to} belong to different dentitions")]
    MixedDentition {
        /// First recorded endpoint.
        from: ToothNumber,
        /// Second recorded endpoint.
        to: ToothNumber,
    },

    /// Timestamp parsing failed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
