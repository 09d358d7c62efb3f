//! # Store Errors
//!
//! Every persistence failure is local and recoverable. Integrity failures
//! (`DigestMismatch`, `Chart`) are distinct from decoding failures
//! (`Corrupt`) so callers can tell a tampered snapshot from a truncated one.

use std::path::PathBuf;

use thiserror::Error;

use odonto_core::{CanonicalizationError, ChartId, ContentDigest};
use odonto_state::ChartError;

/// Errors raised by snapshot stores and chart sessions.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No snapshot has ever been saved for this chart.
    #[error("no snapshot for chart {0}")]
    NotFound(ChartId),

    /// The chart exists but not at this version.
    #[error("chart {chart_id} has no version {version}")]
    VersionNotFound {
        /// Chart identifier.
        chart_id: ChartId,
        /// Requested version.
        version: u64,
    },

    /// The stored digest does not match the stored chart.
    #[error("snapshot {chart_id} v{version}: digest mismatch (recorded {recorded}, computed {computed})")]
    DigestMismatch {
        /// Chart identifier.
        chart_id: ChartId,
        /// Snapshot version.
        version: u64,
        /// Digest stored in the envelope.
        recorded: ContentDigest,
        /// Digest of the chart as read.
        computed: ContentDigest,
    },

    /// A snapshot file could not be decoded.
    #[error("corrupt snapshot at {path}: {reason}")]
    Corrupt {
        /// File that failed to decode.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The session's engine is halfway through a two-step interaction.
    #[error("cannot save while the engine is in {mode}")]
    InteractionPending {
        /// Engine mode name.
        mode: &'static str,
    },

    /// The chart violates the group invariant.
    #[error("snapshot chart is inconsistent: {0}")]
    Chart(#[from] ChartError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Canonicalizing a chart for its digest failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
