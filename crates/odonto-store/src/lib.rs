//! # odonto-store: Chart Snapshot Persistence
//!
//! Saves and loads whole charts as versioned, digest-verified snapshots.
//!
//! ## Components
//!
//! - **Envelope** (`envelope.rs`): chart id, version, save time and the
//!   SHA-256 digest of the chart's canonical bytes. Opening an envelope
//!   verifies the digest and the group invariant.
//! - **Store contract** (`store.rs`): `SnapshotStore`, append-only versions.
//! - **Stores** (`memory.rs`, `file.rs`): a shared in-memory store and a
//!   directory-per-chart filesystem store with atomic writes.
//! - **Session** (`session.rs`): a chart open for editing, with its engine
//!   and treatment plan.

pub mod envelope;
pub mod error;
pub mod file;
pub mod memory;
pub mod session;
pub mod store;

pub use envelope::{chart_digest, SnapshotEnvelope, SnapshotMeta};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::ChartSession;
pub use store::SnapshotStore;
