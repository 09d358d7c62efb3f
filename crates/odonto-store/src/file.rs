//! # Filesystem Store
//!
//! One directory per chart, one JSON file per version:
//!
//! ```text
//! <root>/<chart_id>/1.json
//! <root>/<chart_id>/2.json
//! ```
//!
//! Each version is written to a hidden temporary file in the chart directory,
//! synced, then renamed into place, so a reader never sees a half-written
//! snapshot. Files whose stem is not a version number are ignored.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use odonto_core::ChartId;
use odonto_state::ChartState;

use crate::envelope::{SnapshotEnvelope, SnapshotMeta};
use crate::error::StoreError;
use crate::store::SnapshotStore;

/// Snapshot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chart_dir(&self, chart_id: ChartId) -> PathBuf {
        self.root.join(chart_id.to_string())
    }

    fn version_path(&self, chart_id: ChartId, version: u64) -> PathBuf {
        self.chart_dir(chart_id).join(format!("{version}.json"))
    }

    /// Version numbers present on disk, ascending.
    fn versions(&self, chart_id: ChartId) -> Result<Vec<u64>, StoreError> {
        let dir = self.chart_dir(chart_id);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut versions = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(version) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    fn read_envelope(&self, chart_id: ChartId, path: &Path) -> Result<SnapshotEnvelope, StoreError> {
        let bytes = std::fs::read(path)?;
        let envelope: SnapshotEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if envelope.chart_id != chart_id {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("envelope belongs to chart {}", envelope.chart_id),
            });
        }
        Ok(envelope)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: "snapshot path has no parent directory".to_string(),
    })?;
    std::fs::create_dir_all(parent)?;
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("snapshot");
    let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

impl SnapshotStore for FileStore {
    fn save(&self, chart_id: ChartId, chart: &ChartState) -> Result<SnapshotMeta, StoreError> {
        let version = self.versions(chart_id)?.last().map_or(1, |v| v + 1);
        let envelope = SnapshotEnvelope::seal(chart_id, version, chart)?;
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        let path = self.version_path(chart_id, version);
        write_atomic(&path, &bytes)?;
        tracing::info!(chart_id = %chart_id, version, path = %path.display(), "snapshot saved");
        Ok(envelope.meta())
    }

    fn history(&self, chart_id: ChartId) -> Result<Vec<SnapshotMeta>, StoreError> {
        self.versions(chart_id)?
            .into_iter()
            .map(|v| {
                self.read_envelope(chart_id, &self.version_path(chart_id, v))
                    .map(|e| e.meta())
            })
            .collect()
    }

    fn fetch(&self, chart_id: ChartId, version: u64) -> Result<SnapshotEnvelope, StoreError> {
        let path = self.version_path(chart_id, version);
        if !path.exists() {
            if self.versions(chart_id)?.is_empty() {
                return Err(StoreError::NotFound(chart_id));
            }
            return Err(StoreError::VersionNotFound { chart_id, version });
        }
        let envelope = self.read_envelope(chart_id, &path)?;
        if envelope.version != version {
            return Err(StoreError::Corrupt {
                path,
                reason: format!("file holds version {}", envelope.version),
            });
        }
        Ok(envelope)
    }

    fn fetch_latest(&self, chart_id: ChartId) -> Result<SnapshotEnvelope, StoreError> {
        let latest = self
            .versions(chart_id)?
            .last()
            .copied()
            .ok_or(StoreError::NotFound(chart_id))?;
        self.fetch(chart_id, latest)
    }
}
