//! Immutable export of locked deliverables
//!
//! Each lock event writes exactly one JSON artifact. Artifacts are never
//! rewritten: the file name embeds the deliverable id, the export timestamp
//! and a random suffix, and the final path is only created if it does not
//! already exist.

pub mod artifact;

pub use artifact::{content_checksum, ArtifactMetadata, ExportArtifact, Verification, FORMAT_VERSION};

use crate::error::{VaultError, VaultResult};
use crate::store::Deliverable;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Writes export artifacts under a single directory
#[derive(Debug)]
pub struct ArtifactExporter {
    export_dir: PathBuf,
    exports_written: AtomicU64,
}

impl ArtifactExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            exports_written: AtomicU64::new(0),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Successful export events since construction
    pub fn exports_written(&self) -> u64 {
        self.exports_written.load(Ordering::Relaxed)
    }

    /// Unique artifact path for one export event
    fn artifact_path(&self, deliverable: &Deliverable, exported_at: DateTime<Utc>) -> PathBuf {
        let suffix = Uuid::new_v4().simple().to_string();
        self.export_dir.join(format!(
            "deliverable-{}-{}-{}.json",
            deliverable.id,
            exported_at.format("%Y%m%dT%H%M%S%3fZ"),
            &suffix[..8]
        ))
    }

    /// Export an optimized, not-yet-locked deliverable
    ///
    /// Returns the artifact path only once the file is completely written.
    /// On failure nothing is left at the returned location; a stray temp file
    /// may remain but is never referenced.
    pub async fn export(&self, deliverable: &Deliverable) -> VaultResult<PathBuf> {
        if !deliverable.is_optimized {
            return Err(VaultError::PreconditionFailed(format!(
                "deliverable {} is not optimized",
                deliverable.id
            )));
        }
        if deliverable.is_locked {
            return Err(VaultError::PreconditionFailed(format!(
                "deliverable {} is already locked",
                deliverable.id
            )));
        }

        let exported_at = Utc::now();
        let artifact = ExportArtifact::snapshot(deliverable, exported_at);
        let path = self.artifact_path(deliverable, exported_at);
        let bytes = serde_json::to_vec_pretty(&artifact)?;

        fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| VaultError::export(&path, format!("creating export directory: {}", e)))?;

        let tmp = tmp_path(&path);
        if let Err(e) = write_new(&tmp, &bytes).await {
            discard(&tmp).await;
            return Err(VaultError::export(&path, e.to_string()));
        }

        if let Err(e) = publish(&tmp, &path).await {
            discard(&tmp).await;
            return Err(VaultError::export(&path, e.to_string()));
        }

        self.exports_written.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Exported deliverable {} to {} (checksum {})",
            deliverable.id,
            path.display(),
            &artifact.metadata.checksum[..12]
        );
        Ok(path)
    }

    /// Load an artifact from disk
    pub async fn read_artifact(path: &Path) -> VaultResult<ExportArtifact> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| VaultError::io(format!("reading artifact {}", path.display()), e))?;

        serde_json::from_str(&raw).map_err(|e| VaultError::ArtifactInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load an artifact and recompute its checksum
    pub async fn verify(path: &Path) -> VaultResult<Verification> {
        let artifact = Self::read_artifact(path).await?;
        let check = artifact.verify();
        if !check.matches {
            warn!(
                "Checksum mismatch for {}: expected {}, got {}",
                path.display(),
                check.expected,
                check.actual
            );
        }
        Ok(check)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Move a finished temp file to its final name without clobbering
///
/// Linking fails atomically if `path` already exists.
async fn publish(tmp: &Path, path: &Path) -> std::io::Result<()> {
    fs::hard_link(tmp, path).await?;
    discard(tmp).await;
    Ok(())
}

async fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Could not remove temp artifact {}: {}", tmp.display(), e);
        }
    }
}
