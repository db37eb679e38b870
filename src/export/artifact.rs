//! Export artifact format and checksums

use crate::store::{Content, Deliverable, DeliverableId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Artifact format version written into every export
pub const FORMAT_VERSION: &str = "1.0";

/// SHA-256 hex digest of the canonical content serialization
///
/// Object keys are serialized in sorted order, so two documents that differ
/// only in key order produce the same checksum.
pub fn content_checksum(content: &Content) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.canonical_bytes());
    hex::encode(hasher.finalize())
}

/// Metadata block of an export artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub exported_at: DateTime<Utc>,
    pub version: String,
    pub is_locked: bool,
    pub is_optimized: bool,
    pub checksum: String,
}

/// Immutable snapshot written at lock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub id: DeliverableId,
    pub name: String,
    pub content: Content,
    pub metadata: ArtifactMetadata,
}

impl ExportArtifact {
    /// Snapshot a deliverable as it will look once locked
    pub fn snapshot(deliverable: &Deliverable, exported_at: DateTime<Utc>) -> Self {
        Self {
            id: deliverable.id,
            name: deliverable.name.clone(),
            content: deliverable.content.clone(),
            metadata: ArtifactMetadata {
                exported_at,
                version: FORMAT_VERSION.to_string(),
                is_locked: true,
                is_optimized: deliverable.is_optimized,
                checksum: content_checksum(&deliverable.content),
            },
        }
    }

    /// Recompute the content checksum and compare it with the recorded one
    pub fn verify(&self) -> Verification {
        let actual = content_checksum(&self.content);
        Verification {
            matches: actual == self.metadata.checksum,
            expected: self.metadata.checksum.clone(),
            actual,
        }
    }
}

/// Result of re-checking an artifact's checksum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub expected: String,
    pub actual: String,
    pub matches: bool,
}
