//! Backup descriptors supplied by the external catalog
//!
//! The engine consumes immutable [`BackupDescriptor`] values produced by an
//! external backup catalog. It scores, selects and references them but never
//! mutates them and never touches the underlying data.

use crate::error::{RecoveryError, RecoveryResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor of one candidate backup as reported by the external catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDescriptor {
    /// Catalog-assigned backup identifier, opaque to the engine
    pub id: String,
    /// Capture timestamp
    pub created_at: DateTime<Utc>,
    /// Integrity confidence reported by the catalog, in [0, 1]
    pub integrity: f64,
    /// Whether the backup captured the full dataset
    pub is_complete: bool,
    /// Whether the backup media is currently reachable
    pub accessible: bool,
    /// Whether the stored checksum matched on last verification
    pub checksum_valid: bool,
    /// Backup size in bytes
    pub size_bytes: u64,
}

impl BackupDescriptor {
    /// Age of the backup relative to a reference instant
    ///
    /// Negative when `created_at` lies in the future of `reference`; callers
    /// clamp where a non-negative age is required.
    pub fn age_at(&self, reference: DateTime<Utc>) -> Duration {
        reference - self.created_at
    }

    /// Check the descriptor is well-formed before scoring or planning with it
    pub(crate) fn validate(&self) -> RecoveryResult<()> {
        if self.id.trim().is_empty() {
            return Err(RecoveryError::Validation {
                reason: "backup id is empty".to_string(),
            });
        }

        if !self.integrity.is_finite() || !(0.0..=1.0).contains(&self.integrity) {
            return Err(RecoveryError::Validation {
                reason: format!(
                    "backup {} has integrity {} outside [0, 1]",
                    self.id, self.integrity
                ),
            });
        }

        Ok(())
    }
}
