//! Backup fitness scoring
//!
//! Scores a single backup's restorability from four factors (integrity,
//! completeness, recency, accessibility) and folds them into a weighted
//! overall score with a coarse recommendation tier. Reports are computed per
//! call and never stored.

use crate::backup::BackupDescriptor;
use crate::error::RecoveryResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const INTEGRITY_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.2;
const ACCESSIBILITY_WEIGHT: f64 = 0.1;

const RECOMMENDED_THRESHOLD: f64 = 0.85;
const CAUTION_THRESHOLD: f64 = 0.7;

/// How safe a backup is to restore from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    /// Overall score below 0.7 - restoring from this backup is risky
    NotRecommended,
    /// Overall score in [0.7, 0.85) - usable, but prefer a better candidate
    UseWithCaution,
    /// Overall score at or above 0.85
    Recommended,
}

/// Fitness scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Age at which the recency factor bottoms out at zero, in hours
    pub max_age_hours: i64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 7 * 24,
        }
    }
}

/// Per-factor restorability assessment for one backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Backup the report describes
    pub backup_id: String,
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// Checksum-derived integrity factor, in [0, 1]
    pub integrity_score: f64,
    /// Completeness factor, in [0, 1]
    pub completeness_score: f64,
    /// Age-derived recency factor, in [0, 1]
    pub recency_score: f64,
    /// Media accessibility factor, in [0, 1]
    pub accessibility_score: f64,
    /// Weighted overall score, in [0, 1]
    pub overall_score: f64,
    /// Coarse recommendation tier derived from the overall score
    pub recommendation: Recommendation,
}

/// Scores candidate backups for restorability
#[derive(Debug, Clone, Default)]
pub struct FitnessScorer {
    config: FitnessConfig,
}

impl FitnessScorer {
    /// Create a scorer with the given configuration
    pub fn new(config: FitnessConfig) -> Self {
        Self { config }
    }

    /// Analyze one backup's fitness for restoration
    ///
    /// Factor rules: integrity is 0.99 when the stored checksum verified and
    /// 0.5 otherwise; completeness is 1.0 for full backups and 0.7 for
    /// partial ones; recency decays linearly from 1.0 at age zero to 0.0 at
    /// the configured maximum age; accessibility is 1.0 for reachable media
    /// and 0.3 otherwise. The overall score weights these 0.4/0.3/0.2/0.1.
    pub fn analyze_fitness(&self, backup: &BackupDescriptor) -> RecoveryResult<FitnessReport> {
        backup.validate()?;

        let analyzed_at = Utc::now();

        let integrity_score = if backup.checksum_valid { 0.99 } else { 0.5 };
        let completeness_score = if backup.is_complete { 1.0 } else { 0.7 };
        let accessibility_score = if backup.accessible { 1.0 } else { 0.3 };

        let age_hours = backup.age_at(analyzed_at).num_minutes() as f64 / 60.0;
        let max_age_hours = self.config.max_age_hours as f64;
        let recency_score = (1.0 - age_hours / max_age_hours).clamp(0.0, 1.0);

        let overall_score = INTEGRITY_WEIGHT * integrity_score
            + COMPLETENESS_WEIGHT * completeness_score
            + RECENCY_WEIGHT * recency_score
            + ACCESSIBILITY_WEIGHT * accessibility_score;

        let recommendation = if overall_score < CAUTION_THRESHOLD {
            Recommendation::NotRecommended
        } else if overall_score < RECOMMENDED_THRESHOLD {
            Recommendation::UseWithCaution
        } else {
            Recommendation::Recommended
        };

        debug!(
            backup_id = %backup.id,
            overall = overall_score,
            ?recommendation,
            "analyzed backup fitness"
        );

        Ok(FitnessReport {
            backup_id: backup.id.clone(),
            analyzed_at,
            integrity_score,
            completeness_score,
            recency_score,
            accessibility_score,
            overall_score,
            recommendation,
        })
    }
}
