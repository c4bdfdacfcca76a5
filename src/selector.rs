//! Backup selection against recovery criteria
//!
//! Filters a candidate set down to backups that satisfy the caller's
//! criteria, ranks the survivors by a weighted score, and reports the best
//! pick plus up to two alternatives. An empty survivor set is a normal
//! outcome expressed in the result value, never an error.

use crate::backup::BackupDescriptor;
use crate::error::RecoveryResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

const TIME_PROXIMITY_WEIGHT: f64 = 0.4;
const INTEGRITY_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.2;

const MAX_ALTERNATIVES: usize = 2;

/// Criteria a backup must satisfy to be considered for recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Instant the caller wants to recover to
    pub target_time: DateTime<Utc>,
    /// Minimum acceptable integrity, in [0, 1]
    pub minimum_integrity: f64,
    /// Whether partial backups may be considered
    pub allow_partial: bool,
    /// Maximum acceptable backup age, in hours
    pub max_age_hours: i64,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            target_time: Utc::now(),
            minimum_integrity: 0.95,
            allow_partial: false,
            max_age_hours: 7 * 24,
        }
    }
}

/// Score breakdown for one surviving candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Backup the breakdown describes
    pub backup_id: String,
    /// Closeness to the target time, 0-100
    pub time_proximity: f64,
    /// Integrity scaled to 0-100
    pub integrity_score: f64,
    /// 100 for complete backups, 50 for partial ones
    pub completeness_score: f64,
    /// Weighted total
    pub total: f64,
}

/// Outcome of a selection pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Whether any candidate survived the filter
    pub success: bool,
    /// Best surviving candidate
    pub selected: Option<BackupDescriptor>,
    /// Runners-up, at most two, never containing the selected backup
    pub alternatives: Vec<BackupDescriptor>,
    /// Score breakdown for every survivor, best first
    pub scores: Vec<CandidateScore>,
    /// Why selection produced no pick, when it did not
    pub reason: Option<String>,
}

/// Filters and ranks candidate backups against recovery criteria
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupSelector;

impl BackupSelector {
    /// Create a selector
    pub fn new() -> Self {
        Self
    }

    /// Select the best backup for the given criteria
    ///
    /// A candidate survives when its integrity meets the minimum, its age is
    /// within bounds, and it is complete unless partial backups are allowed.
    /// Survivors are ranked by weighted time proximity, integrity and
    /// completeness; equal totals are broken in favor of the newer backup.
    pub fn select_best(
        &self,
        candidates: &[BackupDescriptor],
        criteria: &SelectionCriteria,
    ) -> RecoveryResult<SelectionResult> {
        for candidate in candidates {
            candidate.validate()?;
        }

        let now = Utc::now();
        let survivors: Vec<&BackupDescriptor> = candidates
            .iter()
            .filter(|backup| {
                backup.integrity >= criteria.minimum_integrity
                    && backup.age_at(now).num_hours() <= criteria.max_age_hours
                    && (criteria.allow_partial || backup.is_complete)
            })
            .collect();

        if survivors.is_empty() {
            let reason = if candidates.is_empty() {
                "no candidate backups supplied".to_string()
            } else {
                format!(
                    "none of {} candidates met the selection criteria",
                    candidates.len()
                )
            };
            debug!(reason = %reason, "backup selection found no suitable candidate");
            return Ok(SelectionResult {
                success: false,
                selected: None,
                alternatives: Vec::new(),
                scores: Vec::new(),
                reason: Some(reason),
            });
        }

        let mut ranked: Vec<(&BackupDescriptor, CandidateScore)> = survivors
            .into_iter()
            .map(|backup| {
                let score = Self::score(backup, criteria);
                (backup, score)
            })
            .collect();

        // Descending by total; ties go to the newer backup.
        ranked.sort_by(|(a, sa), (b, sb)| {
            sb.total
                .partial_cmp(&sa.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let selected = ranked[0].0.clone();
        let alternatives: Vec<BackupDescriptor> = ranked
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|(backup, _)| (*backup).clone())
            .collect();
        let scores: Vec<CandidateScore> = ranked.into_iter().map(|(_, score)| score).collect();

        debug!(
            selected = %selected.id,
            alternatives = alternatives.len(),
            "selected best backup"
        );

        Ok(SelectionResult {
            success: true,
            selected: Some(selected),
            alternatives,
            scores,
            reason: None,
        })
    }

    fn score(backup: &BackupDescriptor, criteria: &SelectionCriteria) -> CandidateScore {
        let hours_from_target =
            (criteria.target_time - backup.created_at).num_minutes().abs() as f64 / 60.0;
        let time_proximity = (100.0 - hours_from_target).max(0.0);
        let integrity_score = backup.integrity * 100.0;
        let completeness_score = if backup.is_complete { 100.0 } else { 50.0 };

        let total = TIME_PROXIMITY_WEIGHT * time_proximity
            + INTEGRITY_WEIGHT * integrity_score
            + COMPLETENESS_WEIGHT * completeness_score;

        CandidateScore {
            backup_id: backup.id.clone(),
            time_proximity,
            integrity_score,
            completeness_score,
            total,
        }
    }
}
