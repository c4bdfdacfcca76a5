//! Automated failover procedure construction
//!
//! A failover procedure is a fixed, strictly sequential four-step sequence
//! promoting a secondary backup target after the primary is lost. The steps
//! reuse the same step type and execution contract as recovery plans;
//! constructing the procedure notifies observers before any step runs.

use crate::backup::BackupDescriptor;
use crate::error::RecoveryResult;
use crate::notify::RecoveryEvent;
use crate::planner::planner::{RecoveryPlanner, STEP_DURATION_MINUTES};
use crate::planner::types::{
    FailoverProcedure, FailoverStatus, RecoveryObjective, RecoveryStep, StepActionKind,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Options for an automated failover
///
/// The RPO/RTO targets are fixed defaults and are not overridable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverOptions {
    /// Operator-supplied reason recorded on the procedure
    pub reason: Option<String>,
    /// Whether completing a step immediately drives the next one
    pub auto_progress: bool,
}

impl Default for FailoverOptions {
    fn default() -> Self {
        Self {
            reason: None,
            auto_progress: true,
        }
    }
}

impl RecoveryPlanner {
    /// Build and register an automated failover procedure
    ///
    /// Emits `failover-initiated` at construction time, before any step
    /// executes.
    pub fn automated_failover(
        &self,
        primary: &BackupDescriptor,
        secondary: &BackupDescriptor,
        options: FailoverOptions,
    ) -> RecoveryResult<FailoverProcedure> {
        primary.validate()?;
        secondary.validate()?;

        let steps = vec![
            RecoveryStep::pending(
                1,
                "Validation",
                "Validate the secondary target and its backing backup",
                StepActionKind::Validation,
            ),
            RecoveryStep::pending(
                2,
                "Preparation",
                "Prepare the secondary to take traffic",
                StepActionKind::Preparation,
            ),
            RecoveryStep::pending(
                3,
                "Routing Switch",
                "Redirect routing from primary to secondary",
                StepActionKind::RoutingSwitch,
            ),
            RecoveryStep::pending(
                4,
                "Connectivity Verification",
                "Confirm the secondary answers on the switched routes",
                StepActionKind::ConnectivityCheck,
            ),
        ];

        let procedure = FailoverProcedure {
            id: Uuid::new_v4(),
            primary_backup: primary.clone(),
            secondary_backup: secondary.clone(),
            status: FailoverStatus::Initiated,
            created_at: Utc::now(),
            estimated_minutes: steps.len() as u64 * STEP_DURATION_MINUTES,
            steps,
            recovery_objective: RecoveryObjective {
                rpo: "1 hour".to_string(),
                rto: "10 minutes".to_string(),
            },
            auto_progress: options.auto_progress,
            reason: options.reason,
        };

        info!(
            procedure_id = %procedure.id,
            primary = %primary.id,
            secondary = %secondary.id,
            "initiated automated failover"
        );
        self.registry().insert_procedure(procedure.clone())?;
        self.bus()
            .publish(&RecoveryEvent::FailoverInitiated(procedure.clone()));
        Ok(procedure)
    }
}
