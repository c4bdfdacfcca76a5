//! Plan step execution
//!
//! Drives one step of a registered plan or failover procedure through the
//! Pending -> Executing -> Completed/Failed state machine, dispatching the
//! step's bound action through the typed registry. When the owning plan has
//! auto-progression enabled, completion continues iteratively into the step
//! with the next consecutive order until the sequence is exhausted or an
//! action fails; a failure always surfaces to the caller and halts the
//! chain. The per-plan lock is held across the whole action-plus-chain, so
//! concurrent calls against one plan serialize.

use crate::action::ActionRegistry;
use crate::error::{RecoveryError, RecoveryResult};
use crate::notify::{NotificationBus, RecoveryEvent};
use crate::planner::{FailoverStatus, PlanStatus, RecoveryStep, StepStatus};
use crate::registry::PlanRegistry;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of one `execute_step` call
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Owning plan or failover procedure
    pub plan_id: Uuid,
    /// The step the caller asked to execute
    pub step_order: u32,
    /// Terminal status the requested step reached
    pub status: StepStatus,
    /// Orders of steps completed by auto-progression after the requested one
    pub chained: Vec<u32>,
    /// Result of the last completed step action
    pub result: Option<serde_json::Value>,
}

/// Executes plan steps as state transitions
pub struct PlanExecutor {
    registry: Arc<PlanRegistry>,
    actions: Arc<ActionRegistry>,
    bus: Arc<NotificationBus>,
}

impl PlanExecutor {
    /// Create an executor over an injected registry, action set and bus
    pub fn new(
        registry: Arc<PlanRegistry>,
        actions: Arc<ActionRegistry>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            registry,
            actions,
            bus,
        }
    }

    /// Execute one step of a registered recovery plan
    pub async fn execute_step(
        &self,
        plan_id: Uuid,
        step_order: u32,
    ) -> RecoveryResult<StepResult> {
        let handle = self
            .registry
            .plan(plan_id)
            .ok_or(RecoveryError::PlanNotFound { plan_id })?;
        let mut plan = handle.lock().await;

        if plan.step(step_order).is_none() {
            return Err(RecoveryError::StepNotFound {
                plan_id,
                step_order,
            });
        }

        let auto = plan.auto_progress;
        let outcome = self
            .drive_steps(plan_id, &mut plan.steps, auto, step_order)
            .await;

        match outcome {
            Ok((chained, result)) => {
                plan.status = if plan
                    .steps
                    .iter()
                    .all(|step| step.status == StepStatus::Completed)
                {
                    PlanStatus::Completed
                } else {
                    PlanStatus::InProgress
                };
                let status = plan
                    .step(step_order)
                    .map(|step| step.status)
                    .unwrap_or(StepStatus::Completed);
                Ok(StepResult {
                    plan_id,
                    step_order,
                    status,
                    chained,
                    result,
                })
            }
            Err(error) => {
                if matches!(error, RecoveryError::ActionFailed { .. }) {
                    plan.status = PlanStatus::Failed;
                }
                Err(error)
            }
        }
    }

    /// Execute one step of a registered failover procedure
    ///
    /// Failover steps share the recovery-plan execution contract; only the
    /// lifecycle bookkeeping differs.
    pub async fn execute_failover_step(
        &self,
        procedure_id: Uuid,
        step_order: u32,
    ) -> RecoveryResult<StepResult> {
        let handle = self
            .registry
            .procedure(procedure_id)
            .ok_or(RecoveryError::ProcedureNotFound { procedure_id })?;
        let mut procedure = handle.lock().await;

        if procedure.step(step_order).is_none() {
            return Err(RecoveryError::StepNotFound {
                plan_id: procedure_id,
                step_order,
            });
        }

        let auto = procedure.auto_progress;
        let outcome = self
            .drive_steps(procedure_id, &mut procedure.steps, auto, step_order)
            .await;

        match outcome {
            Ok((chained, result)) => {
                procedure.status = if procedure
                    .steps
                    .iter()
                    .all(|step| step.status == StepStatus::Completed)
                {
                    FailoverStatus::Completed
                } else {
                    FailoverStatus::InProgress
                };
                let status = procedure
                    .step(step_order)
                    .map(|step| step.status)
                    .unwrap_or(StepStatus::Completed);
                Ok(StepResult {
                    plan_id: procedure_id,
                    step_order,
                    status,
                    chained,
                    result,
                })
            }
            Err(error) => {
                if matches!(error, RecoveryError::ActionFailed { .. }) {
                    procedure.status = FailoverStatus::Failed;
                }
                Err(error)
            }
        }
    }

    /// Run the requested step and, when auto-progression applies, every step
    /// with the next consecutive order until the sequence ends or fails
    async fn drive_steps(
        &self,
        owner_id: Uuid,
        steps: &mut [RecoveryStep],
        auto_progress: bool,
        start_order: u32,
    ) -> RecoveryResult<(Vec<u32>, Option<serde_json::Value>)> {
        let mut current = start_order;
        let mut chained = Vec::new();
        let mut last_result = None;

        loop {
            let value = self.run_single(owner_id, steps, current).await?;

            if let Some(step) = steps.iter().find(|step| step.order == current) {
                self.bus.publish(&RecoveryEvent::StepCompleted {
                    plan_id: owner_id,
                    step: step.clone(),
                });
            }
            last_result = Some(value);

            if !auto_progress {
                break;
            }
            if steps.iter().any(|step| step.order == current + 1) {
                current += 1;
                chained.push(current);
            } else {
                break;
            }
        }

        Ok((chained, last_result))
    }

    /// Drive a single step through its state machine
    async fn run_single(
        &self,
        owner_id: Uuid,
        steps: &mut [RecoveryStep],
        order: u32,
    ) -> RecoveryResult<serde_json::Value> {
        let index = steps
            .iter()
            .position(|step| step.order == order)
            .ok_or(RecoveryError::StepNotFound {
                plan_id: owner_id,
                step_order: order,
            })?;

        if steps[index].status != StepStatus::Pending {
            return Err(RecoveryError::InvalidStepState {
                plan_id: owner_id,
                step_order: order,
                from: format!("{:?}", steps[index].status),
            });
        }

        // Resolve before any transition so a missing binding leaves the step
        // untouched.
        let action = self.actions.resolve(steps[index].action)?;

        steps[index].status = StepStatus::Executing;
        steps[index].started_at = Some(Utc::now());
        debug!(plan_id = %owner_id, order, step = %steps[index].name, "executing step");

        let snapshot = steps[index].clone();
        match action.execute(&snapshot).await {
            Ok(value) => {
                steps[index].status = StepStatus::Completed;
                steps[index].completed_at = Some(Utc::now());
                steps[index].result = Some(value.clone());
                debug!(plan_id = %owner_id, order, "step completed");
                Ok(value)
            }
            Err(source) => {
                steps[index].status = StepStatus::Failed;
                steps[index].completed_at = Some(Utc::now());
                warn!(plan_id = %owner_id, order, error = %source, "step action failed");
                Err(RecoveryError::ActionFailed {
                    plan_id: owner_id,
                    step_order: order,
                    action: snapshot.action.as_str().to_string(),
                    reason: source.to_string(),
                })
            }
        }
    }
}
