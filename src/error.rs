//! Recovery orchestration error types

use thiserror::Error;
use uuid::Uuid;

/// Recovery orchestration error types
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// Input was missing or malformed
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// Referenced plan does not exist in the registry
    #[error("Recovery plan {plan_id} not found")]
    PlanNotFound { plan_id: Uuid },

    /// Referenced step order does not exist within the plan
    #[error("Step {step_order} not found in plan {plan_id}")]
    StepNotFound { plan_id: Uuid, step_order: u32 },

    /// Referenced failover procedure does not exist in the registry
    #[error("Failover procedure {procedure_id} not found")]
    ProcedureNotFound { procedure_id: Uuid },

    /// A step was not in a state that permits the requested transition
    #[error("Step {step_order} in plan {plan_id} cannot start from state {from}")]
    InvalidStepState {
        plan_id: Uuid,
        step_order: u32,
        from: String,
    },

    /// A pluggable step action failed
    #[error("Action {action} failed for step {step_order} in plan {plan_id}: {reason}")]
    ActionFailed {
        plan_id: Uuid,
        step_order: u32,
        action: String,
        reason: String,
    },

    /// No action is registered for the step's action identifier
    #[error("No action registered for {action}")]
    ActionNotRegistered { action: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Recovery orchestration result type
pub type RecoveryResult<T> = Result<T, RecoveryError>;
