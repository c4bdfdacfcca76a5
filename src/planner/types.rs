//! Core types for recovery plans and failover procedures

use crate::backup::BackupDescriptor;
use crate::optimizer::OptimizationParameters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of recovery a plan performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanType {
    /// Restore to the state as of a target instant
    PointInTime,
    /// Restore only named subsets of the dataset
    Selective,
    /// Complete restore of everything
    FullRestore,
    /// Restore of a chosen portion
    PartialRestore,
    /// Replay of increments on top of an existing baseline
    IncrementalRestore,
}

/// Lifecycle state of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Built and registered, no step executed yet
    Ready,
    /// At least one step has executed
    InProgress,
    /// Every step completed
    Completed,
    /// A step action failed
    Failed,
}

/// Lifecycle state of a single step
///
/// The only legal walk is Pending -> Executing -> Completed or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepStatus {
    /// Not started
    Pending,
    /// Action dispatched, awaiting outcome
    Executing,
    /// Action succeeded
    Completed,
    /// Action failed
    Failed,
}

/// Typed identifier of the action a step dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepActionKind {
    /// Check prerequisites and backup fitness
    Validation,
    /// Stage resources for the restore
    Preparation,
    /// Hand the restore off to the external executor
    Restoration,
    /// Confirm restored data matches expectations
    Verification,
    /// Switch traffic to the restored target
    Cutover,
    /// Determine the scope of a selective restore
    Analysis,
    /// Restore one named item
    RestoreItem,
    /// Redirect routing from primary to secondary
    RoutingSwitch,
    /// Confirm the secondary answers after a routing switch
    ConnectivityCheck,
}

impl StepActionKind {
    /// Stable identifier used in logs and error context
    pub fn as_str(&self) -> &'static str {
        match self {
            StepActionKind::Validation => "validation",
            StepActionKind::Preparation => "preparation",
            StepActionKind::Restoration => "restoration",
            StepActionKind::Verification => "verification",
            StepActionKind::Cutover => "cutover",
            StepActionKind::Analysis => "analysis",
            StepActionKind::RestoreItem => "restore-item",
            StepActionKind::RoutingSwitch => "routing-switch",
            StepActionKind::ConnectivityCheck => "connectivity-check",
        }
    }
}

/// One ordered step of a plan or failover procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryStep {
    /// Position in the execution sequence, unique within the parent
    pub order: u32,
    /// Step name
    pub name: String,
    /// What the step does
    pub description: String,
    /// Action the step dispatches
    pub action: StepActionKind,
    /// Current state
    pub status: StepStatus,
    /// When execution began
    pub started_at: Option<DateTime<Utc>>,
    /// When execution reached a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Opaque action result
    pub result: Option<serde_json::Value>,
}

impl RecoveryStep {
    /// Build a pending step
    pub fn pending(order: u32, name: &str, description: &str, action: StepActionKind) -> Self {
        Self {
            order,
            name: name.to_string(),
            description: description.to_string(),
            action,
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            result: None,
        }
    }
}

/// What a selective restore should bring back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectiveCriteria {
    /// Document collections to restore
    pub collections: Vec<String>,
    /// Relational tables to restore
    pub tables: Vec<String>,
    /// Restrict restored records to this time window
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Glob-style patterns to skip
    pub exclude_patterns: Vec<String>,
}

/// A multi-step recovery plan
///
/// Owned by the plan registry for the process lifetime and mutated in place
/// by the executor; retention beyond that is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryPlan {
    /// Plan ID
    pub id: Uuid,
    /// Kind of recovery
    pub plan_type: PlanType,
    /// Lifecycle state
    pub status: PlanStatus,
    /// When the plan was built
    pub created_at: DateTime<Utc>,
    /// Ordered steps
    pub steps: Vec<RecoveryStep>,
    /// Advisory optimization parameters, when the scenario asked for them
    pub optimization: Option<OptimizationParameters>,
    /// Projected duration in minutes
    pub estimated_recovery_minutes: u64,
    /// Qualitative resource needs
    pub resource_requirements: Vec<String>,
    /// Qualitative risks the operator should weigh
    pub risk_factors: Vec<String>,
    /// Whether completing a step immediately drives the next one
    pub auto_progress: bool,
    /// Backup the plan restores from
    pub selected_backup: Option<BackupDescriptor>,
    /// Fallback backup
    pub alternative_backup: Option<BackupDescriptor>,
    /// Criteria recorded verbatim for selective restores
    pub data_to_restore: Option<SelectiveCriteria>,
}

impl RecoveryPlan {
    /// Look up a step by order
    pub fn step(&self, order: u32) -> Option<&RecoveryStep> {
        self.steps.iter().find(|step| step.order == order)
    }

    /// Look up a step by order, mutably
    pub fn step_mut(&mut self, order: u32) -> Option<&mut RecoveryStep> {
        self.steps.iter_mut().find(|step| step.order == order)
    }
}

/// Recovery point and time objectives for a failover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryObjective {
    /// Acceptable data-loss window
    pub rpo: String,
    /// Acceptable downtime
    pub rto: String,
}

/// Lifecycle state of a failover procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailoverStatus {
    /// Procedure constructed, observers notified, no step run yet
    Initiated,
    /// At least one step has executed
    InProgress,
    /// Every step completed
    Completed,
    /// A step action failed
    Failed,
}

/// A fixed, strictly sequential failover procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverProcedure {
    /// Procedure ID
    pub id: Uuid,
    /// Backup backing the failed primary
    pub primary_backup: BackupDescriptor,
    /// Backup backing the promotion target
    pub secondary_backup: BackupDescriptor,
    /// Lifecycle state
    pub status: FailoverStatus,
    /// When the procedure was built
    pub created_at: DateTime<Utc>,
    /// The four sequential steps, orders 1 through 4
    pub steps: Vec<RecoveryStep>,
    /// Projected duration in minutes
    pub estimated_minutes: u64,
    /// Fixed RPO/RTO targets
    pub recovery_objective: RecoveryObjective,
    /// Whether completing a step immediately drives the next one
    pub auto_progress: bool,
    /// Operator-supplied reason, when given
    pub reason: Option<String>,
}

impl FailoverProcedure {
    /// Look up a step by order
    pub fn step(&self, order: u32) -> Option<&RecoveryStep> {
        self.steps.iter().find(|step| step.order == order)
    }

    /// Look up a step by order, mutably
    pub fn step_mut(&mut self, order: u32) -> Option<&mut RecoveryStep> {
        self.steps.iter_mut().find(|step| step.order == order)
    }
}
