//! Intelligent backup-recovery orchestration engine
//!
//! This crate decides *what* a recovery should do and tracks *whether* each
//! step has happened; the underlying I/O belongs to external collaborators.
//! It provides:
//! - Backup fitness scoring from integrity, completeness, recency and
//!   accessibility factors
//! - Candidate selection against recovery criteria with ranked alternatives
//! - Recovery planning for point-in-time, selective and scenario-optimized
//!   restores, sized by resource-aware optimization heuristics
//! - Automated failover procedures with fixed RPO/RTO objectives
//! - A step state machine with optional auto-progression over ordered steps
//! - Synchronous in-process notifications for external observers

#![warn(missing_docs)]

pub mod action;
pub mod backup;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fitness;
pub mod notify;
pub mod optimizer;
pub mod planner;
pub mod registry;
pub mod selector;

// Core error types and results
pub use error::{RecoveryError, RecoveryResult};

// Catalog input
pub use backup::BackupDescriptor;

// Fitness scoring exports
pub use fitness::{FitnessConfig, FitnessReport, FitnessScorer, Recommendation};

// Selection exports
pub use selector::{BackupSelector, CandidateScore, SelectionCriteria, SelectionResult};

// Optimization exports
pub use optimizer::{
    BandwidthAllocation, CompressionLevel, OptimizationAdvisor, OptimizationParameters,
    Parallelization, ResourceProfile,
};

// Planning exports
pub use planner::{
    FailoverOptions, FailoverProcedure, FailoverStatus, PlanStatus, PlanType, RecoveryObjective,
    RecoveryPlan, RecoveryPlanner, RecoveryStep, RestoreScenario, SelectiveCriteria,
    StepActionKind, StepStatus,
};

// Execution exports
pub use action::{ActionRegistry, StepAction};
pub use executor::{PlanExecutor, StepResult};
pub use registry::PlanRegistry;

// Notification exports
pub use notify::{NotificationBus, NotificationSink, RecoveryEvent};

// Engine facade exports
pub use engine::{EngineConfig, EngineMetrics, RecoveryEngine};
