//! Recovery orchestration engine facade
//!
//! Owns the injected plan registry, notification bus and action registry,
//! wires the scoring, selection, planning and execution components over
//! them, and exposes the public operation surface. Engines are independent:
//! two instances share nothing, so tests and embedders can run several side
//! by side.

use crate::action::{ActionRegistry, StepAction};
use crate::backup::BackupDescriptor;
use crate::error::{RecoveryError, RecoveryResult};
use crate::executor::{PlanExecutor, StepResult};
use crate::fitness::{FitnessConfig, FitnessReport, FitnessScorer};
use crate::notify::{NotificationBus, NotificationSink, RecoveryEvent};
use crate::optimizer::{OptimizationAdvisor, OptimizationParameters, ResourceProfile};
use crate::planner::{
    FailoverOptions, FailoverProcedure, RecoveryPlan, RecoveryPlanner, RestoreScenario,
    SelectiveCriteria, StepActionKind,
};
use crate::registry::PlanRegistry;
use crate::selector::{BackupSelector, SelectionCriteria, SelectionResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fitness scoring configuration
    pub fitness: FitnessConfig,
}

/// Counters describing what the engine has done so far
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngineMetrics {
    /// Fitness reports produced
    pub fitness_reports: u64,
    /// Selection passes run
    pub selections: u64,
    /// Recovery plans created
    pub plans_created: u64,
    /// Steps driven to a terminal state
    pub steps_executed: u64,
    /// Step actions that failed
    pub step_failures: u64,
    /// Failover procedures initiated
    pub failovers_initiated: u64,
}

/// Backup-recovery orchestration engine
pub struct RecoveryEngine {
    config: Arc<EngineConfig>,
    registry: Arc<PlanRegistry>,
    bus: Arc<NotificationBus>,
    actions: Arc<ActionRegistry>,
    scorer: FitnessScorer,
    selector: BackupSelector,
    advisor: OptimizationAdvisor,
    planner: RecoveryPlanner,
    executor: PlanExecutor,
    metrics: Arc<RwLock<EngineMetrics>>,
}

impl RecoveryEngine {
    /// Create an engine with the acknowledge-only default actions
    pub fn new(config: EngineConfig) -> RecoveryResult<Self> {
        Self::with_actions(config, Arc::new(ActionRegistry::with_defaults()))
    }

    /// Create an engine over a caller-supplied action registry
    pub fn with_actions(
        config: EngineConfig,
        actions: Arc<ActionRegistry>,
    ) -> RecoveryResult<Self> {
        let registry = Arc::new(PlanRegistry::new());
        let bus = Arc::new(NotificationBus::new());

        info!("starting recovery orchestration engine");
        Ok(Self {
            scorer: FitnessScorer::new(config.fitness.clone()),
            selector: BackupSelector::new(),
            advisor: OptimizationAdvisor::new(),
            planner: RecoveryPlanner::new(Arc::clone(&registry), Arc::clone(&bus)),
            executor: PlanExecutor::new(
                Arc::clone(&registry),
                Arc::clone(&actions),
                Arc::clone(&bus),
            ),
            config: Arc::new(config),
            registry,
            bus,
            actions,
            metrics: Arc::new(RwLock::new(EngineMetrics::default())),
        })
    }

    /// Score one backup's restorability
    pub fn analyze_backup_fitness(
        &self,
        backup: &BackupDescriptor,
    ) -> RecoveryResult<FitnessReport> {
        let report = self.scorer.analyze_fitness(backup)?;
        self.metrics.write().fitness_reports += 1;
        Ok(report)
    }

    /// Filter and rank candidate backups against recovery criteria
    pub fn select_best_backup(
        &self,
        candidates: &[BackupDescriptor],
        criteria: &SelectionCriteria,
    ) -> RecoveryResult<SelectionResult> {
        let result = self.selector.select_best(candidates, criteria)?;
        self.metrics.write().selections += 1;
        Ok(result)
    }

    /// Build a point-in-time recovery plan over the supplied backup timeline
    pub fn point_in_time_recovery(
        &self,
        target_time: DateTime<Utc>,
        backups: &[BackupDescriptor],
    ) -> RecoveryResult<RecoveryPlan> {
        let plan = self.planner.point_in_time_recovery(target_time, backups)?;
        self.metrics.write().plans_created += 1;
        Ok(plan)
    }

    /// Build a selective-restore plan for named subsets of one backup
    pub fn selective_restore(
        &self,
        backup: &BackupDescriptor,
        criteria: SelectiveCriteria,
    ) -> RecoveryResult<RecoveryPlan> {
        let plan = self.planner.selective_restore(backup, criteria)?;
        self.metrics.write().plans_created += 1;
        Ok(plan)
    }

    /// Build a scenario-optimized plan sized for the available resources
    pub fn generate_optimized_recovery_plan(
        &self,
        scenario: RestoreScenario,
        resources: &ResourceProfile,
    ) -> RecoveryResult<RecoveryPlan> {
        let plan = self
            .planner
            .generate_optimized_recovery_plan(scenario, resources)?;
        self.metrics.write().plans_created += 1;
        Ok(plan)
    }

    /// Compute advisory optimization parameters without building a plan
    pub fn optimization_parameters(&self, resources: &ResourceProfile) -> OptimizationParameters {
        self.advisor.compute(resources)
    }

    /// Execute one step of a registered plan, honoring auto-progression
    pub async fn execute_recovery_step(
        &self,
        plan_id: Uuid,
        step_order: u32,
    ) -> RecoveryResult<StepResult> {
        let outcome = self.executor.execute_step(plan_id, step_order).await;
        self.record_execution(&outcome);
        outcome
    }

    /// Build and register an automated failover procedure
    pub fn automated_failover(
        &self,
        primary: &BackupDescriptor,
        secondary: &BackupDescriptor,
        options: FailoverOptions,
    ) -> RecoveryResult<FailoverProcedure> {
        let procedure = self.planner.automated_failover(primary, secondary, options)?;
        self.metrics.write().failovers_initiated += 1;
        Ok(procedure)
    }

    /// Execute one step of a registered failover procedure
    pub async fn execute_failover_step(
        &self,
        procedure_id: Uuid,
        step_order: u32,
    ) -> RecoveryResult<StepResult> {
        let outcome = self
            .executor
            .execute_failover_step(procedure_id, step_order)
            .await;
        self.record_execution(&outcome);
        outcome
    }

    /// Toggle auto-progression on a registered plan
    pub async fn set_auto_progress(
        &self,
        plan_id: Uuid,
        enabled: bool,
    ) -> RecoveryResult<()> {
        let handle = self
            .registry
            .plan(plan_id)
            .ok_or(RecoveryError::PlanNotFound { plan_id })?;
        handle.lock().await.auto_progress = enabled;
        Ok(())
    }

    /// Cloned snapshot of a registered plan
    pub async fn plan(&self, plan_id: Uuid) -> Option<RecoveryPlan> {
        self.registry.plan_snapshot(plan_id).await
    }

    /// Cloned snapshot of a registered failover procedure
    pub async fn failover_procedure(&self, procedure_id: Uuid) -> Option<FailoverProcedure> {
        self.registry.procedure_snapshot(procedure_id).await
    }

    /// Register an observer for engine events
    pub fn subscribe(&self, sink: Arc<dyn NotificationSink>) {
        self.bus.subscribe(sink);
    }

    /// Register a closure observer for engine events
    pub fn subscribe_fn<F>(&self, observer: F)
    where
        F: Fn(&RecoveryEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe_fn(observer);
    }

    /// Bind an action implementation for a step kind
    pub fn register_action(&self, kind: StepActionKind, action: Arc<dyn StepAction>) {
        self.actions.register(kind, action);
    }

    /// The engine's plan registry
    pub fn registry(&self) -> &Arc<PlanRegistry> {
        &self.registry
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the engine counters
    pub fn metrics(&self) -> EngineMetrics {
        *self.metrics.read()
    }

    fn record_execution(&self, outcome: &RecoveryResult<StepResult>) {
        let mut metrics = self.metrics.write();
        match outcome {
            Ok(result) => {
                metrics.steps_executed += 1 + result.chained.len() as u64;
            }
            Err(RecoveryError::ActionFailed { .. }) => {
                metrics.steps_executed += 1;
                metrics.step_failures += 1;
            }
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn backup(id: &str) -> BackupDescriptor {
        BackupDescriptor {
            id: id.to_string(),
            created_at: Utc::now() - Duration::hours(1),
            integrity: 0.99,
            is_complete: true,
            accessible: true,
            checksum_valid: true,
            size_bytes: 1_024,
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = RecoveryEngine::new(EngineConfig::default());
        assert!(engine.is_ok());
    }

    #[test]
    fn test_independent_engines_share_nothing() {
        let first = RecoveryEngine::new(EngineConfig::default()).unwrap();
        let second = RecoveryEngine::new(EngineConfig::default()).unwrap();

        first
            .point_in_time_recovery(Utc::now(), &[backup("bk-a")])
            .unwrap();

        assert_eq!(first.registry().plan_count(), 1);
        assert_eq!(second.registry().plan_count(), 0);
    }

    #[tokio::test]
    async fn test_metrics_advance() {
        let engine = RecoveryEngine::new(EngineConfig::default()).unwrap();

        engine.analyze_backup_fitness(&backup("bk-m")).unwrap();
        engine
            .select_best_backup(&[backup("bk-m")], &SelectionCriteria::default())
            .unwrap();
        let plan = engine
            .point_in_time_recovery(Utc::now(), &[backup("bk-m")])
            .unwrap();
        engine.set_auto_progress(plan.id, true).await.unwrap();
        engine.execute_recovery_step(plan.id, 1).await.unwrap();

        let metrics = engine.metrics();
        assert_eq!(metrics.fitness_reports, 1);
        assert_eq!(metrics.selections, 1);
        assert_eq!(metrics.plans_created, 1);
        assert_eq!(metrics.steps_executed, 5);
        assert_eq!(metrics.step_failures, 0);
    }

    #[tokio::test]
    async fn test_set_auto_progress_on_unknown_plan() {
        let engine = RecoveryEngine::new(EngineConfig::default()).unwrap();
        let error = engine
            .set_auto_progress(Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(error, RecoveryError::PlanNotFound { .. }));
    }

    #[tokio::test]
    async fn test_plan_snapshot_accessor() {
        let engine = RecoveryEngine::new(EngineConfig::default()).unwrap();
        let plan = engine
            .point_in_time_recovery(Utc::now(), &[backup("bk-snap")])
            .unwrap();

        let snapshot = engine.plan(plan.id).await.unwrap();
        assert_eq!(snapshot.id, plan.id);
        assert!(engine.plan(Uuid::new_v4()).await.is_none());
    }
}
