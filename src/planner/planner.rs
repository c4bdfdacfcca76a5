//! Recovery plan builders
//!
//! Pure, synchronous plan construction: bracketing search for point-in-time
//! recovery, per-item step expansion for selective restores, and fixed
//! scenario templates sized by the optimization advisor. Every builder
//! registers its plan and publishes the matching creation event.

use crate::backup::BackupDescriptor;
use crate::error::{RecoveryError, RecoveryResult};
use crate::notify::{NotificationBus, RecoveryEvent};
use crate::optimizer::{OptimizationAdvisor, ResourceProfile};
use crate::planner::types::{
    PlanStatus, PlanType, RecoveryPlan, RecoveryStep, SelectiveCriteria, StepActionKind,
};
use crate::registry::PlanRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Flat per-step estimate applied to every plan projection
pub(crate) const STEP_DURATION_MINUTES: u64 = 5;

/// Restore scenario for optimized plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestoreScenario {
    /// Restore everything
    Full,
    /// Restore a chosen portion
    Partial,
    /// Replay increments over an existing baseline
    Incremental,
}

impl RestoreScenario {
    fn plan_type(&self) -> PlanType {
        match self {
            RestoreScenario::Full => PlanType::FullRestore,
            RestoreScenario::Partial => PlanType::PartialRestore,
            RestoreScenario::Incremental => PlanType::IncrementalRestore,
        }
    }
}

/// Builds recovery plans and registers them with the plan registry
pub struct RecoveryPlanner {
    registry: Arc<PlanRegistry>,
    bus: Arc<NotificationBus>,
    advisor: OptimizationAdvisor,
}

impl RecoveryPlanner {
    /// Create a planner over an injected registry and bus
    pub fn new(registry: Arc<PlanRegistry>, bus: Arc<NotificationBus>) -> Self {
        Self {
            registry,
            bus,
            advisor: OptimizationAdvisor::new(),
        }
    }

    pub(crate) fn registry(&self) -> &Arc<PlanRegistry> {
        &self.registry
    }

    pub(crate) fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Build a point-in-time recovery plan by bracketing the backup timeline
    ///
    /// `before` is the latest backup at or before the target instant and
    /// `after` the earliest at or after it. The plan restores from `before`
    /// when one exists, falling back to `after`; the alternative prefers
    /// `after`, falling back to `before`.
    pub fn point_in_time_recovery(
        &self,
        target_time: DateTime<Utc>,
        backups: &[BackupDescriptor],
    ) -> RecoveryResult<RecoveryPlan> {
        if backups.is_empty() {
            return Err(RecoveryError::Validation {
                reason: "no backups supplied for point-in-time recovery".to_string(),
            });
        }
        for backup in backups {
            backup.validate()?;
        }

        let before = backups
            .iter()
            .filter(|backup| backup.created_at <= target_time)
            .max_by_key(|backup| backup.created_at);
        let after = backups
            .iter()
            .filter(|backup| backup.created_at >= target_time)
            .min_by_key(|backup| backup.created_at);

        let selected_backup = before.or(after).cloned();
        let alternative_backup = after.or(before).cloned();

        let steps = vec![
            RecoveryStep::pending(
                1,
                "Validation",
                "Validate backup fitness and recovery prerequisites",
                StepActionKind::Validation,
            ),
            RecoveryStep::pending(
                2,
                "Preparation",
                "Stage resources and quiesce the recovery target",
                StepActionKind::Preparation,
            ),
            RecoveryStep::pending(
                3,
                "Restoration",
                "Restore data from the selected backup",
                StepActionKind::Restoration,
            ),
            RecoveryStep::pending(
                4,
                "Verification",
                "Verify restored data against the target instant",
                StepActionKind::Verification,
            ),
            RecoveryStep::pending(
                5,
                "Cutover",
                "Switch traffic to the recovered target",
                StepActionKind::Cutover,
            ),
        ];

        let plan = RecoveryPlan {
            id: Uuid::new_v4(),
            plan_type: PlanType::PointInTime,
            status: PlanStatus::Ready,
            created_at: Utc::now(),
            estimated_recovery_minutes: steps.len() as u64 * STEP_DURATION_MINUTES,
            steps,
            optimization: None,
            resource_requirements: Vec::new(),
            risk_factors: Vec::new(),
            auto_progress: false,
            selected_backup,
            alternative_backup,
            data_to_restore: None,
        };

        info!(plan_id = %plan.id, target = %target_time, "built point-in-time recovery plan");
        self.registry.insert_plan(plan.clone())?;
        self.bus.publish(&RecoveryEvent::PlanCreated(plan.clone()));
        Ok(plan)
    }

    /// Build a selective-restore plan for named subsets of one backup
    ///
    /// Steps expand to one restore per entry of the union of collections and
    /// tables (first occurrence wins), framed by an analysis step and a
    /// trailing verification step. The criteria are recorded verbatim.
    pub fn selective_restore(
        &self,
        backup: &BackupDescriptor,
        criteria: SelectiveCriteria,
    ) -> RecoveryResult<RecoveryPlan> {
        backup.validate()?;

        let mut items: Vec<String> = Vec::new();
        for item in criteria.collections.iter().chain(criteria.tables.iter()) {
            if !items.contains(item) {
                items.push(item.clone());
            }
        }

        let mut steps = vec![RecoveryStep::pending(
            1,
            "Analysis",
            "Determine the scope of data to restore",
            StepActionKind::Analysis,
        )];
        for (index, item) in items.iter().enumerate() {
            steps.push(RecoveryStep::pending(
                index as u32 + 2,
                &format!("Restore {item}"),
                &format!("Restore {item} from backup {}", backup.id),
                StepActionKind::RestoreItem,
            ));
        }
        steps.push(RecoveryStep::pending(
            items.len() as u32 + 2,
            "Verification",
            "Verify the restored subsets",
            StepActionKind::Verification,
        ));

        let plan = RecoveryPlan {
            id: Uuid::new_v4(),
            plan_type: PlanType::Selective,
            status: PlanStatus::Ready,
            created_at: Utc::now(),
            estimated_recovery_minutes: steps.len() as u64 * STEP_DURATION_MINUTES,
            steps,
            optimization: None,
            resource_requirements: Vec::new(),
            risk_factors: Vec::new(),
            auto_progress: false,
            selected_backup: Some(backup.clone()),
            alternative_backup: None,
            data_to_restore: Some(criteria),
        };

        info!(
            plan_id = %plan.id,
            backup_id = %backup.id,
            items = items.len(),
            "built selective restore plan"
        );
        self.registry.insert_plan(plan.clone())?;
        self.bus
            .publish(&RecoveryEvent::SelectivePlanCreated(plan.clone()));
        Ok(plan)
    }

    /// Build a scenario-optimized plan sized by the optimization advisor
    ///
    /// Step templates are fixed per scenario; resource requirements and risk
    /// factors are qualitative heuristics, not measurements.
    pub fn generate_optimized_recovery_plan(
        &self,
        scenario: RestoreScenario,
        resources: &ResourceProfile,
    ) -> RecoveryResult<RecoveryPlan> {
        let optimization = self.advisor.compute(resources);

        let steps: Vec<RecoveryStep> = match scenario {
            RestoreScenario::Full => vec![
                ("Infrastructure Validation", StepActionKind::Validation),
                ("Data Preparation", StepActionKind::Preparation),
                ("Full Data Restoration", StepActionKind::Restoration),
                ("Integrity Verification", StepActionKind::Verification),
                ("Service Cutover", StepActionKind::Cutover),
            ],
            RestoreScenario::Partial => vec![
                ("Scope Analysis", StepActionKind::Analysis),
                ("Partial Data Restoration", StepActionKind::Restoration),
                ("Integrity Verification", StepActionKind::Verification),
            ],
            RestoreScenario::Incremental => vec![
                ("Baseline Validation", StepActionKind::Validation),
                ("Incremental Replay", StepActionKind::Restoration),
                ("Integrity Verification", StepActionKind::Verification),
            ],
        }
        .into_iter()
        .enumerate()
        .map(|(index, (name, action))| {
            RecoveryStep::pending(index as u32 + 1, name, name, action)
        })
        .collect();

        let resource_requirements = match scenario {
            RestoreScenario::Full => vec![
                "Standby compute capacity for parallel restore workers".to_string(),
                "Staging storage at least the size of the full backup".to_string(),
                "Dedicated recovery bandwidth for bulk transfer".to_string(),
            ],
            RestoreScenario::Partial => vec![
                "Compute capacity proportional to the restored subset".to_string(),
                "Staging storage for the selected portion".to_string(),
            ],
            RestoreScenario::Incremental => vec![
                "A verified baseline restore to replay increments onto".to_string(),
                "Low-latency access to the increment chain".to_string(),
            ],
        };
        let risk_factors = vec![
            "Data consistency during restoration".to_string(),
            "Downtime impact on dependent services".to_string(),
            "Bandwidth constraints on transfer throughput".to_string(),
        ];

        let plan = RecoveryPlan {
            id: Uuid::new_v4(),
            plan_type: scenario.plan_type(),
            status: PlanStatus::Ready,
            created_at: Utc::now(),
            estimated_recovery_minutes: steps.len() as u64 * STEP_DURATION_MINUTES,
            steps,
            optimization: Some(optimization),
            resource_requirements,
            risk_factors,
            auto_progress: false,
            selected_backup: None,
            alternative_backup: None,
            data_to_restore: None,
        };

        info!(plan_id = %plan.id, ?scenario, "generated optimized recovery plan");
        self.registry.insert_plan(plan.clone())?;
        self.bus
            .publish(&RecoveryEvent::OptimizedPlanGenerated(plan.clone()));
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::types::StepStatus;
    use chrono::Duration;

    fn planner() -> (RecoveryPlanner, Arc<PlanRegistry>, Arc<NotificationBus>) {
        let registry = Arc::new(PlanRegistry::new());
        let bus = Arc::new(NotificationBus::new());
        (
            RecoveryPlanner::new(Arc::clone(&registry), Arc::clone(&bus)),
            registry,
            bus,
        )
    }

    fn backup(id: &str, created_at: DateTime<Utc>) -> BackupDescriptor {
        BackupDescriptor {
            id: id.to_string(),
            created_at,
            integrity: 0.99,
            is_complete: true,
            accessible: true,
            checksum_valid: true,
            size_bytes: 8_192,
        }
    }

    #[test]
    fn test_point_in_time_brackets_the_target() {
        let (planner, _, _) = planner();
        let target = Utc::now();
        let backups = vec![
            backup("bk-2d-before", target - Duration::days(2)),
            backup("bk-1d-before", target - Duration::days(1)),
            backup("bk-1d-after", target + Duration::days(1)),
        ];

        let plan = planner.point_in_time_recovery(target, &backups).unwrap();

        assert_eq!(plan.selected_backup.unwrap().id, "bk-1d-before");
        assert_eq!(plan.alternative_backup.unwrap().id, "bk-1d-after");
    }

    #[test]
    fn test_point_in_time_with_only_later_backups() {
        let (planner, _, _) = planner();
        let target = Utc::now();
        let backups = vec![
            backup("bk-3h-after", target + Duration::hours(3)),
            backup("bk-1h-after", target + Duration::hours(1)),
        ];

        let plan = planner.point_in_time_recovery(target, &backups).unwrap();

        // No backup precedes the target, so both references fall back to the
        // earliest one after it.
        assert_eq!(plan.selected_backup.unwrap().id, "bk-1h-after");
        assert_eq!(plan.alternative_backup.unwrap().id, "bk-1h-after");
    }

    #[test]
    fn test_point_in_time_with_only_earlier_backups() {
        let (planner, _, _) = planner();
        let target = Utc::now();
        let backups = vec![
            backup("bk-2h-before", target - Duration::hours(2)),
            backup("bk-5h-before", target - Duration::hours(5)),
        ];

        let plan = planner.point_in_time_recovery(target, &backups).unwrap();

        assert_eq!(plan.selected_backup.unwrap().id, "bk-2h-before");
        assert_eq!(plan.alternative_backup.unwrap().id, "bk-2h-before");
    }

    #[test]
    fn test_point_in_time_template_shape() {
        let (planner, registry, _) = planner();
        let target = Utc::now();
        let plan = planner
            .point_in_time_recovery(target, &[backup("bk-a", target)])
            .unwrap();

        assert_eq!(plan.plan_type, PlanType::PointInTime);
        assert_eq!(plan.steps.len(), 5);
        let orders: Vec<u32> = plan.steps.iter().map(|step| step.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert!(plan
            .steps
            .iter()
            .all(|step| step.status == StepStatus::Pending));
        let names: Vec<&str> = plan.steps.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Validation",
                "Preparation",
                "Restoration",
                "Verification",
                "Cutover"
            ]
        );
        assert_eq!(plan.estimated_recovery_minutes, 25);
        assert_eq!(registry.plan_count(), 1);
    }

    #[test]
    fn test_point_in_time_rejects_empty_timeline() {
        let (planner, _, _) = planner();
        let error = planner
            .point_in_time_recovery(Utc::now(), &[])
            .unwrap_err();
        assert!(matches!(error, RecoveryError::Validation { .. }));
    }

    #[test]
    fn test_point_in_time_emits_plan_created() {
        let (planner, _, bus) = planner();
        let topics = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&topics);
        bus.subscribe_fn(move |event| sink.lock().push(event.topic()));

        let target = Utc::now();
        planner
            .point_in_time_recovery(target, &[backup("bk-a", target)])
            .unwrap();

        assert_eq!(*topics.lock(), vec!["plan-created"]);
    }

    #[test]
    fn test_selective_restore_step_expansion() {
        let (planner, _, _) = planner();
        let criteria = SelectiveCriteria {
            collections: vec!["A".to_string(), "B".to_string()],
            tables: Vec::new(),
            date_range: None,
            exclude_patterns: Vec::new(),
        };

        let plan = planner
            .selective_restore(&backup("bk-sel", Utc::now()), criteria.clone())
            .unwrap();

        let names: Vec<&str> = plan.steps.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(names, vec!["Analysis", "Restore A", "Restore B", "Verification"]);
        let orders: Vec<u32> = plan.steps.iter().map(|step| step.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(plan.estimated_recovery_minutes, 20);
        assert_eq!(plan.data_to_restore, Some(criteria));
    }

    #[test]
    fn test_selective_restore_unions_collections_and_tables() {
        let (planner, _, _) = planner();
        let criteria = SelectiveCriteria {
            collections: vec!["orders".to_string()],
            tables: vec!["orders".to_string(), "users".to_string()],
            date_range: None,
            exclude_patterns: Vec::new(),
        };

        let plan = planner
            .selective_restore(&backup("bk-union", Utc::now()), criteria)
            .unwrap();

        let names: Vec<&str> = plan.steps.iter().map(|step| step.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Analysis", "Restore orders", "Restore users", "Verification"]
        );
    }

    #[test]
    fn test_selective_restore_emits_its_own_topic() {
        let (planner, _, bus) = planner();
        let topics = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&topics);
        bus.subscribe_fn(move |event| sink.lock().push(event.topic()));

        planner
            .selective_restore(&backup("bk-sel", Utc::now()), SelectiveCriteria::default())
            .unwrap();

        assert_eq!(*topics.lock(), vec!["selective-plan-created"]);
    }

    #[test]
    fn test_optimized_plan_step_counts() {
        let (planner, _, _) = planner();
        let resources = ResourceProfile {
            cpu_cores: 8,
            bandwidth_mbps: 1_000,
        };

        let full = planner
            .generate_optimized_recovery_plan(RestoreScenario::Full, &resources)
            .unwrap();
        assert_eq!(full.plan_type, PlanType::FullRestore);
        assert_eq!(full.steps.len(), 5);
        assert_eq!(full.estimated_recovery_minutes, 25);

        let partial = planner
            .generate_optimized_recovery_plan(RestoreScenario::Partial, &resources)
            .unwrap();
        assert_eq!(partial.plan_type, PlanType::PartialRestore);
        assert_eq!(partial.steps.len(), 3);

        let incremental = planner
            .generate_optimized_recovery_plan(RestoreScenario::Incremental, &resources)
            .unwrap();
        assert_eq!(incremental.plan_type, PlanType::IncrementalRestore);
        assert_eq!(incremental.steps.len(), 3);
    }

    #[test]
    fn test_optimized_plan_carries_advisor_output_and_heuristics() {
        let (planner, _, _) = planner();
        let resources = ResourceProfile {
            cpu_cores: 8,
            bandwidth_mbps: 1_000,
        };

        let plan = planner
            .generate_optimized_recovery_plan(RestoreScenario::Full, &resources)
            .unwrap();

        let optimization = plan.optimization.unwrap();
        assert_eq!(optimization.parallelization.degree, 4);
        assert_eq!(optimization.bandwidth_allocation.recovery_mbps, 700);
        assert!(!plan.resource_requirements.is_empty());
        assert!(plan
            .risk_factors
            .iter()
            .any(|risk| risk.contains("Data consistency")));
    }

    #[test]
    fn test_optimized_plan_emits_its_own_topic() {
        let (planner, _, bus) = planner();
        let topics = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&topics);
        bus.subscribe_fn(move |event| sink.lock().push(event.topic()));

        planner
            .generate_optimized_recovery_plan(
                RestoreScenario::Partial,
                &ResourceProfile {
                    cpu_cores: 2,
                    bandwidth_mbps: 100,
                },
            )
            .unwrap();

        assert_eq!(*topics.lock(), vec!["optimized-plan-generated"]);
    }
}
