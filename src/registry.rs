//! In-memory plan registry
//!
//! Explicitly owned, injected store for recovery plans and failover
//! procedures. Entries are appended at planning time and mutated in place by
//! the executor; the engine never deletes them. Each entry carries its own
//! async mutex so the executor can hold a single-writer lock across a step
//! action plus its auto-progression chain.

use crate::error::{RecoveryError, RecoveryResult};
use crate::planner::{FailoverProcedure, RecoveryPlan};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Append-only store of registered plans and failover procedures
#[derive(Default)]
pub struct PlanRegistry {
    plans: DashMap<Uuid, Arc<Mutex<RecoveryPlan>>>,
    procedures: DashMap<Uuid, Arc<Mutex<FailoverProcedure>>>,
}

impl PlanRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly built plan
    ///
    /// Plan ids are generated v4 UUIDs, so a collision indicates a caller
    /// registering the same plan twice.
    pub fn insert_plan(&self, plan: RecoveryPlan) -> RecoveryResult<()> {
        let id = plan.id;
        if self.plans.contains_key(&id) {
            return Err(RecoveryError::Configuration {
                message: format!("plan {id} is already registered"),
            });
        }
        self.plans.insert(id, Arc::new(Mutex::new(plan)));
        Ok(())
    }

    /// Register a newly built failover procedure
    pub fn insert_procedure(&self, procedure: FailoverProcedure) -> RecoveryResult<()> {
        let id = procedure.id;
        if self.procedures.contains_key(&id) {
            return Err(RecoveryError::Configuration {
                message: format!("failover procedure {id} is already registered"),
            });
        }
        self.procedures.insert(id, Arc::new(Mutex::new(procedure)));
        Ok(())
    }

    /// Handle to a registered plan
    pub fn plan(&self, plan_id: Uuid) -> Option<Arc<Mutex<RecoveryPlan>>> {
        self.plans.get(&plan_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Handle to a registered failover procedure
    pub fn procedure(&self, procedure_id: Uuid) -> Option<Arc<Mutex<FailoverProcedure>>> {
        self.procedures
            .get(&procedure_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Cloned snapshot of a registered plan
    pub async fn plan_snapshot(&self, plan_id: Uuid) -> Option<RecoveryPlan> {
        match self.plan(plan_id) {
            Some(plan) => Some(plan.lock().await.clone()),
            None => None,
        }
    }

    /// Cloned snapshot of a registered failover procedure
    pub async fn procedure_snapshot(&self, procedure_id: Uuid) -> Option<FailoverProcedure> {
        match self.procedure(procedure_id) {
            Some(procedure) => Some(procedure.lock().await.clone()),
            None => None,
        }
    }

    /// Number of registered plans
    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    /// Number of registered failover procedures
    pub fn procedure_count(&self) -> usize {
        self.procedures.len()
    }
}
