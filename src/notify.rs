//! In-process notification bus
//!
//! Synchronous, best-effort fan-out of engine events to registered
//! observers. Publication is side-effect only: subscriber behavior never
//! gates plan building or step completion.

use crate::planner::{FailoverProcedure, RecoveryPlan, RecoveryStep};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// An event published by the engine
#[derive(Debug, Clone, Serialize)]
pub enum RecoveryEvent {
    /// A point-in-time plan was built and registered
    PlanCreated(RecoveryPlan),
    /// A selective-restore plan was built and registered
    SelectivePlanCreated(RecoveryPlan),
    /// A scenario-optimized plan was built and registered
    OptimizedPlanGenerated(RecoveryPlan),
    /// A step reached Completed
    StepCompleted {
        /// Owning plan or failover procedure
        plan_id: Uuid,
        /// Snapshot of the completed step
        step: RecoveryStep,
    },
    /// A failover procedure was constructed, before any step ran
    FailoverInitiated(FailoverProcedure),
}

impl RecoveryEvent {
    /// Topic string for the event
    pub fn topic(&self) -> &'static str {
        match self {
            RecoveryEvent::PlanCreated(_) => "plan-created",
            RecoveryEvent::SelectivePlanCreated(_) => "selective-plan-created",
            RecoveryEvent::OptimizedPlanGenerated(_) => "optimized-plan-generated",
            RecoveryEvent::StepCompleted { .. } => "step-completed",
            RecoveryEvent::FailoverInitiated(_) => "failover-initiated",
        }
    }
}

/// Observer of engine events
pub trait NotificationSink: Send + Sync {
    /// Receive one event; called synchronously at emission time
    fn notify(&self, event: &RecoveryEvent);
}

impl<F> NotificationSink for F
where
    F: Fn(&RecoveryEvent) + Send + Sync,
{
    fn notify(&self, event: &RecoveryEvent) {
        self(event);
    }
}

/// Synchronous in-process publish/subscribe bus
#[derive(Default)]
pub struct NotificationBus {
    sinks: RwLock<Vec<Arc<dyn NotificationSink>>>,
}

impl NotificationBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&self, sink: Arc<dyn NotificationSink>) {
        self.sinks.write().push(sink);
    }

    /// Register a closure observer
    pub fn subscribe_fn<F>(&self, observer: F)
    where
        F: Fn(&RecoveryEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(observer));
    }

    /// Fan one event out to every observer
    ///
    /// The subscriber list is snapshotted first so observers may subscribe
    /// from within a callback without deadlocking.
    pub fn publish(&self, event: &RecoveryEvent) {
        let sinks: Vec<Arc<dyn NotificationSink>> = self.sinks.read().clone();
        debug!(topic = event.topic(), subscribers = sinks.len(), "publishing event");
        for sink in sinks {
            sink.notify(event);
        }
    }

    /// Number of registered observers
    pub fn subscriber_count(&self) -> usize {
        self.sinks.read().len()
    }
}
