//! Pluggable step actions
//!
//! The engine decides what to do and tracks whether each step has happened;
//! the underlying work (restore I/O, routing changes, verification probes)
//! belongs to an external executor plugged in through the [`StepAction`]
//! trait. Actions are resolved through a typed registry keyed by
//! [`StepActionKind`], never by bare strings.

use crate::error::{RecoveryError, RecoveryResult};
use crate::planner::{RecoveryStep, StepActionKind};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// A unit of work bound to a step, possibly suspending on external I/O
#[async_trait]
pub trait StepAction: Send + Sync {
    /// Perform the work for one step and return its opaque result
    async fn execute(&self, step: &RecoveryStep) -> RecoveryResult<serde_json::Value>;
}

/// Default action that acknowledges a step without performing I/O
///
/// Stands in wherever no external executor has been registered, keeping the
/// state machine drivable end to end.
struct AcknowledgeAction;

#[async_trait]
impl StepAction for AcknowledgeAction {
    async fn execute(&self, step: &RecoveryStep) -> RecoveryResult<serde_json::Value> {
        debug!(step = %step.name, action = step.action.as_str(), "acknowledging step");
        Ok(json!({
            "acknowledged": true,
            "action": step.action.as_str(),
            "step": step.name,
        }))
    }
}

/// Typed registry resolving an action implementation per [`StepActionKind`]
pub struct ActionRegistry {
    actions: DashMap<StepActionKind, Arc<dyn StepAction>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
        }
    }

    /// Create a registry with the acknowledge-only default bound to every kind
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        let default: Arc<dyn StepAction> = Arc::new(AcknowledgeAction);
        for kind in [
            StepActionKind::Validation,
            StepActionKind::Preparation,
            StepActionKind::Restoration,
            StepActionKind::Verification,
            StepActionKind::Cutover,
            StepActionKind::Analysis,
            StepActionKind::RestoreItem,
            StepActionKind::RoutingSwitch,
            StepActionKind::ConnectivityCheck,
        ] {
            registry.actions.insert(kind, Arc::clone(&default));
        }
        registry
    }

    /// Bind an action implementation to a kind, replacing any existing one
    pub fn register(&self, kind: StepActionKind, action: Arc<dyn StepAction>) {
        self.actions.insert(kind, action);
    }

    /// Resolve the action bound to a kind
    pub fn resolve(&self, kind: StepActionKind) -> RecoveryResult<Arc<dyn StepAction>> {
        self.actions
            .get(&kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RecoveryError::ActionNotRegistered {
                action: kind.as_str().to_string(),
            })
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(kind: StepActionKind) -> RecoveryStep {
        RecoveryStep::pending(1, "Validation", "Validate prerequisites", kind)
    }

    #[tokio::test]
    async fn test_defaults_cover_every_kind() {
        let registry = ActionRegistry::with_defaults();
        for kind in [
            StepActionKind::Validation,
            StepActionKind::Preparation,
            StepActionKind::Restoration,
            StepActionKind::Verification,
            StepActionKind::Cutover,
            StepActionKind::Analysis,
            StepActionKind::RestoreItem,
            StepActionKind::RoutingSwitch,
            StepActionKind::ConnectivityCheck,
        ] {
            let action = registry.resolve(kind).unwrap();
            let result = action.execute(&step(kind)).await.unwrap();
            assert_eq!(result["acknowledged"], true);
            assert_eq!(result["action"], kind.as_str());
        }
    }

    #[tokio::test]
    async fn test_empty_registry_reports_unregistered_action() {
        let registry = ActionRegistry::new();
        let error = match registry.resolve(StepActionKind::Cutover) {
            Err(error) => error,
            Ok(_) => panic!("expected resolve to fail for an unregistered action"),
        };
        assert!(matches!(error, RecoveryError::ActionNotRegistered { .. }));
        assert!(error.to_string().contains("cutover"));
    }

    #[tokio::test]
    async fn test_registered_action_replaces_default() {
        struct CountingAction;

        #[async_trait]
        impl StepAction for CountingAction {
            async fn execute(&self, _step: &RecoveryStep) -> RecoveryResult<serde_json::Value> {
                Ok(json!({ "restored_items": 42 }))
            }
        }

        let registry = ActionRegistry::with_defaults();
        registry.register(StepActionKind::RestoreItem, Arc::new(CountingAction));

        let action = registry.resolve(StepActionKind::RestoreItem).unwrap();
        let result = action
            .execute(&step(StepActionKind::RestoreItem))
            .await
            .unwrap();
        assert_eq!(result["restored_items"], 42);
    }
}
