use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutating operations the coordinator drives against the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Create,
    Update,
    Scale,
    Rollback,
    Delete,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Create => "create",
            LifecycleAction::Update => "update",
            LifecycleAction::Scale => "scale",
            LifecycleAction::Rollback => "rollback",
            LifecycleAction::Delete => "delete",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record per successfully completed lifecycle operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub action: LifecycleAction,
    /// Service name the action applied to
    pub subject: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: LifecycleAction, subject: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            subject: subject.into(),
            actor: actor.into(),
            timestamp: Utc::now(),
        }
    }
}
