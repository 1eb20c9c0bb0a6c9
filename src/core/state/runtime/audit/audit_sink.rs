use std::sync::{Arc, Mutex};

use tracing::info;

use crate::core::state::runtime::audit::audit_runtime_state::AuditRuntimeState;
use crate::domain::service::model::AuditEvent;

/// Append-only destination for audit events.
///
/// Fire-and-forget: failures stay inside the sink and never reach the
/// operation that produced the event.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Writes each event as a structured log line on the `audit` target.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        info!(
            target: "audit",
            id = %event.id,
            action = %event.action,
            subject = %event.subject,
            actor = %event.actor,
            timestamp = %event.timestamp.to_rfc3339(),
            "service {} {}",
            event.subject,
            event.action
        );
    }
}

/// Keeps the most recent events in memory for the events endpoint.
#[derive(Clone)]
pub struct MemoryAuditSink {
    state: Arc<Mutex<AuditRuntimeState>>,
}

impl MemoryAuditSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(AuditRuntimeState::with_capacity(capacity))),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut AuditRuntimeState) -> T) -> T {
        // A panic while holding the lock cannot leave the ring inconsistent.
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard)
    }

    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        self.with_state(|s| s.recent(limit))
    }

    pub fn for_subject(&self, subject: &str, limit: usize) -> Vec<AuditEvent> {
        self.with_state(|s| s.for_subject(subject, limit))
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.with_state(|s| s.push(event.clone()));
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for FanoutAuditSink {
    fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
