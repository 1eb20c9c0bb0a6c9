use std::collections::VecDeque;

use serde::Serialize;

use crate::domain::service::model::AuditEvent;

/// Bounded ring of recent audit events, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRuntimeState {
    pub events: VecDeque<AuditEvent>,
    #[serde(skip)]
    capacity: usize,
}

impl AuditRuntimeState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, event: AuditEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Newest `limit` events, still oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Newest `limit` events about `subject`, still oldest first.
    pub fn for_subject(&self, subject: &str, limit: usize) -> Vec<AuditEvent> {
        let mut matching: Vec<AuditEvent> = self
            .events
            .iter()
            .rev()
            .filter(|e| e.subject == subject)
            .take(limit)
            .cloned()
            .collect();
        matching.reverse();
        matching
    }
}
