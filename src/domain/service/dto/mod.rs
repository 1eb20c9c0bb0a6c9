//! Read-side views of orchestrated services

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::client::orchestration::{ServiceDescriptor, TaskDescriptor};

/// Row of the service listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummaryDto {
    pub id: String,
    pub name: String,
    pub image: String,
    pub mode: String,
    /// `None` for global services
    pub replicas: Option<u64>,
    pub stack: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ServiceDescriptor> for ServiceSummaryDto {
    fn from(svc: &ServiceDescriptor) -> Self {
        Self {
            id: svc.id.clone(),
            name: svc.name().to_string(),
            image: svc.image().to_string(),
            mode: svc.mode().to_string(),
            replicas: svc.replicas(),
            stack: svc.stack().map(str::to_string),
            updated_at: svc.updated_at,
        }
    }
}

/// Network a service is attached to, with the virtual IP it holds there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceNetworkDto {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDetailDto {
    pub service: ServiceDescriptor,
    pub networks: Vec<ServiceNetworkDto>,
    /// `docker service create` line reproducing the spec
    pub command: String,
    pub tasks: Vec<TaskDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceLogsDto {
    pub service: String,
    pub line: usize,
    pub timestamps: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatsDto {
    pub service: ServiceDescriptor,
    pub tasks: Vec<TaskDescriptor>,
    /// Canonical observation window, e.g. `1h`
    pub time: String,
    pub refresh: bool,
    pub metrics_enabled: bool,
}
