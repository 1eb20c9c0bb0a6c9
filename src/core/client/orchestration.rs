use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::service::model::ServiceSpec;

/// Opaque RPC facade over the orchestration control plane.
///
/// Every call may block on the network; timeouts and retries are the
/// implementation's concern, never the caller's.
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Returns the typed descriptor together with the untouched response body.
    async fn inspect_service(&self, name: &str) -> Result<(ServiceDescriptor, Vec<u8>)>;

    async fn create_service(&self, spec: &ServiceSpec) -> Result<()>;

    async fn update_service(&self, spec: &ServiceSpec) -> Result<()>;

    async fn scale_service(&self, name: &str, replicas: u64) -> Result<()>;

    /// Reverts to the previous spec revision held by the orchestrator.
    async fn rollback_service(&self, name: &str) -> Result<()>;

    async fn remove_service(&self, name: &str) -> Result<()>;

    /// Returns one page of services plus the total number matching the filter.
    async fn list_services(
        &self,
        filter: &ServiceListFilter,
    ) -> Result<(Vec<ServiceDescriptor>, usize)>;

    async fn list_tasks(&self, filter: &TaskListFilter) -> Result<(Vec<TaskDescriptor>, usize)>;

    async fn inspect_network(&self, id: &str) -> Result<NetworkDescriptor>;

    /// Last `tail` lines written by the service's tasks, split by stream.
    async fn service_logs(&self, name: &str, tail: usize, timestamps: bool) -> Result<ServiceLogs>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceListFilter {
    /// Substring/prefix match on the service name, as the engine applies it
    pub name: Option<String>,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl ServiceListFilter {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListFilter {
    pub service: Option<String>,
    pub node: Option<String>,
}

impl TaskListFilter {
    pub fn for_service(name: &str) -> Self {
        Self {
            service: Some(name.to_string()),
            node: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    #[serde(default)]
    pub index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualIp {
    #[serde(rename = "NetworkID", default)]
    pub network_id: String,
    #[serde(default)]
    pub addr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEndpoint {
    #[serde(rename = "VirtualIPs", default)]
    pub virtual_ips: Vec<VirtualIp>,
    #[serde(default)]
    pub ports: Vec<Value>,
}

/// Orchestrator view of a service. `spec` is kept as a document so
/// read-modify-write updates do not drop fields this crate does not model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDescriptor {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub version: ObjectVersion,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub spec: Value,
    pub previous_spec: Option<Value>,
    pub endpoint: Option<ServiceEndpoint>,
    pub update_status: Option<Value>,
}

impl ServiceDescriptor {
    pub fn name(&self) -> &str {
        self.spec["Name"].as_str().unwrap_or_default()
    }

    pub fn image(&self) -> &str {
        self.spec["TaskTemplate"]["ContainerSpec"]["Image"]
            .as_str()
            .unwrap_or_default()
    }

    /// `None` for global services.
    pub fn replicas(&self) -> Option<u64> {
        self.spec["Mode"]["Replicated"]["Replicas"].as_u64()
    }

    pub fn mode(&self) -> &'static str {
        if self.spec["Mode"].get("Global").is_some() {
            "global"
        } else {
            "replicated"
        }
    }

    /// Stack the service was deployed with, if any.
    pub fn stack(&self) -> Option<&str> {
        self.spec["Labels"]["com.docker.stack.namespace"].as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerStatus {
    #[serde(rename = "ContainerID", default)]
    pub container_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStatus {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub err: Option<String>,
    pub container_status: Option<ContainerStatus>,
}

/// One running (or historical) replica of a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDescriptor {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,
    #[serde(rename = "NodeID", default)]
    pub node_id: String,
    pub slot: Option<u64>,
    #[serde(default)]
    pub desired_state: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskDescriptor {
    /// Container backing this task, once the scheduler has started one.
    pub fn container_id(&self) -> Option<&str> {
        self.status
            .container_status
            .as_ref()
            .map(|c| c.container_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkDescriptor {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub scope: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceLogs {
    pub stdout: String,
    pub stderr: String,
}
