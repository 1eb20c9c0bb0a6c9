use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::auth::{AllowAll, Authorizer};
use crate::config::AppConfig;
use crate::core::client::docker_swarm_client::{DockerEndpoint, DockerSwarmClient};
use crate::core::client::http_client::build_http_client;
use crate::core::client::metrics_backend::MetricsBackend;
use crate::core::client::orchestration::OrchestrationClient;
use crate::core::client::prometheus_client::PrometheusClient;
use crate::core::persistence::registry::registry_repository::RegistryRepository;
use crate::core::persistence::registry::registry_repository_trait::RegistryApiRepository;
use crate::core::state::runtime::audit::audit_sink::{
    AuditSink, FanoutAuditSink, MemoryAuditSink, TracingAuditSink,
};
use crate::domain::metric::service::service_metrics_service::ServiceMetricsService;
use crate::domain::service::service::service_control_coordinator::ServiceControlCoordinator;
use crate::domain::service::service::service_query_service::ServiceQueryService;

/// Collaborators the application is assembled from.
pub struct Collaborators {
    pub orchestrator: Arc<dyn OrchestrationClient>,
    pub registries: Arc<dyn RegistryApiRepository>,
    pub metrics: Option<Arc<dyn MetricsBackend>>,
    pub authorizer: Arc<dyn Authorizer>,
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ServiceControlCoordinator>,
    pub query_service: Arc<ServiceQueryService>,
    pub metrics_service: Arc<ServiceMetricsService>,
    pub audit_log: MemoryAuditSink,
    pub registries: Arc<dyn RegistryApiRepository>,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(collaborators: Collaborators, page_size: usize, audit_capacity: usize) -> Self {
        let Collaborators {
            orchestrator,
            registries,
            metrics,
            authorizer,
        } = collaborators;

        let audit_log = MemoryAuditSink::new(audit_capacity);
        let audit: Arc<dyn AuditSink> = Arc::new(FanoutAuditSink::new(vec![
            Arc::new(TracingAuditSink),
            Arc::new(audit_log.clone()),
        ]));

        let metrics_enabled = metrics.is_some();

        Self {
            coordinator: Arc::new(ServiceControlCoordinator::new(
                orchestrator.clone(),
                registries.clone(),
                audit,
            )),
            query_service: Arc::new(ServiceQueryService::new(orchestrator, page_size, metrics_enabled)),
            metrics_service: Arc::new(ServiceMetricsService::new(metrics)),
            audit_log,
            registries,
            authorizer,
        }
    }
}

/// Wires the Docker Engine, Prometheus and registry-file adapters from config.
pub fn build_app_state(config: &AppConfig) -> Result<AppState> {
    let http = build_http_client()?;

    let endpoint = DockerEndpoint::parse(config.docker_host.as_deref())?;
    let orchestrator: Arc<dyn OrchestrationClient> =
        Arc::new(DockerSwarmClient::connect(&endpoint, config.docker_timeout_secs)?);
    info!("Docker engine at {:?}", endpoint);

    let metrics: Option<Arc<dyn MetricsBackend>> = match &config.prometheus_url {
        Some(url) => {
            info!("Metrics backend at {}", url);
            Some(Arc::new(PrometheusClient::new(http, url)))
        }
        None => {
            info!("No metrics backend configured; service charts disabled");
            None
        }
    };

    let collaborators = Collaborators {
        orchestrator,
        registries: Arc::new(RegistryRepository::new(config.registry_file())),
        metrics,
        authorizer: Arc::new(AllowAll),
    };

    Ok(AppState::new(collaborators, config.page_size, config.audit_capacity))
}
