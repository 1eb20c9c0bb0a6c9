use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::api::dto::paginated_response::PaginatedResponse;
use crate::core::client::orchestration::{
    OrchestrationClient, ServiceDescriptor, ServiceListFilter, TaskDescriptor, TaskListFilter,
};
use crate::domain::metric::common::util::metric_sampling_step::{format_period, parse_period};
use crate::domain::service::dto::{
    ServiceDetailDto, ServiceLogsDto, ServiceNetworkDto, ServiceStatsDto, ServiceSummaryDto,
};
use crate::domain::service::util::service_command::service_command;
use crate::errors::{internal_error, upstream_error, AppResult};

const DEFAULT_LOG_LINES: usize = 500;

/// Read-only views over orchestrated services.
pub struct ServiceQueryService {
    orchestrator: Arc<dyn OrchestrationClient>,
    page_size: usize,
    metrics_enabled: bool,
}

impl ServiceQueryService {
    pub fn new(orchestrator: Arc<dyn OrchestrationClient>, page_size: usize, metrics_enabled: bool) -> Self {
        Self {
            orchestrator,
            page_size: page_size.max(1),
            metrics_enabled,
        }
    }

    pub async fn list(
        &self,
        name: Option<String>,
        page: Option<usize>,
    ) -> AppResult<PaginatedResponse<ServiceSummaryDto>> {
        let filter = ServiceListFilter {
            name: name.filter(|n| !n.trim().is_empty()),
            page: page.unwrap_or(1).max(1),
            page_size: self.page_size,
        };
        debug!("Listing services {:?}", filter);

        let (services, total) = self
            .orchestrator
            .list_services(&filter)
            .await
            .map_err(upstream_error)?;

        Ok(PaginatedResponse {
            items: services.iter().map(ServiceSummaryDto::from).collect(),
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn inspect_with_tasks(&self, name: &str) -> AppResult<(ServiceDescriptor, Vec<TaskDescriptor>)> {
        let (service, _) = self
            .orchestrator
            .inspect_service(name)
            .await
            .map_err(upstream_error)?;
        let (tasks, _) = self
            .orchestrator
            .list_tasks(&TaskListFilter::for_service(name))
            .await
            .map_err(upstream_error)?;

        Ok((service, tasks))
    }

    /// Service with its tasks, the networks its virtual IPs live on and the
    /// CLI line that would recreate it.
    pub async fn detail(&self, name: &str) -> AppResult<ServiceDetailDto> {
        let (service, tasks) = self.inspect_with_tasks(name).await?;

        let vips = service
            .endpoint
            .as_ref()
            .map(|e| e.virtual_ips.as_slice())
            .unwrap_or_default();
        let mut networks = Vec::with_capacity(vips.len());
        for vip in vips {
            let network = self
                .orchestrator
                .inspect_network(&vip.network_id)
                .await
                .map_err(upstream_error)?;
            networks.push(ServiceNetworkDto {
                id: vip.network_id.clone(),
                name: network.name,
                address: vip.addr.clone(),
            });
        }
        debug!("Service {} is attached to {} network(s)", name, networks.len());

        Ok(ServiceDetailDto {
            command: service_command(&service),
            service,
            networks,
            tasks,
        })
    }

    pub async fn logs(&self, name: &str, line: Option<usize>, timestamps: Option<bool>) -> AppResult<ServiceLogsDto> {
        let line = line.unwrap_or(DEFAULT_LOG_LINES);
        let timestamps = timestamps.unwrap_or(false);

        let logs = self
            .orchestrator
            .service_logs(name, line, timestamps)
            .await
            .map_err(upstream_error)?;

        Ok(ServiceLogsDto {
            service: name.to_string(),
            line,
            timestamps,
            stdout: logs.stdout,
            stderr: logs.stderr,
        })
    }

    /// Inspect document exactly as the orchestrator returned it, pretty-printed.
    pub async fn raw(&self, name: &str) -> AppResult<String> {
        let (_, raw) = self
            .orchestrator
            .inspect_service(name)
            .await
            .map_err(upstream_error)?;

        let doc: Value = serde_json::from_slice(&raw).map_err(internal_error)?;
        serde_json::to_string_pretty(&doc).map_err(internal_error)
    }

    pub async fn stats(&self, name: &str, time: Option<&str>, refresh: Option<bool>) -> AppResult<ServiceStatsDto> {
        let period = parse_period(time)?;
        let (service, tasks) = self.inspect_with_tasks(name).await?;

        Ok(ServiceStatsDto {
            service,
            tasks,
            time: format_period(period),
            refresh: refresh.unwrap_or(true),
            metrics_enabled: self.metrics_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::orchestration::{NetworkDescriptor, ServiceLogs};
    use crate::domain::service::model::ServiceSpec;
    use crate::errors::AppError;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockOrchestrator {
        services: Vec<ServiceDescriptor>,
        raw: Vec<u8>,
        filters: Mutex<Vec<ServiceListFilter>>,
        log_requests: Mutex<Vec<(String, usize, bool)>>,
    }

    impl MockOrchestrator {
        fn with(names: &[&str]) -> Self {
            let services = names
                .iter()
                .map(|n| {
                    serde_json::from_value(json!({
                        "ID": format!("id-{n}"),
                        "Spec": {
                            "Name": n,
                            "TaskTemplate": { "ContainerSpec": { "Image": "nginx" } },
                            "Mode": { "Replicated": { "Replicas": 2 } }
                        },
                        "Endpoint": {
                            "VirtualIPs": [
                                { "NetworkID": "net-front", "Addr": "10.0.1.5/24" },
                                { "NetworkID": "net-back", "Addr": "10.0.2.5/24" }
                            ]
                        }
                    }))
                    .unwrap()
                })
                .collect();
            Self {
                services,
                raw: br#"{"ID":"id-web","Spec":{"Name":"web"}}"#.to_vec(),
                filters: Mutex::new(Vec::new()),
                log_requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OrchestrationClient for MockOrchestrator {
        async fn inspect_service(&self, name: &str) -> Result<(ServiceDescriptor, Vec<u8>)> {
            self.services
                .iter()
                .find(|s| s.name() == name)
                .cloned()
                .map(|s| (s, self.raw.clone()))
                .ok_or_else(|| anyhow!("service {name} not found"))
        }

        async fn create_service(&self, _spec: &ServiceSpec) -> Result<()> {
            unimplemented!()
        }

        async fn update_service(&self, _spec: &ServiceSpec) -> Result<()> {
            unimplemented!()
        }

        async fn scale_service(&self, _name: &str, _replicas: u64) -> Result<()> {
            unimplemented!()
        }

        async fn rollback_service(&self, _name: &str) -> Result<()> {
            unimplemented!()
        }

        async fn remove_service(&self, _name: &str) -> Result<()> {
            unimplemented!()
        }

        async fn list_services(&self, filter: &ServiceListFilter) -> Result<(Vec<ServiceDescriptor>, usize)> {
            self.filters.lock().unwrap().push(filter.clone());
            let page = self
                .services
                .iter()
                .skip(filter.offset())
                .take(filter.page_size)
                .cloned()
                .collect();
            Ok((page, self.services.len()))
        }

        async fn list_tasks(&self, filter: &TaskListFilter) -> Result<(Vec<TaskDescriptor>, usize)> {
            let task = TaskDescriptor {
                id: format!("task-of-{}", filter.service.clone().unwrap_or_default()),
                ..Default::default()
            };
            Ok((vec![task], 1))
        }

        async fn inspect_network(&self, id: &str) -> Result<NetworkDescriptor> {
            match id.strip_prefix("net-") {
                Some(name) => Ok(NetworkDescriptor {
                    id: id.to_string(),
                    name: name.to_string(),
                    ..Default::default()
                }),
                None => Err(anyhow!("network {id} not found")),
            }
        }

        async fn service_logs(&self, name: &str, tail: usize, timestamps: bool) -> Result<ServiceLogs> {
            self.log_requests.lock().unwrap().push((name.to_string(), tail, timestamps));
            Ok(ServiceLogs {
                stdout: "listening on :80\n".into(),
                stderr: "warning: no config\n".into(),
            })
        }
    }

    fn query(orchestrator: MockOrchestrator) -> (ServiceQueryService, Arc<MockOrchestrator>) {
        let orchestrator = Arc::new(orchestrator);
        (ServiceQueryService::new(orchestrator.clone(), 2, true), orchestrator)
    }

    #[tokio::test]
    async fn list_pages_with_configured_size() {
        let (svc, mock) = query(MockOrchestrator::with(&["a", "b", "c"]));
        let page = svc.list(Some("  ".into()), Some(2)).await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "c");
        assert_eq!(page.items[0].replicas, Some(2));

        let filter = mock.filters.lock().unwrap()[0].clone();
        assert_eq!(filter.name, None);
        assert_eq!(filter.page_size, 2);
    }

    #[tokio::test]
    async fn list_defaults_to_first_page() {
        let (svc, _) = query(MockOrchestrator::with(&["a", "b", "c"]));
        let page = svc.list(None, Some(0)).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn detail_includes_tasks() {
        let (svc, _) = query(MockOrchestrator::with(&["web"]));
        let detail = svc.detail("web").await.unwrap();
        assert_eq!(detail.service.id, "id-web");
        assert_eq!(detail.tasks[0].id, "task-of-web");
        assert_eq!(detail.command, "docker service create --name web --replicas 2 nginx");
    }

    #[tokio::test]
    async fn detail_resolves_virtual_ip_networks() {
        let (svc, _) = query(MockOrchestrator::with(&["web"]));
        let detail = svc.detail("web").await.unwrap();
        assert_eq!(
            detail.networks,
            vec![
                ServiceNetworkDto { id: "net-front".into(), name: "front".into(), address: "10.0.1.5/24".into() },
                ServiceNetworkDto { id: "net-back".into(), name: "back".into(), address: "10.0.2.5/24".into() },
            ]
        );
    }

    #[tokio::test]
    async fn detail_fails_when_a_network_cannot_be_resolved() {
        let mut mock = MockOrchestrator::with(&["web"]);
        mock.services[0].endpoint.as_mut().unwrap().virtual_ips[1].network_id = "gone".into();
        let (svc, _) = query(mock);
        assert!(matches!(svc.detail("web").await, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn logs_default_to_last_500_lines_without_timestamps() {
        let (svc, mock) = query(MockOrchestrator::with(&["web"]));
        let logs = svc.logs("web", None, None).await.unwrap();

        assert_eq!((logs.line, logs.timestamps), (500, false));
        assert_eq!(logs.stdout, "listening on :80\n");
        assert_eq!(logs.stderr, "warning: no config\n");

        svc.logs("web", Some(20), Some(true)).await.unwrap();
        assert_eq!(
            *mock.log_requests.lock().unwrap(),
            vec![("web".to_string(), 500, false), ("web".to_string(), 20, true)]
        );
    }

    #[tokio::test]
    async fn missing_service_is_upstream_error() {
        let (svc, _) = query(MockOrchestrator::with(&["web"]));
        assert!(matches!(svc.detail("db").await, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn raw_is_pretty_printed() {
        let (svc, _) = query(MockOrchestrator::with(&["web"]));
        let raw = svc.raw("web").await.unwrap();
        assert!(raw.contains("\n  \"ID\": \"id-web\""));
    }

    #[tokio::test]
    async fn raw_with_undecodable_body_is_internal() {
        let mut mock = MockOrchestrator::with(&["web"]);
        mock.raw = b"not json".to_vec();
        let (svc, _) = query(mock);
        assert!(matches!(svc.raw("web").await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn stats_canonicalizes_period() {
        let (svc, _) = query(MockOrchestrator::with(&["web"]));
        let stats = svc.stats("web", Some("90m"), None).await.unwrap();
        assert_eq!(stats.time, "1h 30m");
        assert!(stats.refresh);
        assert!(stats.metrics_enabled);

        let err = svc.stats("web", Some("soon"), Some(false)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
