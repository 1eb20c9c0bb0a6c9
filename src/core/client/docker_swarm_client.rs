use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bollard::auth::DockerCredentials;
use bollard::container::LogOutput;
use bollard::models::ServiceSpec as EngineServiceSpec;
use bollard::query_parameters::{
    InspectNetworkOptions, InspectServiceOptions, ListServicesOptionsBuilder,
    ListTasksOptionsBuilder, LogsOptionsBuilder, UpdateServiceOptionsBuilder,
};
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::core::client::orchestration::{
    NetworkDescriptor, OrchestrationClient, ServiceDescriptor, ServiceListFilter, ServiceLogs,
    TaskDescriptor, TaskListFilter,
};
use crate::domain::service::model::{RegistryCredential, ServiceMode, ServiceSpec};

/// Spec keys replaced wholesale on update instead of merged key by key.
const REPLACED_SPEC_KEYS: &[&str] = &["Labels", "Mode"];

/// Where the engine API of the swarm manager is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    /// `DOCKER_HOST` if set, else the platform's local socket
    LocalDefaults,
    Unix(String),
    Http(String),
}

impl DockerEndpoint {
    pub fn parse(host: Option<&str>) -> Result<Self> {
        let Some(host) = host.map(str::trim).filter(|h| !h.is_empty()) else {
            return Ok(Self::LocalDefaults);
        };

        if let Some(path) = host.strip_prefix("unix://") {
            return Ok(Self::Unix(path.to_string()));
        }
        if host.starts_with('/') {
            return Ok(Self::Unix(host.to_string()));
        }
        if let Some(addr) = host.strip_prefix("tcp://") {
            return Ok(Self::Http(format!("http://{addr}")));
        }
        if host.starts_with("http://") {
            return Ok(Self::Http(host.to_string()));
        }

        bail!("unsupported docker host '{host}': expected unix://, tcp:// or http://")
    }
}

/// Swarm manager client over the Docker Engine API.
#[derive(Clone)]
pub struct DockerSwarmClient {
    docker: Docker,
}

impl DockerSwarmClient {
    pub fn connect(endpoint: &DockerEndpoint, timeout_secs: u64) -> Result<Self> {
        let docker = match endpoint {
            DockerEndpoint::LocalDefaults => Docker::connect_with_local_defaults(),
            #[cfg(unix)]
            DockerEndpoint::Unix(path) => {
                Docker::connect_with_unix(path, timeout_secs, API_DEFAULT_VERSION)
            }
            #[cfg(not(unix))]
            DockerEndpoint::Unix(path) => bail!("unix socket {path} is not available on this platform"),
            DockerEndpoint::Http(addr) => {
                Docker::connect_with_http(addr, timeout_secs, API_DEFAULT_VERSION)
            }
        }
        .with_context(|| format!("Failed to connect to Docker at {endpoint:?}"))?;

        Ok(Self { docker })
    }

    async fn apply_update(
        &self,
        current: &ServiceDescriptor,
        spec: Value,
        rollback: bool,
        credentials: Option<DockerCredentials>,
    ) -> Result<()> {
        let mut options = UpdateServiceOptionsBuilder::default().version(
            current
                .version
                .index
                .try_into()
                .context("service version does not fit the engine's range")?,
        );
        if rollback {
            options = options.rollback("previous");
        }

        let target = if current.id.is_empty() { current.name() } else { current.id.as_str() };
        let response = self
            .docker
            .update_service(target, engine_spec(spec)?, options.build(), credentials)
            .await
            .with_context(|| format!("docker service update {}", current.name()))?;

        // The engine reports non-fatal problems (e.g. unpullable image) as warnings.
        debug!("Updated service {}: {:?}", current.name(), response);
        Ok(())
    }

    async fn container_logs(&self, container: &str, tail: usize, timestamps: bool) -> Result<Vec<LogOutput>> {
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .timestamps(timestamps)
            .tail(&tail.to_string())
            .build();

        self.docker
            .logs(container, Some(options))
            .try_collect()
            .await
            .with_context(|| format!("docker logs {container}"))
    }
}

#[async_trait]
impl OrchestrationClient for DockerSwarmClient {
    async fn inspect_service(&self, name: &str) -> Result<(ServiceDescriptor, Vec<u8>)> {
        let service = self
            .docker
            .inspect_service(name, None::<InspectServiceOptions>)
            .await
            .with_context(|| format!("docker service inspect {name}"))?;

        let raw = serde_json::to_vec(&service).context("docker service inspect: encode body")?;
        let descriptor: ServiceDescriptor =
            serde_json::from_slice(&raw).context("docker service inspect: decode body")?;

        debug!("Inspected service {} at version {}", name, descriptor.version.index);
        Ok((descriptor, raw))
    }

    async fn create_service(&self, spec: &ServiceSpec) -> Result<()> {
        let response = self
            .docker
            .create_service(
                engine_spec(spec.to_swarm_spec())?,
                credentials(spec.registry_auth.as_ref()),
            )
            .await
            .with_context(|| format!("docker service create {}", spec.name))?;

        debug!("Created service {}: {:?}", spec.name, response);
        Ok(())
    }

    async fn update_service(&self, spec: &ServiceSpec) -> Result<()> {
        let (current, _) = self.inspect_service(&spec.name).await?;
        let merged = update_document(&current, spec);

        self.apply_update(&current, merged, false, credentials(spec.registry_auth.as_ref()))
            .await
    }

    async fn scale_service(&self, name: &str, replicas: u64) -> Result<()> {
        let (current, _) = self.inspect_service(name).await?;
        if current.replicas().is_none() {
            bail!("service {name} is not in replicated mode and cannot be scaled");
        }

        let mut spec = current.spec.clone();
        spec["Mode"]["Replicated"]["Replicas"] = json!(replicas);

        self.apply_update(&current, spec, false, None).await
    }

    async fn rollback_service(&self, name: &str) -> Result<()> {
        let (current, _) = self.inspect_service(name).await?;
        self.apply_update(&current, current.spec.clone(), true, None).await
    }

    async fn remove_service(&self, name: &str) -> Result<()> {
        self.docker
            .delete_service(name)
            .await
            .with_context(|| format!("docker service remove {name}"))?;
        debug!("Removed service {}", name);
        Ok(())
    }

    async fn list_services(
        &self,
        filter: &ServiceListFilter,
    ) -> Result<(Vec<ServiceDescriptor>, usize)> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            filters.insert("name".into(), vec![name.to_string()]);
        }
        let options = ListServicesOptionsBuilder::default().filters(&filters).build();

        let services = self
            .docker
            .list_services(Some(options))
            .await
            .context("docker service list")?;
        let mut services = services
            .iter()
            .map(convert)
            .collect::<Result<Vec<ServiceDescriptor>>>()?;
        services.sort_by(|a, b| a.name().cmp(b.name()));

        let total = services.len();
        let page = services
            .into_iter()
            .skip(filter.offset())
            .take(filter.page_size)
            .collect::<Vec<_>>();

        debug!("Discovered {} service(s), returning {}", total, page.len());
        Ok((page, total))
    }

    async fn list_tasks(&self, filter: &TaskListFilter) -> Result<(Vec<TaskDescriptor>, usize)> {
        let mut filters: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(service) = filter.service.as_deref() {
            filters.insert("service".into(), vec![service.to_string()]);
        }
        if let Some(node) = filter.node.as_deref() {
            filters.insert("node".into(), vec![node.to_string()]);
        }
        let options = ListTasksOptionsBuilder::default().filters(&filters).build();

        let tasks = self
            .docker
            .list_tasks(Some(options))
            .await
            .context("docker task list")?;
        let tasks = tasks
            .iter()
            .map(convert)
            .collect::<Result<Vec<TaskDescriptor>>>()?;
        let total = tasks.len();

        debug!("Discovered {} task(s)", total);
        Ok((tasks, total))
    }

    async fn inspect_network(&self, id: &str) -> Result<NetworkDescriptor> {
        let network = self
            .docker
            .inspect_network(id, None::<InspectNetworkOptions>)
            .await
            .with_context(|| format!("docker network inspect {id}"))?;
        convert(&network)
    }

    /// Collected from the containers of the service's tasks that the
    /// connected engine can reach; unreachable ones are skipped.
    async fn service_logs(&self, name: &str, tail: usize, timestamps: bool) -> Result<ServiceLogs> {
        let (tasks, _) = self.list_tasks(&TaskListFilter::for_service(name)).await?;
        let containers: Vec<&str> = tasks.iter().filter_map(TaskDescriptor::container_id).collect();

        let mut logs = ServiceLogs::default();
        let mut reached = 0;
        for container in &containers {
            let frames = match self.container_logs(container, tail, timestamps).await {
                Ok(frames) => frames,
                Err(err) => {
                    debug!("Skipping logs of {} for service {}: {:#}", container, name, err);
                    continue;
                }
            };
            reached += 1;

            for frame in frames {
                match frame {
                    LogOutput::StdErr { message } => {
                        logs.stderr.push_str(&String::from_utf8_lossy(&message))
                    }
                    LogOutput::StdOut { message } | LogOutput::Console { message } => {
                        logs.stdout.push_str(&String::from_utf8_lossy(&message))
                    }
                    _ => {}
                }
            }
        }

        if reached == 0 && !containers.is_empty() {
            bail!("no task container of service {name} is reachable from this engine");
        }

        debug!("Read logs of service {} from {} container(s)", name, reached);
        Ok(logs)
    }
}

/// Re-reads an engine model through this crate's descriptor types.
fn convert<T: Serialize, D: DeserializeOwned>(model: &T) -> Result<D> {
    let doc = serde_json::to_value(model).context("encode engine object")?;
    serde_json::from_value(doc).context("decode engine object")
}

fn engine_spec(doc: Value) -> Result<EngineServiceSpec> {
    serde_json::from_value(doc).context("service spec does not match the engine schema")
}

fn credentials(credential: Option<&RegistryCredential>) -> Option<DockerCredentials> {
    credential.map(|c| DockerCredentials {
        username: Some(c.username.clone()),
        password: Some(c.password.clone()),
        serveraddress: Some(c.server_address.clone()),
        ..Default::default()
    })
}

/// The edit overlaid onto the running spec. Without an explicit count the
/// running replica count is kept.
fn update_document(current: &ServiceDescriptor, spec: &ServiceSpec) -> Value {
    let mut desired = spec.to_swarm_spec();
    if spec.mode == ServiceMode::Replicated && spec.replicas.is_none() {
        if let Some(running) = current.replicas() {
            desired["Mode"] = json!({ "Replicated": { "Replicas": running } });
        }
    }

    let mut merged = current.spec.clone();
    overlay_spec(&mut merged, &desired);
    merged
}

/// Merges `desired` into `current`: objects merge key by key, everything
/// else (and the keys in [`REPLACED_SPEC_KEYS`]) is replaced.
fn overlay_spec(current: &mut Value, desired: &Value) {
    match (current, desired) {
        (Value::Object(cur), Value::Object(want)) => {
            for (key, value) in want {
                let merge = value.is_object()
                    && cur.get(key).is_some_and(Value::is_object)
                    && !REPLACED_SPEC_KEYS.contains(&key.as_str());
                match cur.get_mut(key) {
                    Some(existing) if merge => overlay_spec(existing, value),
                    _ => {
                        cur.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (cur, want) => *cur = want.clone(),
    }
}
