use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// Replication mode of an orchestrated service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    #[default]
    Replicated,
    Global,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MountSpec {
    /// `bind`, `volume` or `tmpfs`
    #[serde(rename = "type", default = "default_mount_type")]
    pub kind: String,
    #[serde(default)]
    pub source: String,
    #[validate(length(min = 1, message = "mount target is required"))]
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
}

fn default_mount_type() -> String {
    "volume".into()
}

/// Credential the engine presents to a private registry when pulling.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistryCredential {
    pub username: String,
    pub password: String,
    pub server_address: String,
}

impl fmt::Debug for RegistryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredential")
            .field("username", &self.username)
            .field("server_address", &self.server_address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub published: Option<u16>,
    pub target: u16,
    #[serde(default)]
    pub protocol: String,
}

/// Desired-state descriptor sent to the orchestrator on create/update.
///
/// Owned by the request carrying it; call [`ServiceSpec::normalize`] before
/// handing it to an orchestration client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServiceSpec {
    #[validate(length(min = 1, max = 63, message = "service name must be 1-63 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,

    /// Name of a stored registry record; resolved on create.
    pub registry: String,

    /// Pull credential, attached after registry resolution.
    /// Never read from or written to request/response bodies.
    #[serde(skip)]
    pub registry_auth: Option<RegistryCredential>,

    pub mode: ServiceMode,
    /// Absent on an edit keeps the running replica count; a new service
    /// starts with one.
    pub replicas: Option<u64>,
    pub networks: Vec<String>,
    #[validate(nested)]
    pub mounts: Vec<MountSpec>,
    pub constraints: Vec<String>,
    /// `KEY=VALUE` entries
    pub env: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub ports: Vec<PortSpec>,
}

impl ServiceSpec {
    /// Fills defaults and strips empty or duplicated entries.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.image = self.image.trim().to_string();
        self.registry = self.registry.trim().to_string();

        if self.mode == ServiceMode::Global {
            self.replicas = None;
        }

        self.networks = dedup_trimmed(&self.networks);
        self.constraints = dedup_trimmed(&self.constraints);
        self.env = trimmed(&self.env);
        self.command = trimmed(&self.command);
        self.args = trimmed(&self.args);

        self.labels = std::mem::take(&mut self.labels)
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        for mount in &mut self.mounts {
            mount.kind = mount.kind.trim().to_lowercase();
            if mount.kind.is_empty() {
                mount.kind = default_mount_type();
            }
            mount.source = mount.source.trim().to_string();
            mount.target = mount.target.trim().to_string();
        }

        for port in &mut self.ports {
            port.protocol = port.protocol.trim().to_lowercase();
            if port.protocol.is_empty() {
                port.protocol = "tcp".into();
            }
        }
    }

    /// Renders the Docker Engine `ServiceSpec` document.
    ///
    /// Every field this type owns is always emitted, so the document can be
    /// overlaid onto an existing spec and clear values the caller removed.
    pub fn to_swarm_spec(&self) -> Value {
        let mounts: Vec<Value> = self
            .mounts
            .iter()
            .map(|m| {
                json!({
                    "Type": m.kind,
                    "Source": m.source,
                    "Target": m.target,
                    "ReadOnly": m.read_only,
                })
            })
            .collect();

        let networks: Vec<Value> = self.networks.iter().map(|n| json!({ "Target": n })).collect();

        let ports: Vec<Value> = self
            .ports
            .iter()
            .map(|p| {
                let mut port = json!({
                    "Protocol": p.protocol,
                    "TargetPort": p.target,
                });
                if let Some(published) = p.published {
                    port["PublishedPort"] = json!(published);
                }
                port
            })
            .collect();

        let mode = match self.mode {
            ServiceMode::Replicated => {
                json!({ "Replicated": { "Replicas": self.replicas.unwrap_or(1) } })
            }
            ServiceMode::Global => json!({ "Global": {} }),
        };

        json!({
            "Name": self.name,
            "Labels": self.labels,
            "TaskTemplate": {
                "ContainerSpec": {
                    "Image": self.image,
                    "Env": self.env,
                    "Command": self.command,
                    "Args": self.args,
                    "Mounts": mounts,
                },
                "Placement": { "Constraints": self.constraints },
                "Networks": networks,
            },
            "Mode": mode,
            "EndpointSpec": { "Ports": ports },
        })
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn dedup_trimmed(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    trimmed(values)
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_defaults_and_dedups() {
        let mut spec = ServiceSpec {
            name: " web ".into(),
            image: "nginx:1.27".into(),
            networks: vec!["front".into(), " ".into(), "front".into(), "back".into()],
            ports: vec![PortSpec { published: Some(80), target: 8080, protocol: String::new() }],
            ..Default::default()
        };

        spec.normalize();

        assert_eq!(spec.name, "web");
        assert_eq!(spec.replicas, None);
        assert_eq!(spec.to_swarm_spec()["Mode"]["Replicated"]["Replicas"], 1);
        assert_eq!(spec.networks, vec!["front", "back"]);
        assert_eq!(spec.ports[0].protocol, "tcp");
    }

    #[test]
    fn global_mode_clears_replicas() {
        let mut spec = ServiceSpec {
            name: "agent".into(),
            image: "agent".into(),
            mode: ServiceMode::Global,
            replicas: Some(3),
            ..Default::default()
        };
        spec.normalize();
        assert_eq!(spec.replicas, None);
        assert!(spec.to_swarm_spec()["Mode"]["Global"].is_object());
    }

    #[test]
    fn credential_debug_hides_password() {
        let cred = RegistryCredential {
            username: "bob".into(),
            password: "s3cret".into(),
            server_address: "reg.example.com".into(),
        };
        let shown = format!("{cred:?}");
        assert!(shown.contains("bob"));
        assert!(!shown.contains("s3cret"));
    }

    #[test]
    fn validation_rejects_missing_image() {
        let spec = ServiceSpec { name: "web".into(), ..Default::default() };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn swarm_spec_carries_task_template() {
        let mut spec = ServiceSpec {
            name: "web".into(),
            image: "nginx".into(),
            replicas: Some(3),
            constraints: vec!["node.role==worker".into()],
            networks: vec!["front".into()],
            mounts: vec![MountSpec {
                kind: "bind".into(),
                source: "/srv".into(),
                target: "/data".into(),
                read_only: true,
            }],
            ..Default::default()
        };
        spec.normalize();

        let doc = spec.to_swarm_spec();
        assert_eq!(doc["Name"], "web");
        assert_eq!(doc["TaskTemplate"]["ContainerSpec"]["Image"], "nginx");
        assert_eq!(doc["Mode"]["Replicated"]["Replicas"], 3);
        assert_eq!(doc["TaskTemplate"]["Placement"]["Constraints"][0], "node.role==worker");
        assert_eq!(doc["TaskTemplate"]["Networks"][0]["Target"], "front");
        assert_eq!(doc["TaskTemplate"]["ContainerSpec"]["Mounts"][0]["ReadOnly"], true);
    }
}
