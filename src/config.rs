use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8002;
const DEFAULT_DOCKER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// Process-wide settings, read once at startup from `SWARMDECK_*` variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Engine endpoint of a swarm manager: `unix://`, `tcp://` or `http://`.
    /// Unset means the local defaults (`DOCKER_HOST`, else the local socket).
    pub docker_host: Option<String>,
    pub docker_timeout_secs: u64,
    /// Metrics are disabled when no Prometheus endpoint is configured
    pub prometheus_url: Option<String>,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub page_size: usize,
    pub audit_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            docker_host: None,
            docker_timeout_secs: DEFAULT_DOCKER_TIMEOUT_SECS,
            prometheus_url: None,
            data_dir: PathBuf::from("./data"),
            log_dir: PathBuf::from("./logs"),
            page_size: DEFAULT_PAGE_SIZE,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if any) and then reads the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match non_empty("SWARMDECK_BIND_ADDR") {
            Some(v) => v
                .parse()
                .with_context(|| format!("SWARMDECK_BIND_ADDR is not a socket address: {v}"))?,
            None => defaults.bind_addr,
        };

        let page_size = match non_empty("SWARMDECK_PAGE_SIZE") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("SWARMDECK_PAGE_SIZE must be a positive integer: {v}"))?,
            None => defaults.page_size,
        };

        let docker_timeout_secs = match non_empty("SWARMDECK_DOCKER_TIMEOUT") {
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("SWARMDECK_DOCKER_TIMEOUT must be a positive number of seconds: {v}"))?,
            None => defaults.docker_timeout_secs,
        };

        let audit_capacity = match non_empty("SWARMDECK_AUDIT_CAPACITY") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("SWARMDECK_AUDIT_CAPACITY must be an integer: {v}"))?,
            None => defaults.audit_capacity,
        };

        Ok(Self {
            bind_addr,
            docker_host: non_empty("SWARMDECK_DOCKER_HOST")
                .map(|v| v.trim_end_matches('/').to_string()),
            docker_timeout_secs,
            prometheus_url: non_empty("SWARMDECK_PROMETHEUS_URL")
                .map(|v| v.trim_end_matches('/').to_string()),
            data_dir: non_empty("SWARMDECK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            log_dir: non_empty("SWARMDECK_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            page_size,
            audit_capacity,
        })
    }

    pub fn registry_file(&self) -> PathBuf {
        self.data_dir.join("registries.json")
    }
}
