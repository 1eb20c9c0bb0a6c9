// Collaborator contracts
pub mod metrics_backend;
pub mod orchestration;

// HTTP adapters
pub mod docker_swarm_client;
pub mod http_client;
pub mod prometheus_client;
