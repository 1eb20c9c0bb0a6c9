pub mod service_control_coordinator;
pub mod service_query_service;
