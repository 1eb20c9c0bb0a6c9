pub mod service_metrics_service;
