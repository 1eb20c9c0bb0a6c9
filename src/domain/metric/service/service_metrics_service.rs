use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::client::metrics_backend::{MetricsBackend, SampleStream};
use crate::domain::metric::common::dto::{ChartPoint, ChartSeries, ServiceMetricsDto};
use crate::domain::metric::common::util::metric_sampling_step::MetricWindow;
use crate::errors::{upstream_error, AppError, AppResult};

pub const BYTES_PER_MIB: f64 = 1_048_576.0;

/// Stream label carrying the task/container identity (cAdvisor `name`).
const SERIES_LABEL: &str = "name";

/// Scope label cAdvisor copies from the swarm service container label.
const SERVICE_LABEL: &str = "container_label_com_docker_swarm_service_name";

/// Builds CPU and memory charts for a service from range queries.
pub struct ServiceMetricsService {
    backend: Option<Arc<dyn MetricsBackend>>,
}

impl ServiceMetricsService {
    pub fn new(backend: Option<Arc<dyn MetricsBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn fetch_service_metrics(
        &self,
        service: &str,
        period: Duration,
    ) -> AppResult<ServiceMetricsDto> {
        self.fetch_service_metrics_at(service, period, Utc::now()).await
    }

    /// Same as [`Self::fetch_service_metrics`] with an explicit window end.
    pub async fn fetch_service_metrics_at(
        &self,
        service: &str,
        period: Duration,
        end: DateTime<Utc>,
    ) -> AppResult<ServiceMetricsDto> {
        let backend = self
            .backend
            .as_deref()
            .ok_or_else(|| AppError::NotFound("metrics backend is not configured".into()))?;

        let window = MetricWindow::for_period(period);
        let (start, end) = window.bounds_ending_at(end)?;
        debug!(
            "Fetching metrics for service {} over {:?} (step {:?})",
            service,
            window.period(),
            window.step()
        );

        let cpu_expr = cpu_query(service);
        let memory_expr = memory_query(service);

        // Either failure fails the whole request; no partial charts.
        let (cpu, memory) = tokio::try_join!(
            query_series(backend, &cpu_expr, start, end, window.step(), |v| v),
            query_series(backend, &memory_expr, start, end, window.step(), |v| v / BYTES_PER_MIB),
        )?;

        Ok(ServiceMetricsDto { cpu, memory })
    }
}

async fn query_series(
    backend: &dyn MetricsBackend,
    expr: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    convert: fn(f64) -> f64,
) -> AppResult<Vec<ChartSeries>> {
    let streams = backend
        .query_range(expr, start, end, step)
        .await
        .map_err(upstream_error)?
        .into_matrix()?;

    Ok(to_chart_series(streams, convert))
}

/// One series per stream, backend order kept, no de-duplication by label.
fn to_chart_series(streams: Vec<SampleStream>, convert: fn(f64) -> f64) -> Vec<ChartSeries> {
    streams
        .into_iter()
        .map(|stream| ChartSeries {
            label: stream.metric.get(SERIES_LABEL).cloned().unwrap_or_default(),
            points: stream
                .values
                .iter()
                .map(|p| ChartPoint {
                    x: p.timestamp_ms,
                    y: convert(p.value),
                })
                .collect(),
        })
        .collect()
}

/// User CPU seconds rate over a trailing 5m window, as a percentage.
pub fn cpu_query(service: &str) -> String {
    format!(
        r#"rate(container_cpu_user_seconds_total{{{}="{}"}}[5m]) * 100"#,
        SERVICE_LABEL,
        escape_label_value(service)
    )
}

pub fn memory_query(service: &str) -> String {
    format!(
        r#"container_memory_usage_bytes{{{}="{}"}}"#,
        SERVICE_LABEL,
        escape_label_value(service)
    )
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}
