use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::client::metrics_backend::{
    MetricsBackend, QueryValue, Sample, SamplePair, SampleStream,
};

/// Prometheus HTTP API client (`/api/v1/query_range`).
#[derive(Clone)]
pub struct PrometheusClient {
    http: Client,
    base_url: String,
}

impl PrometheusClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ApiEnvelope {
    status: String,
    data: Option<RawData>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
enum RawData {
    Matrix(Vec<RawStream>),
    Vector(Vec<RawSample>),
    Scalar((f64, String)),
    String((f64, String)),
}

#[derive(Deserialize)]
struct RawStream {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

#[derive(Deserialize)]
struct RawSample {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    value: (f64, String),
}

fn to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Sample values travel as strings; `NaN` and `+Inf`/`-Inf` are legal.
fn parse_pair((ts, raw): (f64, String)) -> Result<SamplePair> {
    let value = raw
        .parse::<f64>()
        .with_context(|| format!("invalid sample value {raw:?}"))?;
    Ok(SamplePair {
        timestamp_ms: to_millis(ts),
        value,
    })
}

impl TryFrom<RawData> for QueryValue {
    type Error = anyhow::Error;

    fn try_from(data: RawData) -> Result<Self> {
        Ok(match data {
            RawData::Matrix(streams) => QueryValue::Matrix(
                streams
                    .into_iter()
                    .map(|s| {
                        Ok(SampleStream {
                            metric: s.metric,
                            values: s.values.into_iter().map(parse_pair).collect::<Result<_>>()?,
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            RawData::Vector(samples) => QueryValue::Vector(
                samples
                    .into_iter()
                    .map(|s| {
                        Ok(Sample {
                            metric: s.metric,
                            value: parse_pair(s.value)?,
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            RawData::Scalar(pair) => QueryValue::Scalar(parse_pair(pair)?),
            RawData::String((ts, value)) => QueryValue::String {
                timestamp_ms: to_millis(ts),
                value,
            },
        })
    }
}

#[async_trait]
impl MetricsBackend for PrometheusClient {
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<QueryValue> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        let params = [
            ("query", expr.to_string()),
            ("start", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("step", step.as_secs_f64().to_string()),
        ];

        debug!("Prometheus range query: {} (step={:?})", expr, step);

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("prometheus query_range request failed (url={url})"))?;

        let status = resp.status();
        let text = resp.text().await.context("prometheus query_range: read body")?;

        // Prometheus answers errors (400/422/503) with the same envelope.
        let envelope: ApiEnvelope = serde_json::from_str(&text).map_err(|e| {
            anyhow!("prometheus returned {status} with undecodable body: {e}")
        })?;

        if envelope.status != "success" {
            return Err(anyhow!(
                "prometheus query failed ({}): {}",
                envelope.error_type.as_deref().unwrap_or("unknown"),
                envelope.error.as_deref().unwrap_or("no error message")
            ));
        }

        for w in &envelope.warnings {
            warn!("Prometheus warning for {}: {}", expr, w);
        }

        let data = envelope
            .data
            .ok_or_else(|| anyhow!("prometheus response has no data"))?;
        QueryValue::try_from(data)
    }
}
