use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};

/// Opaque RPC facade over the time-series store.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<QueryValue>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePair {
    pub timestamp_ms: i64,
    pub value: f64,
}

/// One labeled series of a range query, in the backend's native order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStream {
    pub metric: BTreeMap<String, String>,
    pub values: Vec<SamplePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: BTreeMap<String, String>,
    pub value: SamplePair,
}

/// Tagged query result; range queries are expected to yield `Matrix`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Matrix(Vec<SampleStream>),
    Vector(Vec<Sample>),
    Scalar(SamplePair),
    String { timestamp_ms: i64, value: String },
}

impl QueryValue {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::Matrix(_) => "matrix",
            QueryValue::Vector(_) => "vector",
            QueryValue::Scalar(_) => "scalar",
            QueryValue::String { .. } => "string",
        }
    }

    pub fn into_matrix(self) -> AppResult<Vec<SampleStream>> {
        match self {
            QueryValue::Matrix(streams) => Ok(streams),
            other => Err(AppError::Internal(format!(
                "expected matrix result from metrics backend, got {}",
                other.kind()
            ))),
        }
    }
}
