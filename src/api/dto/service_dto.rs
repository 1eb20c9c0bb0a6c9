use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ServiceListQuery {
    pub name: Option<String>,
    pub page: Option<usize>,
}

/// `time` is a window such as `30m` or `6h`; absent means one hour.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct MetricsQuery {
    pub time: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct StatsQuery {
    pub time: Option<String>,
    pub refresh: Option<bool>,
}

/// `line` is how many trailing lines to show (500 when absent).
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LogsQuery {
    pub line: Option<usize>,
    pub timestamps: Option<bool>,
}

/// Replica count as typed by the user; parsed by the coordinator.
#[derive(Deserialize, Debug)]
pub struct ScaleRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub count: String,
}

/// Comma-separated service names.
#[derive(Deserialize, Debug)]
pub struct DeleteRequest {
    pub names: String,
}

impl DeleteRequest {
    /// Names in submission order; blank segments are dropped.
    pub fn name_list(&self) -> Vec<String> {
        self.names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}
