use serde::Serialize;

/// One chart point: `x` is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: i64,
    pub y: f64,
}

/// One labeled dataset, points in backend order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// CPU and memory datasets for one service. The two collections are
/// independent and not aligned by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceMetricsDto {
    pub cpu: Vec<ChartSeries>,
    pub memory: Vec<ChartSeries>,
}
