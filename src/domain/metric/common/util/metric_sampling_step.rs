use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_PERIOD: Duration = HOUR;

/// (period threshold, step), checked top-down; thresholds are inclusive.
const STEP_TABLE: [(Duration, Duration); 4] = [
    (Duration::from_secs(24 * 60 * 60), Duration::from_secs(10 * 60)),
    (Duration::from_secs(12 * 60 * 60), Duration::from_secs(5 * 60)),
    (Duration::from_secs(6 * 60 * 60), Duration::from_secs(3 * 60)),
    (Duration::from_secs(3 * 60 * 60), Duration::from_secs(2 * 60)),
];

/// Picks the sampling step for a window so a chart stays near ~144 points
/// whatever the window size.
pub fn determine_step(period: Duration) -> Duration {
    STEP_TABLE
        .iter()
        .find(|(threshold, _)| period >= *threshold)
        .map(|(_, step)| *step)
        .unwrap_or(MINUTE)
}

/// Observation window; `step` is always derived from `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricWindow {
    period: Duration,
    step: Duration,
}

impl MetricWindow {
    pub fn for_period(period: Duration) -> Self {
        Self {
            period,
            step: determine_step(period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// `(end - period, end)`
    pub fn bounds_ending_at(&self, end: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let span = chrono::Duration::from_std(self.period)
            .map_err(|_| AppError::InvalidArgument(format!("time window {:?} is too large", self.period)))?;
        let start = end
            .checked_sub_signed(span)
            .ok_or_else(|| AppError::InvalidArgument("time window reaches before the epoch range".into()))?;
        Ok((start, end))
    }
}

/// Parses a window such as `30m`, `6h` or `1h30m`; absent or blank means one hour.
pub fn parse_period(raw: Option<&str>) -> AppResult<Duration> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_PERIOD),
        Some(s) => humantime::parse_duration(s)
            .map_err(|e| AppError::InvalidArgument(format!("invalid time window {s:?}: {e}"))),
    }
}

/// Canonical text form of a window, e.g. `1h 30m`.
pub fn format_period(period: Duration) -> String {
    humantime::format_duration(period).to_string()
}
