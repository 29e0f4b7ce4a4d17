//! Per-series summary statistics for the summary table and JSON export.

use std::time::Duration;

use serde::Serialize;

use super::rate::RateSeries;

/// Summary of one rate series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateStats {
    /// Number of derived samples.
    pub count: usize,
    pub min_hz: f64,
    pub max_hz: f64,
    pub mean_hz: f64,
    /// Mean frame interval, i.e. the mean of `1 / rate` over all samples.
    #[serde(serialize_with = "serialize_secs")]
    pub mean_interval: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl RateStats {
    /// Compute statistics, or `None` for an empty series.
    pub fn from_series(series: &RateSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }

        let count = series.samples.len();
        let mut min_hz = f64::INFINITY;
        let mut max_hz = f64::NEG_INFINITY;
        let mut sum_hz = 0.0;
        let mut sum_secs = 0.0;

        for sample in &series.samples {
            min_hz = min_hz.min(sample.rate_hz);
            max_hz = max_hz.max(sample.rate_hz);
            sum_hz += sample.rate_hz;
            sum_secs += 1.0 / sample.rate_hz;
        }

        Some(Self {
            count,
            min_hz,
            max_hz,
            mean_hz: sum_hz / count as f64,
            mean_interval: Duration::from_secs_f64(sum_secs / count as f64),
        })
    }
}
