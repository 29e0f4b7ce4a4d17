//! Frame rate derivation.
//!
//! Turns a [`TimestampSeries`] into a [`RateSeries`]: one instantaneous
//! frame rate per pair of consecutive timestamps.
//!
//! ```text
//! timestamps   t0 ── t1 ── t2 ── t3
//! deltas          d1    d2    d3
//! samples      (1, 1/d1) (2, 1/d2) (3, 1/d3)
//! ```
//!
//! Zero and negative deltas are reported as [`RateError::InvalidInterval`]
//! instead of producing infinite or negative rates. Whether to skip such a
//! sample or abort is chosen by the caller through [`IntervalPolicy`].

use std::fmt;
use std::str::FromStr;

use chrono::{SubsecRound, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::names::DisplayNames;
use super::timestamp::{TimestampSeries, Timestamps};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const MICROS_PER_SEC: f64 = 1_000_000.0;

/// How timestamp deltas are converted to elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeUnit {
    /// Integer nanosecond ticks; `seconds = delta / 1e9`.
    #[default]
    Nanoseconds,
    /// Calendar times at microsecond precision, keeping only the sub-second
    /// part of each delta. Two frames `1.000001s` apart read as `1µs` apart.
    /// Capture logs analysed with this convention rely on the truncation,
    /// so it is kept as-is; use [`TimeUnit::CalendarFullPrecision`] for the
    /// true interval.
    CalendarMicroseconds,
    /// Calendar times using the full delta at nanosecond precision.
    CalendarFullPrecision,
}

impl TimeUnit {
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::CalendarMicroseconds => "calendar-microseconds",
            TimeUnit::CalendarFullPrecision => "calendar-full-precision",
        }
    }

    fn accepts(&self, timestamps: &Timestamps) -> bool {
        matches!(
            (self, timestamps),
            (TimeUnit::Nanoseconds, Timestamps::Nanoseconds(_))
                | (TimeUnit::CalendarMicroseconds, Timestamps::Calendar(_))
                | (TimeUnit::CalendarFullPrecision, Timestamps::Calendar(_))
        )
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "calendar" | "calendar-microseconds" => Ok(TimeUnit::CalendarMicroseconds),
            "calendar-full" | "calendar-full-precision" => Ok(TimeUnit::CalendarFullPrecision),
            other => Err(format!("unknown time unit: {}", other)),
        }
    }
}

/// What went wrong with an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalFault {
    /// The later timestamp precedes the earlier one.
    Negative,
    /// Both timestamps are equal, which would give an infinite rate.
    Zero,
}

impl fmt::Display for IntervalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalFault::Negative => f.write_str("negative"),
            IntervalFault::Zero => f.write_str("zero"),
        }
    }
}

/// Errors produced while deriving rates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    /// A delta was zero or negative.
    #[error("{source_key}: {fault} interval at frame {frame_index}")]
    InvalidInterval {
        source_key: String,
        frame_index: usize,
        fault: IntervalFault,
    },

    /// The unit convention does not fit the stored timestamps.
    #[error("{source_key}: unit {unit} cannot be applied to {found} timestamps")]
    UnitMismatch {
        source_key: String,
        unit: TimeUnit,
        found: &'static str,
    },
}

/// What to do with samples whose interval is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalPolicy {
    /// Fail the whole derivation on the first invalid interval.
    #[default]
    Abort,
    /// Drop the sample and keep going. Later samples keep their frame index.
    Skip,
}

/// One instantaneous frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRateSample {
    /// 1-based position among the derived samples.
    pub frame_index: usize,
    pub rate_hz: f64,
}

/// Frame rates for one capture source, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    pub source_key: String,
    /// Legend label.
    pub label: String,
    pub samples: Vec<FrameRateSample>,
}

impl RateSeries {
    pub fn empty(source_key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            label: label.into(),
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(frame_index, rate_hz)` pairs for chart widgets.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.frame_index as f64, s.rate_hz)).collect()
    }
}

/// A series together with the unit convention its deltas use.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub series: TimestampSeries,
    pub unit: TimeUnit,
}

impl Capture {
    pub fn new(series: TimestampSeries, unit: TimeUnit) -> Self {
        Self { series, unit }
    }
}

/// Derive one sample per interval, each of which may fail on its own.
///
/// Series shorter than two timestamps yield nothing. A unit that does not
/// fit the stored timestamps fails up front.
pub fn samples(
    series: &TimestampSeries,
    unit: TimeUnit,
) -> Result<impl Iterator<Item = Result<FrameRateSample, RateError>> + '_, RateError> {
    let intervals = series.len().saturating_sub(1);
    if intervals > 0 && !unit.accepts(&series.timestamps) {
        return Err(RateError::UnitMismatch {
            source_key: series.source_key.clone(),
            unit,
            found: series.timestamps.kind(),
        });
    }

    Ok((0..intervals).map(move |i| {
        let frame_index = i + 1;
        let invalid = |fault| RateError::InvalidInterval {
            source_key: series.source_key.clone(),
            frame_index,
            fault,
        };
        let seconds = interval_seconds(&series.timestamps, unit, i).map_err(invalid)?;
        if seconds == 0.0 {
            return Err(invalid(IntervalFault::Zero));
        }
        Ok(FrameRateSample {
            frame_index,
            rate_hz: 1.0 / seconds,
        })
    }))
}

/// Elapsed seconds between timestamps `i` and `i + 1`.
///
/// The caller has checked that `unit` accepts `timestamps`.
fn interval_seconds(timestamps: &Timestamps, unit: TimeUnit, i: usize) -> Result<f64, IntervalFault> {
    match timestamps {
        Timestamps::Nanoseconds(values) => {
            let delta = values[i + 1].checked_sub(values[i]).ok_or(IntervalFault::Negative)?;
            Ok(delta as f64 / NANOS_PER_SEC)
        }
        Timestamps::Calendar(values) if unit == TimeUnit::CalendarMicroseconds => {
            let delta = values[i + 1].trunc_subsecs(6) - values[i].trunc_subsecs(6);
            if delta < TimeDelta::zero() {
                return Err(IntervalFault::Negative);
            }
            // Sub-second component only; whole seconds are discarded.
            let whole = TimeDelta::seconds(delta.num_seconds());
            let micros = (delta - whole).num_microseconds().unwrap_or(0);
            Ok(micros as f64 / MICROS_PER_SEC)
        }
        Timestamps::Calendar(values) => {
            let delta = values[i + 1] - values[i];
            if delta < TimeDelta::zero() {
                return Err(IntervalFault::Negative);
            }
            Ok(match delta.num_nanoseconds() {
                Some(nanos) => nanos as f64 / NANOS_PER_SEC,
                None => delta.num_milliseconds() as f64 / 1_000.0,
            })
        }
    }
}

/// Derive the rates of a single series, labelled with its source key.
///
/// Fails on the first invalid interval.
pub fn derive_rates(series: &TimestampSeries, unit: TimeUnit) -> Result<RateSeries, RateError> {
    RateDeriver::default().derive(&Capture::new(series.clone(), unit))
}

/// Derives labelled rate series from captures.
#[derive(Debug, Clone, Default)]
pub struct RateDeriver {
    names: DisplayNames,
}

impl RateDeriver {
    pub fn new(names: DisplayNames) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &DisplayNames {
        &self.names
    }

    /// Derive one series, failing on the first invalid interval.
    pub fn derive(&self, capture: &Capture) -> Result<RateSeries, RateError> {
        self.derive_with(capture, IntervalPolicy::Abort)
    }

    /// Derive one series with an explicit policy for invalid intervals.
    pub fn derive_with(
        &self,
        capture: &Capture,
        policy: IntervalPolicy,
    ) -> Result<RateSeries, RateError> {
        let series = &capture.series;
        let label = self.names.resolve(&series.source_key).to_string();
        let mut out = RateSeries::empty(series.source_key.clone(), label);
        let mut skipped = 0usize;

        for sample in samples(series, capture.unit)? {
            match (sample, policy) {
                (Ok(sample), _) => out.samples.push(sample),
                (Err(e), IntervalPolicy::Skip) => {
                    warn!("Skipping sample: {}", e);
                    skipped += 1;
                }
                (Err(e), IntervalPolicy::Abort) => return Err(e),
            }
        }

        debug!(
            source = %out.source_key,
            unit = %capture.unit,
            samples = out.samples.len(),
            skipped,
            "Derived frame rates"
        );
        Ok(out)
    }

    /// Derive every capture independently, preserving input order.
    pub fn derive_all(
        &self,
        captures: &[Capture],
        policy: IntervalPolicy,
    ) -> Result<Vec<RateSeries>, RateError> {
        captures.iter().map(|c| self.derive_with(c, policy)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timestamp::parse_calendar;

    fn calendar(key: &str, values: &[&str]) -> TimestampSeries {
        TimestampSeries::calendar(
            key,
            values.iter().map(|v| parse_calendar(v).unwrap()).collect(),
        )
    }

    #[test]
    fn test_nanosecond_rates() {
        let series = TimestampSeries::nanoseconds(
            "cam",
            vec![0, 1_000_000_000, 3_000_000_000, 3_500_000_000],
        );
        let rates = derive_rates(&series, TimeUnit::Nanoseconds).unwrap();

        let indices: Vec<usize> = rates.samples.iter().map(|s| s.frame_index).collect();
        let hz: Vec<f64> = rates.samples.iter().map(|s| s.rate_hz).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(hz, vec![1.0, 0.5, 2.0]);
        assert_eq!(rates.label, "cam");
    }

    #[test]
    fn test_sample_count_and_order() {
        let values: Vec<u64> = (0..50u64).map(|i| i * 33_333_333 + i % 3).collect();
        let series = TimestampSeries::nanoseconds("cam", values);
        let rates = derive_rates(&series, TimeUnit::Nanoseconds).unwrap();

        assert_eq!(rates.len(), 49);
        for (i, sample) in rates.samples.iter().enumerate() {
            assert_eq!(sample.frame_index, i + 1);
            assert!(sample.rate_hz.is_finite());
        }
    }

    #[test]
    fn test_short_series_is_empty() {
        for values in [vec![], vec![42u64]] {
            let series = TimestampSeries::nanoseconds("cam", values);
            let rates = derive_rates(&series, TimeUnit::Nanoseconds).unwrap();
            assert!(rates.is_empty());
        }

        let single = calendar("cam", &["2017-03-08T18:13:59.757956-08:00"]);
        assert!(derive_rates(&single, TimeUnit::CalendarMicroseconds).unwrap().is_empty());
    }

    #[test]
    fn test_zero_delta_is_error() {
        let series = TimestampSeries::nanoseconds("cam", vec![10, 20, 20, 30]);
        let err = derive_rates(&series, TimeUnit::Nanoseconds).unwrap_err();
        assert_eq!(
            err,
            RateError::InvalidInterval {
                source_key: "cam".to_string(),
                frame_index: 2,
                fault: IntervalFault::Zero,
            }
        );
    }

    #[test]
    fn test_negative_delta_is_error() {
        let series = TimestampSeries::nanoseconds("cam", vec![30, 20]);
        let err = derive_rates(&series, TimeUnit::Nanoseconds).unwrap_err();
        assert!(matches!(
            err,
            RateError::InvalidInterval {
                fault: IntervalFault::Negative,
                frame_index: 1,
                ..
            }
        ));

        let series = calendar("cam", &["2020-01-01T00:00:01Z", "2020-01-01T00:00:00Z"]);
        let err = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap_err();
        assert!(matches!(
            err,
            RateError::InvalidInterval {
                fault: IntervalFault::Negative,
                ..
            }
        ));
    }

    #[test]
    fn test_calendar_one_microsecond() {
        let series = calendar(
            "cam",
            &["2020-01-01T00:00:00.000000Z", "2020-01-01T00:00:00.000001Z"],
        );
        let rates = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap();
        assert_eq!(rates.samples[0].rate_hz, 1_000_000.0);
    }

    #[test]
    fn test_calendar_truncation_drops_whole_seconds() {
        let series = calendar(
            "cam",
            &["2020-01-01T00:00:00.000000Z", "2020-01-01T00:00:01.000001Z"],
        );
        let rates = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap();
        assert_eq!(rates.samples[0].rate_hz, 1_000_000.0);

        let full = derive_rates(&series, TimeUnit::CalendarFullPrecision).unwrap();
        assert!((full.samples[0].rate_hz - 1.0 / 1.000001).abs() < 1e-9);
    }

    #[test]
    fn test_calendar_whole_second_delta_is_zero_interval() {
        let series = calendar("cam", &["2020-01-01T00:00:00Z", "2020-01-01T00:00:02Z"]);
        let err = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap_err();
        assert!(matches!(
            err,
            RateError::InvalidInterval {
                fault: IntervalFault::Zero,
                ..
            }
        ));

        let full = derive_rates(&series, TimeUnit::CalendarFullPrecision).unwrap();
        assert_eq!(full.samples[0].rate_hz, 0.5);
    }

    #[test]
    fn test_calendar_truncates_to_microseconds() {
        // 900ns and 1100ns truncate to 0µs and 1µs.
        let series = calendar(
            "cam",
            &["2020-01-01T00:00:00.000000900Z", "2020-01-01T00:00:00.000001100Z"],
        );
        let rates = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap();
        assert_eq!(rates.samples[0].rate_hz, 1_000_000.0);
    }

    #[test]
    fn test_calendar_across_offsets() {
        let series = calendar(
            "cam",
            &["2017-03-08T18:13:59.900000-08:00", "2017-03-09T02:14:00.000000Z"],
        );
        let rates = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap();
        assert!((rates.samples[0].rate_hz - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_mismatch() {
        let series = TimestampSeries::nanoseconds("cam", vec![1, 2]);
        let err = derive_rates(&series, TimeUnit::CalendarMicroseconds).unwrap_err();
        assert!(matches!(err, RateError::UnitMismatch { found: "nanoseconds", .. }));
    }

    #[test]
    fn test_skip_policy_keeps_frame_indices() {
        let capture = Capture::new(
            TimestampSeries::nanoseconds("cam", vec![0, 100, 100, 300]),
            TimeUnit::Nanoseconds,
        );
        let deriver = RateDeriver::default();

        assert!(deriver.derive_with(&capture, IntervalPolicy::Abort).is_err());

        let rates = deriver.derive_with(&capture, IntervalPolicy::Skip).unwrap();
        let indices: Vec<usize> = rates.samples.iter().map(|s| s.frame_index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_derive_all_independent_sources() {
        let names = DisplayNames::new().with("21734321", "Left");
        let deriver = RateDeriver::new(names);
        let captures = vec![
            Capture::new(
                TimestampSeries::nanoseconds("21734321", vec![0, 500_000_000, 1_000_000_000]),
                TimeUnit::Nanoseconds,
            ),
            Capture::new(
                TimestampSeries::nanoseconds("22000001", vec![0, 250_000_000]),
                TimeUnit::Nanoseconds,
            ),
        ];

        let all = deriver.derive_all(&captures, IntervalPolicy::Abort).unwrap();
        assert_eq!(all.len(), 2);

        assert_eq!(all[0].label, "Left");
        assert_eq!(all[0].source_key, "21734321");
        assert_eq!(all[0].points(), vec![(1.0, 2.0), (2.0, 2.0)]);

        assert_eq!(all[1].label, "22000001");
        assert_eq!(all[1].points(), vec![(1.0, 4.0)]);
    }

    #[test]
    fn test_time_unit_from_str() {
        assert_eq!("ns".parse::<TimeUnit>().unwrap(), TimeUnit::Nanoseconds);
        assert_eq!(
            "calendar-microseconds".parse::<TimeUnit>().unwrap(),
            TimeUnit::CalendarMicroseconds
        );
        assert_eq!(
            "Calendar-Full".parse::<TimeUnit>().unwrap(),
            TimeUnit::CalendarFullPrecision
        );
        assert!("fortnights".parse::<TimeUnit>().is_err());
    }
}
