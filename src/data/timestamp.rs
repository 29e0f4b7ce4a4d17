//! Raw capture timestamps, one series per capture source.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Naive layouts accepted when a calendar value carries no UTC offset.
/// Such values are interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Timestamp values for one source, tagged with their representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamps {
    /// Device ticks in nanoseconds (e.g. pylon chunk timestamps).
    Nanoseconds(Vec<u64>),
    /// Wall-clock times with an offset.
    Calendar(Vec<DateTime<FixedOffset>>),
}

impl Timestamps {
    pub fn len(&self) -> usize {
        match self {
            Timestamps::Nanoseconds(values) => values.len(),
            Timestamps::Calendar(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the representation, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Timestamps::Nanoseconds(_) => "nanoseconds",
            Timestamps::Calendar(_) => "calendar",
        }
    }
}

/// An ordered sequence of capture timestamps from a single source.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampSeries {
    /// Identifier of the capture source (device serial, log file prefix, ...).
    pub source_key: String,
    pub timestamps: Timestamps,
}

impl TimestampSeries {
    pub fn nanoseconds(source_key: impl Into<String>, values: Vec<u64>) -> Self {
        Self {
            source_key: source_key.into(),
            timestamps: Timestamps::Nanoseconds(values),
        }
    }

    pub fn calendar(source_key: impl Into<String>, values: Vec<DateTime<FixedOffset>>) -> Self {
        Self {
            source_key: source_key.into(),
            timestamps: Timestamps::Calendar(values),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Parse a calendar timestamp such as `2017-03-08T18:13:59.757956934-08:00`.
///
/// RFC 3339 values keep their offset. Values without an offset are read
/// with [`NAIVE_FORMATS`] and pinned to UTC.
pub fn parse_calendar(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(s, format)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}
