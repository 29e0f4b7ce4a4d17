//! Data models and frame rate derivation.
//!
//! This module turns raw capture timestamps into labelled frame rate series
//! suitable for plotting.
//!
//! ## Submodules
//!
//! - [`timestamp`]: Raw timestamp series ([`TimestampSeries`]) and calendar parsing
//! - [`rate`]: Frame rate derivation ([`RateDeriver`], [`derive_rates`])
//! - [`names`]: Static source key to display name table ([`DisplayNames`])
//! - [`stats`]: Per-series summaries ([`RateStats`])
//! - [`duration`]: Formatting of intervals and rates for display
//!
//! ## Data Flow
//!
//! ```text
//! TimestampSeries + TimeUnit (Capture)
//!        │
//!        ▼
//! RateDeriver::derive_all()  ◀── DisplayNames, IntervalPolicy
//!        │
//!        ▼
//! Vec<RateSeries> ──▶ chart / export / ui
//! ```

pub mod duration;
pub mod names;
pub mod rate;
pub mod stats;
pub mod timestamp;

pub use names::DisplayNames;
pub use rate::{
    derive_rates, Capture, FrameRateSample, IntervalFault, IntervalPolicy, RateDeriver, RateError,
    RateSeries, TimeUnit,
};
pub use stats::RateStats;
pub use timestamp::{TimestampSeries, Timestamps};
