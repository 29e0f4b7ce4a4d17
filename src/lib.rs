//! # framescope
//!
//! Frame rate analysis for camera capture logs.
//!
//! Cameras stamp every grabbed frame. This crate turns those per-frame
//! timestamps into instantaneous frame rates (one sample per consecutive
//! pair of frames), labels one series per capture source, and renders the
//! result as a chart file, a JSON export or an interactive terminal view.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌───────────┐ │
//! │  │ source  │───▶│   data   │───▶│  chart   │───▶│ .svg/.html│ │
//! │  │ (input) │    │ (derive) │─┐  └──────────┘    └───────────┘ │
//! │  └─────────┘    └──────────┘ │  ┌──────────┐                  │
//! │   CsvSource                  ├─▶│  export  │───▶ .json        │
//! │   PylonLogSource             │  └──────────┘                  │
//! │                              │  ┌──────────┐                  │
//! │                              └─▶│ app + ui │───▶ Terminal     │
//! │                                 └──────────┘                  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Timestamp sources ([`TimestampSource`] trait) for CSV
//!   logs and pylon grab logs, plus file discovery and source keys
//! - **[`data`]**: Timestamp and rate models and the [`RateDeriver`]
//! - **[`pipeline`]**: Sources and deriver glued together ([`Pipeline`])
//! - **[`chart`]**: Self-contained SVG/HTML chart output
//! - **[`export`]**: JSON export of derived series
//! - **[`config`]**: Layered run [`Settings`]
//! - **[`app`]** / **[`ui`]**: Interactive terminal viewer built on ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Plot the nanosecond column of every CSV log in a directory
//! framescope /home/agridata/output --column timestamp2=nanoseconds
//!
//! # Pylon grab log, browse interactively
//! framescope --input-format pylon aca1300-6000.txt --tui
//! ```
//!
//! ### As a library
//!
//! ```
//! use framescope::{derive_rates, TimeUnit, TimestampSeries};
//!
//! let series = TimestampSeries::nanoseconds(
//!     "21734321",
//!     vec![0, 1_000_000_000, 3_000_000_000, 3_500_000_000],
//! );
//! let rates = derive_rates(&series, TimeUnit::Nanoseconds).unwrap();
//! let hz: Vec<f64> = rates.samples.iter().map(|s| s.rate_hz).collect();
//! assert_eq!(hz, vec![1.0, 0.5, 2.0]);
//! ```
//!
//! ### Several sources with display names
//!
//! ```
//! use framescope::{
//!     Capture, DisplayNames, IntervalPolicy, RateDeriver, TimeUnit, TimestampSeries,
//! };
//!
//! let names = DisplayNames::new().with("21734321", "Left camera");
//! let deriver = RateDeriver::new(names);
//! let captures = vec![
//!     Capture::new(TimestampSeries::nanoseconds("21734321", vec![0, 33_333_333]), TimeUnit::Nanoseconds),
//!     Capture::new(TimestampSeries::nanoseconds("21734322", vec![0, 40_000_000]), TimeUnit::Nanoseconds),
//! ];
//! let series = deriver.derive_all(&captures, IntervalPolicy::Skip).unwrap();
//! assert_eq!(series[0].label, "Left camera");
//! assert_eq!(series[1].label, "21734322");
//! ```

pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod pipeline;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use chart::{ChartFormat, ChartOptions};
pub use config::{InputFormat, Settings};
pub use data::{
    derive_rates, Capture, DisplayNames, FrameRateSample, IntervalFault, IntervalPolicy,
    RateDeriver, RateError, RateSeries, RateStats, TimeUnit, TimestampSeries, Timestamps,
};
pub use pipeline::Pipeline;
pub use source::{
    discover, source_key_from_path, CsvColumn, CsvSchema, CsvSource, PylonLogSource, SourceError,
    TimestampSource,
};
