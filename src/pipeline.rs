//! Source loading and derivation glued together.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Settings;
use crate::data::{Capture, IntervalPolicy, RateDeriver, RateSeries};
use crate::source::TimestampSource;

/// Loads captures from a set of sources and derives their frame rates.
///
/// Holds everything needed to re-run the analysis, so the viewer can reload
/// the logs in place.
#[derive(Debug)]
pub struct Pipeline {
    sources: Vec<Box<dyn TimestampSource>>,
    deriver: RateDeriver,
    policy: IntervalPolicy,
    description: String,
}

impl Pipeline {
    pub fn new(
        sources: Vec<Box<dyn TimestampSource>>,
        deriver: RateDeriver,
        policy: IntervalPolicy,
    ) -> Self {
        let description = sources
            .iter()
            .map(|s| s.description())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            sources,
            deriver,
            policy,
            description,
        }
    }

    /// Build a pipeline from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let sources = settings.sources().context("Failed to discover input files")?;
        Ok(Self::new(
            sources,
            RateDeriver::new(settings.display_names.clone()),
            settings.policy,
        ))
    }

    /// Human-readable list of the sources.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Read every source, in order.
    pub fn load(&self) -> Result<Vec<Capture>> {
        let mut captures = Vec::new();
        for source in &self.sources {
            let loaded = source
                .load()
                .with_context(|| format!("Failed to load {}", source.description()))?;
            captures.extend(loaded);
        }
        Ok(captures)
    }

    /// Load and derive all series.
    pub fn run(&self) -> Result<Vec<RateSeries>> {
        let captures = self.load()?;
        let series = self
            .deriver
            .derive_all(&captures, self.policy)
            .context("Failed to derive frame rates")?;
        info!(
            series = series.len(),
            samples = series.iter().map(RateSeries::len).sum::<usize>(),
            "Derived frame rates"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DisplayNames, TimeUnit, TimestampSeries};
    use crate::source::SourceError;

    #[derive(Debug)]
    struct FixedSource(Vec<Capture>);

    impl TimestampSource for FixedSource {
        fn load(&self) -> Result<Vec<Capture>, SourceError> {
            Ok(self.0.clone())
        }

        fn description(&self) -> &str {
            "fixed"
        }
    }

    fn capture(key: &str, values: Vec<u64>) -> Capture {
        Capture::new(TimestampSeries::nanoseconds(key, values), TimeUnit::Nanoseconds)
    }

    #[test]
    fn test_run_preserves_source_order() {
        let pipeline = Pipeline::new(
            vec![
                Box::new(FixedSource(vec![capture("b", vec![0, 10])])),
                Box::new(FixedSource(vec![capture("a", vec![0, 20, 40])])),
            ],
            RateDeriver::new(DisplayNames::new().with("a", "Camera A")),
            IntervalPolicy::Abort,
        );
        assert_eq!(pipeline.description(), "fixed, fixed");

        let series = pipeline.run().unwrap();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "Camera A"]);
        assert_eq!(series[1].len(), 2);
    }

    #[test]
    fn test_run_reports_invalid_interval() {
        let pipeline = Pipeline::new(
            vec![Box::new(FixedSource(vec![capture("a", vec![5, 5])]))],
            RateDeriver::default(),
            IntervalPolicy::Abort,
        );
        let err = pipeline.run().unwrap_err();
        assert!(format!("{err:#}").contains("zero interval at frame 1"));
    }
}
