//! JSON export of derived rate series.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::data::{RateSeries, RateStats};

/// Build the export document: a summary block plus every series with its
/// statistics and samples.
pub fn to_json(series: &[RateSeries]) -> Value {
    let total_samples: usize = series.iter().map(RateSeries::len).sum();
    let empty = series.iter().filter(|s| s.is_empty()).count();

    let entries: Vec<Value> = series
        .iter()
        .map(|s| {
            json!({
                "source_key": s.source_key,
                "label": s.label,
                "stats": RateStats::from_series(s),
                "samples": s.samples,
            })
        })
        .collect();

    json!({
        "summary": {
            "total_series": series.len(),
            "empty_series": empty,
            "total_samples": total_samples,
        },
        "series": entries,
    })
}

/// Write the export document to `path` as pretty-printed JSON.
pub fn write_json(path: &Path, series: &[RateSeries]) -> Result<()> {
    let json = serde_json::to_string_pretty(&to_json(series))?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FrameRateSample;
    use tempfile::TempDir;

    fn sample_series() -> Vec<RateSeries> {
        vec![
            RateSeries {
                source_key: "21734321".to_string(),
                label: "Left".to_string(),
                samples: vec![
                    FrameRateSample {
                        frame_index: 1,
                        rate_hz: 30.0,
                    },
                    FrameRateSample {
                        frame_index: 2,
                        rate_hz: 15.0,
                    },
                ],
            },
            RateSeries::empty("22000001", "22000001"),
        ]
    }

    #[test]
    fn test_export_structure() {
        let doc = to_json(&sample_series());
        assert_eq!(doc["summary"]["total_series"], 2);
        assert_eq!(doc["summary"]["empty_series"], 1);
        assert_eq!(doc["summary"]["total_samples"], 2);

        let first = &doc["series"][0];
        assert_eq!(first["label"], "Left");
        assert_eq!(first["stats"]["count"], 2);
        assert_eq!(first["stats"]["max_hz"], 30.0);
        assert_eq!(first["samples"][1]["frame_index"], 2);

        assert!(doc["series"][1]["stats"].is_null());
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.json");
        write_json(&path, &sample_series()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["series"][0]["source_key"], "21734321");
    }
}
