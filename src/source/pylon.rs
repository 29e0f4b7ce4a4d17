//! Basler pylon grab logs.
//!
//! The multi-camera grab sample prints a camera header followed by one
//! chunk timestamp line per grabbed frame:
//!
//! ```text
//! Using device acA1300-60gc (21734321)
//! Camera 0: acA1300-60gc (21734321)
//! GrabSucceeded: 1
//! Timestamp: 4519003344
//! Camera 1: acA1300-60gc (21734322)
//! Timestamp: 4519101520
//! ```
//!
//! Frames are attributed to the most recent `Camera ...:` line.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{SourceError, TimestampSource};
use crate::data::{Capture, TimeUnit, TimestampSeries};

/// Model prefix of Basler ace cameras, where the camera name starts.
const CAMERA_PREFIX: &str = "acA";

/// A timestamp source reading a pylon grab log.
///
/// Produces one nanosecond capture per camera, in first-seen order.
#[derive(Debug)]
pub struct PylonLogSource {
    path: PathBuf,
    description: String,
}

impl PylonLogSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("pylon: {}", path.display());
        Self { path, description }
    }

    /// Returns the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimestampSource for PylonLogSource {
    fn load(&self) -> Result<Vec<Capture>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let captures = parse_pylon_log(&self.path, &content)?;
        info!(
            file = %self.path.display(),
            cameras = captures.len(),
            "Loaded pylon log"
        );
        Ok(captures)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Parse the content of a grab log.
pub(crate) fn parse_pylon_log(path: &Path, content: &str) -> Result<Vec<Capture>, SourceError> {
    let mut cameras: Vec<(String, Vec<u64>)> = Vec::new();
    let mut current: Option<usize> = None;

    for (i, line) in content.lines().enumerate() {
        if line.contains("Camera") && line.contains(':') {
            if let Some(start) = line.find(CAMERA_PREFIX) {
                let name = line[start..].trim_end().to_string();
                let index = match cameras.iter().position(|(n, _)| *n == name) {
                    Some(index) => index,
                    None => {
                        debug!(camera = %name, "Found camera");
                        cameras.push((name, Vec::new()));
                        cameras.len() - 1
                    }
                };
                current = Some(index);
            }
        }

        if line.contains("Timestamp") {
            let parse_error = |message: String| SourceError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                message,
            };
            let ticks = first_number(line).ok_or_else(|| {
                parse_error(format!("invalid timestamp line '{}'", line.trim()))
            })?;
            let index =
                current.ok_or_else(|| parse_error("timestamp before any camera line".to_string()))?;
            cameras[index].1.push(ticks);
        }
    }

    Ok(cameras
        .into_iter()
        .map(|(name, ticks)| {
            Capture::new(TimestampSeries::nanoseconds(name, ticks), TimeUnit::Nanoseconds)
        })
        .collect())
}

/// First run of ASCII digits in `line`, `None` when absent or out of range.
fn first_number(line: &str) -> Option<u64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits = &line[start..];
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse().ok()
}
