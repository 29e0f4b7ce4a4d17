//! Timestamp source abstraction for loading capture logs.
//!
//! This module provides a trait-based abstraction for reading per-frame
//! capture timestamps from different log formats (CSV exports, pylon grab
//! logs) and for discovering log files on disk.

mod csv;
mod file;
mod pylon;

pub use self::csv::{CsvColumn, CsvSchema, CsvSource};
pub use file::{discover, source_key_from_path};
pub use pylon::PylonLogSource;

use std::fmt::Debug;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::Capture;

/// Errors that can occur while loading timestamps.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("Read error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header.
    #[error("{path}: missing column '{column}' (available: {available})")]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: String,
    },

    /// A line could not be interpreted.
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Trait for loading capture timestamps from various log formats.
///
/// Each call to [`load`](TimestampSource::load) reads the underlying files
/// afresh and returns one [`Capture`] per capture source found, in a stable
/// order.
///
/// # Example
///
/// ```no_run
/// use framescope::{CsvSchema, CsvSource, TimestampSource, TimeUnit};
///
/// let schema = CsvSchema::single("timestamp2", TimeUnit::Nanoseconds);
/// let source = CsvSource::new(vec!["camera.csv".into()], schema, '_');
/// let captures = source.load().unwrap();
/// println!("Loaded {} series", captures.len());
/// ```
pub trait TimestampSource: Debug {
    /// Load every timestamp series this source knows about.
    fn load(&self) -> Result<Vec<Capture>, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
