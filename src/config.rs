//! Run configuration.
//!
//! Settings are layered, lowest priority first:
//!
//! 1. built-in defaults (`default_config.toml`)
//! 2. an optional TOML file
//! 3. `FRAMESCOPE_*` environment variables (`__` separates nested keys)
//!
//! Command line flags are applied on top by the binary.
//!
//! ```toml
//! inputs = ["/home/agridata/output"]
//! policy = "skip"
//!
//! [[columns]]
//! name = "Timestamp"
//! unit = "calendar-microseconds"
//!
//! [[columns]]
//! name = "timestamp2"
//! unit = "nanoseconds"
//!
//! [display_names]
//! d3cd6a96 = "Row unit 3"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartFormat, ChartOptions};
use crate::data::{DisplayNames, IntervalPolicy};
use crate::source::{
    discover, CsvColumn, CsvSchema, CsvSource, PylonLogSource, SourceError, TimestampSource,
};

const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");
const ENV_PREFIX: &str = "FRAMESCOPE";

/// Environment overrides such as `FRAMESCOPE_KEY_SEPARATOR=-`,
/// `FRAMESCOPE_CHART__TITLE=...` or `FRAMESCOPE_INPUTS=a.csv,b.csv`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("inputs")
}

/// Log format of the input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Timestamp tables with a header row.
    #[default]
    Csv,
    /// Pylon multi-camera grab logs.
    Pylon,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "pylon" => Ok(InputFormat::Pylon),
            other => Err(format!("unknown input format: {}", other)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => f.write_str("csv"),
            InputFormat::Pylon => f.write_str("pylon"),
        }
    }
}

/// Everything a run needs, passed down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log files or directories.
    pub inputs: Vec<PathBuf>,
    pub input_format: InputFormat,
    /// Extension of files picked up from directories.
    pub extension: String,
    /// Source keys are the file name prefix before this separator.
    pub key_separator: String,
    /// CSV timestamp columns.
    pub columns: Vec<CsvColumn>,
    pub policy: IntervalPolicy,
    /// Chart output path.
    pub output: Option<PathBuf>,
    /// Chart format; inferred from `output` when unset.
    pub format: Option<ChartFormat>,
    /// Optional JSON export path.
    pub export: Option<PathBuf>,
    pub chart: ChartOptions,
    pub display_names: DisplayNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            input_format: InputFormat::Csv,
            extension: "csv".to_string(),
            key_separator: "_".to_string(),
            columns: vec![CsvColumn::new("timestamp2", Default::default())],
            policy: IntervalPolicy::Abort,
            output: Some(PathBuf::from("comparison.html")),
            format: None,
            export: None,
            chart: ChartOptions::default(),
            display_names: DisplayNames::default(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder
            .add_source(env)
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to parse config: {e}"))
    }

    /// Parse settings from a TOML string layered over the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to parse config: {e}"))
    }

    /// The separator character used for source keys.
    pub fn separator(&self) -> char {
        self.key_separator.chars().next().unwrap_or('_')
    }

    /// Chart format: explicit setting, else the output extension, else HTML.
    pub fn chart_format(&self) -> ChartFormat {
        self.format
            .or_else(|| self.output.as_deref().and_then(ChartFormat::from_path))
            .unwrap_or_default()
    }

    pub fn schema(&self) -> CsvSchema {
        CsvSchema::new(self.columns.clone())
    }

    /// Build the timestamp sources for the configured inputs.
    pub fn sources(&self) -> Result<Vec<Box<dyn TimestampSource>>, SourceError> {
        let extension = match self.input_format {
            InputFormat::Csv => self.extension.as_str(),
            // Grab logs are plain text regardless of the CSV extension.
            InputFormat::Pylon if self.extension == "csv" => "txt",
            InputFormat::Pylon => self.extension.as_str(),
        };
        let files = discover(&self.inputs, extension)?;

        Ok(match self.input_format {
            InputFormat::Csv => {
                vec![Box::new(CsvSource::new(files, self.schema(), self.separator()))]
            }
            InputFormat::Pylon => files
                .into_iter()
                .map(|f| Box::new(PylonLogSource::new(f)) as Box<dyn TimestampSource>)
                .collect(),
        })
    }
}
