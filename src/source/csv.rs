//! CSV timestamp logs.
//!
//! Reads comma-separated capture logs with a header row. The columns to
//! read are declared up front in a [`CsvSchema`] and checked against the
//! header before any row is parsed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::file::source_key_from_path;
use super::{SourceError, TimestampSource};
use crate::data::timestamp::parse_calendar;
use crate::data::{Capture, TimeUnit, TimestampSeries, Timestamps};

/// A timestamp column and the unit convention of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvColumn {
    /// Header name of the column.
    pub name: String,
    #[serde(default)]
    pub unit: TimeUnit,
}

impl CsvColumn {
    pub fn new(name: impl Into<String>, unit: TimeUnit) -> Self {
        Self {
            name: name.into(),
            unit,
        }
    }
}

/// The timestamp columns a CSV log must provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsvSchema {
    pub columns: Vec<CsvColumn>,
}

impl CsvSchema {
    pub fn new(columns: Vec<CsvColumn>) -> Self {
        Self { columns }
    }

    /// Schema with a single timestamp column.
    pub fn single(name: impl Into<String>, unit: TimeUnit) -> Self {
        Self::new(vec![CsvColumn::new(name, unit)])
    }
}

/// A timestamp source reading one or more CSV logs.
///
/// Each file yields one capture per schema column. The source key is
/// derived from the file name (see [`source_key_from_path`]); with several
/// columns it is suffixed with `/<column>`.
#[derive(Debug)]
pub struct CsvSource {
    files: Vec<PathBuf>,
    schema: CsvSchema,
    separator: char,
    description: String,
}

impl CsvSource {
    pub fn new(files: Vec<PathBuf>, schema: CsvSchema, separator: char) -> Self {
        let description = match files.as_slice() {
            [single] => format!("csv: {}", single.display()),
            _ => format!("csv: {} files", files.len()),
        };
        Self {
            files,
            schema,
            separator,
            description,
        }
    }

    pub fn schema(&self) -> &CsvSchema {
        &self.schema
    }

    fn load_file(&self, path: &Path) -> Result<Vec<Capture>, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_key = source_key_from_path(path, self.separator);
        parse_csv(path, &content, &file_key, &self.schema)
    }
}

impl TimestampSource for CsvSource {
    fn load(&self) -> Result<Vec<Capture>, SourceError> {
        let mut captures = Vec::new();
        for path in &self.files {
            let loaded = self.load_file(path)?;
            info!(
                file = %path.display(),
                series = loaded.len(),
                "Loaded CSV log"
            );
            captures.extend(loaded);
        }
        Ok(captures)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Split one row on commas. Double-quoted fields may contain commas, and a
/// doubled quote inside them stands for a literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Parse CSV content against `schema`.
///
/// `path` is only used for error messages.
pub(crate) fn parse_csv(
    path: &Path,
    content: &str,
    file_key: &str,
    schema: &CsvSchema,
) -> Result<Vec<Capture>, SourceError> {
    let parse_error = |line: usize, message: String| SourceError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(parse_error(1, "missing header row".to_string()));
    };
    let header = split_fields(header_line);

    // Resolve every column before reading rows so a bad schema fails fast.
    let mut indices = Vec::with_capacity(schema.columns.len());
    let mut values = Vec::with_capacity(schema.columns.len());
    for column in &schema.columns {
        let index = header.iter().position(|h| *h == column.name).ok_or_else(|| {
            SourceError::MissingColumn {
                path: path.to_path_buf(),
                column: column.name.clone(),
                available: header.join(", "),
            }
        })?;
        indices.push(index);
        values.push(match column.unit {
            TimeUnit::Nanoseconds => Timestamps::Nanoseconds(Vec::new()),
            TimeUnit::CalendarMicroseconds | TimeUnit::CalendarFullPrecision => {
                Timestamps::Calendar(Vec::new())
            }
        });
    }

    for (line_no, line) in lines {
        let fields = split_fields(line);
        for ((column, &index), timestamps) in
            schema.columns.iter().zip(&indices).zip(values.iter_mut())
        {
            let field = fields.get(index).ok_or_else(|| {
                parse_error(
                    line_no,
                    format!("expected {} fields, found {}", header.len(), fields.len()),
                )
            })?;

            match timestamps {
                Timestamps::Nanoseconds(v) => {
                    let ticks = field.parse::<u64>().map_err(|e| {
                        parse_error(
                            line_no,
                            format!("column '{}': invalid nanoseconds '{}': {}", column.name, field, e),
                        )
                    })?;
                    v.push(ticks);
                }
                Timestamps::Calendar(v) => {
                    let dt = parse_calendar(field).ok_or_else(|| {
                        parse_error(
                            line_no,
                            format!("column '{}': invalid timestamp '{}'", column.name, field),
                        )
                    })?;
                    v.push(dt);
                }
            }
        }
    }

    let multi = schema.columns.len() > 1;
    let captures: Vec<Capture> = schema
        .columns
        .iter()
        .zip(values)
        .map(|(column, timestamps)| {
            let source_key = if multi {
                format!("{}/{}", file_key, column.name)
            } else {
                file_key.to_string()
            };
            debug!(source = %source_key, frames = timestamps.len(), "Parsed column");
            Capture::new(
                TimestampSeries {
                    source_key,
                    timestamps,
                },
                column.unit,
            )
        })
        .collect();

    Ok(captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LOG: &str = "\
Timestamp,timestamp2,exposure
2017-03-08T18:13:59.757956934-08:00,1000000000,500

2017-03-08T18:13:59.791290-08:00,1033333333,500
";

    fn two_columns() -> CsvSchema {
        CsvSchema::new(vec![
            CsvColumn::new("Timestamp", TimeUnit::CalendarMicroseconds),
            CsvColumn::new("timestamp2", TimeUnit::Nanoseconds),
        ])
    }

    #[test]
    fn test_parse_two_columns() {
        let captures = parse_csv(Path::new("log.csv"), LOG, "d3cd6a96", &two_columns()).unwrap();
        assert_eq!(captures.len(), 2);

        assert_eq!(captures[0].series.source_key, "d3cd6a96/Timestamp");
        assert_eq!(captures[0].unit, TimeUnit::CalendarMicroseconds);
        assert!(matches!(captures[0].series.timestamps, Timestamps::Calendar(ref v) if v.len() == 2));

        assert_eq!(captures[1].series.source_key, "d3cd6a96/timestamp2");
        assert_eq!(
            captures[1].series.timestamps,
            Timestamps::Nanoseconds(vec![1_000_000_000, 1_033_333_333])
        );
    }

    #[test]
    fn test_single_column_uses_file_key() {
        let schema = CsvSchema::single("timestamp2", TimeUnit::Nanoseconds);
        let captures = parse_csv(Path::new("log.csv"), LOG, "d3cd6a96", &schema).unwrap();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].series.source_key, "d3cd6a96");
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let schema = CsvSchema::single("frame_ts", TimeUnit::Nanoseconds);
        let err = parse_csv(Path::new("log.csv"), LOG, "k", &schema).unwrap_err();
        match err {
            SourceError::MissingColumn {
                column, available, ..
            } => {
                assert_eq!(column, "frame_ts");
                assert_eq!(available, "Timestamp, timestamp2, exposure");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_value_reports_line() {
        let content = "timestamp2\n100\nabc\n";
        let schema = CsvSchema::single("timestamp2", TimeUnit::Nanoseconds);
        let err = parse_csv(Path::new("log.csv"), content, "k", &schema).unwrap_err();
        assert!(matches!(err, SourceError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_short_row() {
        let content = "a,b\n1,2\n3\n";
        let schema = CsvSchema::single("b", TimeUnit::Nanoseconds);
        let err = parse_csv(Path::new("log.csv"), content, "k", &schema).unwrap_err();
        assert!(err.to_string().contains("expected 2 fields, found 1"));
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(
            split_fields(r#" "Timestamp, local" ,timestamp2,"say ""hi""""#),
            vec!["Timestamp, local", "timestamp2", r#"say "hi""#]
        );

        let content = "\"Timestamp, local\",timestamp2\n\"2024-05-01 10:00:00\",0\n\"2024-05-01 10:00:01\",1000000000\n";
        let schema = CsvSchema::single("timestamp2", TimeUnit::Nanoseconds);
        let captures = parse_csv(Path::new("cam_1.csv"), content, "cam", &schema).unwrap();
        assert_eq!(
            captures[0].series.timestamps,
            Timestamps::Nanoseconds(vec![0, 1_000_000_000])
        );
    }

    #[test]
    fn test_empty_file() {
        let schema = CsvSchema::single("b", TimeUnit::Nanoseconds);
        let err = parse_csv(Path::new("log.csv"), "\n\n", "k", &schema).unwrap_err();
        assert!(err.to_string().contains("missing header row"));
    }

    #[test]
    fn test_source_loads_files() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", LOG).unwrap();

        let source = CsvSource::new(vec![file.path().to_path_buf()], two_columns(), '_');
        assert!(source.description().starts_with("csv: "));

        let captures = source.load().unwrap();
        assert_eq!(captures.len(), 2);
    }

    #[test]
    fn test_source_missing_file() {
        let source = CsvSource::new(
            vec![PathBuf::from("/nonexistent/log.csv")],
            two_columns(),
            '_',
        );
        assert!(matches!(source.load(), Err(SourceError::Io { .. })));
    }
}
