//! Log file discovery and source key derivation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::SourceError;

/// Expand input paths into a list of log files.
///
/// Directories contribute their direct children whose extension matches
/// `extension` (case-insensitive), sorted by file name. Plain files are kept
/// as given, even when their extension differs. A path that does not exist
/// is an error.
pub fn discover(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();

    for path in paths {
        let metadata = fs::metadata(path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;

        if !metadata.is_dir() {
            files.push(path.clone());
            continue;
        }

        let entries = fs::read_dir(path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;

        let mut found: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_extension(p, extension))
            .collect();
        found.sort();

        debug!(dir = %path.display(), files = found.len(), "Discovered log files");
        files.extend(found);
    }

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

/// Derive a source key from a log file name.
///
/// The key is the part of the file stem before the first `separator`, e.g.
/// `d3cd6a96_2017-03-08T18:13:59.txt` gives `d3cd6a96`. Without a separator
/// the whole stem is used.
pub fn source_key_from_path(path: &Path, separator: char) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.split_once(separator) {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => stem,
    }
}
