//! Static lookup from source keys to human-readable series labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps a source key (device serial, log prefix) to its display name.
///
/// Lookups never fail: an unmapped key is displayed as itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayNames(BTreeMap<String, String>);

impl DisplayNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert(key, name);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, name: impl Into<String>) {
        self.0.insert(key.into(), name.into());
    }

    /// Resolve the label for `key`, falling back to the key itself.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.0.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for DisplayNames {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mapped_and_fallback() {
        let names = DisplayNames::new().with("21734321", "Left camera");
        assert_eq!(names.resolve("21734321"), "Left camera");
        assert_eq!(names.resolve("22000001"), "22000001");
    }

    #[test]
    fn test_deserialize_from_table() {
        let names: DisplayNames =
            serde_json::from_str(r#"{"d3cd6a96": "Row unit 3"}"#).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.resolve("d3cd6a96"), "Row unit 3");
    }
}
