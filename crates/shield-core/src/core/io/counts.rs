//! Named entry counts produced by the histogram reducer.
//!
//! The reduced artifact is a delimited table with a `name,entries` header,
//! one row per declared histogram. Counts are queryable by name; a missing
//! name is a hard error for the trial that expected it.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CountsError {
    #[error("reduced output is missing expected histogram '{name}'")]
    MissingHistogram { name: String },

    #[error("malformed counts table: {source}")]
    Malformed {
        #[from]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CountRow {
    name: String,
    entries: u64,
}

/// Scalar entry counts keyed by histogram name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamedCounts {
    entries: HashMap<String, u64>,
}

impl NamedCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `name,entries` table from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, CountsError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = HashMap::new();
        for row in csv_reader.deserialize() {
            let row: CountRow = row?;
            entries.insert(row.name, row.entries);
        }
        Ok(Self { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, count: u64) {
        self.entries.insert(name.into(), count);
    }

    /// Look up a count, reporting the missing name on failure.
    pub fn get(&self, name: &str) -> Result<u64, CountsError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| CountsError::MissingHistogram {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_entries_table() {
        let table = "name,entries\nNPhotons_DRIFT_1_total,12345\nNPhotons_eAper,67\n";
        let counts = NamedCounts::from_reader(table.as_bytes()).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("NPhotons_DRIFT_1_total").unwrap(), 12345);
        assert_eq!(counts.get("NPhotons_eAper").unwrap(), 67);
    }

    #[test]
    fn missing_name_is_reported_with_the_name() {
        let counts = NamedCounts::new();
        let err = counts.get("NPhotons_pAper").unwrap_err();
        assert!(matches!(
            err,
            CountsError::MissingHistogram { name } if name == "NPhotons_pAper"
        ));
    }

    #[test]
    fn malformed_entries_fail_to_parse() {
        let table = "name,entries\nNPhotons_eAper,not-a-number\n";
        assert!(NamedCounts::from_reader(table.as_bytes()).is_err());
    }
}
