//! Delulu Airport Codes
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! delulu-internals/airport-codes
//! An immutable reference set of recognized airport codes, loaded once and
//! queried case-insensitively.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Dataset compiled into the crate, `CODE -> airport name`.
const BUNDLED_AIRPORTS_JSON: &str = include_str!("../data/airports.json");

/// Errors raised while loading the airport dataset
#[derive(Debug, Error)]
pub enum AirportDataError {
    #[error("failed to read airport dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed airport dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("airport dataset is empty")]
    Empty,
    #[error("invalid airport code in dataset: {0:?}")]
    InvalidCode(String),
}

/// Accepted on-disk layouts: `{"HAN": "Noi Bai ..."}` or `["HAN", "DAD"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDataset {
    Named(BTreeMap<String, String>),
    Codes(Vec<String>),
}

/// Read-only set of airport codes.
///
/// Codes are stored upper-cased; every lookup folds ASCII case first, so
/// `han`, `Han` and `HAN` all resolve to the same entry.
#[derive(Clone, Debug, Default)]
pub struct AirportDirectory {
    airports: BTreeMap<String, Option<String>>,
}

impl AirportDirectory {
    /// Load the dataset bundled with the crate
    pub fn bundled() -> Result<Self, AirportDataError> {
        Self::from_json_str(BUNDLED_AIRPORTS_JSON)
    }

    /// Load a dataset from a JSON file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AirportDataError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AirportDataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Parse a dataset from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self, AirportDataError> {
        let entries: Vec<(String, Option<String>)> = match serde_json::from_str(json)? {
            RawDataset::Named(map) => map
                .into_iter()
                .map(|(code, name)| (code, Some(name)))
                .collect(),
            RawDataset::Codes(codes) => codes.into_iter().map(|code| (code, None)).collect(),
        };
        Self::from_entries(entries)
    }

    /// Build a directory from bare codes
    pub fn from_codes<I, S>(codes: I) -> Result<Self, AirportDataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(codes.into_iter().map(|code| (code.into(), None)))
    }

    fn from_entries(
        entries: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Result<Self, AirportDataError> {
        let mut airports = BTreeMap::new();
        for (code, name) in entries {
            let trimmed = code.trim();
            if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(AirportDataError::InvalidCode(code));
            }
            airports.insert(trimmed.to_ascii_uppercase(), name);
        }
        if airports.is_empty() {
            return Err(AirportDataError::Empty);
        }
        Ok(Self { airports })
    }

    /// Case-insensitive membership check
    pub fn contains(&self, code: &str) -> bool {
        self.airports.contains_key(&code.trim().to_ascii_uppercase())
    }

    /// Display name of an airport, when the dataset provides one
    pub fn name(&self, code: &str) -> Option<&str> {
        self.airports
            .get(&code.trim().to_ascii_uppercase())
            .and_then(|name| name.as_deref())
    }

    /// Upper-cased codes in lexicographic order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.airports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}
