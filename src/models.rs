use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub mod benchmark;
pub mod measurement;
pub mod run;

pub use benchmark::{BenchmarkImproves, Tool};
pub use measurement::{Bench, BenchValue};
pub use run::{short_id, BenchmarkEntry, Commit, Person};

/// The whole content of a `data.js` file: every tool suite and its history.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkData {
    #[serde(with = "timestamp")]
    pub last_update: DateTime<Utc>,
    pub repo_url: String,
    pub entries: BTreeMap<String, Vec<BenchmarkEntry>>,
}

impl BenchmarkData {
    pub fn new(repo_url: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            last_update: now,
            repo_url: repo_url.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn suite(&self, name: &str) -> Result<&[BenchmarkEntry]> {
        self.entries
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownSuite(name.to_string()))
    }

    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries over all suites.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// The most recent `date` recorded in any suite.
    pub fn newest_date(&self) -> Option<DateTime<Utc>> {
        self.entries.values().flatten().map(|entry| entry.date).max()
    }
}

/// Epoch-millisecond timestamps, as written by the dashboard tooling.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp {millis} is out of range")))
    }
}
