use itertools::Itertools;
use serde::Serialize;

use crate::{
    models::{BenchmarkData, BenchmarkEntry, BenchmarkImproves, Commit},
    Error, Result,
};

/// One bench of an entry set against the same bench of the entry before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub name: String,
    pub unit: String,
    pub value: f64,
    pub previous: Option<f64>,
    pub improves: BenchmarkImproves,
    pub threshold: f64,
}

impl Comparison {
    pub fn diff(&self) -> Option<f64> {
        self.previous.map(|previous| self.value - previous)
    }

    /// How many times worse the new value is; above 1 is a regression.
    pub fn ratio(&self) -> Option<f64> {
        let previous = self.previous?;
        let (numerator, denominator) = match self.improves {
            BenchmarkImproves::Down => (self.value, previous),
            BenchmarkImproves::Up => (previous, self.value),
        };
        (denominator != 0.0).then(|| numerator / denominator)
    }

    pub fn improved(&self) -> bool {
        let Some(diff) = self.diff() else {
            return true;
        };
        (match (diff >= 0.0, &self.improves) {
            (true, BenchmarkImproves::Up) => true,
            (true, BenchmarkImproves::Down) => false,
            (false, BenchmarkImproves::Up) => false,
            (false, BenchmarkImproves::Down) => true,
        }) || diff == 0.0
    }

    pub fn is_alert(&self) -> bool {
        self.ratio().is_some_and(|ratio| ratio > self.threshold)
    }

    pub fn status_text(&self) -> &str {
        if self.previous.is_none() {
            "NEW"
        } else if self.improved() {
            "IMPROVED"
        } else {
            "DECLINED"
        }
    }

    pub fn percent_change(&self) -> Option<f64> {
        let previous = self.previous.filter(|previous| *previous != 0.0)?;
        Some((self.value - previous) / previous)
    }

    pub fn percent_change_text(&self) -> String {
        match self.percent_change() {
            Some(change) => format!("{:+.02} %", change * 100.0),
            None => "-".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRef {
    pub id: String,
    pub summary: String,
    pub url: String,
}

impl From<&Commit> for CommitRef {
    fn from(commit: &Commit) -> Self {
        Self {
            id: commit.id.clone(),
            summary: commit.summary().to_string(),
            url: commit.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunComparison {
    pub suite: String,
    pub current: CommitRef,
    pub previous: Option<CommitRef>,
    pub threshold: f64,
    pub benchmarks: Vec<Comparison>,
}

impl RunComparison {
    pub fn alerts(&self) -> impl Iterator<Item = &Comparison> {
        self.benchmarks.iter().filter(|benchmark| benchmark.is_alert())
    }

    pub fn has_alerts(&self) -> bool {
        self.alerts().next().is_some()
    }
}

/// Benches of `current` in order, each paired with its value in `previous`.
/// Benches with non-numeric values are left out.
pub fn compare(
    current: &BenchmarkEntry,
    previous: Option<&BenchmarkEntry>,
    threshold: f64,
) -> Vec<Comparison> {
    let improves = current.improves();
    current
        .benches
        .iter()
        .filter_map(|new| {
            let value = new.value.as_f64()?;
            let previous = previous
                .and_then(|p| p.bench(&new.name))
                .and_then(|old| old.value.as_f64());
            Some(Comparison {
                name: new.name.clone(),
                unit: new.unit.clone(),
                value,
                previous,
                improves,
                threshold,
            })
        })
        .collect()
}

/// Find the entry whose commit id starts with `prefix`.
pub fn find_entry<'a>(
    data: &'a BenchmarkData,
    suite: &str,
    prefix: &str,
) -> Result<(usize, &'a BenchmarkEntry)> {
    let entries = data.suite(suite)?;
    let candidates = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.commit.id.starts_with(prefix))
        .collect_vec();

    let ids = candidates
        .iter()
        .map(|(_, entry)| entry.commit.id.clone())
        .unique()
        .collect_vec();
    if ids.len() > 1 {
        return Err(Error::AmbiguousCommit {
            prefix: prefix.to_string(),
            candidates: ids,
        });
    }
    // A commit recorded twice resolves to its latest entry.
    candidates
        .last()
        .copied()
        .ok_or_else(|| Error::UnknownCommit {
            suite: suite.to_string(),
            commit: prefix.to_string(),
        })
}

pub fn compare_latest(data: &BenchmarkData, suite: &str, threshold: f64) -> Result<RunComparison> {
    let entries = data.suite(suite)?;
    if entries.is_empty() {
        return Err(Error::EmptySuite(suite.to_string()));
    }
    Ok(compare_at(suite, entries, entries.len() - 1, threshold))
}

pub fn compare_commit(
    data: &BenchmarkData,
    suite: &str,
    prefix: &str,
    threshold: f64,
) -> Result<RunComparison> {
    let (index, _) = find_entry(data, suite, prefix)?;
    Ok(compare_at(suite, data.suite(suite)?, index, threshold))
}

fn compare_at(suite: &str, entries: &[BenchmarkEntry], index: usize, threshold: f64) -> RunComparison {
    let current = &entries[index];
    let previous = index.checked_sub(1).map(|i| &entries[i]);
    RunComparison {
        suite: suite.to_string(),
        current: CommitRef::from(&current.commit),
        previous: previous.map(|p| CommitRef::from(&p.commit)),
        threshold,
        benchmarks: compare(current, previous, threshold),
    }
}
