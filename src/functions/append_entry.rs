use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    models::{Bench, BenchmarkData, BenchmarkEntry, Commit, Tool},
    Error, Result,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppendOutcome {
    Inserted { trimmed: usize },
    Replaced { trimmed: usize },
}

impl AppendOutcome {
    pub fn trimmed(&self) -> usize {
        match self {
            AppendOutcome::Inserted { trimmed } | AppendOutcome::Replaced { trimmed } => *trimmed,
        }
    }
}

pub fn new_entry(
    commit: Commit,
    tool: Tool,
    benches: Vec<Bench>,
    date: DateTime<Utc>,
) -> Result<BenchmarkEntry> {
    if benches.is_empty() {
        return Err(Error::EmptyBenches);
    }
    if let Some(name) = benches.iter().map(|b| &b.name).duplicates().next() {
        return Err(Error::DuplicateBench(name.clone()));
    }

    Ok(BenchmarkEntry {
        commit,
        date,
        tool,
        benches,
    })
}

/// Upsert `entry` into `suite`, keyed by commit id, then drop the oldest
/// entries until at most `max_items` remain.
pub fn append_entry(
    data: &mut BenchmarkData,
    suite: &str,
    entry: BenchmarkEntry,
    max_items: Option<NonZeroUsize>,
    now: DateTime<Utc>,
) -> AppendOutcome {
    let commit = entry.commit.id.clone();
    let entries = data.entries.entry(suite.to_string()).or_default();

    let replaced = match entries.iter().position(|e| e.commit.id == commit) {
        Some(index) => {
            warn!(suite, commit = %commit, "replacing existing entry for commit");
            entries[index] = entry;
            true
        }
        None => {
            entries.push(entry);
            false
        }
    };

    let trimmed = match max_items {
        Some(max) if entries.len() > max.get() => {
            let excess = entries.len() - max.get();
            entries.drain(..excess);
            warn!(suite, trimmed = excess, max_items = max.get(), "trimmed oldest entries");
            excess
        }
        _ => 0,
    };

    data.last_update = now;
    info!(suite, commit = %commit, entries = entries.len(), "recorded benchmark entry");

    if replaced {
        AppendOutcome::Replaced { trimmed }
    } else {
        AppendOutcome::Inserted { trimmed }
    }
}
