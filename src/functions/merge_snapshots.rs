use std::collections::{hash_map::Entry, HashMap};

use tracing::{debug, info};

use crate::{
    models::BenchmarkData,
    Error, Result,
};

/// Fold cumulative rolling exports of the same data file into one history.
///
/// Entries are unioned per suite by commit id. For a commit recorded more
/// than once the entry with the later `date` wins, ties going to the later
/// snapshot. Each merged suite is ordered by `date`.
pub fn merge_snapshots(snapshots: impl IntoIterator<Item = BenchmarkData>) -> Result<BenchmarkData> {
    let mut snapshots = snapshots.into_iter().peekable();
    let first = snapshots.peek().ok_or(Error::NoSnapshots)?;
    let mut merged = BenchmarkData::new(first.repo_url.clone(), first.last_update);
    let mut seen: HashMap<String, HashMap<String, usize>> = HashMap::new();

    for snapshot in snapshots {
        if snapshot.repo_url != merged.repo_url {
            return Err(Error::RepoMismatch {
                expected: merged.repo_url,
                found: snapshot.repo_url,
            });
        }
        merged.last_update = merged.last_update.max(snapshot.last_update);

        for (suite, entries) in snapshot.entries {
            let target = merged.entries.entry(suite.clone()).or_default();
            let index = seen.entry(suite.clone()).or_default();

            for entry in entries {
                match index.entry(entry.commit.id.clone()) {
                    Entry::Occupied(slot) => {
                        let existing = &mut target[*slot.get()];
                        if entry.date >= existing.date {
                            debug!(suite = %suite, commit = %entry.commit.id, "newer duplicate replaces earlier one");
                            *existing = entry;
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(target.len());
                        target.push(entry);
                    }
                }
            }
        }
    }

    for entries in merged.entries.values_mut() {
        entries.sort_by_key(|entry| entry.date);
    }

    info!(
        suites = merged.entries.len(),
        entries = merged.entry_count(),
        "merged snapshots"
    );
    Ok(merged)
}
