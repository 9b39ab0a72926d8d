use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{models::BenchmarkData, Result};

/// One value of a bench over time.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct Point {
    pub commit: String,
    pub summary: String,
    #[serde(with = "crate::models::timestamp")]
    pub date: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
}

/// The series of `bench` across the entries of `suite`, oldest first.
/// Entries without the bench, or with a non-numeric value, are skipped.
pub fn history(data: &BenchmarkData, suite: &str, bench: &str) -> Result<Vec<Point>> {
    let entries = data.suite(suite)?;
    Ok(entries
        .iter()
        .filter_map(|entry| {
            let measured = entry.bench(bench)?;
            Some(Point {
                commit: entry.commit.id.clone(),
                summary: entry.commit.summary().to_string(),
                date: entry.date,
                value: measured.value.as_f64()?,
                unit: measured.unit.clone(),
            })
        })
        .collect())
}

/// Distinct bench names of a suite in first-seen order.
pub fn bench_names<'a>(data: &'a BenchmarkData, suite: &str) -> Result<Vec<&'a str>> {
    let entries = data.suite(suite)?;
    Ok(entries
        .iter()
        .flat_map(|entry| entry.benches.iter().map(|bench| bench.name.as_str()))
        .unique()
        .collect())
}
