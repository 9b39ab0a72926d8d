use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use itertools::Itertools;

use crate::models::BenchmarkData;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Issue {
    pub severity: Severity,
    /// Empty for issues that concern the whole file.
    pub suite: String,
    pub kind: IssueKind,
}

#[derive(Clone, PartialEq, Debug)]
pub enum IssueKind {
    DuplicateCommit { id: String },
    DuplicateBench { commit: String, name: String },
    EmptySuite,
    OutOfOrder { commit: String },
    UnitChanged { name: String, from: String, to: String },
    NonNumeric { commit: String, name: String },
    StaleLastUpdate,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::DuplicateCommit { .. } | IssueKind::DuplicateBench { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        if self.suite.is_empty() {
            write!(f, "{level}: ")?;
        } else {
            write!(f, "{level} [{}]: ", self.suite)?;
        }
        match &self.kind {
            IssueKind::DuplicateCommit { id } => write!(f, "commit {id} is recorded more than once"),
            IssueKind::DuplicateBench { commit, name } => {
                write!(f, "bench '{name}' appears more than once in commit {commit}")
            }
            IssueKind::EmptySuite => write!(f, "suite has no entries"),
            IssueKind::OutOfOrder { commit } => {
                write!(f, "entry for commit {commit} is dated before its predecessor")
            }
            IssueKind::UnitChanged { name, from, to } => {
                write!(f, "bench '{name}' changed unit from '{from}' to '{to}'")
            }
            IssueKind::NonNumeric { commit, name } => {
                write!(f, "bench '{name}' in commit {commit} has a non-numeric value")
            }
            IssueKind::StaleLastUpdate => write!(f, "lastUpdate is older than the newest entry"),
        }
    }
}

pub fn validate(data: &BenchmarkData) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut report = |suite: &str, kind: IssueKind| {
        issues.push(Issue {
            severity: kind.severity(),
            suite: suite.to_string(),
            kind,
        })
    };

    for (suite, entries) in &data.entries {
        if entries.is_empty() {
            report(suite, IssueKind::EmptySuite);
            continue;
        }

        for id in entries.iter().map(|e| &e.commit.id).duplicates() {
            report(suite, IssueKind::DuplicateCommit { id: id.clone() });
        }

        for (previous, entry) in entries.iter().tuple_windows() {
            if entry.date < previous.date {
                report(
                    suite,
                    IssueKind::OutOfOrder {
                        commit: entry.commit.id.clone(),
                    },
                );
            }
        }

        let mut units: HashMap<&str, &str> = HashMap::new();
        for entry in entries {
            let mut names = HashSet::new();
            for bench in &entry.benches {
                if !names.insert(bench.name.as_str()) {
                    report(
                        suite,
                        IssueKind::DuplicateBench {
                            commit: entry.commit.id.clone(),
                            name: bench.name.clone(),
                        },
                    );
                }
                if bench.value.as_f64().is_none() {
                    report(
                        suite,
                        IssueKind::NonNumeric {
                            commit: entry.commit.id.clone(),
                            name: bench.name.clone(),
                        },
                    );
                }
                if let Some(previous) = units.insert(&bench.name, &bench.unit) {
                    if previous != bench.unit {
                        report(
                            suite,
                            IssueKind::UnitChanged {
                                name: bench.name.clone(),
                                from: previous.to_string(),
                                to: bench.unit.clone(),
                            },
                        );
                    }
                }
            }
        }
    }

    if data.newest_date().is_some_and(|newest| newest > data.last_update) {
        report("", IssueKind::StaleLastUpdate);
    }

    issues
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|issue| issue.severity == Severity::Error)
}
