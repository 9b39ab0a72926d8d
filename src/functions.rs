pub mod append_entry;
pub mod compare_runs;
pub mod history;
pub mod merge_snapshots;
pub mod validate;

pub use append_entry::{append_entry, new_entry, AppendOutcome};
pub use compare_runs::{
    compare, compare_commit, compare_latest, find_entry, Comparison, CommitRef, RunComparison,
};
pub use history::{bench_names, history, Point};
pub use merge_snapshots::merge_snapshots;
pub use validate::{has_errors, validate, Issue, IssueKind, Severity};
