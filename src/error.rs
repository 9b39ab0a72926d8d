use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while reading, editing or writing benchmark data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("data file contains no payload after the assignment")]
    MissingPayload,

    #[error("suite '{0}' does not exist")]
    UnknownSuite(String),

    #[error("suite '{0}' has no entries")]
    EmptySuite(String),

    #[error("no entry in suite '{suite}' matches commit '{commit}'")]
    UnknownCommit { suite: String, commit: String },

    #[error("commit prefix '{prefix}' is ambiguous: {candidates:?}")]
    AmbiguousCommit {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("snapshots belong to different repositories: '{expected}' and '{found}'")]
    RepoMismatch { expected: String, found: String },

    #[error("at least one snapshot is required")]
    NoSnapshots,

    #[error("an entry needs at least one bench")]
    EmptyBenches,

    #[error("bench '{0}' appears more than once in the entry")]
    DuplicateBench(String),

    #[error("line {line}: cannot read '{value}' as {expected}")]
    BadValue {
        line: usize,
        value: String,
        expected: &'static str,
    },

    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
