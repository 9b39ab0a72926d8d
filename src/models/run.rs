use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::{benchmark::BenchmarkImproves, measurement::Bench, timestamp, Tool};

/// One recorded measurement set tied to a single commit.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct BenchmarkEntry {
    pub commit: Commit,

    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,

    pub tool: Tool,

    pub benches: Vec<Bench>,
}

impl BenchmarkEntry {
    pub fn bench(&self, name: &str) -> Option<&Bench> {
        self.benches.iter().find(|bench| bench.name == name)
    }

    pub fn improves(&self) -> BenchmarkImproves {
        self.tool.improves()
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Commit {
    pub author: Person,
    pub committer: Person,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    pub id: String,
    pub message: String,
    /// ISO-8601 as reported by GitHub, kept verbatim.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_id: Option<String>,
    pub url: String,
}

impl Commit {
    pub fn committed_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// The seven-character abbreviation of a commit id.
pub fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::fixtures;

    #[test]
    fn commit_accessors() {
        let commit = fixtures::commit("4a201aeed18f6450fbb200e7fa6a1827e72658a8");
        assert_eq!(commit.short_id(), "4a201ae");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(commit.summary(), "commit 4a201aeed18f6450fbb200e7fa6a1827e72658a8");
        assert_eq!(
            commit.committed_at().unwrap(),
            Utc.with_ymd_and_hms(2023, 2, 17, 22, 53, 18).unwrap()
        );
    }

    #[test]
    fn pull_request_commits_omit_optional_fields() {
        let commit: Commit = serde_json::from_str(
            r#"{"author":{"name":"Owen Shepherd","username":"414owen"},
                "committer":{"name":"GitHub"},
                "id":"abc","message":"wip","timestamp":"2023-03-11T12:07:12Z",
                "url":"https://github.com/414owen/lang-c/pull/1/commits/abc"}"#,
        )
        .unwrap();
        assert_eq!(commit.distinct, None);
        assert_eq!(commit.tree_id, None);
        assert_eq!(commit.committer.email, None);

        let json = serde_json::to_value(&commit).unwrap();
        assert!(json.get("distinct").is_none());
        assert!(json.get("tree_id").is_none());
        assert!(json["author"].get("email").is_none());
    }
}
