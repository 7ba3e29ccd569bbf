//! Commit record types

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Prefix git puts in front of tag names in `%D` output
const TAG_PREFIX: &str = "tag: ";
/// Separator git uses between `HEAD` and the checked-out branch in `%D` output
const HEAD_POINTER: &str = "HEAD -> ";

/// Represents one parsed commit from `git log`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit hash
    pub hash: String,
    /// Abbreviated hash as printed by git
    pub short_hash: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp, keeping the author's UTC offset
    pub author_date: DateTime<FixedOffset>,
    /// Committer name
    pub committer_name: String,
    /// Commit timestamp, keeping the committer's UTC offset
    pub commit_date: DateTime<FixedOffset>,
    /// First line of the commit message, trimmed
    pub subject: String,
    /// Remaining message lines joined by newlines (empty if none)
    pub body: String,
    /// Parent commit hashes, in order
    pub parent_hashes: Vec<String>,
    /// Branch, tag and HEAD labels pointing at this commit
    pub ref_names: Vec<String>,
    /// Aggregate diff statistics, if a summary was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CommitStats>,
    /// Per-file changes, present only when file detail was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_changes: Option<Vec<FileChange>>,
}

impl Commit {
    /// Validate that a hash is a full SHA-1 (40) or SHA-256 (64) hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        (sha.len() == 40 || sha.len() == 64) && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Check if this is a merge commit (has multiple parents)
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() > 1
    }

    /// Check if this is a root commit (has no parents)
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    /// Tag names pointing at this commit, without the `tag: ` prefix
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.ref_names
            .iter()
            .filter_map(|r| r.strip_prefix(TAG_PREFIX))
            .collect()
    }

    /// Branch names pointing at this commit
    ///
    /// Tags and a detached `HEAD` are left out; `HEAD -> main` yields `main`.
    #[must_use]
    pub fn branches(&self) -> Vec<&str> {
        self.ref_names
            .iter()
            .filter(|r| !r.starts_with(TAG_PREFIX) && r.as_str() != "HEAD")
            .map(|r| r.strip_prefix(HEAD_POINTER).unwrap_or(r))
            .collect()
    }

    /// Author date converted to UTC
    #[must_use]
    pub fn author_date_utc(&self) -> DateTime<Utc> {
        self.author_date.with_timezone(&Utc)
    }
}

/// Kind of change applied to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File was added
    Added,
    /// File content was modified
    Modified,
    /// File was deleted
    Deleted,
    /// File was renamed (possibly with modifications)
    Renamed,
    /// File was copied from another path
    Copied,
    /// File type changed (regular file, symlink, submodule)
    TypeChanged,
    /// Any other status code git reports
    Changed,
}

impl FileStatus {
    /// Map a git status code such as `M` or `R100` to a status
    ///
    /// Only the first character is significant; the digits after `R` and `C`
    /// are a similarity score.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => Self::Added,
            Some('M') => Self::Modified,
            Some('D') => Self::Deleted,
            Some('R') => Self::Renamed,
            Some('C') => Self::Copied,
            Some('T') => Self::TypeChanged,
            _ => Self::Changed,
        }
    }

    /// Derive a status from line counts alone
    #[must_use]
    pub fn from_counts(insertions: u64, deletions: u64) -> Self {
        match (insertions, deletions) {
            (i, 0) if i > 0 => Self::Added,
            (0, d) if d > 0 => Self::Deleted,
            _ => Self::Modified,
        }
    }

    /// Whether this status carries an origin path
    #[must_use]
    pub fn has_origin(self) -> bool {
        matches!(self, Self::Renamed | Self::Copied)
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
            Self::Copied => "Copied",
            Self::TypeChanged => "Type Changed",
            Self::Changed => "Changed",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Change status
    pub status: FileStatus,
    /// Current path of the file
    pub file_path: String,
    /// Origin path; empty unless the status is renamed or copied
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub old_path: String,
    /// Lines added (0 when unknown or binary)
    pub insertions: u64,
    /// Lines deleted (0 when unknown or binary)
    pub deletions: u64,
}

impl FileChange {
    /// Create a change without an origin path and with unknown counts
    #[must_use]
    pub fn new(status: FileStatus, file_path: impl Into<String>) -> Self {
        Self {
            status,
            file_path: file_path.into(),
            old_path: String::new(),
            insertions: 0,
            deletions: 0,
        }
    }

    /// Create a rename or copy from `old_path` to `file_path`
    #[must_use]
    pub fn moved(
        status: FileStatus,
        old_path: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            status,
            file_path: file_path.into(),
            old_path: old_path.into(),
            insertions: 0,
            deletions: 0,
        }
    }

    /// Set the line counts
    #[must_use]
    pub fn with_counts(mut self, insertions: u64, deletions: u64) -> Self {
        self.insertions = insertions;
        self.deletions = deletions;
        self
    }

    /// Status implied by the line counts, regardless of the declared status
    ///
    /// A pure rename reports zero counts and therefore derives `Modified`.
    #[must_use]
    pub fn derived_status(&self) -> FileStatus {
        FileStatus::from_counts(self.insertions, self.deletions)
    }
}

/// Aggregate diff statistics for one commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    /// Number of files changed
    pub files_changed: u64,
    /// Total lines added
    pub insertions: u64,
    /// Total lines deleted
    pub deletions: u64,
}

impl CommitStats {
    /// Sum per-file counts into an aggregate
    #[must_use]
    pub fn from_changes(changes: &[FileChange]) -> Self {
        changes.iter().fold(
            Self {
                files_changed: changes.len() as u64,
                ..Self::default()
            },
            |acc, change| Self {
                insertions: acc.insertions + change.insertions,
                deletions: acc.deletions + change.deletions,
                ..acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_commit() -> Commit {
        let date = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 17, 2, 33, 6)
            .unwrap();
        Commit {
            hash: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            short_hash: "1945ab9".to_string(),
            author_name: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            author_date: date,
            committer_name: "Test Author".to_string(),
            commit_date: date,
            subject: "feat(skills): add milestone-creator".to_string(),
            body: "Detailed description here.".to_string(),
            parent_hashes: vec!["c460aeb7fb2d109c17e43de0ce681faec0b7374d".to_string()],
            ref_names: vec![
                "HEAD -> main".to_string(),
                "tag: v1.0".to_string(),
                "origin/main".to_string(),
            ],
            stats: Some(CommitStats {
                files_changed: 2,
                insertions: 10,
                deletions: 1,
            }),
            file_changes: None,
        }
    }

    #[test]
    fn test_commit_serialization_roundtrip() {
        let commit = sample_commit();
        let json = serde_json::to_string(&commit).expect("serialize");
        let deserialized: Commit = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(commit, deserialized);
    }

    #[test]
    fn test_commit_json_omits_absent_file_changes() {
        let commit = sample_commit();
        let json = serde_json::to_string_pretty(&commit).expect("serialize");
        assert!(json.contains("\"hash\":"));
        assert!(json.contains("\"stats\":"));
        assert!(!json.contains("file_changes"));
        // chrono serializes to RFC 3339 and keeps the offset
        assert!(json.contains("2026-01-17T02:33:06+01:00"));
    }

    #[test]
    fn test_is_valid_sha() {
        assert!(Commit::is_valid_sha(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eb"
        ));
        assert!(Commit::is_valid_sha(&"a".repeat(64)));
        assert!(!Commit::is_valid_sha("1945ab9"));
        assert!(!Commit::is_valid_sha(
            "1945ab9c752534e733c38ba0109dc3b741f0a6eg"
        ));
        assert!(!Commit::is_valid_sha(""));
    }

    #[test]
    fn test_is_merge_and_root() {
        let mut commit = sample_commit();
        assert!(!commit.is_merge());
        assert!(!commit.is_root());

        commit.parent_hashes.push("b".repeat(40));
        assert!(commit.is_merge());

        commit.parent_hashes.clear();
        assert!(commit.is_root());
        assert!(!commit.is_merge());
    }

    #[test]
    fn test_tags_and_branches() {
        let commit = sample_commit();
        assert_eq!(commit.tags(), vec!["v1.0"]);
        assert_eq!(commit.branches(), vec!["main", "origin/main"]);
    }

    #[test]
    fn test_branches_skip_detached_head() {
        let mut commit = sample_commit();
        commit.ref_names = vec!["HEAD".to_string(), "feature".to_string()];
        assert_eq!(commit.branches(), vec!["feature"]);
        assert!(commit.tags().is_empty());
    }

    #[test]
    fn test_author_date_utc() {
        let commit = sample_commit();
        assert_eq!(
            commit.author_date_utc(),
            Utc.with_ymd_and_hms(2026, 1, 17, 1, 33, 6).unwrap()
        );
    }

    #[test]
    fn test_status_from_code() {
        assert_eq!(FileStatus::from_code("A"), FileStatus::Added);
        assert_eq!(FileStatus::from_code("M"), FileStatus::Modified);
        assert_eq!(FileStatus::from_code("D"), FileStatus::Deleted);
        assert_eq!(FileStatus::from_code("R100"), FileStatus::Renamed);
        assert_eq!(FileStatus::from_code("C075"), FileStatus::Copied);
        assert_eq!(FileStatus::from_code("T"), FileStatus::TypeChanged);
        assert_eq!(FileStatus::from_code("U"), FileStatus::Changed);
        assert_eq!(FileStatus::from_code(""), FileStatus::Changed);
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(FileStatus::from_counts(5, 0), FileStatus::Added);
        assert_eq!(FileStatus::from_counts(0, 3), FileStatus::Deleted);
        assert_eq!(FileStatus::from_counts(5, 2), FileStatus::Modified);
        assert_eq!(FileStatus::from_counts(0, 0), FileStatus::Modified);
    }

    #[test]
    fn test_derived_status_can_disagree_with_declared() {
        let rename = FileChange::moved(FileStatus::Renamed, "old.txt", "new.txt");
        assert_eq!(rename.status, FileStatus::Renamed);
        assert_eq!(rename.derived_status(), FileStatus::Modified);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(FileStatus::TypeChanged.to_string(), "Type Changed");
        assert!(FileStatus::Renamed.has_origin());
        assert!(FileStatus::Copied.has_origin());
        assert!(!FileStatus::Modified.has_origin());
    }

    #[test]
    fn test_stats_from_changes() {
        let changes = vec![
            FileChange::new(FileStatus::Modified, "a.rs").with_counts(5, 2),
            FileChange::new(FileStatus::Added, "b.rs").with_counts(10, 0),
            FileChange::new(FileStatus::Added, "logo.png"),
        ];
        assert_eq!(
            CommitStats::from_changes(&changes),
            CommitStats {
                files_changed: 3,
                insertions: 15,
                deletions: 2,
            }
        );
        assert_eq!(CommitStats::from_changes(&[]), CommitStats::default());
    }
}
