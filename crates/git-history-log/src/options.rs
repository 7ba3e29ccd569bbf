//! Building the argument lists for `git log` and the per-commit detail query

use serde::{Deserialize, Serialize};

/// Character separating the fields of a header record
pub const FIELD_SEPARATOR: char = '|';

/// Pretty-format template for the header record of each commit
///
/// Eleven fields: full hash, short hash, author name, author email, author
/// date, committer name, commit date, subject, body, parent hashes and ref
/// names. The trailing `%n` leaves a blank line between the header record
/// and the diff output that follows it.
pub const HEADER_FORMAT: &str = "%H|%h|%an|%ae|%ad|%cn|%cd|%s|%b|%P|%D%n";

/// How merge commits are filtered
///
/// Merges-only and no-merges are variants of one enum, so a single set of
/// options can never ask for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeFilter {
    /// Include merge and non-merge commits
    #[default]
    All,
    /// Only merge commits (`--merges`)
    MergesOnly,
    /// Only non-merge commits (`--no-merges`)
    NoMerges,
}

impl MergeFilter {
    /// Build a filter from the two command-line booleans
    ///
    /// Returns `None` when both are set.
    #[must_use]
    pub fn from_flags(merges_only: bool, no_merges: bool) -> Option<Self> {
        match (merges_only, no_merges) {
            (true, true) => None,
            (true, false) => Some(Self::MergesOnly),
            (false, true) => Some(Self::NoMerges),
            (false, false) => Some(Self::All),
        }
    }

    fn flag(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::MergesOnly => Some("--merges"),
            Self::NoMerges => Some("--no-merges"),
        }
    }
}

/// Filter configuration for one history query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Maximum number of commits (None = unlimited)
    pub limit: Option<usize>,
    /// Author substring or pattern
    pub author: Option<String>,
    /// Only commits more recent than this date expression
    pub since: Option<String>,
    /// Only commits older than this date expression
    pub until: Option<String>,
    /// Branch, tag or other revision to start from (defaults to HEAD)
    pub branch: Option<String>,
    /// Merge commit filter
    pub merges: MergeFilter,
    /// Request per-file status lines and per-commit detail counts
    pub file_changes: bool,
}

impl LogOptions {
    /// Create options for the N most recent commits
    #[must_use]
    pub fn latest(n: usize) -> Self {
        Self {
            limit: Some(n),
            ..Default::default()
        }
    }

    /// Set the limit from a signed count, where zero or less means unlimited
    #[must_use]
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = usize::try_from(limit).ok().filter(|n| *n > 0);
        self
    }

    /// Enable per-file change detail
    #[must_use]
    pub fn with_file_changes(mut self) -> Self {
        self.file_changes = true;
        self
    }

    /// Filter by author
    #[must_use]
    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    /// Only include commits since a git date expression (e.g. "2 weeks ago")
    #[must_use]
    pub fn since(mut self, date: &str) -> Self {
        self.since = Some(date.to_string());
        self
    }

    /// Only include commits until a git date expression
    #[must_use]
    pub fn until(mut self, date: &str) -> Self {
        self.until = Some(date.to_string());
        self
    }

    /// Start from this branch or revision
    #[must_use]
    pub fn branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    /// Set the merge filter
    #[must_use]
    pub fn merges(mut self, filter: MergeFilter) -> Self {
        self.merges = filter;
        self
    }

    /// Arguments for the primary `git log` query
    ///
    /// The header format, strict ISO dates and `--stat` are always present so
    /// the output shape stays stable. Empty filter strings are treated as
    /// unset.
    #[must_use]
    pub fn log_args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            format!("--pretty=format:{HEADER_FORMAT}"),
            "--date=iso-strict".to_string(),
            "--stat".to_string(),
        ];

        if self.file_changes {
            args.push("--name-status".to_string());
        }
        if let Some(limit) = self.limit {
            args.push(format!("--max-count={limit}"));
        }
        if let Some(author) = non_empty(&self.author) {
            args.push(format!("--author={author}"));
        }
        if let Some(since) = non_empty(&self.since) {
            args.push(format!("--since={since}"));
        }
        if let Some(until) = non_empty(&self.until) {
            args.push(format!("--until={until}"));
        }
        if let Some(flag) = self.merges.flag() {
            args.push(flag.to_string());
        }
        // `--` keeps a branch name from being read as a path
        if let Some(branch) = non_empty(&self.branch) {
            args.push(branch.to_string());
            args.push("--".to_string());
        }

        args
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Arguments for the numeric per-file detail query of a single commit
#[must_use]
pub fn detail_args(hash: &str) -> Vec<String> {
    vec![
        "show".to_string(),
        "--numstat".to_string(),
        "--pretty=format:".to_string(),
        hash.to_string(),
    ]
}
