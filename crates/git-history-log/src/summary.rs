//! Repository-level aggregates and commit grouping

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::commit::Commit;

/// Totals for one author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
    /// Number of commits
    pub commits: usize,
    /// Lines added across commits with stats
    pub insertions: u64,
    /// Lines deleted across commits with stats
    pub deletions: u64,
}

/// Aggregates over a commit sequence (newest first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    /// Number of commits
    pub total_commits: usize,
    /// Distinct authors, keyed by name and email
    pub total_authors: usize,
    /// Author date of the oldest commit (last in sequence)
    pub first_commit: Option<DateTime<FixedOffset>>,
    /// Author date of the newest commit (first in sequence)
    pub last_commit: Option<DateTime<FixedOffset>>,
    /// Sum of files changed over commits with stats
    pub files_changed: u64,
    /// Sum of insertions over commits with stats
    pub insertions: u64,
    /// Sum of deletions over commits with stats
    pub deletions: u64,
    /// Per-author totals, most commits first, then by name
    pub authors: Vec<AuthorStats>,
}

impl RepoStats {
    /// Compute aggregates for `commits`
    #[must_use]
    pub fn from_commits(commits: &[Commit]) -> Self {
        let mut authors: Vec<AuthorStats> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut stats = Self {
            total_commits: commits.len(),
            first_commit: commits.last().map(|c| c.author_date),
            last_commit: commits.first().map(|c| c.author_date),
            ..Self::default()
        };

        for commit in commits {
            let key = (commit.author_name.as_str(), commit.author_email.as_str());
            let slot = *index.entry(key).or_insert_with(|| {
                authors.push(AuthorStats {
                    name: commit.author_name.clone(),
                    email: commit.author_email.clone(),
                    commits: 0,
                    insertions: 0,
                    deletions: 0,
                });
                authors.len() - 1
            });

            let author = &mut authors[slot];
            author.commits += 1;
            if let Some(s) = commit.stats {
                author.insertions += s.insertions;
                author.deletions += s.deletions;
                stats.files_changed += s.files_changed;
                stats.insertions += s.insertions;
                stats.deletions += s.deletions;
            }
        }

        authors.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
        stats.total_authors = authors.len();
        stats.authors = authors;
        stats
    }
}

/// Commits sharing one calendar day of their author date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a> {
    /// Day in the author's own UTC offset
    pub date: NaiveDate,
    /// Commits on that day, in sequence order
    pub commits: Vec<&'a Commit>,
}

/// Commits by one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorGroup<'a> {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
    /// The author's commits, in sequence order
    pub commits: Vec<&'a Commit>,
}

/// Group commits by author date, in first-appearance order
#[must_use]
pub fn group_by_date(commits: &[Commit]) -> Vec<DateGroup<'_>> {
    let mut groups: Vec<DateGroup<'_>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    for commit in commits {
        let date = commit.author_date.date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            groups.push(DateGroup {
                date,
                commits: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].commits.push(commit);
    }
    groups
}

/// Group commits by author name and email, in first-appearance order
#[must_use]
pub fn group_by_author(commits: &[Commit]) -> Vec<AuthorGroup<'_>> {
    let mut groups: Vec<AuthorGroup<'_>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for commit in commits {
        let key = (commit.author_name.as_str(), commit.author_email.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(AuthorGroup {
                name: commit.author_name.clone(),
                email: commit.author_email.clone(),
                commits: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].commits.push(commit);
    }
    groups
}
