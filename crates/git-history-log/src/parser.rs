// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! `git log` output parsing
//!
//! The output of the primary query interleaves four kinds of content with no
//! section markers: header records, message body lines, the aggregate
//! `--stat` summary and `--name-status` lines. [`LogParser`] tells them apart
//! by line shape and by an explicit [`ParseState`], one line at a time.
//!
//! # Example
//!
//! ```
//! use git_history_log::parser::parse_log;
//!
//! let output = "\
//! 1945ab9c752534e733c38ba0109dc3b741f0a6eb|1945ab9|Ann|ann@example.com|2026-01-17T02:33:06+00:00|Ann|2026-01-17T02:33:06+00:00|Add parser||c460aeb7fb2d109c17e43de0ce681faec0b7374d|HEAD -> main
//!
//!  src/parser.rs | 12 ++++++++++--
//!  1 file changed, 10 insertions(+), 2 deletions(-)
//! ";
//! let commits = parse_log(output, false);
//! assert_eq!(commits.len(), 1);
//! assert_eq!(commits[0].subject, "Add parser");
//! assert_eq!(commits[0].stats.map(|s| s.insertions), Some(10));
//! ```

use std::borrow::Cow;
use std::str::Lines;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, trace};

use crate::commit::{Commit, CommitStats, FileChange, FileStatus};
use crate::options::FIELD_SEPARATOR;

/// Separators in a complete header record (eleven fields)
const HEADER_SEPARATORS: usize = 10;
/// Fields up to and including the subject
const LEADING_FIELDS: usize = 8;
/// Separator between a path and its change bar in `--stat` lines
const DIFFSTAT_SEPARATOR: char = '|';

/// Where the parser is within the current commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Collecting message body lines
    Body,
    /// Past the body: collecting the stat summary and per-file status lines
    StatsOrFiles,
}

/// Parse the complete output of the primary `git log` query
///
/// Never fails: lines that do not fit the expected shapes are skipped.
#[must_use]
pub fn parse_log(output: &str, with_files: bool) -> Vec<Commit> {
    let mut parser = LogParser::new(with_files);
    for line in LogicalLines::new(output) {
        parser.push_line(&line);
    }
    let commits = parser.finish();
    debug!(count = commits.len(), "parsed git log output");
    commits
}

/// Line-at-a-time state machine over `git log` output
///
/// Feed it logical lines (see [`LogicalLines`]) with [`LogParser::push_line`]
/// and collect the commits with [`LogParser::finish`].
#[derive(Debug)]
pub struct LogParser {
    with_files: bool,
    state: ParseState,
    pending: Option<PendingCommit>,
    commits: Vec<Commit>,
}

#[derive(Debug)]
struct PendingCommit {
    commit: Commit,
    body_lines: Vec<String>,
    files: Vec<FileChange>,
    /// Set once the summary line is seen; later status lines are ignored
    files_done: bool,
}

impl LogParser {
    /// Create a parser; `with_files` enables per-file status collection
    #[must_use]
    pub fn new(with_files: bool) -> Self {
        Self {
            with_files,
            state: ParseState::Body,
            pending: None,
            commits: Vec::new(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Classify and consume one logical line
    pub fn push_line(&mut self, line: &str) {
        if let Some((commit, body_lines)) = parse_header(line) {
            self.finalize_pending();
            trace!(hash = %commit.hash, "header record");
            self.pending = Some(PendingCommit {
                commit,
                body_lines,
                files: Vec::new(),
                files_done: false,
            });
            self.state = ParseState::Body;
            return;
        }

        let Some(pending) = self.pending.as_mut() else {
            trace!(line, "skipping line before first header");
            return;
        };
        let blank = line.trim().is_empty();

        if self.state == ParseState::Body {
            if blank {
                if !pending.body_lines.is_empty() {
                    self.state = ParseState::StatsOrFiles;
                }
                return;
            }
            // A commit without a body goes straight from header to diff output
            if !(pending.body_lines.is_empty() && is_diff_output(line)) {
                pending.body_lines.push(line.to_string());
                return;
            }
            self.state = ParseState::StatsOrFiles;
        }

        if blank {
            return;
        }
        if is_summary_line(line) {
            if pending.commit.stats.is_none() {
                pending.commit.stats = parse_stat_summary(line);
            }
            pending.files_done = true;
        } else if self.with_files && !pending.files_done {
            match parse_name_status_line(line) {
                Some(change) => pending.files.push(change),
                None => trace!(line, "skipping non-status line"),
            }
        } else {
            trace!(line, "skipping stat line");
        }
    }

    /// Finalize the last commit and return all commits in input order
    #[must_use]
    pub fn finish(mut self) -> Vec<Commit> {
        self.finalize_pending();
        self.commits
    }

    fn finalize_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let mut commit = pending.commit;
            commit.body = pending.body_lines.join("\n");
            commit.file_changes = self.with_files.then_some(pending.files);
            self.commits.push(commit);
        }
    }
}

// ============================================================================
// Header records
// ============================================================================

/// Iterator over logical lines of `git log` output
///
/// `%b` expands to a newline-terminated body, so the header record of a
/// commit with a message body spans several physical lines and ends on a
/// line of the form `|<parent hashes>|<ref names>`. A line that opens a
/// record is joined (with `\n`) to the following lines up to the last such
/// closing line before the next record. If there is none, the opening line
/// is yielded on its own.
#[derive(Debug, Clone)]
pub struct LogicalLines<'a> {
    lines: Lines<'a>,
}

impl<'a> LogicalLines<'a> {
    /// Iterate over the logical lines of `output`
    #[must_use]
    pub fn new(output: &'a str) -> Self {
        Self {
            lines: output.lines(),
        }
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        if !opens_record(line) {
            return Some(Cow::Borrowed(line));
        }

        // The last closing line before the next record wins: body text may
        // itself look like a tail, diff output never does
        let mut lookahead = self.lines.clone();
        let mut following = Vec::new();
        let mut closed = None;
        while let Some(next) = lookahead.next() {
            if opens_record(next) {
                break;
            }
            following.push(next);
            if is_closing_line(next) {
                closed = Some((following.len(), lookahead.clone()));
            }
        }

        if let Some((count, rest)) = closed {
            self.lines = rest;
            let mut record = line.to_string();
            for next in &following[..count] {
                record.push('\n');
                record.push_str(next);
            }
            return Some(Cow::Owned(record));
        }
        if !is_header_line(line) {
            trace!(line, "unterminated header record");
        }
        Some(Cow::Borrowed(line))
    }
}

/// Whether a line is a complete single-line header record
///
/// A commit without a message body renders as
/// `<hash>|<short>|...|<subject>||<parents>|<refs>`: at least ten separators,
/// a hash-like first field, a short hash that prefixes it, an empty body
/// field and a parent field made only of full hashes.
#[must_use]
pub fn is_header_line(line: &str) -> bool {
    if line.contains('\n') || separator_count(line) < HEADER_SEPARATORS || !has_hash_prefix(line) {
        return false;
    }
    let mut tail = line.rsplitn(4, FIELD_SEPARATOR);
    let (_refs, parents, body) = (tail.next(), tail.next(), tail.next());
    matches!((parents, body, tail.next()), (Some(parents), Some(""), Some(_)) if is_parent_list(parents))
}

/// Whether a line starts a header record: hash-like leading fields and
/// enough separators for the fields before the body
fn opens_record(line: &str) -> bool {
    separator_count(line) >= LEADING_FIELDS && has_hash_prefix(line)
}

/// Whether a line is the `|<parents>|<refs>` tail of a multi-line record
fn is_closing_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix(FIELD_SEPARATOR) else {
        return false;
    };
    match rest.split_once(FIELD_SEPARATOR) {
        Some((parents, refs)) => !refs.contains(FIELD_SEPARATOR) && is_parent_list(parents),
        None => false,
    }
}

/// Whether a record is a complete header, on one line or several
fn is_header_record(record: &str) -> bool {
    match (record.split_once('\n'), record.rsplit_once('\n')) {
        (Some((first, _)), Some((_, last))) => opens_record(first) && is_closing_line(last),
        _ => is_header_line(record),
    }
}

fn separator_count(line: &str) -> usize {
    line.matches(FIELD_SEPARATOR).count()
}

fn has_hash_prefix(line: &str) -> bool {
    let mut fields = line.splitn(3, FIELD_SEPARATOR);
    match (fields.next(), fields.next()) {
        (Some(hash), Some(short)) => {
            is_hash_like(hash) && is_hash_like(short) && hash.starts_with(short)
        }
        _ => false,
    }
}

/// `%P`: empty for a root commit, otherwise full hashes separated by spaces
fn is_parent_list(field: &str) -> bool {
    field.is_empty() || field.split(' ').all(is_full_hash)
}

fn is_hash_like(s: &str) -> bool {
    (4..=64).contains(&s.len()) && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_full_hash(s: &str) -> bool {
    matches!(s.len(), 40 | 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a header record into a commit and its initial body lines
///
/// The fields up to the commit date are split from the left and the parents
/// and refs from the right. On a single-line record everything in between is
/// the subject. On a multi-line record the subject ends at the first
/// separator of the opening line and the rest is the body.
fn parse_header(record: &str) -> Option<(Commit, Vec<String>)> {
    if !is_header_record(record) {
        return None;
    }

    let mut leading = record.splitn(LEADING_FIELDS, FIELD_SEPARATOR);
    let mut fields = [""; LEADING_FIELDS - 1];
    for field in &mut fields {
        *field = leading.next()?;
    }
    let mut trailing = leading.next()?.rsplitn(3, FIELD_SEPARATOR);
    let refs = trailing.next()?;
    let parents = trailing.next()?;
    let message = trailing.next()?;
    let (subject, body) = if record.contains('\n') {
        message.split_once(FIELD_SEPARATOR)?
    } else {
        (message.strip_suffix(FIELD_SEPARATOR)?, "")
    };

    let [
        hash,
        short_hash,
        author_name,
        author_email,
        author_date,
        committer_name,
        commit_date,
    ] = fields;

    let commit = Commit {
        hash: hash.to_string(),
        short_hash: short_hash.to_string(),
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        author_date: parse_date(author_date),
        committer_name: committer_name.to_string(),
        commit_date: parse_date(commit_date),
        subject: subject.trim().to_string(),
        body: String::new(),
        parent_hashes: parents.split_whitespace().map(str::to_string).collect(),
        ref_names: parse_ref_names(refs),
        stats: None,
        file_changes: None,
    };
    Some((commit, body_lines(body)))
}

fn body_lines(body: &str) -> Vec<String> {
    let body = body.trim();
    if body.is_empty() {
        return Vec::new();
    }
    body.lines().map(|l| l.trim_end().to_string()).collect()
}

/// Parse an ISO-8601 strict date, falling back to the Unix epoch
#[must_use]
pub fn parse_date(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value.trim()).unwrap_or_else(|err| {
        trace!(value, %err, "unparseable date");
        DateTime::<Utc>::default().fixed_offset()
    })
}

/// Split a `%D` ref field into trimmed, non-empty names in source order
#[must_use]
pub fn parse_ref_names(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Stat and status lines
// ============================================================================

/// Whether a line has the shape of the `--stat` summary line
#[must_use]
pub fn is_summary_line(line: &str) -> bool {
    !line.contains(DIFFSTAT_SEPARATOR)
        && (line.contains("files changed")
            || line.contains("file changed")
            || line.contains("insertion")
            || line.contains("deletion"))
}

/// Parse a summary such as `3 files changed, 10 insertions(+), 2 deletions(-)`
///
/// Each clause is optional and singular or plural wording is accepted.
/// Returns `None` when no clause can be read.
#[must_use]
pub fn parse_stat_summary(line: &str) -> Option<CommitStats> {
    let mut stats = CommitStats::default();
    let mut matched = false;

    for clause in line.split(',') {
        let mut words = clause.split_whitespace();
        let (Some(count), Some(keyword)) = (words.next(), words.next()) else {
            continue;
        };
        let Ok(count) = count.parse::<u64>() else {
            continue;
        };
        if keyword.starts_with("file") {
            stats.files_changed = count;
        } else if keyword.starts_with("insertion") {
            stats.insertions = count;
        } else if keyword.starts_with("deletion") {
            stats.deletions = count;
        } else {
            continue;
        }
        matched = true;
    }

    matched.then_some(stats)
}

/// Whether a token is a git status code: one uppercase letter, then digits
fn is_status_code(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_digit())
}

/// Whether a line can only be diff output, never message text
fn is_diff_output(line: &str) -> bool {
    if is_summary_line(line) {
        return true;
    }
    if line.starts_with(' ') && line.contains(" | ") {
        return true;
    }
    line.split_once('\t')
        .is_some_and(|(code, _)| is_status_code(code))
}

/// Parse a `--name-status` line such as `M\tsrc/main.rs` or `R100\told\tnew`
///
/// Tab-separated columns are used when present, so paths may contain spaces.
/// Otherwise the line is split on whitespace and the last path takes the
/// remainder. Returns `None` for lines with too few columns, for tokens that
/// are not status codes, and for renames or copies onto the same path.
#[must_use]
pub fn parse_name_status_line(line: &str) -> Option<FileChange> {
    let line = line.trim_end();
    let tabbed = line.contains('\t');
    let (code, paths) = if tabbed {
        line.split_once('\t')?
    } else {
        split_first_token(line)?
    };
    if !is_status_code(code) {
        return None;
    }

    let status = FileStatus::from_code(code);
    if status.has_origin() {
        let (old_path, new_path) = if tabbed {
            paths.split_once('\t')?
        } else {
            split_first_token(paths)?
        };
        if old_path.is_empty() || new_path.is_empty() || old_path == new_path {
            return None;
        }
        Some(FileChange::moved(status, old_path, new_path))
    } else if paths.is_empty() {
        None
    } else {
        Some(FileChange::new(status, paths))
    }
}

fn split_first_token(text: &str) -> Option<(&str, &str)> {
    let (first, rest) = text.trim_start().split_once(char::is_whitespace)?;
    Some((first, rest.trim_start()))
}
