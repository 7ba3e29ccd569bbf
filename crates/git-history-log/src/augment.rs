//! Per-commit line counts from `git show --numstat`
//!
//! The primary log query yields letter-code statuses but no per-file counts.
//! The [`Augmenter`] runs one detail query per commit and folds the counts
//! into each commit's file-change list according to a [`FileStatusPolicy`].

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::commit::{Commit, CommitStats, FileChange, FileStatus};
use crate::error::GitError;
use crate::options::detail_args;
use crate::runner::GitRunner;

/// How detail counts are combined with the statuses from the primary query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatusPolicy {
    /// Keep the letter-code status and fill in counts, matching by path
    #[default]
    Declared,
    /// Replace the file list with the detail list, deriving status from counts
    Counts,
}

/// Augmentation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentOptions {
    /// How counts and statuses are merged
    pub policy: FileStatusPolicy,
    /// Number of detail queries run at once (1 = sequential)
    pub jobs: usize,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            policy: FileStatusPolicy::default(),
            jobs: 1,
        }
    }
}

impl AugmentOptions {
    /// Set the merge policy
    #[must_use]
    pub fn policy(mut self, policy: FileStatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number of concurrent detail queries (0 is treated as 1)
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

/// One line of `--numstat` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    /// Lines added (0 for binary files)
    pub insertions: u64,
    /// Lines deleted (0 for binary files)
    pub deletions: u64,
    /// Path after the change, with rename notation resolved
    pub path: String,
}

impl NumstatEntry {
    /// Convert to a file change whose status is derived from the counts
    #[must_use]
    pub fn into_change(self) -> FileChange {
        let status = FileStatus::from_counts(self.insertions, self.deletions);
        FileChange::new(status, self.path).with_counts(self.insertions, self.deletions)
    }
}

/// Parse the full output of a numstat detail query
#[must_use]
pub fn parse_numstat_output(output: &str) -> Vec<NumstatEntry> {
    output.lines().filter_map(parse_numstat_line).collect()
}

/// Parse a numstat line such as `5\t2\tsrc/lib.rs`
///
/// Binary files report `-` counts, which become 0. Lines with fewer than
/// three columns are skipped.
#[must_use]
pub fn parse_numstat_line(line: &str) -> Option<NumstatEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (insertions, deletions, raw_path) = if line.contains('\t') {
        let mut columns = line.splitn(3, '\t');
        (columns.next()?, columns.next()?, columns.next()?)
    } else {
        let (insertions, rest) = line.split_once(char::is_whitespace)?;
        let (deletions, path) = rest.trim_start().split_once(char::is_whitespace)?;
        (insertions, deletions, path)
    };

    let path = resolve_rename(raw_path.trim());
    if path.is_empty() {
        trace!(line, "numstat line without a path");
        return None;
    }

    Some(NumstatEntry {
        insertions: parse_count(insertions),
        deletions: parse_count(deletions),
        path,
    })
}

fn parse_count(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

/// Resolve numstat rename notation to the path after the change
///
/// `a.txt => b.txt` and `src/{old => new}/lib.rs` are both accepted.
/// The new side of the braced form may be empty (`src/{sub => }/lib.rs`).
fn resolve_rename(raw: &str) -> String {
    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}'))
        && open < close
        && let Some((_, to)) = raw[open + 1..close].split_once(" => ")
    {
        let joined = format!("{}{to}{}", &raw[..open], &raw[close + 1..]);
        if to.is_empty() {
            // `src/{sub => }/lib.rs` leaves `src//lib.rs`
            return joined.replacen("//", "/", 1);
        }
        return joined;
    }

    match raw.split_once(" => ") {
        Some((_, to)) => to.trim().to_string(),
        None => raw.to_string(),
    }
}

/// Combine the primary file list with detail counts
#[must_use]
pub fn merge_file_changes(
    declared: Vec<FileChange>,
    counted: Vec<NumstatEntry>,
    policy: FileStatusPolicy,
) -> Vec<FileChange> {
    match policy {
        FileStatusPolicy::Counts => counted.into_iter().map(NumstatEntry::into_change).collect(),
        FileStatusPolicy::Declared => merge_by_path(declared, counted),
    }
}

fn merge_by_path(mut declared: Vec<FileChange>, counted: Vec<NumstatEntry>) -> Vec<FileChange> {
    let index: HashMap<String, usize> = declared
        .iter()
        .enumerate()
        .map(|(i, change)| (change.file_path.clone(), i))
        .collect();

    let mut unmatched = Vec::new();
    for entry in counted {
        match index.get(&entry.path) {
            Some(&i) => {
                declared[i].insertions = entry.insertions;
                declared[i].deletions = entry.deletions;
            }
            None => unmatched.push(entry.into_change()),
        }
    }

    declared.extend(unmatched);
    declared
}

/// Runs per-commit detail queries and merges their counts
#[derive(Debug)]
pub struct Augmenter<R> {
    runner: R,
    options: AugmentOptions,
}

impl<R: GitRunner> Augmenter<R> {
    /// Create an augmenter over a runner
    pub fn new(runner: R, options: AugmentOptions) -> Self {
        Self { runner, options }
    }

    /// Augment every commit in place
    ///
    /// A failed detail query is logged and leaves its commit unchanged.
    /// Commit order is never affected.
    pub fn augment(&self, commits: &mut [Commit]) {
        if commits.is_empty() {
            return;
        }
        debug!(
            commits = commits.len(),
            jobs = self.options.jobs,
            policy = ?self.options.policy,
            "fetching per-commit detail"
        );

        if self.options.jobs > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
            {
                Ok(pool) => {
                    pool.install(|| {
                        commits.par_iter_mut().for_each(|c| self.augment_or_warn(c));
                    });
                    return;
                }
                Err(err) => warn!(%err, "worker pool unavailable, running sequentially"),
            }
        }

        commits.iter_mut().for_each(|c| self.augment_or_warn(c));
    }

    /// Augment a single commit
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the detail query fails; the commit is left
    /// unchanged in that case.
    pub fn augment_commit(&self, commit: &mut Commit) -> Result<(), GitError> {
        let output = self.runner.run(&detail_args(&commit.hash))?;
        let counted = parse_numstat_output(&output);
        trace!(hash = %commit.short_hash, entries = counted.len(), "numstat detail");

        let has_counts = !counted.is_empty();
        let declared = commit.file_changes.take().unwrap_or_default();
        let merged = merge_file_changes(declared, counted, self.options.policy);
        if commit.stats.is_none() && has_counts {
            commit.stats = Some(CommitStats::from_changes(&merged));
        }
        commit.file_changes = Some(merged);
        Ok(())
    }

    fn augment_or_warn(&self, commit: &mut Commit) {
        if let Err(err) = self.augment_commit(commit) {
            warn!(hash = %commit.short_hash, %err, "detail query failed, keeping commit as parsed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use similar_asserts::assert_eq;
    use std::sync::Mutex;

    /// Returns canned numstat output per hash and records the calls
    struct CannedRunner {
        outputs: HashMap<String, Result<String, ()>>,
        calls: Mutex<Vec<String>>,
    }

    impl CannedRunner {
        fn new(outputs: &[(&str, Result<&str, ()>)]) -> Self {
            Self {
                outputs: outputs
                    .iter()
                    .map(|(h, o)| (h.to_string(), o.map(str::to_string)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl GitRunner for CannedRunner {
        fn run(&self, args: &[String]) -> Result<String, GitError> {
            let hash = args.last().cloned().unwrap_or_default();
            self.calls.lock().unwrap().push(hash.clone());
            match self.outputs.get(&hash) {
                Some(Ok(out)) => Ok(out.clone()),
                _ => Err(GitError::CommandFailed {
                    command: format!("git {}", args.join(" ")),
                    code: Some(128),
                    stderr: "fatal: bad object".to_string(),
                }),
            }
        }
    }

    fn commit(hash: &str, files: Option<Vec<FileChange>>) -> Commit {
        Commit {
            hash: hash.to_string(),
            short_hash: hash.chars().take(7).collect(),
            author_name: "Ann".to_string(),
            author_email: "ann@example.com".to_string(),
            author_date: DateTime::default(),
            committer_name: "Ann".to_string(),
            commit_date: DateTime::default(),
            subject: "subject".to_string(),
            body: String::new(),
            parent_hashes: Vec::new(),
            ref_names: Vec::new(),
            stats: None,
            file_changes: files,
        }
    }

    #[test]
    fn test_parse_numstat_line() {
        assert_eq!(
            parse_numstat_line("5\t2\tsrc/main.rs"),
            Some(NumstatEntry {
                insertions: 5,
                deletions: 2,
                path: "src/main.rs".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_numstat_binary_and_spaces() {
        let entry = parse_numstat_line("-\t-\tassets/logo final.png").expect("entry");
        assert_eq!(entry.insertions, 0);
        assert_eq!(entry.deletions, 0);
        assert_eq!(entry.path, "assets/logo final.png");
    }

    #[test]
    fn test_parse_numstat_whitespace_columns() {
        let entry = parse_numstat_line("3   1   docs/read me.md").expect("entry");
        assert_eq!((entry.insertions, entry.deletions), (3, 1));
        assert_eq!(entry.path, "docs/read me.md");
    }

    #[test]
    fn test_parse_numstat_rename_notation() {
        let entry = parse_numstat_line("0\t0\ta.txt => b.txt").expect("entry");
        assert_eq!(entry.path, "b.txt");

        let entry = parse_numstat_line("4\t1\tsrc/{old => new}/lib.rs").expect("entry");
        assert_eq!(entry.path, "src/new/lib.rs");

        let entry = parse_numstat_line("0\t0\td/{x.txt => y.txt}").expect("entry");
        assert_eq!(entry.path, "d/y.txt");

        let entry = parse_numstat_line("1\t0\tsrc/{ => sub}/lib.rs").expect("entry");
        assert_eq!(entry.path, "src/sub/lib.rs");

        let entry = parse_numstat_line("0\t3\tsrc/{sub => }/lib.rs").expect("entry");
        assert_eq!(entry.path, "src/lib.rs");
    }

    #[test]
    fn test_parse_numstat_skips_short_lines() {
        assert_eq!(parse_numstat_line(""), None);
        assert_eq!(parse_numstat_line("5\t2"), None);
        assert_eq!(parse_numstat_line("garbage"), None);
        assert_eq!(
            parse_numstat_output("1\t0\ta.rs\n\nnot numstat\n2\t2\tb.rs\n").len(),
            2
        );
    }

    #[test]
    fn test_declared_policy_keeps_letter_status() {
        let declared = vec![FileChange::new(FileStatus::Modified, "a.go")];
        let counted = parse_numstat_output("5\t2\ta.go\n");
        let merged = merge_file_changes(declared, counted, FileStatusPolicy::Declared);
        assert_eq!(
            merged,
            vec![FileChange::new(FileStatus::Modified, "a.go").with_counts(5, 2)]
        );
    }

    #[test]
    fn test_declared_policy_keeps_rename_and_appends_unmatched() {
        let declared = vec![
            FileChange::moved(FileStatus::Renamed, "old.rs", "new.rs"),
            FileChange::new(FileStatus::Deleted, "gone.rs"),
        ];
        let counted = parse_numstat_output("0\t0\told.rs => new.rs\n0\t9\tgone.rs\n3\t0\textra.rs\n");
        let merged = merge_file_changes(declared, counted, FileStatusPolicy::Declared);
        assert_eq!(
            merged,
            vec![
                FileChange::moved(FileStatus::Renamed, "old.rs", "new.rs"),
                FileChange::new(FileStatus::Deleted, "gone.rs").with_counts(0, 9),
                FileChange::new(FileStatus::Added, "extra.rs").with_counts(3, 0),
            ]
        );
    }

    #[test]
    fn test_counts_policy_replaces_list() {
        let declared = vec![FileChange::new(FileStatus::Modified, "a.go")];
        let counted = parse_numstat_output("5\t0\ta.go\n0\t4\tb.go\n");
        let merged = merge_file_changes(declared, counted, FileStatusPolicy::Counts);
        assert_eq!(
            merged,
            vec![
                FileChange::new(FileStatus::Added, "a.go").with_counts(5, 0),
                FileChange::new(FileStatus::Deleted, "b.go").with_counts(0, 4),
            ]
        );
    }

    #[test]
    fn test_augment_commit_fills_counts_and_stats() {
        let runner = CannedRunner::new(&[("abc1234", Ok("5\t2\ta.go\n1\t0\tb.go\n"))]);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default());
        let mut c = commit(
            "abc1234",
            Some(vec![
                FileChange::new(FileStatus::Modified, "a.go"),
                FileChange::new(FileStatus::Added, "b.go"),
            ]),
        );

        augmenter.augment_commit(&mut c).expect("augment");
        let files = c.file_changes.as_ref().expect("files");
        assert_eq!(files[0].insertions, 5);
        assert_eq!(files[0].deletions, 2);
        assert_eq!(files[1].status, FileStatus::Added);
        assert_eq!(
            c.stats,
            Some(CommitStats {
                files_changed: 2,
                insertions: 6,
                deletions: 2,
            })
        );
    }

    #[test]
    fn test_derived_stats_cover_declared_only_files() {
        let runner = CannedRunner::new(&[("abc1234", Ok("3\t1\ta.go\n"))]);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default());
        let mut c = commit(
            "abc1234",
            Some(vec![
                FileChange::new(FileStatus::Modified, "a.go"),
                FileChange::new(FileStatus::Added, "empty.go"),
            ]),
        );

        augmenter.augment_commit(&mut c).expect("augment");
        assert_eq!(
            c.stats,
            Some(CommitStats {
                files_changed: 2,
                insertions: 3,
                deletions: 1,
            })
        );
    }

    #[test]
    fn test_augment_keeps_existing_stats() {
        let runner = CannedRunner::new(&[("abc1234", Ok("5\t2\ta.go\n"))]);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default());
        let existing = CommitStats {
            files_changed: 1,
            insertions: 7,
            deletions: 7,
        };
        let mut c = commit("abc1234", Some(vec![]));
        c.stats = Some(existing);
        augmenter.augment_commit(&mut c).expect("augment");
        assert_eq!(c.stats, Some(existing));
    }

    #[test]
    fn test_failed_detail_keeps_commit_and_continues() {
        let runner = CannedRunner::new(&[
            ("aaaaaaa", Err(())),
            ("bbbbbbb", Ok("1\t1\tx.rs\n")),
        ]);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default());
        let declared = vec![FileChange::new(FileStatus::Modified, "x.rs")];
        let mut commits = vec![
            commit("aaaaaaa", Some(declared.clone())),
            commit("bbbbbbb", Some(declared.clone())),
        ];

        augmenter.augment(&mut commits);

        assert_eq!(commits[0].file_changes.as_ref(), Some(&declared));
        assert_eq!(commits[0].stats, None);
        assert_eq!(
            commits[1].file_changes.as_ref().map(|f| f[0].insertions),
            Some(1)
        );
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec!["aaaaaaa".to_string(), "bbbbbbb".to_string()]
        );
    }

    #[test]
    fn test_empty_detail_leaves_stats_absent() {
        let runner = CannedRunner::new(&[("mmmmmmm", Ok(""))]);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default());
        let mut c = commit("mmmmmmm", Some(vec![]));
        augmenter.augment_commit(&mut c).expect("augment");
        assert_eq!(c.stats, None);
        assert_eq!(c.file_changes, Some(vec![]));
    }

    #[test]
    fn test_parallel_augment_preserves_order() {
        let hashes: Vec<String> = (0..32).map(|i| format!("{i:07x}")).collect();
        let outputs: Vec<(String, String)> = hashes
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), format!("{i}\t0\tfile{i}.rs\n")))
            .collect();
        let canned: Vec<(&str, Result<&str, ()>)> = outputs
            .iter()
            .map(|(h, o)| (h.as_str(), Ok(o.as_str())))
            .collect();
        let runner = CannedRunner::new(&canned);
        let augmenter = Augmenter::new(&runner, AugmentOptions::default().jobs(4));

        let mut commits: Vec<Commit> = hashes.iter().map(|h| commit(h, None)).collect();
        augmenter.augment(&mut commits);

        for (i, c) in commits.iter().enumerate() {
            assert_eq!(c.hash, hashes[i]);
            let files = c.file_changes.as_ref().expect("files");
            assert_eq!(files[0].file_path, format!("file{i}.rs"));
        }
        assert_eq!(runner.calls.lock().unwrap().len(), 32);
    }

    #[test]
    fn test_jobs_zero_is_sequential() {
        assert_eq!(AugmentOptions::default().jobs(0).jobs, 1);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the declared policy never changes declared statuses or order
        #[test]
        fn prop_declared_statuses_survive(
            files in proptest::collection::vec(("[a-z]{1,8}\\.rs", 0usize..4), 0..10),
            counts in proptest::collection::vec((0u64..50, 0u64..50), 0..10),
        ) {
            let statuses = [FileStatus::Added, FileStatus::Modified, FileStatus::Deleted, FileStatus::TypeChanged];
            let mut seen = std::collections::HashSet::new();
            let declared: Vec<FileChange> = files
                .into_iter()
                .filter(|(p, _)| seen.insert(p.clone()))
                .map(|(p, s)| FileChange::new(statuses[s], p))
                .collect();
            let counted: Vec<NumstatEntry> = declared
                .iter()
                .zip(&counts)
                .map(|(f, (i, d))| NumstatEntry {
                    insertions: *i,
                    deletions: *d,
                    path: f.file_path.clone(),
                })
                .collect();

            let merged = merge_file_changes(declared.clone(), counted, FileStatusPolicy::Declared);
            prop_assert_eq!(merged.len(), declared.len());
            for (m, d) in merged.iter().zip(&declared) {
                prop_assert_eq!(m.status, d.status);
                prop_assert_eq!(&m.file_path, &d.file_path);
            }
        }

        /// Property: numstat parsing never panics
        #[test]
        fn prop_numstat_never_panics(input in ".*") {
            let _ = parse_numstat_output(&input);
        }
    }
}
