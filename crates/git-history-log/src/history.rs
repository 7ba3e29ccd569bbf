//! Reading commit history end to end

use tracing::{info, instrument};

use crate::augment::{AugmentOptions, Augmenter};
use crate::commit::Commit;
use crate::error::GitError;
use crate::options::LogOptions;
use crate::parser::parse_log;
use crate::runner::GitRunner;

/// Runs the primary log query, parses it and augments the result
///
/// # Example
///
/// ```no_run
/// use git_history_log::{GitCli, HistoryReader, LogOptions};
///
/// let reader = HistoryReader::new(GitCli::in_dir("."));
/// let commits = reader.read(&LogOptions::latest(10))?;
/// for commit in &commits {
///     println!("{} {}", commit.short_hash, commit.subject);
/// }
/// # Ok::<(), git_history_log::GitError>(())
/// ```
#[derive(Debug)]
pub struct HistoryReader<R> {
    runner: R,
    augment: AugmentOptions,
}

impl<R: GitRunner> HistoryReader<R> {
    /// Create a reader with default augmentation settings
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            augment: AugmentOptions::default(),
        }
    }

    /// Use these augmentation settings when file detail is requested
    #[must_use]
    pub fn with_augment(mut self, options: AugmentOptions) -> Self {
        self.augment = options;
        self
    }

    /// Read commits matching `options`, newest first
    ///
    /// Per-commit detail queries only run when `options.file_changes` is set.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the primary `git log` invocation fails. Failed
    /// detail queries are logged and do not fail the read.
    #[instrument(level = "debug", skip_all, fields(limit = ?options.limit, files = options.file_changes))]
    pub fn read(&self, options: &LogOptions) -> Result<Vec<Commit>, GitError> {
        let output = self.runner.run(&options.log_args())?;
        let mut commits = parse_log(&output, options.file_changes);

        if options.file_changes {
            Augmenter::new(&self.runner, self.augment).augment(&mut commits);
        }

        info!(count = commits.len(), "read commit history");
        Ok(commits)
    }
}
