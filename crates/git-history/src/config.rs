//! Configuration for the git-history command
//!
//! Command-line flags (and their environment variables) map onto the
//! library's [`LogOptions`] and [`AugmentOptions`] and onto the renderer's
//! [`RenderOptions`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use git_history_log::{AugmentOptions, FileStatusPolicy, LogOptions, MergeFilter};

use crate::render::{ColorChoice, GroupBy, OutputFormat, Palette, RenderOptions};

/// Default number of commits shown
pub const DEFAULT_LIMIT: i64 = 50;

/// git-history - a human-friendly git history viewer
#[derive(Parser, Debug, Clone)]
#[command(name = "git-history")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Limit number of commits (0 or less shows all)
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    pub limit: i64,

    /// Filter by author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Show commits more recent than a specific date
    #[arg(long)]
    pub since: Option<String>,

    /// Show commits older than a specific date
    #[arg(long)]
    pub until: Option<String>,

    /// Show commits from a specific branch
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Compact output
    #[arg(short, long, default_value = "false")]
    pub compact: bool,

    /// Show file statistics
    #[arg(long, default_value = "false")]
    pub stats: bool,

    /// Show changed files with per-file line counts
    ///
    /// Runs one extra git query per commit.
    #[arg(long, default_value = "false")]
    pub files: bool,

    /// Show ASCII commit graph
    #[arg(long, default_value = "false")]
    pub graph: bool,

    /// Show only merge commits
    #[arg(long, default_value = "false", conflicts_with = "no_merges")]
    pub merges: bool,

    /// Exclude merge commits
    #[arg(long, default_value = "false")]
    pub no_merges: bool,

    /// Repository to read (defaults to the current directory)
    #[arg(short = 'C', long, env = "GIT_HISTORY_REPO")]
    pub repo: Option<PathBuf>,

    /// Number of per-commit detail queries to run at once
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Which status wins when per-file counts are merged in
    #[arg(long, value_enum, default_value_t = FileStatusArg::Declared)]
    pub file_status: FileStatusArg,

    /// Group commits under headings
    #[arg(long, value_enum, default_value_t = GroupBy::None)]
    pub group_by: GroupBy,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the history.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            author: None,
            since: None,
            until: None,
            branch: None,
            format: OutputFormat::default(),
            compact: false,
            stats: false,
            files: false,
            graph: false,
            merges: false,
            no_merges: false,
            repo: None,
            jobs: 1,
            file_status: FileStatusArg::default(),
            group_by: GroupBy::default(),
            color: ColorChoice::default(),
            verbose: false,
            quiet: false,
        }
    }
}

/// Command-line form of [`FileStatusPolicy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FileStatusArg {
    /// Keep git's letter-code status and fill in counts
    #[default]
    Declared,
    /// Derive the status from the line counts
    Counts,
}

impl From<FileStatusArg> for FileStatusPolicy {
    fn from(arg: FileStatusArg) -> Self {
        match arg {
            FileStatusArg::Declared => Self::Declared,
            FileStatusArg::Counts => Self::Counts,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path is specified but doesn't exist or isn't a directory
    /// - Both `--merges` and `--no-merges` are set
    /// - `--jobs` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref repo) = self.repo {
            if !repo.exists() {
                return Err(ConfigError::RepoNotFound(repo.clone()));
            }
            if !repo.is_dir() {
                return Err(ConfigError::RepoNotDirectory(repo.clone()));
            }
        }
        self.merge_filter()?;
        if self.jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }
        Ok(())
    }

    /// Merge filter from the two merge flags
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingMergeFilters`] when both are set.
    pub fn merge_filter(&self) -> Result<MergeFilter, ConfigError> {
        MergeFilter::from_flags(self.merges, self.no_merges)
            .ok_or(ConfigError::ConflictingMergeFilters)
    }

    /// Query options for the history reader
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingMergeFilters`] when both merge flags
    /// are set.
    pub fn log_options(&self) -> Result<LogOptions, ConfigError> {
        Ok(LogOptions {
            author: self.author.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
            branch: self.branch.clone(),
            merges: self.merge_filter()?,
            file_changes: self.files,
            ..LogOptions::default()
        }
        .with_limit(self.limit))
    }

    /// Detail query settings
    #[must_use]
    pub fn augment_options(&self) -> AugmentOptions {
        AugmentOptions::default()
            .policy(self.file_status.into())
            .jobs(self.jobs)
    }

    /// Rendering settings, resolving `--color auto` against `is_tty`
    #[must_use]
    pub fn render_options(&self, is_tty: bool) -> RenderOptions {
        RenderOptions {
            format: self.format,
            compact: self.compact,
            show_stats: self.stats,
            show_files: self.files,
            graph: self.graph,
            group_by: self.group_by,
            palette: Palette::new(self.color.enabled(is_tty)),
        }
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// Both merge filters were requested
    #[error("--merges and --no-merges cannot be used together")]
    ConflictingMergeFilters,

    /// Zero worker threads were requested
    #[error("--jobs must be at least 1")]
    InvalidJobs,
}
