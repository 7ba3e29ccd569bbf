// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! git-history-log: typed commit history from `git log` output
//!
//! This library crate builds `git log` invocations, parses their
//! delimiter-based text output into [`Commit`] records and fills in per-file
//! line counts from `git show --numstat`.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use git_history_log::{AugmentOptions, GitCli, HistoryReader, LogOptions};
//!
//! let reader = HistoryReader::new(GitCli::in_dir("."))
//!     .with_augment(AugmentOptions::default().jobs(4));
//! let commits = reader
//!     .read(&LogOptions::latest(10).with_file_changes())
//!     .expect("read history");
//!
//! for c in commits {
//!     println!("{} - {}", c.short_hash, c.subject);
//! }
//! ```

pub mod augment;
pub mod commit;
pub mod error;
pub mod history;
pub mod options;
pub mod parser;
pub mod runner;
pub mod summary;

pub use augment::{AugmentOptions, Augmenter, FileStatusPolicy};
pub use commit::{Commit, CommitStats, FileChange, FileStatus};
pub use error::GitError;
pub use history::HistoryReader;
pub use options::{LogOptions, MergeFilter};
pub use parser::{ParseState, parse_log};
pub use runner::{GitCli, GitRunner};
pub use summary::{AuthorStats, RepoStats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::augment::{AugmentOptions, FileStatusPolicy};
    pub use crate::commit::{Commit, CommitStats, FileChange, FileStatus};
    pub use crate::error::GitError;
    pub use crate::history::HistoryReader;
    pub use crate::options::{LogOptions, MergeFilter};
    pub use crate::runner::{GitCli, GitRunner};
}
