// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for git-history-log

use thiserror::Error;

/// Errors that can occur while querying git
///
/// Only invocation-level failures are errors. Output that does not match the
/// expected shape is skipped line by line rather than reported.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git process could not be started
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        /// The command line that was attempted
        command: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The git process ran but exited unsuccessfully
    #[error("{command} exited with {}: {stderr}", exit_description(.code))]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error, trimmed
        stderr: String,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl GitError {
    /// The command line associated with this error
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::CommandFailed { command, .. } => command,
        }
    }
}
