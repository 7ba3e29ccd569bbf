//! Running git commands
//!
//! [`GitRunner`] is the seam between query building and parsing on one side
//! and the git process on the other. [`GitCli`] runs the real `git` binary;
//! tests substitute canned output.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, instrument};

use crate::error::GitError;

/// Something that can run a git command and return its standard output
///
/// Implementations must be shareable across threads: per-commit detail
/// queries may run on a worker pool.
pub trait GitRunner: Send + Sync {
    /// Run git with `args` and return standard output as text
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the process cannot be started or exits
    /// unsuccessfully.
    fn run(&self, args: &[String]) -> Result<String, GitError>;
}

impl<R: GitRunner + ?Sized> GitRunner for &R {
    fn run(&self, args: &[String]) -> Result<String, GitError> {
        (**self).run(args)
    }
}

/// Runs the `git` executable as a child process
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    work_dir: Option<PathBuf>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Run `git` from `PATH` in the current directory
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
            work_dir: None,
        }
    }

    /// Run git inside `dir`
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(dir.into()),
            ..Self::new()
        }
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Working directory, if one was set
    #[must_use]
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl GitRunner for GitCli {
    #[instrument(level = "debug", skip(self), fields(dir = ?self.work_dir))]
    fn run(&self, args: &[String]) -> Result<String, GitError> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| GitError::Spawn {
            command: self.command_line(args),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: self.command_line(args),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "git command succeeded");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
