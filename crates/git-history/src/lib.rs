// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! git-history library
//!
//! This module exports the command's configuration, rendering and top-level
//! run function for use in integration tests and by the binary.

use std::io::Write;

use anyhow::Context;
use git_history_log::{GitCli, HistoryReader};
use tracing::debug;

pub mod config;
pub mod render;

use config::Config;
use render::Renderer;

/// Read the history described by `config` and render it to `out`
///
/// Returns the number of commits rendered.
///
/// # Errors
///
/// Fails on invalid configuration, on a failed `git log` invocation and on
/// write errors.
pub fn run<W: Write>(config: &Config, out: &mut W, is_tty: bool) -> anyhow::Result<usize> {
    config.validate()?;

    let runner = match &config.repo {
        Some(dir) => GitCli::in_dir(dir),
        None => GitCli::new(),
    };
    let reader = HistoryReader::new(runner).with_augment(config.augment_options());
    let commits = reader
        .read(&config.log_options()?)
        .context("Failed to read commit history")?;

    let options = config.render_options(is_tty);
    debug!(format = ?options.format, commits = commits.len(), "rendering history");
    Renderer::new(options)
        .render(out, &commits)
        .context("Failed to write output")?;
    Ok(commits.len())
}
