//! git-history: a human-friendly git history viewer
//!
//! Reads commits through the git binary and prints them in one of several
//! text layouts or as JSON.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::process::ExitCode;

use clap::Parser;
use git_history::config::Config;
use is_terminal::IsTerminal;
use tracing::debug;

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let is_tty = stdout.is_terminal();
    let color = config.color.enabled(is_tty);
    // colored consults its own terminal detection unless overridden
    colored::control::set_override(color);

    let mut out = BufWriter::new(stdout.lock());
    let result = git_history::run(&config, &mut out, is_tty).and_then(|count| {
        out.flush()?;
        Ok(count)
    });

    match result {
        Ok(count) => {
            debug!(count, "done");
            ExitCode::SUCCESS
        }
        Err(err) if is_broken_pipe(&err) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Output piped into a pager or `head` that exits early
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == ErrorKind::BrokenPipe)
}
