//! Text and JSON rendering of commit history
//!
//! Rendering is stateless: every choice, including whether to emit color,
//! travels in [`RenderOptions`]. Relative times are computed against the
//! renderer's `now`, which tests can pin with [`Renderer::at`].

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use git_history_log::summary::{RepoStats, group_by_author, group_by_date};
use git_history_log::{Commit, CommitStats, FileChange, FileStatus};
use serde::Serialize;

const RULE_WIDTH: usize = 80;
const GRAPH_WIDTH: usize = 50;
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Output layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Multi-line entries with body, stats and refs
    #[default]
    Human,
    /// Labelled fields for every commit
    Detailed,
    /// One line per commit with author, age and branches
    Compact,
    /// Short hash and subject
    Oneline,
    /// Subjects grouped under date headings
    Changelog,
    /// Commits and summary as JSON
    Json,
}

/// How commits are grouped under headings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// No grouping
    #[default]
    None,
    /// By calendar day of the author date
    Date,
    /// By author name and email
    Author,
}

/// When to emit ANSI color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when writing to a terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl ColorChoice {
    /// Resolve to on/off given whether output is a terminal
    #[must_use]
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            Self::Auto => is_tty,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Color palette; a disabled palette returns text unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Create a palette
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether styling is applied
    #[must_use]
    pub fn enabled(self) -> bool {
        self.enabled
    }

    fn paint(self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.enabled {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn green(self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    fn yellow(self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    fn cyan(self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    fn red(self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    fn blue(self, text: &str) -> String {
        self.paint(text, |t| t.blue())
    }

    fn magenta(self, text: &str) -> String {
        self.paint(text, |t| t.magenta())
    }

    fn bold(self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    fn dim(self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }

    fn highlight(self, text: &str) -> String {
        self.paint(text, |t| t.bright_white().on_bright_black())
    }
}

/// Everything that shapes the rendered output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Layout
    pub format: OutputFormat,
    /// One line per commit in the human format
    pub compact: bool,
    /// Show the aggregate change line
    pub show_stats: bool,
    /// Show per-file changes
    pub show_files: bool,
    /// Show a progress bar through the history before each commit
    pub graph: bool,
    /// Grouping headings
    pub group_by: GroupBy,
    /// Colors
    pub palette: Palette,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    commits: &'a [Commit],
    summary: RepoStats,
}

/// Writes commits in the configured format
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    now: DateTime<Utc>,
}

impl Renderer {
    /// Create a renderer that measures ages against the current time
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            now: Utc::now(),
        }
    }

    /// Measure relative ages against `now` instead of the current time
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Render `commits` to `out`
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn render<W: Write>(&self, out: &mut W, commits: &[Commit]) -> io::Result<()> {
        if self.options.format == OutputFormat::Json {
            let report = JsonReport {
                commits,
                summary: RepoStats::from_commits(commits),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            return writeln!(out);
        }

        let p = self.options.palette;
        match self.options.group_by {
            GroupBy::None => {
                let all: Vec<&Commit> = commits.iter().collect();
                self.render_list(out, &all)
            }
            GroupBy::Date => {
                for group in group_by_date(commits) {
                    let heading = group.date.format("%Y-%m-%d (%A)").to_string();
                    writeln!(out, "{} {}", p.bold("##"), p.bold(&heading))?;
                    writeln!(out)?;
                    self.render_list(out, &group.commits)?;
                    writeln!(out)?;
                }
                Ok(())
            }
            GroupBy::Author => {
                for group in group_by_author(commits) {
                    let count = group.commits.len();
                    writeln!(
                        out,
                        "{} {} <{}> ({count} commit{})",
                        p.bold("##"),
                        p.yellow(&group.name),
                        group.email,
                        plural(count as i64)
                    )?;
                    writeln!(out)?;
                    self.render_list(out, &group.commits)?;
                    writeln!(out)?;
                }
                Ok(())
            }
        }
    }

    fn render_list<W: Write>(&self, out: &mut W, commits: &[&Commit]) -> io::Result<()> {
        match self.options.format {
            OutputFormat::Human if self.options.compact => self.compact(out, commits, false),
            OutputFormat::Human => self.human(out, commits),
            OutputFormat::Detailed => self.detailed(out, commits),
            OutputFormat::Compact => self.compact(out, commits, true),
            OutputFormat::Oneline => self.oneline(out, commits),
            OutputFormat::Changelog => self.changelog(out, commits),
            OutputFormat::Json => Ok(()),
        }
    }

    fn human<W: Write>(&self, out: &mut W, commits: &[&Commit]) -> io::Result<()> {
        let p = self.options.palette;
        for (i, commit) in commits.iter().enumerate() {
            if self.options.graph {
                writeln!(out, "{}", graph_line(i, commits.len()))?;
            }
            writeln!(out, "{} {}", p.bold("commit"), p.highlight(&commit.short_hash))?;
            writeln!(
                out,
                "{}: {} <{}>",
                p.bold("Author"),
                p.yellow(&commit.author_name),
                commit.author_email
            )?;
            writeln!(out, "{}: {}", p.bold("Date"), format_date(commit))?;
            writeln!(out)?;
            writeln!(out, "    {}", commit.subject)?;
            writeln!(out)?;

            if !commit.body.is_empty() {
                for line in commit.body.trim().lines().filter(|l| !l.is_empty()) {
                    writeln!(out, "    {}", p.cyan(line))?;
                }
                writeln!(out)?;
            }
            self.stats_line(out, commit)?;
            self.file_lines(out, commit)?;
            if !commit.ref_names.is_empty() {
                writeln!(out, "    {}: {}", p.bold("Refs"), self.refs(commit))?;
            }
            if i + 1 < commits.len() {
                writeln!(out, "{}", p.dim(&"─".repeat(RULE_WIDTH)))?;
            }
        }
        Ok(())
    }

    fn detailed<W: Write>(&self, out: &mut W, commits: &[&Commit]) -> io::Result<()> {
        let p = self.options.palette;
        for (i, commit) in commits.iter().enumerate() {
            if self.options.graph {
                writeln!(out, "{}", graph_line(i, commits.len()))?;
            }
            writeln!(out, "{} {}", p.bold("Commit:"), p.highlight(&commit.short_hash))?;
            writeln!(out, "{} {}", p.bold("Hash:"), commit.hash)?;
            if !commit.parent_hashes.is_empty() {
                writeln!(out, "{} {}", p.bold("Parents:"), commit.parent_hashes.join(" "))?;
            }
            writeln!(
                out,
                "{} {} <{}>",
                p.bold("Author:"),
                p.yellow(&commit.author_name),
                commit.author_email
            )?;
            writeln!(out, "{} {}", p.bold("Date:"), format_date(commit))?;
            if commit.committer_name != commit.author_name {
                writeln!(out, "{} {}", p.bold("Committer:"), commit.committer_name)?;
            }
            writeln!(out, "{} {}", p.bold("Message:"), commit.subject)?;
            writeln!(out)?;

            if !commit.body.is_empty() {
                writeln!(out, "{}", p.bold("Description:"))?;
                writeln!(out, "{}", p.cyan(&commit.body))?;
                writeln!(out)?;
            }
            if self.options.show_stats && commit.stats.is_some() {
                self.stats_line(out, commit)?;
                writeln!(out)?;
            }
            if self.options.show_files
                && commit.file_changes.as_ref().is_some_and(|f| !f.is_empty())
            {
                self.file_lines(out, commit)?;
                writeln!(out)?;
            }
            if !commit.ref_names.is_empty() {
                writeln!(out, "    {}: {}", p.bold("Refs"), self.refs(commit))?;
                writeln!(out)?;
            }
            if i + 1 < commits.len() {
                writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// One line per commit; `branches` appends the branch names
    fn compact<W: Write>(&self, out: &mut W, commits: &[&Commit], branches: bool) -> io::Result<()> {
        let p = self.options.palette;
        for (i, commit) in commits.iter().enumerate() {
            if self.options.graph {
                writeln!(out, "{}", graph_line(i, commits.len()))?;
            }
            let names = commit.branches();
            let branch_info = if branches && !names.is_empty() {
                format!(" [{}]", names.join(", "))
            } else {
                String::new()
            };
            writeln!(
                out,
                "{} {} - {} ({}){}",
                p.green(&commit.short_hash),
                commit.subject,
                p.yellow(&commit.author_name),
                p.dim(&time_ago(commit.author_date_utc(), self.now)),
                p.magenta(&branch_info)
            )?;
            if self.options.show_stats {
                self.stats_line(out, commit)?;
            }
        }
        Ok(())
    }

    fn oneline<W: Write>(&self, out: &mut W, commits: &[&Commit]) -> io::Result<()> {
        let p = self.options.palette;
        for commit in commits {
            writeln!(out, "{} {}", p.green(&commit.short_hash), commit.subject)?;
        }
        Ok(())
    }

    fn changelog<W: Write>(&self, out: &mut W, commits: &[&Commit]) -> io::Result<()> {
        let p = self.options.palette;
        let mut current = None;
        for commit in commits {
            let day = commit.author_date.date_naive();
            if current != Some(day) {
                current = Some(day);
                writeln!(out)?;
                writeln!(out, "{} {}", p.bold("##"), format_date(commit))?;
            }

            let names = commit.branches();
            let branch_info = if names.is_empty() {
                String::new()
            } else {
                format!(" {}", p.magenta(&format!("[{}]", names.join(", "))))
            };
            writeln!(
                out,
                "- {}{} {}",
                commit.subject,
                branch_info,
                p.dim(&format!("({})", commit.author_name))
            )?;
            for line in commit.body.trim().lines().filter(|l| !l.is_empty()) {
                writeln!(out, "    {}", p.dim(line))?;
            }
        }
        Ok(())
    }

    fn stats_line<W: Write>(&self, out: &mut W, commit: &Commit) -> io::Result<()> {
        let Some(stats) = commit.stats.filter(|_| self.options.show_stats) else {
            return Ok(());
        };
        writeln!(out, "    {}", self.describe_stats(stats))
    }

    fn describe_stats(&self, stats: CommitStats) -> String {
        let p = self.options.palette;
        let bar = if stats.deletions > stats.insertions {
            p.red("█")
        } else {
            p.green("█")
        };
        format!(
            "{}: {} {bar}(+{}/-{})",
            p.bold("Changes"),
            stats.files_changed,
            stats.insertions,
            stats.deletions
        )
    }

    fn file_lines<W: Write>(&self, out: &mut W, commit: &Commit) -> io::Result<()> {
        let Some(files) = commit.file_changes.as_ref().filter(|_| self.options.show_files) else {
            return Ok(());
        };
        if files.is_empty() {
            return Ok(());
        }
        writeln!(out, "    {}:", self.options.palette.bold("Files"))?;
        for change in files {
            writeln!(out, "      {}", self.describe_file(change))?;
        }
        Ok(())
    }

    fn describe_file(&self, change: &FileChange) -> String {
        let p = self.options.palette;
        let label = format!("{:<12}", change.status.label());
        let status = match change.status {
            FileStatus::Added => p.green(&label),
            FileStatus::Deleted => p.red(&label),
            FileStatus::Renamed | FileStatus::Copied => p.blue(&label),
            _ => p.yellow(&label),
        };
        let path = if change.old_path.is_empty() {
            change.file_path.clone()
        } else {
            format!("{} → {}", change.old_path, change.file_path)
        };
        format!(
            "{status} {path} ({}/{})",
            p.green(&format!("+{}", change.insertions)),
            p.red(&format!("-{}", change.deletions))
        )
    }

    fn refs(&self, commit: &Commit) -> String {
        let p = self.options.palette;
        commit
            .ref_names
            .iter()
            .map(|r| {
                if let Some(tag) = r.strip_prefix("tag: ") {
                    p.blue(tag)
                } else if r == "HEAD" || r.starts_with("HEAD -> ") {
                    p.red(r)
                } else if r.starts_with("origin/") {
                    p.magenta(r)
                } else {
                    p.green(r)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn format_date(commit: &Commit) -> String {
    commit.author_date.format(DATE_FORMAT).to_string()
}

/// Progress bar marking how far through the list `index` is
#[must_use]
pub fn graph_line(index: usize, total: usize) -> String {
    let position = if total > 1 {
        index as f64 / (total - 1) as f64
    } else {
        0.0
    };
    let bar: String = (0..GRAPH_WIDTH)
        .map(|i| {
            if (i as f64) / (GRAPH_WIDTH as f64) < position {
                '█'
            } else {
                '░'
            }
        })
        .collect();
    let symbol = if index == 0 {
        "⭓"
    } else if index + 1 == total {
        "⭔"
    } else {
        "●"
    };
    format!("{symbol} {bar}")
}

/// Relative age such as `3 days ago`; future dates count as `just now`
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    let (count, unit) = if minutes < 1 {
        return "just now".to_string();
    } else if hours < 1 {
        (minutes, "minute")
    } else if days < 1 {
        (hours, "hour")
    } else if days < 30 {
        (days, "day")
    } else if days < 365 {
        (days / 30, "month")
    } else {
        (days / 365, "year")
    };
    format!("{count} {unit}{} ago", plural(count))
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
