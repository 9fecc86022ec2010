//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand is one maintenance task: rewriting legacy issue links,
//! upgrading pinned actions, listing scan targets, or printing a remote's
//! web URL.

use clap::{Args as ClapArgs, Parser, Subcommand};
use github_tools::logging::LogStyle;
use github_tools::resolver::{DEFAULT_API_URL, DEFAULT_REDIRECT_ENDPOINT};
use github_tools::scanner::FileKind;
use std::path::PathBuf;

/// Maintenance tasks for a GitHub-hosted repository checkout.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print extra messages to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format. Defaults to `rich` on a terminal and `plain` otherwise.
    #[arg(long, value_enum, global = true)]
    pub log_style: Option<LogStyle>,
}

/// Flags shared by the rewriting subcommands.
#[derive(Debug, ClapArgs)]
pub struct RewriteFlags {
    /// Show but don't save changes.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Confirm each file's changes before saving.
    #[arg(short, long)]
    pub interactive: bool,

    /// Glob patterns for directories/files to exclude (e.g., "build", "*.generated.rst").
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Update old tracker links and :issue: roles to GitHub issues.
    Redirect {
        /// File or directory to redirect.
        input: PathBuf,

        #[command(flatten)]
        flags: RewriteFlags,

        /// Redirect endpoint; the issue number is appended.
        #[arg(long, env = "GITHUB_TOOLS_REDIRECT_ENDPOINT", default_value = DEFAULT_REDIRECT_ENDPOINT)]
        redirect_endpoint: String,
    },

    /// Upgrade GitHub Actions versions in a workflow file or directory.
    UpgradeActions {
        /// Workflow file or directory to upgrade.
        #[arg(default_value = ".github/workflows/")]
        input: PathBuf,

        #[command(flatten)]
        flags: RewriteFlags,

        /// GitHub REST API base URL.
        #[arg(long, env = "GITHUB_TOOLS_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// List files that would be processed, without touching them.
    Scan {
        /// Kind of run to list files for.
        #[arg(value_enum)]
        kind: FileKind,

        /// File or directory to scan.
        input: PathBuf,

        /// Glob patterns for directories/files to exclude.
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Print the web URL of this checkout's remote.
    RepoUrl {
        /// Use the upstream remote instead (if there is one).
        #[arg(short, long)]
        upstream: bool,

        /// Tab to point at, e.g. `pulls`, `issues/@me`, `actions`.
        tab: Option<String>,
    },
}
