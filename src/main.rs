//! github-tools: maintenance tasks for a GitHub-hosted checkout.
//!
//! Rewrites old tracker links to GitHub issues, bumps pinned GitHub Actions,
//! lists the files a run would visit, and prints remote web URLs.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands, RewriteFlags};
use colored::Colorize;
use github_tools::driver::{self, RunOptions};
use github_tools::logging::{self, LogStyle};
use github_tools::resolver::{Endpoints, HttpLookup};
use github_tools::rewriter::{ActionPinRewriter, IssueLinkRewriter, LineRewriter};
use github_tools::scanner::{self, FileKind};
use github_tools::remote;
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_style.unwrap_or_else(LogStyle::detect), args.verbose);

    match args.command {
        Commands::Redirect {
            input,
            flags,
            redirect_endpoint,
        } => {
            let endpoints = Endpoints {
                redirect: redirect_endpoint,
                ..Endpoints::default()
            };
            let mut rewriter = IssueLinkRewriter::new(HttpLookup::new(endpoints)?);
            cmd_rewrite(&input, FileKind::Docs, &flags, &mut rewriter)
        }
        Commands::UpgradeActions {
            input,
            flags,
            api_url,
        } => {
            let endpoints = Endpoints {
                api: api_url,
                ..Endpoints::default()
            };
            let mut rewriter = ActionPinRewriter::new(HttpLookup::new(endpoints)?);
            cmd_rewrite(&input, FileKind::Workflows, &flags, &mut rewriter)
        }
        Commands::Scan {
            kind,
            input,
            exclude,
        } => cmd_scan(kind, &input, &exclude),
        Commands::RepoUrl { upstream, tab } => cmd_repo_url(upstream, tab.as_deref()),
    }
}

fn cmd_rewrite<R: LineRewriter>(
    input: &Path,
    kind: FileKind,
    flags: &RewriteFlags,
    rewriter: &mut R,
) -> Result<()> {
    let exclude = scanner::parse_excludes(&flags.exclude).context("Invalid --exclude pattern")?;
    let options = RunOptions {
        dry_run: flags.dry_run,
        interactive: flags.interactive,
    };

    let summary = driver::process_path(input, kind, &exclude, rewriter, options)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    if flags.json || summary.files_scanned > 1 {
        summary.print(flags.json)?;
    }
    if flags.dry_run && summary.files_changed > 0 && !flags.json {
        println!("\n{} Run without --dry-run to save changes", "hint:".cyan().bold());
    }
    Ok(())
}

fn cmd_scan(kind: FileKind, input: &Path, exclude: &[String]) -> Result<()> {
    let exclude = scanner::parse_excludes(exclude).context("Invalid --exclude pattern")?;
    let files = scanner::collect_files(input, kind, &exclude)?;

    println!("Would scan {} files:", files.len());
    for file in files {
        println!("  {}", file.display());
    }
    Ok(())
}

fn cmd_repo_url(upstream: bool, tab: Option<&str>) -> Result<()> {
    let origin = || -> Result<String> {
        remote::remote_url("origin")?.context("No origin remote in this repository")
    };

    let url = if upstream {
        match remote::remote_url("upstream")? {
            Some(url) => url,
            None => {
                println!("{}", "No upstream, using origin".yellow());
                origin()?
            }
        }
    } else {
        origin()?
    };

    println!("{}", url.dimmed());
    println!("{}", remote::page_url(&url, tab));
    Ok(())
}
