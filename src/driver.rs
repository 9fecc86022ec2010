//! Per-file processing.
//!
//! Each file goes `Unread -> Read -> Unchanged`, or `Read -> Rewritten`
//! followed by one of dry run, declined (interactive) or persisted. A file is
//! only opened for writing when at least one line changed and the run is
//! neither a dry run nor declined, and then its whole content is replaced in
//! one write.

use crate::diff;
use crate::error::{Error, Result};
use crate::report::Summary;
use crate::rewriter::LineRewriter;
use crate::scanner::{self, FileKind};
use colored::Colorize;
use glob::Pattern;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Show diffs but never write.
    pub dry_run: bool,
    /// Ask before writing each changed file.
    pub interactive: bool,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileResult {
    Unchanged,
    DryRun { changes: usize },
    Declined { changes: usize },
    Persisted { changes: usize },
}

impl FileResult {
    pub fn changes(self) -> usize {
        match self {
            FileResult::Unchanged => 0,
            FileResult::DryRun { changes }
            | FileResult::Declined { changes }
            | FileResult::Persisted { changes } => changes,
        }
    }
}

/// Rewrites `content` line by line, returning the new content and the
/// number of lines that changed.
pub fn rewrite_content<R: LineRewriter>(content: &str, rewriter: &mut R) -> Result<(String, usize)> {
    let mut changes = 0;
    let mut new_content = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let edit = rewriter.rewrite_line(line)?;
        if edit.changed {
            changes += 1;
        }
        new_content.push_str(&edit.new);
    }
    Ok((new_content, changes))
}

/// Rewrites one file, prints its diff and persists it unless told not to.
pub fn process_file<R: LineRewriter>(
    path: &Path,
    rewriter: &mut R,
    options: RunOptions,
) -> Result<FileResult> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let (new_content, changes) = rewrite_content(&content, rewriter)?;

    diff::print_report(&content, &new_content, path);
    if changes == 0 {
        return Ok(FileResult::Unchanged);
    }
    if options.dry_run {
        return Ok(FileResult::DryRun { changes });
    }
    if options.interactive && !confirm(path)? {
        println!("{} {}", "Skipped:".yellow().bold(), path.display());
        return Ok(FileResult::Declined { changes });
    }

    std::fs::write(path, new_content).map_err(|e| Error::io(path, e))?;
    Ok(FileResult::Persisted { changes })
}

fn confirm(path: &Path) -> Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(format!("Apply changes to {}?", path.display()))
        .default(false)
        .interact()?)
}

/// Processes a file or every matching file under a directory, in sorted
/// order, sharing `rewriter` (and so its cache) across all of them.
pub fn process_path<R: LineRewriter>(
    input: &Path,
    kind: FileKind,
    exclude: &[Pattern],
    rewriter: &mut R,
    options: RunOptions,
) -> Result<Summary> {
    let files = scanner::collect_files(input, kind, exclude)?;
    info!("Found {} file(s) under {}", files.len(), input.display());

    let mut summary = Summary {
        files_scanned: files.len(),
        ..Summary::default()
    };
    for file in &files {
        info!("{}", file.display());
        let result = process_file(file, rewriter, options)?;
        if result != FileResult::Unchanged {
            summary.files_changed += 1;
            summary.lines_changed += result.changes();
        }
        if matches!(result, FileResult::Persisted { .. }) {
            summary.files_written += 1;
        }
    }

    summary.cache = rewriter.cache_stats();
    let cache = summary.cache;
    info!(
        "cache: lookups={} hits={} misses={} entries={}",
        cache.lookups(),
        cache.hits,
        cache.misses,
        cache.entries
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::stubs::{StubIssues, StubTags};
    use crate::rewriter::{ActionPinRewriter, IssueLinkRewriter};
    use std::fs;
    use tempfile::TempDir;

    const WORKFLOW: &str = "\
name: Test
on: [push]
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - uses: \"actions/setup-python@v4\"
      - uses: some/tool@main
      - uses: pypa/gh-action-pypi-publish@release
";

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn workflow_tags() -> StubTags {
        let mut stub = StubTags::with("actions/checkout", &["v4", "v3", "v2"]);
        stub.tags.insert(
            "actions/setup-python".to_string(),
            vec!["v5".to_string(), "v4".to_string()],
        );
        stub
    }

    #[test]
    fn rewrites_workflow_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ci.yml", WORKFLOW);
        let stub = workflow_tags();
        let mut rewriter = ActionPinRewriter::new(&stub);

        let result = process_file(&path, &mut rewriter, RunOptions::default()).unwrap();

        assert_eq!(result, FileResult::Persisted { changes: 2 });
        insta::assert_snapshot!(fs::read_to_string(&path).unwrap(), @r#"
        name: Test
        on: [push]
        jobs:
          test:
            runs-on: ubuntu-latest
            steps:
              - uses: actions/checkout@v4
              - uses: "actions/setup-python@v5"
              - uses: some/tool@main
              - uses: pypa/gh-action-pypi-publish@release
        "#);
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ci.yml", WORKFLOW);
        let stub = workflow_tags();
        let mut rewriter = ActionPinRewriter::new(&stub);
        let options = RunOptions {
            dry_run: true,
            interactive: false,
        };

        let result = process_file(&path, &mut rewriter, options).unwrap();

        assert_eq!(result, FileResult::DryRun { changes: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), WORKFLOW);
    }

    #[test]
    fn file_without_references_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let text = "Nothing to see here.\nhttps://bugs.python.org\n";
        let path = write(&dir, "plain.rst", text);
        let stub = StubIssues::default();
        let mut rewriter = IssueLinkRewriter::new(&stub);

        let result = process_file(&path, &mut rewriter, RunOptions::default()).unwrap();

        assert_eq!(result, FileResult::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
        assert_eq!(stub.calls.get(), 0);
    }

    #[test]
    fn rewrite_content_counts_changed_lines() {
        let stub = StubIssues::with(&[(28524, "https://github.com/python/cpython/issues/72710")]);
        let mut rewriter = IssueLinkRewriter::new(&stub);
        let content = "intro\n:issue:`28524` and https://bugs.python.org/issue28524\nlast line";

        let (new_content, changes) = rewrite_content(content, &mut rewriter).unwrap();

        assert_eq!(changes, 1);
        assert_eq!(
            new_content,
            "intro\n:gh:`72710` and https://github.com/python/cpython/issues/72710\nlast line"
        );
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn tree_shares_cache_across_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b/news.rst", ":issue:`28524`\n");
        write(&dir, "a/logging.rst", "see :issue:`28524`\n");
        write(&dir, "c/untouched.rst", "plain\n");
        write(&dir, "d/ignored.md", ":issue:`28524`\n");
        let stub = StubIssues::with(&[(28524, "https://github.com/python/cpython/issues/72710")]);
        let mut rewriter = IssueLinkRewriter::new(&stub);

        let summary = process_path(
            dir.path(),
            FileKind::Docs,
            &[],
            &mut rewriter,
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.files_changed, 2);
        assert_eq!(summary.lines_changed, 2);
        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.cache.misses, 1);
        assert_eq!(summary.cache.hits, 1);
        assert_eq!(stub.calls.get(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("a/logging.rst")).unwrap(),
            "see :gh:`72710`\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("d/ignored.md")).unwrap(),
            ":issue:`28524`\n"
        );
    }

    #[test]
    fn second_run_over_rewritten_tree_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ci.yml", WORKFLOW);
        let stub = workflow_tags();
        let mut rewriter = ActionPinRewriter::new(&stub);

        process_file(&path, &mut rewriter, RunOptions::default()).unwrap();
        let after_first = fs::read_to_string(&path).unwrap();
        let second = process_file(&path, &mut rewriter, RunOptions::default()).unwrap();

        assert_eq!(second, FileResult::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn unreadable_input_reports_path() {
        let dir = TempDir::new().unwrap();
        let stub = StubIssues::default();
        let mut rewriter = IssueLinkRewriter::new(&stub);
        let missing = dir.path().join("missing.rst");

        let err = process_file(&missing, &mut rewriter, RunOptions::default()).unwrap_err();

        assert!(err.to_string().contains("missing.rst"));
    }
}
