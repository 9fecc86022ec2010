//! Unified diffs of a file's old and new content, coloured for the terminal.
//!
//! Purely presentational: nothing here decides whether a file is written.

use colored::Colorize;
use similar::TextDiff;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    Added,
    Removed,
    Context,
}

impl DiffLineKind {
    /// Classifies a diff line by its first character. File headers (`---`,
    /// `+++`) are classified like the lines they introduce.
    pub fn of(line: &str) -> Self {
        if line.starts_with('+') {
            DiffLineKind::Added
        } else if line.starts_with('-') {
            DiffLineKind::Removed
        } else {
            DiffLineKind::Context
        }
    }
}

/// Line-based unified diff between `old` and `new`, or `None` if they are equal.
pub fn unified(old: &str, new: &str, path: &Path) -> Option<String> {
    if old == new {
        return None;
    }
    let name = path.display().to_string();
    Some(
        TextDiff::from_lines(old, new)
            .unified_diff()
            .header(&name, &name)
            .to_string(),
    )
}

/// Colours additions green and removals red, leaving context as is.
pub fn colorize(diff: &str) -> String {
    diff.lines()
        .map(|line| match DiffLineKind::of(line) {
            DiffLineKind::Added => format!("{}\n", line.green()),
            DiffLineKind::Removed => format!("{}\n", line.red()),
            DiffLineKind::Context => format!("{line}\n"),
        })
        .collect()
}

/// Prints the coloured diff, or a "no change" notice when nothing changed.
pub fn print_report(old: &str, new: &str, path: &Path) {
    match unified(old, new, path) {
        Some(diff) => print!("{}", colorize(&diff)),
        None => println!("{}", format!("no change for {}", path.display()).yellow()),
    }
}
