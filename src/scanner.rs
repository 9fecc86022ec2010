//! File discovery.
//!
//! Walks a directory recursively and keeps the files whose extension belongs
//! to the run's [`FileKind`]. Results are sorted so every run visits files,
//! and therefore fills the cache, in the same order.

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files a run rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileKind {
    /// Documentation and source text that may carry issue links.
    Docs,
    /// CI workflow definitions.
    Workflows,
}

impl FileKind {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Docs => &["py", "rst", "txt"],
            FileKind::Workflows => &["yml", "yaml"],
        }
    }

    fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Parses `--exclude` globs.
pub fn parse_excludes(globs: &[String]) -> Result<Vec<Pattern>, glob::PatternError> {
    globs.iter().map(|g| Pattern::new(g)).collect()
}

/// Collects the files to process under `input`.
///
/// A file path is returned as is, whatever its extension. A directory is
/// walked recursively; entries whose name or path matches an `exclude`
/// pattern are skipped along with everything beneath them. Symlinked files
/// and directories are followed.
pub fn collect_files(input: &Path, kind: FileKind, exclude: &[Pattern]) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.exists() {
        return Err(Error::io(
            input,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e, exclude))
    {
        let entry = entry?;
        if entry.file_type().is_file() && kind.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_excluded(entry: &walkdir::DirEntry, exclude: &[Pattern]) -> bool {
    let name = entry.file_name().to_string_lossy();
    exclude
        .iter()
        .any(|p| p.matches(&name) || p.matches_path(entry.path()))
}
