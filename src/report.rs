//! Run summary.

use crate::resolver::CacheStats;
use colored::Colorize;
use serde::Serialize;

/// Totals for one run over a file or tree.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub lines_changed: usize,
    pub files_written: usize,
    pub cache: CacheStats,
}

impl Summary {
    pub fn print(&self, json: bool) -> serde_json::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            println!(
                "{} {} file(s) scanned, {} changed ({} line(s)), {} written",
                "Summary:".bold(),
                self.files_scanned,
                self.files_changed,
                self.lines_changed,
                self.files_written
            );
        }
        Ok(())
    }
}
