//! Library behind the `github-tools` maintenance commands.
//!
//! The core is a line rewriter that works in three phases:
//!
//! 1. **Matching**: find old tracker links, `:issue:` roles or `uses:` action
//!    pins on a line ([`patterns`])
//! 2. **Resolving**: follow the tracker redirect or list the action's tags,
//!    memoised for the whole run ([`resolver`])
//! 3. **Rewriting**: replace each matched span and report a diff
//!    ([`rewriter`], [`diff`], [`driver`])
//!
//! # Example
//!
//! ```no_run
//! use github_tools::driver::{self, RunOptions};
//! use github_tools::resolver::{Endpoints, HttpLookup};
//! use github_tools::rewriter::IssueLinkRewriter;
//! use github_tools::scanner::FileKind;
//! use std::path::Path;
//!
//! let lookup = HttpLookup::new(Endpoints::default()).unwrap();
//! let mut rewriter = IssueLinkRewriter::new(lookup);
//! let options = RunOptions { dry_run: true, interactive: false };
//! let summary = driver::process_path(Path::new("Doc"), FileKind::Docs, &[], &mut rewriter, options).unwrap();
//!
//! println!("{} file(s) would change", summary.files_changed);
//! ```

pub mod diff;
pub mod driver;
pub mod error;
pub mod logging;
pub mod patterns;
pub mod remote;
pub mod report;
pub mod resolver;
pub mod rewriter;
pub mod scanner;
pub mod text;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use patterns::{ActionPin, LegacyReference};
pub use rewriter::{LineEdit, LineRewriter};
