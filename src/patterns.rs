//! Recognisers for the references this crate rewrites.
//!
//! Each matcher takes one line and returns every non-overlapping match in
//! left-to-right order, with the byte span the rewriter will replace. A
//! missing scheme, trailing letters after the number or an unexpected
//! version character means no match.

use crate::error::{Error, Result};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// `http://bugs.python.org/issue5237`, `https://bugs.python.org/issue9633`.
static ISSUE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://bugs\.python\.org/issue(\d+)\b").expect("valid regex"));

/// ``:issue:`45440` ``
static ISSUE_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":issue:`(\d+)`").expect("valid regex"));

/// `- uses: actions/checkout@v3`, optionally quoted. The version must be
/// followed by a closing quote, whitespace or the end of the line so that
/// `@v1.2.3-beta` is not read as `@v1.2.3`.
static USES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:- )?uses: "?([A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+)@([a-z0-9.]+)(?:"|\s|$)"#)
        .expect("valid regex")
});

/// An old-tracker issue reference found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyReference {
    /// Full URL form. `span` covers the whole URL.
    Url { number: u64, span: Range<usize> },
    /// Inline role form. `span` covers ``:issue:`N` ``.
    Role { number: u64, span: Range<usize> },
}

impl LegacyReference {
    pub fn number(&self) -> u64 {
        match self {
            LegacyReference::Url { number, .. } | LegacyReference::Role { number, .. } => *number,
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            LegacyReference::Url { span, .. } | LegacyReference::Role { span, .. } => span.clone(),
        }
    }
}

/// A pinned action in a workflow file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPin {
    /// `owner/repo`.
    pub repo: String,
    /// The token after `@`.
    pub version: String,
    /// Byte span of `owner/repo@version` within the line.
    pub span: Range<usize>,
}

/// All URL-form references on `line`.
pub fn url_references(line: &str) -> Result<Vec<LegacyReference>> {
    references(&ISSUE_URL, line, |number, span| LegacyReference::Url { number, span })
}

/// All role-form references on `line`.
pub fn role_references(line: &str) -> Result<Vec<LegacyReference>> {
    references(&ISSUE_ROLE, line, |number, span| LegacyReference::Role { number, span })
}

fn references(
    pattern: &Regex,
    line: &str,
    make: fn(u64, Range<usize>) -> LegacyReference,
) -> Result<Vec<LegacyReference>> {
    pattern
        .captures_iter(line)
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?)))
        .map(|(whole, digits)| Ok(make(parse_issue_number(digits.as_str(), line)?, whole.range())))
        .collect()
}

/// All `uses:` pins on `line`.
pub fn action_pins(line: &str) -> Vec<ActionPin> {
    USES.captures_iter(line)
        .filter_map(|caps| {
            let repo = caps.get(1)?;
            let version = caps.get(2)?;
            Some(ActionPin {
                repo: repo.as_str().to_string(),
                version: version.as_str().to_string(),
                span: repo.start()..version.end(),
            })
        })
        .collect()
}

fn parse_issue_number(capture: &str, line: &str) -> Result<u64> {
    match capture.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::MalformedMatch {
            capture: capture.to_string(),
            line: line.trim_end().to_string(),
        }),
    }
}
