//! Line rewriting.
//!
//! A rewriter asks the matchers for every reference on a line, resolves each
//! one and replaces exactly that reference's span. Replacements are sorted by
//! position and applied back to front so earlier spans stay valid. Everything
//! outside the spans, line ending included, is kept byte for byte.
//!
//! The rewritten forms never match the legacy patterns again, so running a
//! rewriter over its own output changes nothing.

use crate::error::Result;
use crate::patterns::{self, LegacyReference};
use crate::resolver::{CacheStats, IssueLookup, IssueResolver, TagLookup, TagResolver};
use crate::text;
use tracing::info;

/// Outcome of rewriting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub original: String,
    pub new: String,
    pub changed: bool,
}

impl LineEdit {
    fn new(original: &str, new: String) -> Self {
        let changed = new != original;
        Self {
            original: original.to_string(),
            new,
            changed,
        }
    }
}

/// Rewrites one line at a time, sharing a resolver across lines and files.
pub trait LineRewriter {
    fn rewrite_line(&mut self, line: &str) -> Result<LineEdit>;

    /// Statistics of the cache behind this rewriter.
    fn cache_stats(&self) -> CacheStats;
}

/// A single text replacement with position information.
#[derive(Debug, Clone)]
struct Replacement {
    start: usize,
    end: usize,
    new_text: String,
}

/// Applies replacements to `line`, back to front. Out-of-range or inverted
/// spans are skipped.
fn apply_replacements(line: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = line.to_string();
    for rep in replacements {
        if rep.start <= rep.end && rep.end <= result.len() {
            result.replace_range(rep.start..rep.end, &rep.new_text);
        }
    }
    result
}

/// Rewrites old tracker links and roles to their new issue locations.
///
/// `https://bugs.python.org/issueN` becomes the URL the redirect lands on;
/// ``:issue:`N` `` becomes ``:gh:`M` `` where `M` is the last path segment of
/// that URL.
pub struct IssueLinkRewriter<L> {
    resolver: IssueResolver<L>,
}

impl<L: IssueLookup> IssueLinkRewriter<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            resolver: IssueResolver::new(lookup),
        }
    }
}

impl<L: IssueLookup> LineRewriter for IssueLinkRewriter<L> {
    fn rewrite_line(&mut self, line: &str) -> Result<LineEdit> {
        let mut references = patterns::url_references(line)?;
        references.extend(patterns::role_references(line)?);
        if references.is_empty() {
            return Ok(LineEdit::new(line, line.to_string()));
        }

        info!("Old line:\t{}", line.trim_end());
        let mut replacements = Vec::with_capacity(references.len());
        for reference in &references {
            let number = reference.number();
            let target = self.resolver.resolve(number)?;
            let new_text = match reference {
                LegacyReference::Url { .. } => target,
                LegacyReference::Role { .. } => format!(":gh:`{}`", text::last_segment(&target)),
            };
            let span = reference.span();
            replacements.push(Replacement {
                start: span.start,
                end: span.end,
                new_text,
            });
        }

        let new = apply_replacements(line, replacements);
        info!("New line:\t{}", new.trim_end());
        Ok(LineEdit::new(line, new))
    }

    fn cache_stats(&self) -> CacheStats {
        self.resolver.stats()
    }
}

/// Moves `uses: owner/repo@version` pins to the newest same-shaped tag.
pub struct ActionPinRewriter<L> {
    resolver: TagResolver<L>,
}

impl<L: TagLookup> ActionPinRewriter<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            resolver: TagResolver::new(lookup),
        }
    }
}

impl<L: TagLookup> LineRewriter for ActionPinRewriter<L> {
    fn rewrite_line(&mut self, line: &str) -> Result<LineEdit> {
        let mut replacements = Vec::new();
        for pin in patterns::action_pins(line) {
            let Some(tag) = self.resolver.upgrade(&pin.repo, &pin.version)? else {
                continue;
            };
            if tag != pin.version {
                info!("{}: {} -> {}", pin.repo, pin.version, tag);
                replacements.push(Replacement {
                    start: pin.span.start,
                    end: pin.span.end,
                    new_text: format!("{}@{}", pin.repo, tag),
                });
            }
        }
        Ok(LineEdit::new(line, apply_replacements(line, replacements)))
    }

    fn cache_stats(&self) -> CacheStats {
        self.resolver.stats()
    }
}
