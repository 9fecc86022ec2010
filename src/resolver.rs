//! Resolution of legacy references to their new targets.
//!
//! Lookups go through two traits so the rewriters can run against the real
//! services ([`HttpLookup`]) or against stubs in tests. Every lookup is
//! memoised in a [`ResolverCache`] owned by the resolver for the lifetime of
//! one run: an answer fetched once is reused for every later line and file.
//! Entries are never evicted or refreshed.

use crate::error::{Error, Result};
use crate::text;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use tracing::{debug, info};

pub const DEFAULT_REDIRECT_ENDPOINT: &str = "https://bugs.python.org/issue?@action=redirect&bpo=";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Branch pins that look like versions but must never be replaced.
const BRANCH_PINS: &[(&str, &str)] = &[("pypa/gh-action-pypi-publish", "release")];

/// Follows the old tracker's redirect for an issue number.
pub trait IssueLookup {
    /// Returns the final URL the redirect lands on.
    fn redirect(&self, number: u64) -> Result<String>;
}

/// Lists the tags of a hosted repository.
pub trait TagLookup {
    fn tags(&self, repo: &str) -> Result<Vec<String>>;
}

/// Hit/miss counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    pub fn lookups(&self) -> usize {
        self.hits + self.misses
    }
}

/// Memoises `key -> value` for the duration of a run.
///
/// A failed fetch stores nothing, so the next lookup of the same key tries
/// again.
#[derive(Debug)]
pub struct ResolverCache<K, V> {
    entries: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for ResolverCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Eq + Hash, V> ResolverCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, calling `fetch` on a miss.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        fetch: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<&V, E> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let value = fetch(entry.key())?;
                self.misses += 1;
                Ok(entry.insert(value))
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Resolves old issue numbers to new issue URLs.
pub struct IssueResolver<L> {
    lookup: L,
    cache: ResolverCache<u64, String>,
}

impl<L: IssueLookup> IssueResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: ResolverCache::new(),
        }
    }

    pub fn resolve(&mut self, number: u64) -> Result<String> {
        let lookup = &self.lookup;
        let url = self.cache.get_or_try_insert_with(number, |&n| {
            let url = lookup.redirect(n)?;
            info!("Issue {n} redirects to {url}");
            Ok::<_, Error>(url)
        })?;
        Ok(url.clone())
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Finds upgrade tags for pinned actions.
///
/// Only the tag list is cached. The choice of tag is made again on every
/// call, so a pin with no candidate warns each time it is seen.
pub struct TagResolver<L> {
    lookup: L,
    cache: ResolverCache<String, Vec<String>>,
    warnings: Vec<String>,
}

impl<L: TagLookup> TagResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: ResolverCache::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns the tag `repo@old_version` should move to, or `None` when the
    /// pin is a branch, a commit, or has no same-length tag.
    ///
    /// The returned tag may equal `old_version` when it is already the newest.
    pub fn upgrade(&mut self, repo: &str, old_version: &str) -> Result<Option<String>> {
        if is_branch(repo, old_version) {
            info!("{repo}'s '{old_version}' is a branch not tag, skipping");
            return Ok(None);
        }
        if is_commit_sha(old_version) {
            info!("{repo} is pinned to commit {old_version}, skipping");
            return Ok(None);
        }

        let lookup = &self.lookup;
        let tags = self
            .cache
            .get_or_try_insert_with(repo.to_string(), |repo| lookup.tags(repo))?;
        debug!("{repo} tags: {tags:?}");

        match select_upgrade(tags, old_version) {
            Some(tag) => Ok(Some(tag.to_string())),
            None => {
                let message = no_upgrade_message(repo, old_version, tags);
                println!("{}", message.red());
                self.warnings.push(message);
                Ok(None)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// No-upgrade warnings printed so far, in order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Picks the greatest tag, compared as a string, among those with the same
/// length as `old_version`.
///
/// Comparing only equal-length tags lets plain string order stand in for
/// version order under both `vN.N.N` and date-based schemes. It can pick the
/// wrong tag when a project mixes schemes of equal length (`v3.0` against
/// `3.0.0`); that limitation is kept as is.
pub fn select_upgrade<'a>(tags: &'a [String], old_version: &str) -> Option<&'a str> {
    let width = old_version.chars().count();
    tags.iter()
        .filter(|tag| tag.chars().count() == width)
        .max()
        .map(String::as_str)
}

fn is_branch(repo: &str, version: &str) -> bool {
    matches!(version, "main" | "master") || BRANCH_PINS.contains(&(repo, version))
}

fn is_commit_sha(version: &str) -> bool {
    version.len() == 40 && version.chars().all(|c| c.is_ascii_hexdigit())
}

/// Warning for a pin with no same-length tag, listing every candidate.
pub fn no_upgrade_message(repo: &str, old_version: &str, tags: &[String]) -> String {
    format!("No upgrade found for https://github.com/{repo}\n  Old version: {old_version}\n  New tags: {tags:?}")
}

/// Target of the `rel="next"` entry of a `Link` header, if any.
pub fn next_link(header: &str) -> Option<&str> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| matches!(p.trim(), r#"rel="next""# | "rel=next"));
        is_next.then(|| text::strip_affixes(target.trim(), "<", ">"))
    })
}

/// Where the real lookups go.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Redirect endpoint; the issue number is appended.
    pub redirect: String,
    /// REST API base URL.
    pub api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            redirect: DEFAULT_REDIRECT_ENDPOINT.to_string(),
            api: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}

/// Blocking HTTP implementation of both lookups.
pub struct HttpLookup {
    client: reqwest::blocking::Client,
    endpoints: Endpoints,
}

impl HttpLookup {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client, endpoints })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send().map_err(|source| Error::Network {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

impl IssueLookup for HttpLookup {
    fn redirect(&self, number: u64) -> Result<String> {
        let url = format!("{}{}", self.endpoints.redirect, number);
        info!("Redirect link:\t{url}");
        let response = self.get(&url)?;
        Ok(response.url().to_string())
    }
}

impl TagLookup for HttpLookup {
    fn tags(&self, repo: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/repos/{}/tags?per_page=100",
            self.endpoints.api.trim_end_matches('/'),
            repo
        );
        let mut names = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            info!("{url}");
            let response = self.get(&url)?;
            next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link)
                .map(str::to_string);
            let page: Vec<Tag> = response.json().map_err(|source| Error::Network {
                url: url.clone(),
                source,
            })?;
            names.extend(page.into_iter().map(|tag| tag.name));
        }
        Ok(names)
    }
}


#[cfg(test)]
mod tests {
    use super::stubs::{StubIssues, StubTags};
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn same_issue_is_fetched_once() {
        let stub = StubIssues::with(&[(28524, "https://github.com/python/cpython/issues/72710")]);
        let mut resolver = IssueResolver::new(&stub);

        let first = resolver.resolve(28524).unwrap();
        let second = resolver.resolve(28524).unwrap();

        assert_eq!(first, "https://github.com/python/cpython/issues/72710");
        assert_eq!(first, second);
        assert_eq!(stub.calls.get(), 1);
        assert_eq!(
            resolver.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn distinct_issues_are_fetched_separately() {
        let stub = StubIssues::default();
        let mut resolver = IssueResolver::new(&stub);
        resolver.resolve(1).unwrap();
        resolver.resolve(2).unwrap();
        resolver.resolve(1).unwrap();
        assert_eq!(stub.calls.get(), 2);
        assert_eq!(resolver.stats().lookups(), 3);
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let mut cache: ResolverCache<u64, String> = ResolverCache::new();
        let failed: Result<&String, &str> = cache.get_or_try_insert_with(7, |_| Err("offline"));
        assert!(failed.is_err());
        let value = cache
            .get_or_try_insert_with(7, |_| Ok::<_, &str>("ok".to_string()))
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn picks_greatest_same_length_tag() {
        let candidates = tags(&["v2.1.0", "v1.9.9", "v2.0.0"]);
        assert_eq!(select_upgrade(&candidates, "v1.0.0"), Some("v2.1.0"));
    }

    #[test]
    fn ignores_tags_of_other_lengths() {
        let candidates = tags(&["v4.1.0", "v4", "v3", "v2"]);
        assert_eq!(select_upgrade(&candidates, "v3"), Some("v4"));
    }

    #[test]
    fn date_tags_compare_as_strings() {
        let candidates = tags(&["2023.01.15", "2024.03.02", "2022.12.31"]);
        assert_eq!(select_upgrade(&candidates, "2022.12.31"), Some("2024.03.02"));
    }

    #[test]
    fn no_same_length_tag_yields_none() {
        let candidates = tags(&["v10", "v11"]);
        assert_eq!(select_upgrade(&candidates, "v3.0"), None);
    }

    #[test]
    fn tag_list_is_fetched_once_per_repo() {
        let stub = StubTags::with("actions/checkout", &["v4", "v3", "v2"]);
        let mut resolver = TagResolver::new(&stub);

        assert_eq!(
            resolver.upgrade("actions/checkout", "v3").unwrap().as_deref(),
            Some("v4")
        );
        assert_eq!(
            resolver.upgrade("actions/checkout", "v2").unwrap().as_deref(),
            Some("v4")
        );
        assert_eq!(stub.requested.borrow().len(), 1);
    }

    #[test]
    fn missing_upgrade_is_rederived_from_cached_tags() {
        let stub = StubTags::with("some/tool", &["1.0.0", "2.0.0"]);
        let mut resolver = TagResolver::new(&stub);

        assert_eq!(resolver.upgrade("some/tool", "v3").unwrap(), None);
        assert_eq!(resolver.upgrade("some/tool", "v3").unwrap(), None);
        assert_eq!(stub.requested.borrow().as_slice(), ["some/tool"]);
        assert_eq!(resolver.stats().hits, 1);

        let expected = no_upgrade_message("some/tool", "v3", &tags(&["1.0.0", "2.0.0"]));
        assert_eq!(resolver.warnings(), [expected.clone(), expected]);
    }

    #[test]
    fn no_upgrade_message_names_repo_version_and_all_tags() {
        let message = no_upgrade_message("some/tool", "v3", &tags(&["1.0.0", "2.0.0"]));
        assert_eq!(
            message,
            "No upgrade found for https://github.com/some/tool\n  Old version: v3\n  New tags: [\"1.0.0\", \"2.0.0\"]"
        );
    }

    #[test]
    fn successful_upgrade_records_no_warning() {
        let stub = StubTags::with("actions/checkout", &["v4", "v3"]);
        let mut resolver = TagResolver::new(&stub);
        resolver.upgrade("actions/checkout", "v3").unwrap();
        assert!(resolver.warnings().is_empty());
    }

    #[test]
    fn next_link_finds_next_page() {
        let header = r#"<https://api.github.com/repositories/1/tags?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/tags?per_page=100&page=5>; rel="last""#;
        assert_eq!(
            next_link(header),
            Some("https://api.github.com/repositories/1/tags?per_page=100&page=2")
        );
    }

    #[test]
    fn next_link_absent_on_last_page() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=1>; rel="first""#;
        assert_eq!(next_link(header), None);
        assert_eq!(next_link(""), None);
    }

    #[test]
    fn branches_and_commits_skip_the_lookup() {
        let stub = StubTags::with("some/tool", &["main"]);
        let mut resolver = TagResolver::new(&stub);

        assert_eq!(resolver.upgrade("some/tool", "main").unwrap(), None);
        assert_eq!(resolver.upgrade("some/tool", "master").unwrap(), None);
        assert_eq!(
            resolver
                .upgrade("pypa/gh-action-pypi-publish", "release")
                .unwrap(),
            None
        );
        assert_eq!(
            resolver
                .upgrade("some/tool", "8e8c483db84b4bee98b60c0593521ed34d9990e8")
                .unwrap(),
            None
        );
        assert!(stub.requested.borrow().is_empty());
    }
}
