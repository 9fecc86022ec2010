//! Small string helpers shared by the rewriters and `repo-url`.

/// Removes `prefix` from the start and `suffix` from the end of `s`, each only
/// if present. Either may be empty.
pub fn strip_affixes<'a>(s: &'a str, prefix: &str, suffix: &str) -> &'a str {
    let s = s.strip_prefix(prefix).unwrap_or(s);
    s.strip_suffix(suffix).unwrap_or(s)
}

/// Final `/`-separated segment of a URL or path, ignoring one trailing slash.
pub fn last_segment(url: &str) -> &str {
    let trimmed = strip_affixes(url, "", "/");
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Turns a git remote URL into the repository's web URL.
///
/// `git@github.com:user/repo.git` becomes `https://github.com/user/repo`;
/// HTTPS remotes only lose the `.git` suffix.
pub fn web_url(remote: &str) -> String {
    let url = if remote.starts_with("git@") {
        format!("https://{}", strip_affixes(remote, "git@", "").replacen(':', "/", 1))
    } else {
        remote.to_string()
    };
    strip_affixes(&url, "", ".git").to_string()
}
