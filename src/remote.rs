//! Web URLs for the current checkout's git remotes.
//!
//! Shells out to `git remote get-url` and turns the remote into the URL of
//! the hosted repository, optionally pointing at one of its tabs.

use crate::error::{Error, Result};
use crate::text;
use std::process::Command;

/// URL of the remote called `name`, or `None` if there is no such remote.
pub fn remote_url(name: &str) -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["remote", "get-url", name])
        .output()
        .map_err(|e| Error::io("git", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No such remote") {
            return Ok(None);
        }
        return Err(Error::Git {
            args: format!("remote get-url {name}"),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
}

/// Web URL for `remote`, extended with `tab` (e.g. `pulls`, `issues/hugovk`).
/// GitLab puts project pages under `/-/`.
pub fn page_url(remote: &str, tab: Option<&str>) -> String {
    let mut url = text::web_url(remote);
    if let Some(tab) = tab {
        if url.contains("gitlab") {
            url.push_str("/-");
        }
        url.push('/');
        url.push_str(tab);
    }
    url
}
