//! Library error type.
//!
//! Everything that aborts a run ends up here. A missing upgrade tag is not
//! an error: it is reported as a warning and the line is left alone.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A redirect or tag request could not be completed.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The redirect endpoint or the tag API answered with a non-success status.
    #[error("{url} returned {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A pattern matched but the capture is not a usable issue number.
    #[error("malformed issue number `{capture}` in line: {line}")]
    MalformedMatch { capture: String, line: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walking {0}")]
    Walk(#[from] walkdir::Error),

    /// `git` ran but did not succeed.
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    /// The interactive confirmation prompt could not be shown.
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
