//! Change-set retrieval: the ordered list of files changed by a pull request.
//!
//! [`list_changed_files`] drives a [`PageSource`] until it reports a terminal
//! page, accumulating everything into one ordered sequence before any rule is
//! evaluated.

pub mod github;

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

pub use github::GithubClient;

/// Upper bound on pages requested for one change set.
pub const MAX_PAGES: u32 = 100;

/// Identifies the pull request whose files are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetIdentity {
    pub owner: String,
    pub repo: String,
    pub pull_request: u64,
}

impl fmt::Display for ChangeSetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.pull_request)
    }
}

/// One page of changed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Repository-relative paths, in server order.
    pub files: Vec<String>,
    /// Number of the next page, or `None` on the terminal page.
    pub next: Option<u32>,
}

/// Errors retrieving the change set. All are fatal; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ChangeSetError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("request timed out after {}s", after.as_secs())]
    Timeout {
        after: Duration,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} listing changed files: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode changed files")]
    Decode(#[source] reqwest::Error),
    #[error("malformed Link header: {0}")]
    MalformedLink(String),
    #[error("pagination did not advance: page {current} points to page {next}")]
    Pagination { current: u32, next: u32 },
    #[error("change set exceeds {0} pages")]
    PageLimit(u32),
}

/// A paginated source of changed files.
pub trait PageSource {
    /// Fetch one page, numbered from 1. One attempt; errors propagate unchanged.
    fn fetch_page(&self, identity: &ChangeSetIdentity, page: u32)
        -> Result<Page, ChangeSetError>;
}

/// List every changed file of a pull request, following pagination to the end.
///
/// Pages are requested one at a time, starting at page 1, and concatenated in
/// the order received. Fails if a page points backwards or the change set
/// spans more than [`MAX_PAGES`] pages.
pub fn list_changed_files<S>(
    source: &S,
    identity: &ChangeSetIdentity,
) -> Result<Vec<String>, ChangeSetError>
where
    S: PageSource + ?Sized,
{
    let mut files = Vec::new();
    let mut page = 1;

    for fetched in 1..=MAX_PAGES {
        let current = source.fetch_page(identity, page)?;
        debug!(page, count = current.files.len(), "fetched change-set page");
        files.extend(current.files);

        match current.next {
            None => {
                info!(files = files.len(), pages = fetched, "listed changed files for {identity}");
                return Ok(files);
            }
            Some(next) if next <= page => {
                return Err(ChangeSetError::Pagination {
                    current: page,
                    next,
                })
            }
            Some(next) => page = next,
        }
    }

    Err(ChangeSetError::PageLimit(MAX_PAGES))
}
