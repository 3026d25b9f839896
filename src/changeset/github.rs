//! GitHub REST source for pull-request files.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, LINK};
use reqwest::redirect::Policy;
use reqwest::Url;
use serde::Deserialize;

use super::{ChangeSetError, ChangeSetIdentity, Page, PageSource};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested from the API (its maximum).
const PER_PAGE: u32 = 100;

const USER_AGENT: &str = concat!("drone-skip-pipeline/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSettings {
    /// API root, e.g. `https://api.github.com` or `https://ghe.example.com/api/v3`.
    pub api_url: Url,
    /// Bearer token; requests are anonymous without one.
    pub token: Option<String>,
    /// Deadline for each request, covering connect through body.
    pub timeout: Duration,
}

/// Blocking client listing pull-request files page by page.
#[derive(Debug)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
    timeout: Duration,
}

/// The only field of a pull-request file entry we need.
#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GithubClient {
    /// Build a client. Redirects are not followed.
    pub fn new(settings: &GithubSettings) -> Result<Self, ChangeSetError> {
        if settings.api_url.cannot_be_a_base() {
            return Err(ChangeSetError::InvalidUrl(settings.api_url.to_string()));
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(ChangeSetError::Client)?;
        Ok(GithubClient {
            client,
            api_url: settings.api_url.clone(),
            token: settings.token.clone(),
            timeout: settings.timeout,
        })
    }

    /// `{api}/repos/{owner}/{repo}/pulls/{number}/files?per_page=100&page={page}`
    fn files_url(&self, identity: &ChangeSetIdentity, page: u32) -> Result<Url, ChangeSetError> {
        let mut url = self.api_url.clone();
        let number = identity.pull_request.to_string();
        url.path_segments_mut()
            .map_err(|()| ChangeSetError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                identity.owner.as_str(),
                identity.repo.as_str(),
                "pulls",
                number.as_str(),
                "files",
            ]);
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Deadline expiry gets its own variant so the diagnostic says so.
    fn transport_error(&self, err: reqwest::Error) -> ChangeSetError {
        if err.is_timeout() {
            ChangeSetError::Timeout {
                after: self.timeout,
                source: err,
            }
        } else {
            ChangeSetError::Transport(err)
        }
    }
}

impl PageSource for GithubClient {
    fn fetch_page(
        &self,
        identity: &ChangeSetIdentity,
        page: u32,
    ) -> Result<Page, ChangeSetError> {
        let url = self.files_url(identity, page)?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChangeSetError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let next = match response.headers().get(LINK) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| ChangeSetError::MalformedLink("non-ASCII header".to_string()))?;
                next_page(value)?
            }
            None => None,
        };

        let files: Vec<PullRequestFile> = response.json().map_err(|err| {
            if err.is_timeout() {
                self.transport_error(err)
            } else {
                ChangeSetError::Decode(err)
            }
        })?;
        Ok(Page {
            files: files.into_iter().map(|file| file.filename).collect(),
            next,
        })
    }
}

/// Extract the API's `message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Find the `rel="next"` link and return its `page` query parameter.
///
/// `None` means there is no next link, i.e. this is the terminal page.
fn next_page(link: &str) -> Result<Option<u32>, ChangeSetError> {
    for entry in link.split(',') {
        let mut parts = entry.split(';');
        let target = parts.next().unwrap_or_default().trim();
        if !parts.any(|param| param.trim() == r#"rel="next""#) {
            continue;
        }

        let malformed = || ChangeSetError::MalformedLink(entry.trim().to_string());
        let target = target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or_else(malformed)?;
        let url = Url::parse(target).map_err(|_| malformed())?;
        let page = url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
            .ok_or_else(malformed)?;
        return Ok(Some(page));
    }
    Ok(None)
}
