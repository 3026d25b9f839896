use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::changeset::github::{GithubSettings, DEFAULT_API_URL};
use crate::changeset::ChangeSetIdentity;

/// Default deadline for each change-set request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw plugin settings, each read from a flag or its environment variable.
///
/// Everything is optional at this layer; [`Config::from_settings`] decides
/// what is required so that a missing value produces one clear diagnostic.
#[derive(Debug, Default, Parser)]
#[command(name = "drone-skip-pipeline", version, about)]
pub struct Settings {
    /// Triggering pipeline event
    #[arg(long, env = "DRONE_BUILD_EVENT")]
    pub event: Option<String>,

    /// Repository owner
    #[arg(long, env = "DRONE_REPO_OWNER")]
    pub repo_owner: Option<String>,

    /// Repository name
    #[arg(long, env = "DRONE_REPO_NAME")]
    pub repo_name: Option<String>,

    /// Pull request number
    #[arg(long, env = "DRONE_PULL_REQUEST")]
    pub pull_request: Option<String>,

    /// Access token for the GitHub API (anonymous when unset)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Comma-separated path rules
    #[arg(long, env = "PLUGIN_RULES", value_delimiter = ',')]
    pub rules: Vec<String>,

    /// File to create when the pipeline is skipped
    #[arg(long, env = "PLUGIN_TOUCH")]
    pub touch: Option<PathBuf>,

    /// GitHub API root URL
    #[arg(long, env = "PLUGIN_GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Request deadline in seconds
    #[arg(long, env = "PLUGIN_TIMEOUT")]
    pub timeout: Option<String>,
}

/// Validated, immutable plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub event: String,
    pub identity: ChangeSetIdentity,
    pub github: GithubSettings,
    /// Rule lines in configuration order, not yet compiled.
    pub rules: Vec<String>,
    pub sentinel: Option<PathBuf>,
}

/// Errors that can occur while validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    /// Validate raw settings.
    ///
    /// Empty values count as unset. Required settings are checked in a fixed
    /// order (event, pull request, repository name, repository owner) and the
    /// first missing one is reported.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let event = required(settings.event, "DRONE_BUILD_EVENT")?;
        let pull_request = parse_pull_request(required(
            settings.pull_request,
            "DRONE_PULL_REQUEST",
        )?)?;
        let repo = required(settings.repo_name, "DRONE_REPO_NAME")?;
        let owner = required(settings.repo_owner, "DRONE_REPO_OWNER")?;

        let api_url = match non_empty(settings.github_api_url) {
            Some(raw) => parse_api_url(raw)?,
            None => parse_api_url(DEFAULT_API_URL.to_string())?,
        };
        let timeout = match non_empty(settings.timeout) {
            Some(raw) => parse_timeout(raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            event,
            identity: ChangeSetIdentity {
                owner,
                repo,
                pull_request,
            },
            github: GithubSettings {
                api_url,
                token: non_empty(settings.github_token),
                timeout,
            },
            rules: split_rules(settings.rules),
            sentinel: settings.touch.filter(|p| !p.as_os_str().is_empty()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing(name))
}

/// `0` is what an unset numeric variable decodes to, so it counts as missing.
fn parse_pull_request(raw: String) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Missing("DRONE_PULL_REQUEST")),
        Ok(number) => Ok(number),
        Err(_) => Err(ConfigError::Invalid {
            name: "DRONE_PULL_REQUEST",
            value: raw,
        }),
    }
}

fn parse_api_url(raw: String) -> Result<Url, ConfigError> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::Invalid {
            name: "PLUGIN_GITHUB_API_URL",
            value: raw,
        }),
    }
}

fn parse_timeout(raw: String) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            name: "PLUGIN_TIMEOUT",
            value: raw,
        }),
    }
}

/// Flatten comma-joined entries and trim each rule. Blank entries are kept
/// for the rule compiler to drop.
fn split_rules(entries: Vec<String>) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(|rule| rule.trim().to_string())
        .collect()
}
