use std::error::Error;
use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use crate::changeset::{self, ChangeSetError, GithubClient};
use crate::config::{Config, ConfigError, Settings};
use crate::decision::{self, reason, APP_NAME};
use crate::rules::{PatternError, RuleSet};
use crate::signal::{self, SentinelError, Signal, FAILURE_STATUS};

/// Every fatal error of one invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Arguments(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    ChangeSet(#[from] ChangeSetError),
    #[error(transparent)]
    Sentinel(#[from] SentinelError),
}

/// Parse command-line arguments (with environment fallbacks), then run.
///
/// `--help` and `--version` print and exit successfully. Any other parse
/// failure is fatal and reported like every other fatal error.
pub fn run_from_args<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Settings::try_parse_from(args) {
        Ok(settings) => run(settings),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        Err(err) => {
            super::init_logging();
            fail(&RunError::Arguments(argument_error(&err)))
        }
    }
}

/// Run one invocation and map the outcome to an exit status.
///
/// Fatal errors are logged as a single diagnostic line and exit with
/// [`FAILURE_STATUS`]; no verdict is emitted for them.
pub fn run(settings: Settings) -> ExitCode {
    super::init_logging();
    info!("{APP_NAME} {}", env!("CARGO_PKG_VERSION"));

    match execute(settings) {
        Ok(signal) => signal.into(),
        Err(err) => fail(&err),
    }
}

fn fail(err: &RunError) -> ExitCode {
    error!("{APP_NAME}: {}", diagnostic(err));
    ExitCode::from(FAILURE_STATUS)
}

/// Render an error and every cause beneath it on one line.
fn diagnostic(err: &dyn Error) -> String {
    let mut line = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        line.push_str(": ");
        line.push_str(&inner.to_string());
        cause = inner.source();
    }
    line
}

/// First line of a clap error, without its `error: ` prefix or usage text.
fn argument_error(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default().trim();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

/// Configuration, then rules, then the change set: a bad setting or rule
/// fails before any network access.
fn execute(settings: Settings) -> Result<Signal, RunError> {
    let config = Config::from_settings(settings)?;
    let rules = RuleSet::compile(&config.rules)?;
    info!(
        event = %config.event,
        rules = rules.len(),
        "evaluating {}",
        config.identity
    );

    let client = GithubClient::new(&config.github)?;
    let files = changeset::list_changed_files(&client, &config.identity)?;

    let verdict = decision::decide(&rules, &files);
    for file in &verdict.files {
        info!("{}", reason::describe_file(file));
    }
    info!("{}", reason::summarize(&verdict));

    Ok(signal::emit(&verdict, config.sentinel.as_deref())?)
}
