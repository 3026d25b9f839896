//! Translate a verdict into the process exit surface.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::info;

use crate::decision::Verdict;

/// Exit status when the pipeline should continue.
pub const CONTINUE_STATUS: u8 = 0;
/// Exit status Drone treats as "skip the remaining steps".
pub const SKIP_STATUS: u8 = 78;
/// Exit status for every fatal error.
pub const FAILURE_STATUS: u8 = 1;

/// What the pipeline should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Skip,
}

impl Signal {
    pub fn status(self) -> u8 {
        match self {
            Signal::Continue => CONTINUE_STATUS,
            Signal::Skip => SKIP_STATUS,
        }
    }
}

impl From<Signal> for ExitCode {
    fn from(signal: Signal) -> Self {
        ExitCode::from(signal.status())
    }
}

/// The sentinel file could not be created.
#[derive(Debug, thiserror::Error)]
#[error("failed to create sentinel file {}", path.display())]
pub struct SentinelError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Act on a verdict.
///
/// On skip, the sentinel file is created (empty, truncating any existing
/// file) before [`Signal::Skip`] is returned. Parent directories must exist.
pub fn emit(verdict: &Verdict<'_>, sentinel: Option<&Path>) -> Result<Signal, SentinelError> {
    if !verdict.skip {
        return Ok(Signal::Continue);
    }
    if let Some(path) = sentinel {
        File::create(path).map_err(|source| SentinelError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "created sentinel file");
    }
    Ok(Signal::Skip)
}
