mod aggregation;
pub mod reason;

use crate::rules::{evaluate, MatchOutcome, RuleSet};

pub use aggregation::is_skip;

pub(crate) const APP_NAME: &str = "drone-skip-pipeline";

/// The match outcome of one changed file.
#[derive(Debug, Clone, Copy)]
pub struct FileOutcome<'a> {
    pub path: &'a str,
    pub outcome: MatchOutcome<'a>,
}

/// The skip/continue decision for one change set, with a per-file audit trail.
#[derive(Debug, Clone)]
pub struct Verdict<'a> {
    /// True when no changed file matched the rules.
    pub skip: bool,
    /// One entry per changed file, in change-set order.
    pub files: Vec<FileOutcome<'a>>,
}

impl Verdict<'_> {
    /// Number of changed files that matched.
    pub fn matched_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.matched).count()
    }
}

/// Decide whether the rest of the pipeline should be skipped.
///
/// Each changed file is evaluated against the rules. The pipeline continues
/// when at least one file matched and is skipped otherwise, including when
/// the change set is empty. Pure: no I/O and no logging.
///
/// # Examples
///
/// ```
/// use drone_skip_pipeline::decision::decide;
/// use drone_skip_pipeline::rules::RuleSet;
///
/// let rules = RuleSet::compile(["*.go"]).unwrap();
///
/// let docs_only = vec!["readme.md".to_string()];
/// assert!(decide(&rules, &docs_only).skip);
///
/// let with_code = vec!["main.go".to_string(), "readme.md".to_string()];
/// assert!(!decide(&rules, &with_code).skip);
/// ```
pub fn decide<'a>(rules: &'a RuleSet, changed_files: &'a [String]) -> Verdict<'a> {
    let files: Vec<FileOutcome<'a>> = changed_files
        .iter()
        .map(|path| FileOutcome {
            path: path.as_str(),
            outcome: evaluate(rules, path),
        })
        .collect();

    let outcomes: Vec<MatchOutcome<'_>> = files.iter().map(|f| f.outcome).collect();
    Verdict {
        skip: is_skip(&outcomes),
        files,
    }
}

#[cfg(test)]
mod tests;
