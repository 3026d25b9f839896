use super::{FileOutcome, Verdict, APP_NAME};

/// Build a human-readable audit line for one changed file.
pub fn describe_file(file: &FileOutcome<'_>) -> String {
    match file.outcome.winner {
        Some(rule) if rule.is_negated() => {
            format!("'{}' excluded by rule '{}'", file.path, rule.raw())
        }
        Some(rule) => format!("'{}' matched rule '{}'", file.path, rule.raw()),
        None => format!("'{}' matched no rule", file.path),
    }
}

/// Build the one-line summary of a verdict.
pub fn summarize(verdict: &Verdict<'_>) -> String {
    let total = verdict.files.len();
    if total == 0 {
        return format!("{APP_NAME}: skipping pipeline, no files changed");
    }
    let matched = verdict.matched_count();
    if verdict.skip {
        format!("{APP_NAME}: skipping pipeline, none of {total} changed files matched")
    } else {
        format!("{APP_NAME}: continuing pipeline, {matched} of {total} changed files matched")
    }
}
