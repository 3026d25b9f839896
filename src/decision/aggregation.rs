use crate::rules::MatchOutcome;

/// Fold per-file outcomes into the skip decision.
///
/// - No files → skip (nothing to match)
/// - Any file matched → continue
/// - Otherwise → skip
pub fn is_skip(outcomes: &[MatchOutcome<'_>]) -> bool {
    !outcomes.iter().any(|outcome| outcome.matched)
}
