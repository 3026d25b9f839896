use super::pattern::{Pattern, Segment};
use super::RuleSet;

/// Result of evaluating one path against a [`RuleSet`].
#[derive(Debug, Clone, Copy)]
pub struct MatchOutcome<'r> {
    /// True when the winning rule is a plain (non-negated) rule.
    pub matched: bool,
    /// The last rule, in configuration order, that structurally matched the path.
    pub winner: Option<&'r Pattern>,
}

/// Evaluate a repository-relative, `/`-separated path against a rule set.
///
/// Every rule is tested; the last one that applies wins. A winning `!` rule
/// excludes the path even if earlier rules matched it. No applicable rule
/// means not matched.
pub fn evaluate<'r>(rules: &'r RuleSet, path: &str) -> MatchOutcome<'r> {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();

    // Last match wins, so the first hit scanning backwards is the winner.
    let winner = rules
        .patterns()
        .iter()
        .rev()
        .find(|pattern| applies(pattern, &components));

    MatchOutcome {
        matched: winner.is_some_and(|pattern| !pattern.is_negated()),
        winner,
    }
}

/// Structural applicability of one pattern, ignoring negation.
fn applies(pattern: &Pattern, components: &[&str]) -> bool {
    let segments = pattern.segments();
    if pattern.is_anchored() {
        let prefixes = matched_prefixes(segments, components);
        if pattern.is_directory_only() {
            // Must cover a leading run of directories, never the final component.
            prefixes
                .get(1..components.len())
                .is_some_and(|dirs| dirs.iter().any(|&hit| hit))
        } else {
            prefixes[components.len()]
        }
    } else {
        let candidates = if pattern.is_directory_only() {
            &components[..components.len().saturating_sub(1)]
        } else {
            components
        };
        candidates
            .iter()
            .any(|component| segments.iter().all(|segment| segment.matches(component)))
    }
}

/// For every `n` in `0..=components.len()`, whether the whole segment
/// sequence matches exactly the first `n` components.
///
/// One pass per segment, so the cost is segments times components however
/// many `**` the pattern holds.
fn matched_prefixes(segments: &[Segment], components: &[&str]) -> Vec<bool> {
    let mut reachable = vec![false; components.len() + 1];
    reachable[0] = true;

    for segment in segments {
        match segment {
            Segment::AnyDepth => {
                let mut seen = false;
                for slot in reachable.iter_mut() {
                    seen |= *slot;
                    *slot = seen;
                }
            }
            Segment::Glob(_) => {
                for end in (1..=components.len()).rev() {
                    reachable[end] = reachable[end - 1] && segment.matches(components[end - 1]);
                }
                reachable[0] = false;
            }
        }
    }
    reachable
}
