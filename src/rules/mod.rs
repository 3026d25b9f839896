//! Path rules: compiled patterns and last-match-wins evaluation.
//!
//! Rule lines follow ignore-file conventions: `!` negates, a trailing `/`
//! restricts to directories, an internal `/` anchors to the full path, and
//! a later matching rule always overrides an earlier one.

pub mod matcher;
pub mod pattern;

pub use matcher::{evaluate, MatchOutcome};
pub use pattern::{Pattern, PatternError, Segment};

/// An ordered set of compiled rules. Order is significant: the last matching
/// rule decides the outcome for a path.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    patterns: Vec<Pattern>,
}

impl RuleSet {
    /// Compile every configured rule line, in order.
    ///
    /// Lines are trimmed; blank lines and lines starting with an unescaped `#`
    /// are dropped. The first line that fails to compile aborts the whole set.
    pub fn compile<I, S>(lines: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                (!is_ignorable(line)).then(|| Pattern::compile(line))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Blank lines and `#` comments carry no rule. `\#` is a literal hash.
fn is_ignorable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}
