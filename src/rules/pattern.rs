use globset::{GlobBuilder, GlobMatcher};

/// Error compiling a single rule line into a [`Pattern`].
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Nothing is left to match once `!` and the trailing `/` are stripped.
    #[error("invalid pattern '{0}': pattern is empty")]
    Empty(String),
    /// A segment was rejected by the glob compiler (e.g. an unclosed `[`).
    #[error("invalid pattern '{raw}'")]
    Glob {
        raw: String,
        #[source]
        source: globset::Error,
    },
}

/// One `/`-separated piece of a pattern, matched against one path component.
#[derive(Debug, Clone)]
pub enum Segment {
    /// `**`: zero or more whole path components.
    AnyDepth,
    /// Any other segment, compiled as a single-component glob.
    Glob(GlobMatcher),
}

impl Segment {
    /// Tests this segment against a single path component.
    pub fn matches(&self, component: &str) -> bool {
        match self {
            Segment::AnyDepth => true,
            Segment::Glob(matcher) => matcher.is_match(component),
        }
    }
}

/// A single compiled rule.
///
/// Immutable once compiled. Owned by the [`RuleSet`](super::RuleSet) that
/// compiled it.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    negated: bool,
    directory_only: bool,
    anchored: bool,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile one rule line.
    ///
    /// The line must already be trimmed and must not be blank or a comment;
    /// [`RuleSet::compile`](super::RuleSet::compile) filters those out.
    ///
    /// - a single leading `!` negates the rule
    /// - a single trailing unescaped `/` makes it directory-only
    /// - a `/` between two non-empty segments anchors it to the full path; a
    ///   leading `/` only anchors and contributes no segment
    /// - runs of `/` collapse, so `a//` is the same rule as `a/`
    /// - `**` as a whole segment spans zero or more components
    pub fn compile(line: &str) -> Result<Self, PatternError> {
        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let (directory_only, body) = match body.strip_suffix('/') {
            Some(rest) if !ends_with_escape(rest) => (true, rest),
            _ => (false, body),
        };

        let pieces: Vec<&str> = split_unescaped(body)
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect();
        let anchored = body.starts_with('/') || pieces.len() > 1;

        let mut segments = pieces
            .into_iter()
            .map(|piece| compile_segment(line, piece))
            .collect::<Result<Vec<_>, _>>()?;
        // `**/**` spans exactly what `**` does.
        segments.dedup_by(|a, b| matches!((a, b), (Segment::AnyDepth, Segment::AnyDepth)));

        if segments.is_empty() {
            return Err(PatternError::Empty(line.to_string()));
        }

        Ok(Pattern {
            raw: line.to_string(),
            negated,
            directory_only,
            anchored,
            segments,
        })
    }

    /// The rule line exactly as configured.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn compile_segment(raw: &str, piece: &str) -> Result<Segment, PatternError> {
    if piece == "**" {
        return Ok(Segment::AnyDepth);
    }
    let glob = GlobBuilder::new(piece)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|source| PatternError::Glob {
            raw: raw.to_string(),
            source,
        })?;
    Ok(Segment::Glob(glob.compile_matcher()))
}

/// Split on every `/` not preceded by an escaping backslash.
fn split_unescaped(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '/' => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// True when `text` ends in an odd run of backslashes, i.e. escapes whatever follows.
fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}
