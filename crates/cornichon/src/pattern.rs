//! Step patterns: a closed union of the three matcher kinds.
//!
//! A [`StepPattern`] is an exact string, an anchored regular expression, or
//! a parse-style template. All three expose one capability:
//! [`match_text`](StepPattern::match_text), which matches the *entire*
//! rendered step text and yields named captures. Compilation is lazy and
//! cached; registries compile eagerly at registration time.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use cornichon_patterns::{
    PatternError, PlaceholderSpec, SpecificityScore, compile_regex_from_pattern,
    extract_named_captures, placeholder_specs,
};
use regex::Regex;

/// The matcher kind of a step pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(serde::Serialize))]
pub enum PatternKind {
    /// Matches when the step text equals the pattern text.
    Exact,
    /// A regular expression, implicitly anchored to the full text.
    Regex,
    /// A `{name}`/`{name:hint}` template compiled to an anchored regex.
    Template,
}

impl PatternKind {
    /// Kind name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Regex => "regex",
            Self::Template => "template",
        }
    }
}

/// One registered step matcher.
#[derive(Debug)]
pub struct StepPattern {
    kind: PatternKind,
    text: Cow<'static, str>,
    compiled: OnceLock<Regex>,
    placeholders: OnceLock<Vec<PlaceholderSpec>>,
    specificity: OnceLock<SpecificityScore>,
}

// Identity is the (kind, text) pair; allocation and compilation state are
// irrelevant to equality so patterns work as map keys.
impl PartialEq for StepPattern {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for StepPattern {}

impl Hash for StepPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pattern `{}`", self.kind.as_str(), self.text)
    }
}

impl StepPattern {
    /// Build a pattern of the given kind.
    #[must_use]
    pub fn new(kind: PatternKind, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            text: text.into(),
            compiled: OnceLock::new(),
            placeholders: OnceLock::new(),
            specificity: OnceLock::new(),
        }
    }

    /// An exact-string pattern.
    #[must_use]
    pub fn exact(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(PatternKind::Exact, text)
    }

    /// A regular-expression pattern, anchored to the full step text.
    #[must_use]
    pub fn regex(source: impl Into<Cow<'static, str>>) -> Self {
        Self::new(PatternKind::Regex, source)
    }

    /// A parse-style template pattern.
    #[must_use]
    pub fn template(pattern: impl Into<Cow<'static, str>>) -> Self {
        Self::new(PatternKind::Template, pattern)
    }

    /// The pattern text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The matcher kind.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Compile the pattern, caching the result.
    ///
    /// Idempotent and thread-safe; concurrent calls may race to build the
    /// regex but only the first value is kept.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the template or regex source is
    /// malformed.
    pub fn compile(&self) -> Result<(), PatternError> {
        match self.kind {
            PatternKind::Exact => Ok(()),
            PatternKind::Regex => {
                if self.compiled.get().is_none() {
                    let regex = Regex::new(&format!("^(?:{})$", self.text))?;
                    let _ = self.compiled.set(regex);
                }
                Ok(())
            }
            PatternKind::Template => {
                if self.compiled.get().is_none() {
                    let regex = compile_regex_from_pattern(&self.text)?;
                    let _ = self.compiled.set(regex);
                }
                if self.placeholders.get().is_none() {
                    let specs = placeholder_specs(&self.text)?;
                    let _ = self.placeholders.set(specs);
                }
                Ok(())
            }
        }
    }

    /// Match the full step text, yielding `(name, value)` captures.
    ///
    /// Exact patterns yield no captures; regex and template patterns yield
    /// their named groups in declaration order. Returns `None` when the
    /// text does not match. A pattern that fails to compile is logged and
    /// treated as no match.
    #[must_use]
    pub fn match_text(&self, text: &str) -> Option<Vec<(String, String)>> {
        if self.kind == PatternKind::Exact {
            return (self.text == text).then(Vec::new);
        }
        if let Err(error) = self.compile() {
            log::warn!("step pattern `{}` does not compile: {error}", self.text);
            return None;
        }
        let regex = self.compiled.get()?;
        extract_named_captures(regex, text)
    }

    /// Placeholders of a template pattern, in declaration order.
    ///
    /// Empty for exact and regex patterns, and for templates that have not
    /// been compiled yet.
    #[must_use]
    pub fn placeholders(&self) -> &[PlaceholderSpec] {
        self.placeholders.get().map_or(&[], Vec::as_slice)
    }

    /// Specificity score used to rank same-kind patterns that match the
    /// same text.
    ///
    /// Exact patterns are all literal. Template patterns are scored by the
    /// shared lexer. Regex patterns get a rough score from the literal mass
    /// of their source; two regexes that tie are reported as ambiguous
    /// rather than silently ordered.
    #[must_use]
    pub fn specificity(&self) -> SpecificityScore {
        if let Some(score) = self.specificity.get() {
            return *score;
        }
        let score = match self.kind {
            PatternKind::Exact => SpecificityScore {
                literal_chars: self.text.chars().count(),
                placeholder_count: 0,
                typed_placeholder_count: 0,
            },
            PatternKind::Regex => SpecificityScore {
                literal_chars: self
                    .text
                    .chars()
                    .filter(|c| c.is_alphanumeric() || *c == ' ')
                    .count(),
                placeholder_count: self
                    .compiled
                    .get()
                    .map_or(0, |re| re.captures_len().saturating_sub(1)),
                typed_placeholder_count: 0,
            },
            PatternKind::Template => SpecificityScore::calculate(&self.text).unwrap_or_else(|e| {
                log::warn!("specificity calculation failed for `{}`: {e}", self.text);
                SpecificityScore::default()
            }),
        };
        let _ = self.specificity.set(score);
        score
    }
}
