//! Pattern specificity scoring for disambiguation.
//!
//! When several step patterns match the same step text, the resolver ranks
//! them by specificity: more literal text and fewer placeholders make a
//! pattern more specific.

use std::cmp::Ordering;

use crate::PatternError;
use crate::pattern::lexer::{Token, lex_pattern};

/// Specificity score for a step pattern.
///
/// Ordering: more literal characters first, then fewer placeholders, then
/// more typed placeholders as the final tiebreaker.
///
/// # Examples
/// ```
/// use cornichon_patterns::SpecificityScore;
///
/// let literal = SpecificityScore::calculate("the lights are off")
///     .unwrap_or_else(|e| panic!("valid pattern: {e}"));
/// let generic = SpecificityScore::calculate("the lights are {state}")
///     .unwrap_or_else(|e| panic!("valid pattern: {e}"));
/// assert!(literal > generic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecificityScore {
    /// Number of literal characters in the pattern.
    pub literal_chars: usize,
    /// Number of placeholders in the pattern.
    pub placeholder_count: usize,
    /// Number of placeholders carrying a type hint.
    pub typed_placeholder_count: usize,
}

impl SpecificityScore {
    /// Score a pattern string.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern does not lex.
    pub fn calculate(pattern: &str) -> Result<Self, PatternError> {
        let mut score = Self::default();
        for token in lex_pattern(pattern)? {
            match token {
                Token::Literal(text) => score.literal_chars += text.chars().count(),
                Token::Placeholder(spec) => {
                    score.placeholder_count += 1;
                    if spec.hint.is_some() {
                        score.typed_placeholder_count += 1;
                    }
                }
                // Stray braces match themselves, so they count as literals.
                Token::OpenBrace { .. } | Token::CloseBrace { .. } => score.literal_chars += 1,
            }
        }
        Ok(score)
    }
}

impl Ord for SpecificityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.literal_chars
            .cmp(&other.literal_chars)
            .then_with(|| other.placeholder_count.cmp(&self.placeholder_count))
            .then_with(|| {
                self.typed_placeholder_count
                    .cmp(&other.typed_placeholder_count)
            })
    }
}

impl PartialOrd for SpecificityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
