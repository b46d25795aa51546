//! Step keyword type and the conjunction-resolution rule.

use std::fmt;
use std::str::FromStr;

/// Keyword classifying a step.
///
/// `And` and `But` are preserved as written; their *effective* type is
/// resolved against the nearest preceding primary keyword via
/// [`resolve`](Self::resolve), independently within each step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "diagnostics", derive(serde::Serialize))]
pub enum StepKeyword {
    /// Establishes a precondition.
    Given,
    /// Performs the action under test.
    When,
    /// Asserts an outcome.
    Then,
    /// Continues the previous step's role.
    And,
    /// Continues the previous step's role with contrast.
    But,
}

impl StepKeyword {
    /// Canonical text of the keyword.
    ///
    /// # Examples
    /// ```
    /// use cornichon::StepKeyword;
    /// assert_eq!(StepKeyword::Given.as_str(), "Given");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Whether the keyword is a conjunction (`And`/`But`).
    #[must_use]
    pub const fn is_conjunction(self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// Resolve a conjunction to the effective keyword of the previous step.
    ///
    /// Primary keywords update `prev` and return themselves; conjunctions
    /// return the stored value. `None` means no primary keyword has been
    /// seen yet in this sequence, which the model builder rejects before
    /// resolution runs.
    ///
    /// # Examples
    /// ```
    /// use cornichon::StepKeyword;
    /// let mut prev = None;
    /// assert_eq!(StepKeyword::When.resolve(&mut prev), Some(StepKeyword::When));
    /// assert_eq!(StepKeyword::And.resolve(&mut prev), Some(StepKeyword::When));
    /// ```
    #[must_use]
    pub fn resolve(self, prev: &mut Option<Self>) -> Option<Self> {
        if self.is_conjunction() {
            *prev
        } else {
            *prev = Some(self);
            Some(self)
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for text that is not a step keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKeywordParseError(pub String);

impl fmt::Display for StepKeywordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step keyword: {}", self.0)
    }
}

impl std::error::Error for StepKeywordParseError {}

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("given") {
            Ok(Self::Given)
        } else if trimmed.eq_ignore_ascii_case("when") {
            Ok(Self::When)
        } else if trimmed.eq_ignore_ascii_case("then") {
            Ok(Self::Then)
        } else if trimmed.eq_ignore_ascii_case("and") {
            Ok(Self::And)
        } else if trimmed.eq_ignore_ascii_case("but") {
            Ok(Self::But)
        } else {
            Err(StepKeywordParseError(trimmed.to_string()))
        }
    }
}

impl TryFrom<&str> for StepKeyword {
    type Error = StepKeywordParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
