//! Error types for pattern lexing and compilation.

use std::fmt;
use thiserror::Error;

/// Context attached to a placeholder-related pattern failure.
///
/// # Examples
/// ```
/// use cornichon_patterns::PlaceholderIssue;
/// let issue = PlaceholderIssue::new("missing closing '}'", 4, Some("count".into()));
/// assert_eq!(issue.name.as_deref(), Some("count"));
/// assert_eq!(issue.offset, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderIssue {
    /// Short description of what went wrong.
    pub message: &'static str,
    /// Zero-based character offset into the pattern where the issue begins.
    pub offset: usize,
    /// Placeholder name, when parsing got far enough to read one.
    pub name: Option<String>,
}

impl PlaceholderIssue {
    /// Describe a placeholder failure at `offset`.
    #[must_use]
    pub fn new(message: &'static str, offset: usize, name: Option<String>) -> Self {
        Self {
            message,
            offset,
            name,
        }
    }
}

impl fmt::Display for PlaceholderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(
                f,
                "{} for placeholder `{}` at offset {}",
                self.message, name, self.offset
            ),
            None => write!(f, "{} at offset {}", self.message, self.offset),
        }
    }
}

/// Errors raised while turning a step pattern into a regular expression.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The placeholder syntax in the pattern is malformed.
    #[error("{0}")]
    Placeholder(PlaceholderIssue),
    /// The generated regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub(crate) fn placeholder_error(
    message: &'static str,
    offset: usize,
    name: Option<String>,
) -> PatternError {
    PatternError::Placeholder(PlaceholderIssue::new(message, offset, name))
}
