//! Error taxonomy for the whole pipeline.
//!
//! Parse failures are [`SyntaxError`]s; structurally parseable but
//! semantically invalid documents raise [`ValidationError`]s; resolution and
//! execution failures are reported per step and never abort sibling scenario
//! instances. Every collection-time error carries a 1-based line number, the
//! raw source line, and the file path so hosts can render actionable
//! diagnostics.

use thiserror::Error;

use crate::keyword::StepKeyword;
use crate::syntax::Location;

/// Boxed error type returned by step implementations.
///
/// Implementation failures propagate through the execution driver unchanged;
/// the core never transforms or suppresses them.
pub type DynStepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Malformed feature-file syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({path}:{line}: {line_text:?})")]
pub struct SyntaxError {
    /// What went wrong.
    pub message: String,
    /// 1-based line number of the offending line.
    pub line: u32,
    /// The offending line, verbatim.
    pub line_text: String,
    /// Path of the feature file.
    pub path: String,
}

impl SyntaxError {
    pub(crate) fn new(
        message: impl Into<String>,
        line: u32,
        line_text: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            line_text: line_text.into(),
            path: path.into(),
        }
    }
}

/// Structurally parseable but semantically invalid input.
///
/// Raised for duplicate example parameters, unequal vertical example rows,
/// rule-level examples, mismatched table shapes, a leading `And`/`But` step,
/// and step/example parameter-coverage mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({path}:{line}: {line_text:?})")]
pub struct ValidationError {
    /// What is invalid.
    pub message: String,
    /// 1-based line number of the invalid construct.
    pub line: u32,
    /// The source line of the invalid construct, verbatim.
    pub line_text: String,
    /// Path of the feature file.
    pub path: String,
}

impl ValidationError {
    pub(crate) fn new(
        message: impl Into<String>,
        location: Location,
        line_text: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line: location.line,
            line_text: line_text.into(),
            path: path.into(),
        }
    }
}

/// A named scenario does not exist in the feature it was requested from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario {name:?} not found in feature {feature:?} ({path})")]
pub struct ScenarioNotFound {
    /// The scenario name that was looked up.
    pub name: String,
    /// Name of the feature that was searched.
    pub feature: String,
    /// Path of the feature file.
    pub path: String,
}

/// Failure to resolve a rendered step against the registry.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No registered pattern matched the step text.
    #[error("no step definition matches {keyword} {text:?}", keyword = keyword.as_str())]
    NotFound {
        /// Effective keyword the lookup ran under.
        keyword: StepKeyword,
        /// The rendered step text.
        text: String,
    },
    /// More than one equally ranked pattern matched the step text.
    #[error(
        "ambiguous step {text:?}: {contenders}",
        contenders = contenders.join("; ")
    )]
    Ambiguous {
        /// The rendered step text.
        text: String,
        /// Pattern text and source location of every contender.
        contenders: Vec<String>,
    },
    /// A captured value could not be converted to its hinted type.
    #[error("cannot convert {value:?} for placeholder `{name}` ({hint})")]
    Conversion {
        /// Placeholder name.
        name: String,
        /// Captured text that failed to convert.
        value: String,
        /// The type hint the conversion targeted.
        hint: String,
    },
}

/// Failure while executing one step of a scenario instance.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The step could not be resolved to an implementation.
    #[error("step {index} ({keyword} {text:?}) at line {line}: {source}", keyword = keyword.as_str())]
    Resolve {
        /// Zero-based index of the step within the instance.
        index: usize,
        /// Effective step keyword.
        keyword: StepKeyword,
        /// Rendered step text.
        text: String,
        /// 1-based source line of the step.
        line: u32,
        /// The underlying resolution failure.
        #[source]
        source: ResolveError,
    },
    /// The step implementation returned an error.
    #[error("step {index} ({keyword} {text:?}) at line {line} failed: {source}", keyword = keyword.as_str())]
    StepFailed {
        /// Zero-based index of the step within the instance.
        index: usize,
        /// Effective step keyword.
        keyword: StepKeyword,
        /// Rendered step text.
        text: String,
        /// 1-based source line of the step.
        line: u32,
        /// The implementation's own error, unchanged.
        #[source]
        source: DynStepError,
    },
}

/// Failure while collecting feature files from disk.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Reading a feature file or walking a directory failed.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path that failed.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A discovered path is not valid UTF-8.
    #[error("feature path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },
    /// The feature file did not parse.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// The feature file parsed but failed model validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
