//! Step-pattern parsing and compilation for cornichon.
//!
//! A step pattern is a template such as `"there are {count:u32} cucumbers"`.
//! This crate lexes the placeholder syntax, translates it into an anchored
//! regular expression with named capture groups, extracts captured values
//! after a match, and scores patterns for disambiguation when several match
//! the same step text.

mod capture;
mod errors;
mod hint;
mod pattern;
mod specificity;

pub use capture::extract_named_captures;
pub use errors::{PatternError, PlaceholderIssue};
pub use hint::hint_fragment;
pub use pattern::{
    PlaceholderSpec, build_regex_from_pattern, compile_regex_from_pattern, placeholder_specs,
};
pub use specificity::SpecificityScore;
