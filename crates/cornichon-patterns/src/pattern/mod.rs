//! Placeholder lexing and regex construction for step patterns.

mod compiler;
pub(crate) mod lexer;
mod placeholder;

pub use compiler::{build_regex_from_pattern, compile_regex_from_pattern, placeholder_specs};
pub use placeholder::PlaceholderSpec;
