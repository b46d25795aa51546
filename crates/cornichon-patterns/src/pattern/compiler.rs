//! Conversion of lexed pattern tokens into anchored regular expressions.

use regex::Regex;

use crate::errors::{PatternError, placeholder_error};
use crate::hint::hint_fragment;

use super::lexer::{Token, lex_pattern};
use super::placeholder::PlaceholderSpec;

/// Build the anchored regular-expression source for a step pattern.
///
/// Each placeholder becomes a named capture group whose fragment is chosen
/// by its type hint, so `"value {n:u32}"` compiles to `^value (?P<n>\d+)$`.
///
/// # Errors
/// Returns [`PatternError`] for malformed placeholders, duplicate
/// placeholder names, or unbalanced stray braces.
pub fn build_regex_from_pattern(pattern: &str) -> Result<String, PatternError> {
    let tokens = lex_pattern(pattern)?;
    let mut source = String::with_capacity(pattern.len().saturating_mul(2) + 2);
    source.push('^');
    let mut seen_names: Vec<String> = Vec::new();
    let mut stray_depth = 0usize;

    for token in tokens {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(&text)),
            Token::Placeholder(spec) => {
                if seen_names.contains(&spec.name) {
                    return Err(placeholder_error(
                        "duplicate placeholder name in step pattern",
                        spec.offset,
                        Some(spec.name),
                    ));
                }
                source.push_str("(?P<");
                source.push_str(&spec.name);
                source.push('>');
                source.push_str(hint_fragment(spec.hint.as_deref()));
                source.push(')');
                seen_names.push(spec.name);
            }
            Token::OpenBrace { .. } => {
                stray_depth = stray_depth.saturating_add(1);
                source.push_str(&regex::escape("{"));
            }
            Token::CloseBrace { at } => {
                if stray_depth == 0 {
                    return Err(placeholder_error(
                        "unmatched closing brace '}' in step pattern",
                        at,
                        None,
                    ));
                }
                stray_depth -= 1;
                source.push_str(&regex::escape("}"));
            }
        }
    }

    if stray_depth != 0 {
        return Err(placeholder_error(
            "unbalanced braces in step pattern",
            pattern.chars().count(),
            None,
        ));
    }

    source.push('$');
    Ok(source)
}

/// Compile a step pattern into an anchored [`Regex`].
///
/// # Errors
/// Returns [`PatternError`] when the pattern is malformed or the generated
/// expression fails to compile.
pub fn compile_regex_from_pattern(pattern: &str) -> Result<Regex, PatternError> {
    let source = build_regex_from_pattern(pattern)?;
    Regex::new(&source).map_err(PatternError::Regex)
}

/// List the placeholders of a step pattern in order of appearance.
///
/// Used by resolvers that convert captured text into typed values after a
/// match, keyed by each placeholder's hint.
///
/// # Errors
/// Returns [`PatternError`] when the pattern is malformed.
pub fn placeholder_specs(pattern: &str) -> Result<Vec<PlaceholderSpec>, PatternError> {
    let tokens = lex_pattern(pattern)?;
    Ok(tokens
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder(spec) => Some(spec),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_named_groups_from_placeholders() {
        let source = build_regex_from_pattern("I have {count:u32} cukes")
            .unwrap_or_else(|e| panic!("pattern should compile: {e}"));
        assert_eq!(source, r"^I have (?P<count>\d+) cukes$");
    }

    #[test]
    fn untyped_placeholder_uses_lazy_fragment() {
        let source = build_regex_from_pattern("a {thing} here")
            .unwrap_or_else(|e| panic!("pattern should compile: {e}"));
        assert_eq!(source, r"^a (?P<thing>.+?) here$");
    }

    #[test]
    fn rejects_duplicate_placeholder_names() {
        let Err(err) = build_regex_from_pattern("{x} and {x}") else {
            panic!("duplicate names should fail");
        };
        assert!(err.to_string().contains("duplicate placeholder name"));
    }

    #[test]
    fn rejects_unmatched_closing_brace() {
        let Err(err) = build_regex_from_pattern("broken}") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("unmatched closing brace"));
    }

    #[test]
    fn rejects_dangling_open_brace() {
        let Err(err) = build_regex_from_pattern("{open") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("missing closing '}'"));
    }

    #[test]
    fn lists_placeholders_in_order() {
        let specs = placeholder_specs("type {type} and value {value:w}")
            .unwrap_or_else(|e| panic!("pattern should lex: {e}"));
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["type", "value"]);
        assert_eq!(
            specs.last().and_then(|s| s.hint.as_deref()),
            Some("w"),
            "trailing placeholder keeps its hint"
        );
    }
}
