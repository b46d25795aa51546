//! Parsing of a single `{name}` or `{name:hint}` placeholder.

use crate::errors::{PatternError, placeholder_error};

/// A placeholder parsed out of a step pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec {
    /// Placeholder name as written between the braces.
    pub name: String,
    /// Optional type hint following the colon.
    pub hint: Option<String>,
    /// Character offset of the opening brace within the pattern.
    pub offset: usize,
}

fn skip_to_closing_brace(chars: &[char], from: usize) -> Option<usize> {
    let mut index = from;
    let mut depth = 0usize;
    while let Some(&c) = chars.get(index) {
        match c {
            '{' => depth = depth.saturating_add(1),
            '}' => {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
        index += 1;
    }
    None
}

/// Parse one placeholder starting at the opening brace at `start`.
///
/// Returns the offset just past the closing brace together with the parsed
/// spec. The caller guarantees that `chars[start]` is `{` and that the next
/// character can begin an identifier.
pub(crate) fn parse_placeholder(
    chars: &[char],
    start: usize,
) -> Result<(usize, PlaceholderSpec), PatternError> {
    let mut index = start + 1;
    let mut name = String::new();
    while let Some(&c) = chars.get(index) {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            index += 1;
        } else {
            break;
        }
    }

    // Whitespace immediately before the hint separator or the closing brace
    // is rejected so that `{name :u32}` and `{name }` fail loudly rather
    // than silently producing an oddly named capture group.
    if chars.get(index).is_some_and(|c| c.is_ascii_whitespace()) {
        let mut after_ws = index;
        while chars.get(after_ws).is_some_and(|c| c.is_ascii_whitespace()) {
            after_ws += 1;
        }
        if matches!(chars.get(after_ws), Some(':' | '}')) {
            return Err(placeholder_error(
                "invalid placeholder in step pattern",
                start,
                Some(name),
            ));
        }
        index = after_ws;
    }

    let mut hint = None;
    if chars.get(index) == Some(&':') {
        index += 1;
        let mut raw = String::new();
        while let Some(&c) = chars.get(index) {
            if c == '}' {
                break;
            }
            raw.push(c);
            index += 1;
        }
        if raw.is_empty()
            || raw.chars().any(|c| c.is_ascii_whitespace())
            || raw.contains('{')
            || raw.contains('}')
        {
            return Err(placeholder_error(
                "invalid type hint in step pattern",
                start,
                Some(name),
            ));
        }
        hint = Some(raw);
    } else {
        index = skip_to_closing_brace(chars, index).ok_or_else(|| {
            placeholder_error(
                "missing closing '}' for placeholder",
                start,
                Some(name.clone()),
            )
        })?;
    }

    if chars.get(index) != Some(&'}') {
        return Err(placeholder_error(
            "missing closing '}' for placeholder",
            start,
            Some(name),
        ));
    }

    Ok((
        index + 1,
        PlaceholderSpec {
            name,
            hint,
            offset: start,
        },
    ))
}
