//! Extraction of named capture values after a pattern match.

use regex::Regex;

/// Extract named capture values when `text` matches `re` in full.
///
/// Returns `None` when the text does not match at all, so callers can
/// distinguish a non-matching pattern from a match without captures. Groups
/// that did not participate in the match yield empty strings, keeping the
/// result aligned with the pattern's placeholder list.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use cornichon_patterns::extract_named_captures;
/// let re = Regex::new(r"^(?P<n>\d+) of (?P<item>\w+)$")
///     .unwrap_or_else(|e| panic!("regex should compile: {e}"));
/// let caps = extract_named_captures(&re, "3 of cucumbers")
///     .unwrap_or_else(|| panic!("text should match"));
/// assert_eq!(
///     caps,
///     vec![
///         ("n".to_string(), "3".to_string()),
///         ("item".to_string(), "cucumbers".to_string()),
///     ]
/// );
/// ```
#[must_use]
pub fn extract_named_captures(re: &Regex, text: &str) -> Option<Vec<(String, String)>> {
    let caps = re.captures(text)?;
    let mut values = Vec::new();
    for name in re.capture_names().flatten() {
        let value = caps
            .name(name)
            .map_or_else(String::new, |m| m.as_str().to_string());
        values.push((name.to_string(), value));
    }
    Some(values)
}
