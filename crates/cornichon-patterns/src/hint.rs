//! Type-hint lookup used when compiling placeholders to regex fragments.

/// Translate a placeholder type hint into a regular-expression fragment.
///
/// Both Rust primitive names (`u32`, `i64`, `f64`, …) and the short
/// parse-style converters are understood: `d` (signed integer), `f`
/// (float), `w` (single word), `s` (string). Unknown or absent hints fall
/// back to a lazy any-text match.
///
/// # Examples
/// ```
/// use cornichon_patterns::hint_fragment;
/// assert_eq!(hint_fragment(Some("u32")), r"\d+");
/// assert_eq!(hint_fragment(Some("d")), r"[+-]?\d+");
/// assert_eq!(hint_fragment(Some("w")), r"\w+");
/// assert_eq!(hint_fragment(None), r".+?");
/// ```
#[must_use]
pub fn hint_fragment(hint: Option<&str>) -> &'static str {
    match hint {
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => r"\d+",
        Some("d" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize") => r"[+-]?\d+",
        Some("f" | "f32" | "f64") => {
            r"(?i:(?:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?|nan|inf|infinity))"
        }
        Some("w") => r"\w+",
        _ => r".+?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("u64"), r"\d+")]
    #[case(Some("usize"), r"\d+")]
    #[case(Some("i32"), r"[+-]?\d+")]
    #[case(Some("d"), r"[+-]?\d+")]
    #[case(Some("w"), r"\w+")]
    #[case(Some("s"), r".+?")]
    #[case(Some("String"), r".+?")]
    #[case(None, r".+?")]
    fn maps_hints_to_fragments(#[case] hint: Option<&str>, #[case] expected: &str) {
        assert_eq!(hint_fragment(hint), expected);
    }

    #[test]
    fn float_fragment_accepts_scientific_notation() {
        let re = regex::Regex::new(&format!("^{}$", hint_fragment(Some("f64"))))
            .unwrap_or_else(|e| panic!("float fragment should compile: {e}"));
        for text in ["1.5", "-0.25", "2e10", "inf", "NaN"] {
            assert!(re.is_match(text), "{text} should match the float fragment");
        }
        assert!(!re.is_match("pi"));
    }
}
