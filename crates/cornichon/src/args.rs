//! Typed step arguments extracted from pattern captures.

use crate::error::ResolveError;

/// A value captured by a step pattern, converted per its type hint.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Integer hints (`d`, `u8`…`usize`, `i8`…`isize`).
    Int(i64),
    /// Float hints (`f`, `f32`, `f64`).
    Float(f64),
    /// Word, string, and unhinted captures.
    Str(String),
}

impl ArgValue {
    /// The captured string, when the value is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The converted integer, when the hint was an integer type.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The converted float, when the hint was a float type.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }
}

/// Named arguments for one step invocation, in capture order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepArgs {
    entries: Vec<(String, ArgValue)>,
}

impl StepArgs {
    pub(crate) fn from_entries(entries: Vec<(String, ArgValue)>) -> Self {
        Self { entries }
    }

    /// The value captured for `name`, when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of captured arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no arguments were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name/value pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Convert one captured string according to its placeholder hint.
///
/// Conversion runs after the regex has already accepted the text, so a
/// failure here (an overflowing integer, for instance) is a
/// [`ResolveError::Conversion`], distinct from a pattern mismatch.
pub(crate) fn convert_capture(
    name: &str,
    value: String,
    hint: Option<&str>,
) -> Result<ArgValue, ResolveError> {
    let conversion_error = |hint: &str| ResolveError::Conversion {
        name: name.to_string(),
        value: value.clone(),
        hint: hint.to_string(),
    };
    match hint {
        Some(
            hint @ ("d" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32"
            | "i64" | "i128" | "isize"),
        ) => value
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| conversion_error(hint)),
        Some(hint @ ("f" | "f32" | "f64")) => value
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| conversion_error(hint)),
        _ => Ok(ArgValue::Str(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", Some("u32"), ArgValue::Int(12))]
    #[case("-3", Some("d"), ArgValue::Int(-3))]
    #[case("2.5", Some("f64"), ArgValue::Float(2.5))]
    #[case("hello", Some("w"), ArgValue::Str("hello".into()))]
    #[case("hello there", None, ArgValue::Str("hello there".into()))]
    fn converts_by_hint(
        #[case] value: &str,
        #[case] hint: Option<&str>,
        #[case] expected: ArgValue,
    ) {
        let converted = convert_capture("x", value.to_string(), hint)
            .unwrap_or_else(|e| panic!("{value:?} should convert: {e}"));
        assert_eq!(converted, expected);
    }

    #[test]
    fn integer_overflow_is_a_conversion_error() {
        let Err(err) = convert_capture("n", "99999999999999999999".to_string(), Some("u64")) else {
            panic!("overflow should fail conversion");
        };
        assert!(matches!(err, ResolveError::Conversion { .. }));
        assert!(err.to_string().contains("`n`"));
    }

    #[test]
    fn args_look_up_by_name() {
        let args = StepArgs::from_entries(vec![
            ("n".to_string(), ArgValue::Int(3)),
            ("item".to_string(), ArgValue::Str("pears".to_string())),
        ]);
        assert_eq!(args.get("n").and_then(ArgValue::as_int), Some(3));
        assert_eq!(
            args.get("item").and_then(ArgValue::as_str),
            Some("pears")
        );
        assert_eq!(args.get("missing"), None);
        assert_eq!(args.len(), 2);
    }
}
