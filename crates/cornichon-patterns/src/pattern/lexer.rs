//! Lexer splitting a step pattern into literal and placeholder tokens.

use crate::errors::PatternError;

use super::placeholder::{PlaceholderSpec, parse_placeholder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder(PlaceholderSpec),
    OpenBrace { at: usize },
    CloseBrace { at: usize },
}

fn flush(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn starts_identifier(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Tokenise `pattern`, honouring `\`-escapes and doubled-brace literals.
pub(crate) fn lex_pattern(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(&c) = chars.get(pos) {
        match c {
            '\\' => {
                if let Some(&next) = chars.get(pos + 1) {
                    literal.push(next);
                    pos += 2;
                } else {
                    literal.push('\\');
                    pos += 1;
                }
            }
            '{' => {
                if chars.get(pos + 1) == Some(&'{') {
                    literal.push('{');
                    pos += 2;
                } else if chars.get(pos + 1).copied().is_some_and(starts_identifier) {
                    flush(&mut literal, &mut tokens);
                    let (next_pos, spec) = parse_placeholder(&chars, pos)?;
                    tokens.push(Token::Placeholder(spec));
                    pos = next_pos;
                } else {
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::OpenBrace { at: pos });
                    pos += 1;
                }
            }
            '}' => {
                if chars.get(pos + 1) == Some(&'}') {
                    literal.push('}');
                    pos += 2;
                } else {
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::CloseBrace { at: pos });
                    pos += 1;
                }
            }
            _ => {
                literal.push(c);
                pos += 1;
            }
        }
    }

    flush(&mut literal, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(pattern: &str) -> Vec<Token> {
        lex_pattern(pattern).unwrap_or_else(|e| panic!("pattern {pattern:?} should lex: {e}"))
    }

    #[test]
    fn splits_literals_and_placeholders() {
        assert_eq!(
            lex("eat {count:u32} cucumbers"),
            vec![
                Token::Literal("eat ".into()),
                Token::Placeholder(PlaceholderSpec {
                    name: "count".into(),
                    hint: Some("u32".into()),
                    offset: 4,
                }),
                Token::Literal(" cucumbers".into()),
            ]
        );
    }

    #[test]
    fn doubled_braces_become_literal_braces() {
        assert_eq!(
            lex("{{raw}} {name}"),
            vec![
                Token::Literal("{raw} ".into()),
                Token::Placeholder(PlaceholderSpec {
                    name: "name".into(),
                    hint: None,
                    offset: 8,
                }),
            ]
        );
    }

    #[test]
    fn stray_braces_are_tracked_by_position() {
        assert_eq!(
            lex("{ literal }"),
            vec![
                Token::OpenBrace { at: 0 },
                Token::Literal(" literal ".into()),
                Token::CloseBrace { at: 10 },
            ]
        );
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        assert_eq!(
            lex("café {x}"),
            vec![
                Token::Literal("café ".into()),
                Token::Placeholder(PlaceholderSpec {
                    name: "x".into(),
                    hint: None,
                    offset: 5,
                }),
            ]
        );
    }

    #[test]
    fn backslash_escapes_the_next_character() {
        assert_eq!(lex(r"a \{b\} c"), vec![Token::Literal("a {b} c".into())]);
    }
}
