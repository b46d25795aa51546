//! Line classification for the feature-file parser.
//!
//! Each source line is classified independently; block structure is the
//! parser's concern. Classification works on the trimmed line, since Gherkin
//! assigns no meaning to indentation.

use super::{Location, TableCell, Tag};

/// Which block header a keyword line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Feature,
    Rule,
    Background,
    Scenario { outline: bool },
    Examples { vertical: bool },
}

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    Comment,
    Tags(Vec<Tag>),
    Block {
        kind: BlockKind,
        /// Keyword as written, without the trailing colon.
        keyword: String,
        /// Text after the colon, comment-stripped and trimmed.
        rest: String,
    },
    Step {
        /// Keyword as written (`Given`, `And`, …).
        keyword: String,
        /// Step text, comment-stripped and trimmed.
        text: String,
    },
    TableRow(Vec<TableCell>),
    DocStringDelimiter {
        delimiter: String,
    },
    /// Anything else: description text under a header.
    Text,
}

const STEP_KEYWORDS: [&str; 5] = ["Given", "When", "Then", "And", "But"];

const BLOCK_HEADERS: [(&str, BlockKind); 7] = [
    ("Feature", BlockKind::Feature),
    ("Rule", BlockKind::Rule),
    ("Background", BlockKind::Background),
    ("Scenario Outline", BlockKind::Scenario { outline: true }),
    ("Scenario Template", BlockKind::Scenario { outline: true }),
    ("Scenario", BlockKind::Scenario { outline: false }),
    ("Example", BlockKind::Scenario { outline: false }),
];

/// Cut the line at the first `#` that starts the line or follows whitespace.
fn strip_comment(line: &str) -> &str {
    let mut prev_is_ws = true;
    for (index, c) in line.char_indices() {
        if c == '#' && prev_is_ws {
            return line.get(..index).unwrap_or(line);
        }
        prev_is_ws = c.is_whitespace();
    }
    line
}

/// 1-based column of the first non-whitespace character.
fn indent_column(line: &str) -> u32 {
    let leading = line.chars().take_while(|c| c.is_whitespace()).count();
    u32::try_from(leading).unwrap_or(u32::MAX).saturating_add(1)
}

fn lex_tags(trimmed: &str, line_number: u32, column: u32) -> Result<Vec<Tag>, String> {
    let stripped = strip_comment(trimmed);
    let mut tags = Vec::new();
    let mut offset = 0u32;
    for token in stripped.split_whitespace() {
        let Some(name) = token.strip_prefix('@') else {
            return Err(format!("expected a tag, found {token:?}"));
        };
        if name.is_empty() {
            return Err("empty tag name".to_string());
        }
        tags.push(Tag {
            name: name.to_string(),
            // Columns of later tags on the same line are approximated by
            // token order; only the line matters for diagnostics.
            location: Location::new(line_number, column.saturating_add(offset)),
        });
        offset = offset.saturating_add(u32::try_from(token.len()).unwrap_or(0)).saturating_add(1);
    }
    Ok(tags)
}

fn lex_table_row(trimmed: &str, line_number: u32, column: u32) -> Result<Vec<TableCell>, String> {
    let mut chars = trimmed.chars().peekable();
    // Caller guarantees the line starts with '|'.
    let _ = chars.next();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut cell_column = column.saturating_add(1);
    let mut cursor = cell_column;
    let mut terminated = false;

    while let Some(c) = chars.next() {
        cursor = cursor.saturating_add(1);
        match c {
            '\\' => match chars.next() {
                Some('|') => current.push('|'),
                Some('\\') => current.push('\\'),
                Some('n') => current.push('\n'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => {
                cells.push(TableCell {
                    value: current.trim().to_string(),
                    location: Location::new(line_number, cell_column),
                });
                current = String::new();
                cell_column = cursor;
                terminated = chars.peek().is_none();
                if terminated {
                    break;
                }
            }
            _ => current.push(c),
        }
    }

    if !terminated {
        let trailing = current.trim();
        if trailing.is_empty() || trailing.starts_with('#') {
            // A trailing comment after the closing '|' is fine; the last
            // cell was already flushed when that '|' was consumed.
            if cells.is_empty() {
                return Err("table row has no closing '|'".to_string());
            }
        } else {
            return Err("table row has no closing '|'".to_string());
        }
    }
    Ok(cells)
}

/// Classify one line. `line_number` is 1-based.
pub(crate) fn lex_line(raw: &str, line_number: u32) -> Result<LineKind, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }
    if trimmed.starts_with('#') {
        return Ok(LineKind::Comment);
    }
    let column = indent_column(raw);
    if trimmed.starts_with('@') {
        return lex_tags(trimmed, line_number, column).map(LineKind::Tags);
    }
    if trimmed.starts_with('|') {
        return lex_table_row(trimmed, line_number, column).map(LineKind::TableRow);
    }
    if let Some(delimiter) = ["\"\"\"", "```"]
        .into_iter()
        .find(|d| trimmed.starts_with(d))
    {
        return Ok(LineKind::DocStringDelimiter {
            delimiter: delimiter.to_string(),
        });
    }

    let stripped = strip_comment(trimmed).trim_end();

    for (keyword, kind) in BLOCK_HEADERS {
        if let Some(rest) = stripped.strip_prefix(keyword) {
            if let Some(rest) = rest.strip_prefix(':') {
                let rest = rest.trim().to_string();
                return Ok(LineKind::Block {
                    kind,
                    keyword: keyword.to_string(),
                    rest,
                });
            }
        }
    }
    // "Examples:" and its aliases accept the "Vertical" modifier after the
    // colon, so they are matched separately from the fixed headers above.
    for keyword in ["Examples", "Scenarios"] {
        if let Some(rest) = stripped.strip_prefix(keyword) {
            if let Some(rest) = rest.strip_prefix(':') {
                let rest = rest.trim();
                let vertical = rest.eq_ignore_ascii_case("vertical");
                return Ok(LineKind::Block {
                    kind: BlockKind::Examples { vertical },
                    keyword: keyword.to_string(),
                    rest: if vertical { String::new() } else { rest.to_string() },
                });
            }
        }
    }

    for keyword in STEP_KEYWORDS {
        if let Some(rest) = stripped.strip_prefix(keyword) {
            if rest.starts_with(char::is_whitespace) {
                return Ok(LineKind::Step {
                    keyword: keyword.to_string(),
                    text: rest.trim().to_string(),
                });
            }
        }
    }

    Ok(LineKind::Text)
}
