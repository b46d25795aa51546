//! Recursive-descent parser over classified lines.
//!
//! The parser is pure: the same input text always produces a structurally
//! identical [`Document`]. All failures carry the 1-based line number, the
//! raw line text, and the file path.

use crate::error::SyntaxError;

use super::lexer::{BlockKind, LineKind, lex_line};
use super::{
    Background, Child, DocString, Document, Examples, Feature, Location, Orientation, Rule,
    Scenario, Step, Table, TableRow, Tag, dedent,
};

/// Parse feature-file text into a [`Document`].
///
/// # Errors
/// Returns [`SyntaxError`] on malformed input, with the failing line's
/// number and raw text.
///
/// # Examples
/// ```
/// let doc = cornichon::syntax::parse(
///     "Feature: Basket\n  Scenario: Eating\n    Given a cucumber\n",
///     "basket.feature",
/// )
/// .unwrap_or_else(|e| panic!("feature should parse: {e}"));
/// assert_eq!(doc.feature.name, "Basket");
/// ```
pub fn parse(text: &str, path: &str) -> Result<Document, SyntaxError> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let mut cursor = Cursor {
        lines: &lines,
        pos: 0,
        path,
    };
    let feature = parse_feature(&mut cursor)?;
    Ok(Document { feature, lines })
}

struct Cursor<'a> {
    lines: &'a [String],
    pos: usize,
    path: &'a str,
}

impl Cursor<'_> {
    fn line_number(&self) -> u32 {
        u32::try_from(self.pos).unwrap_or(u32::MAX).saturating_add(1)
    }

    fn raw(&self) -> &str {
        self.lines.get(self.pos).map_or("", String::as_str)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.line_number(), self.raw(), self.path)
    }

    /// Classify the current line, or `None` at end of input.
    fn peek(&self) -> Result<Option<LineKind>, SyntaxError> {
        if self.at_end() {
            return Ok(None);
        }
        lex_line(self.raw(), self.line_number())
            .map(Some)
            .map_err(|message| self.error(message))
    }

    /// Step over blank and comment lines.
    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        while matches!(self.peek()?, Some(LineKind::Blank | LineKind::Comment)) {
            self.advance();
        }
        Ok(())
    }

    fn location(&self) -> Location {
        let column = self
            .raw()
            .chars()
            .take_while(|c| c.is_whitespace())
            .count();
        Location::new(
            self.line_number(),
            u32::try_from(column).unwrap_or(u32::MAX).saturating_add(1),
        )
    }
}

/// Consume consecutive tag lines, blanks and comments included.
fn take_tags(cursor: &mut Cursor<'_>) -> Result<Vec<Tag>, SyntaxError> {
    let mut tags = Vec::new();
    loop {
        cursor.skip_trivia()?;
        match cursor.peek()? {
            Some(LineKind::Tags(mut line_tags)) => {
                tags.append(&mut line_tags);
                cursor.advance();
            }
            _ => return Ok(tags),
        }
    }
}

/// Consume description text lines under a block header.
fn take_description(cursor: &mut Cursor<'_>) -> Result<String, SyntaxError> {
    let mut lines: Vec<String> = Vec::new();
    loop {
        match cursor.peek()? {
            Some(LineKind::Text) => {
                lines.push(cursor.raw().to_string());
                cursor.advance();
            }
            Some(LineKind::Blank | LineKind::Comment) => {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                cursor.advance();
            }
            _ => break,
        }
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    Ok(dedent(&lines.join("\n")))
}

fn parse_feature(cursor: &mut Cursor<'_>) -> Result<Feature, SyntaxError> {
    let tags = take_tags(cursor)?;
    let location = cursor.location();
    let Some(LineKind::Block {
        kind: BlockKind::Feature,
        keyword,
        rest,
    }) = cursor.peek()?
    else {
        return Err(cursor.error("expected 'Feature:' at the top of the file"));
    };
    cursor.advance();

    let mut feature = Feature {
        keyword,
        name: rest,
        description: String::new(),
        tags,
        children: Vec::new(),
        examples: Vec::new(),
        location,
    };
    feature.description = take_description(cursor)?;

    loop {
        let mark = cursor.pos;
        let pending_tags = take_tags(cursor)?;
        let location = cursor.location();
        match cursor.peek()? {
            None => {
                if pending_tags.is_empty() {
                    break;
                }
                cursor.pos = mark;
                return Err(cursor.error("tags are not attached to anything"));
            }
            Some(LineKind::Block {
                kind,
                keyword,
                rest,
            }) => match kind {
                BlockKind::Background => {
                    if !pending_tags.is_empty() {
                        cursor.pos = mark;
                        return Err(cursor.error("a background cannot have tags"));
                    }
                    if feature
                        .children
                        .iter()
                        .any(|c| matches!(c, Child::Background(_)))
                    {
                        return Err(cursor.error("a feature can declare only one background"));
                    }
                    cursor.advance();
                    let background = parse_background(cursor, rest, location)?;
                    feature.children.push(Child::Background(background));
                }
                BlockKind::Rule => {
                    cursor.advance();
                    let rule = parse_rule(cursor, pending_tags, rest, location)?;
                    feature.children.push(Child::Rule(rule));
                }
                BlockKind::Scenario { .. } => {
                    cursor.advance();
                    let scenario = parse_scenario(cursor, pending_tags, rest, location, keyword)?;
                    feature.children.push(Child::Scenario(scenario));
                }
                BlockKind::Examples { vertical } => {
                    cursor.advance();
                    let examples =
                        parse_examples(cursor, pending_tags, rest, location, vertical)?;
                    feature.examples.push(examples);
                }
                BlockKind::Feature => {
                    return Err(cursor.error("a file can declare only one feature"));
                }
            },
            Some(_) => return Err(cursor.error("unexpected content outside a scenario")),
        }
    }
    Ok(feature)
}

fn parse_rule(
    cursor: &mut Cursor<'_>,
    tags: Vec<Tag>,
    name: String,
    location: Location,
) -> Result<Rule, SyntaxError> {
    let mut rule = Rule {
        name,
        description: take_description(cursor)?,
        tags,
        background: None,
        scenarios: Vec::new(),
        examples: Vec::new(),
        location,
    };

    loop {
        let mark = cursor.pos;
        let pending_tags = take_tags(cursor)?;
        let child_location = cursor.location();
        match cursor.peek()? {
            Some(LineKind::Block {
                kind,
                keyword,
                rest,
            }) => match kind {
                BlockKind::Background => {
                    if !pending_tags.is_empty() {
                        cursor.pos = mark;
                        return Err(cursor.error("a background cannot have tags"));
                    }
                    if rule.background.is_some() {
                        return Err(cursor.error("a rule can declare only one background"));
                    }
                    cursor.advance();
                    rule.background = Some(parse_background(cursor, rest, child_location)?);
                }
                BlockKind::Scenario { .. } => {
                    cursor.advance();
                    let scenario =
                        parse_scenario(cursor, pending_tags, rest, child_location, keyword)?;
                    rule.scenarios.push(scenario);
                }
                BlockKind::Examples { vertical } => {
                    cursor.advance();
                    let examples =
                        parse_examples(cursor, pending_tags, rest, child_location, vertical)?;
                    rule.examples.push(examples);
                }
                BlockKind::Rule | BlockKind::Feature => {
                    cursor.pos = mark;
                    return Ok(rule);
                }
            },
            None => {
                if pending_tags.is_empty() {
                    return Ok(rule);
                }
                cursor.pos = mark;
                return Err(cursor.error("tags are not attached to anything"));
            }
            Some(_) => return Err(cursor.error("unexpected content inside a rule")),
        }
    }
}

fn parse_background(
    cursor: &mut Cursor<'_>,
    name: String,
    location: Location,
) -> Result<Background, SyntaxError> {
    let _ = take_description(cursor)?;
    Ok(Background {
        name,
        steps: parse_steps(cursor)?,
        location,
    })
}

fn parse_scenario(
    cursor: &mut Cursor<'_>,
    tags: Vec<Tag>,
    name: String,
    location: Location,
    keyword: String,
) -> Result<Scenario, SyntaxError> {
    let mut scenario = Scenario {
        keyword,
        name,
        description: take_description(cursor)?,
        tags,
        steps: parse_steps(cursor)?,
        examples: Vec::new(),
        location,
    };

    // Examples blocks, each optionally preceded by its own tag lines. Tags
    // that turn out to belong to the next scenario are handed back.
    loop {
        let mark = cursor.pos;
        let pending_tags = take_tags(cursor)?;
        let block_location = cursor.location();
        match cursor.peek()? {
            Some(LineKind::Block {
                kind: BlockKind::Examples { vertical },
                rest,
                ..
            }) => {
                cursor.advance();
                let examples =
                    parse_examples(cursor, pending_tags, rest, block_location, vertical)?;
                scenario.examples.push(examples);
            }
            _ => {
                cursor.pos = mark;
                return Ok(scenario);
            }
        }
    }
}

fn parse_steps(cursor: &mut Cursor<'_>) -> Result<Vec<Step>, SyntaxError> {
    let mut steps: Vec<Step> = Vec::new();
    loop {
        cursor.skip_trivia()?;
        match cursor.peek()? {
            Some(LineKind::Step { keyword, text }) => {
                let location = cursor.location();
                cursor.advance();
                let mut step = Step {
                    keyword,
                    text,
                    location,
                    table: None,
                    docstring: None,
                };
                attach_step_argument(cursor, &mut step)?;
                steps.push(step);
            }
            Some(LineKind::TableRow(_)) => {
                return Err(cursor.error("table row is not attached to a step"));
            }
            Some(LineKind::DocStringDelimiter { .. }) => {
                return Err(cursor.error("doc string is not attached to a step"));
            }
            _ => return Ok(steps),
        }
    }
}

fn attach_step_argument(cursor: &mut Cursor<'_>, step: &mut Step) -> Result<(), SyntaxError> {
    cursor.skip_trivia()?;
    match cursor.peek()? {
        Some(LineKind::TableRow(_)) => {
            step.table = Some(parse_table(cursor)?);
            cursor.skip_trivia()?;
            if matches!(cursor.peek()?, Some(LineKind::DocStringDelimiter { .. })) {
                return Err(cursor.error("a step can have a data table or a doc string, not both"));
            }
        }
        Some(LineKind::DocStringDelimiter { delimiter }) => {
            step.docstring = Some(parse_docstring(cursor, &delimiter)?);
            cursor.skip_trivia()?;
            if matches!(cursor.peek()?, Some(LineKind::TableRow(_))) {
                return Err(cursor.error("a step can have a data table or a doc string, not both"));
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_table(cursor: &mut Cursor<'_>) -> Result<Table, SyntaxError> {
    let mut table = Table::default();
    loop {
        match cursor.peek()? {
            Some(LineKind::TableRow(cells)) => {
                let location = cursor.location();
                cursor.advance();
                table.rows.push(TableRow { cells, location });
            }
            Some(LineKind::Comment) => cursor.advance(),
            _ => return Ok(table),
        }
    }
}

fn parse_docstring(cursor: &mut Cursor<'_>, delimiter: &str) -> Result<DocString, SyntaxError> {
    let location = cursor.location();
    let opened_at = cursor.line_number();
    cursor.advance();
    let mut content_lines: Vec<String> = Vec::new();
    loop {
        if cursor.at_end() {
            let opening_text = usize::try_from(opened_at)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| cursor.lines.get(idx))
                .map_or("", String::as_str);
            return Err(SyntaxError::new(
                "doc string is never closed",
                opened_at,
                opening_text,
                cursor.path,
            ));
        }
        if cursor.raw().trim() == delimiter {
            cursor.advance();
            break;
        }
        // Doc-string content is verbatim: comments and table pipes survive.
        content_lines.push(cursor.raw().to_string());
        cursor.advance();
    }
    Ok(DocString {
        content: dedent(&content_lines.join("\n")),
        delimiter: delimiter.to_string(),
        location,
    })
}

fn parse_examples(
    cursor: &mut Cursor<'_>,
    tags: Vec<Tag>,
    name: String,
    location: Location,
    vertical: bool,
) -> Result<Examples, SyntaxError> {
    let _ = take_description(cursor)?;
    cursor.skip_trivia()?;
    let table = parse_table(cursor)?;
    Ok(Examples {
        name,
        tags,
        orientation: if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        },
        table,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> Document {
        parse(text, "test.feature").unwrap_or_else(|e| panic!("feature should parse: {e}"))
    }

    #[test]
    fn parses_feature_header_with_tags_and_description() {
        let doc = parse_ok(
            "@web @slow\nFeature: Articles\n  Writing and publishing.\n  In two lines.\n\n  Scenario: Open\n    Given a page\n",
        );
        let names: Vec<&str> = doc.feature.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["web", "slow"]);
        assert_eq!(doc.feature.description, "Writing and publishing.\nIn two lines.");
        assert_eq!(doc.feature.location.line, 2);
    }

    #[test]
    fn identical_input_parses_identically() {
        let text = "Feature: F\n  Scenario: S\n    Given a\n    And b\n";
        assert_eq!(parse_ok(text), parse_ok(text));
    }

    #[test]
    fn missing_feature_header_is_a_syntax_error() {
        let Err(err) = parse("Scenario: stray\n", "x.feature") else {
            panic!("missing feature header should fail");
        };
        assert_eq!(err.line, 1);
        assert_eq!(err.line_text, "Scenario: stray");
        assert_eq!(err.path, "x.feature");
    }

    #[test]
    fn step_table_is_attached_to_the_step() {
        let doc = parse_ok(
            "Feature: F\n  Scenario: S\n    Given these users:\n      | name | role |\n      | ada  | admin |\n",
        );
        let Some(Child::Scenario(scenario)) = doc.feature.children.first() else {
            panic!("expected a scenario child");
        };
        let step = scenario.steps.first().unwrap_or_else(|| panic!("expected a step"));
        let table = step.table.as_ref().unwrap_or_else(|| panic!("expected a table"));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn docstring_content_is_dedented_and_verbatim() {
        let doc = parse_ok(
            "Feature: F\n  Scenario: S\n    Given a payload\n      \"\"\"\n      {\n        \"k\": 1 # not a comment\n      }\n      \"\"\"\n",
        );
        let Some(Child::Scenario(scenario)) = doc.feature.children.first() else {
            panic!("expected a scenario child");
        };
        let step = scenario.steps.first().unwrap_or_else(|| panic!("expected a step"));
        let doc_string = step
            .docstring
            .as_ref()
            .unwrap_or_else(|| panic!("expected a doc string"));
        assert_eq!(doc_string.content, "{\n  \"k\": 1 # not a comment\n}");
    }

    #[test]
    fn unterminated_docstring_reports_the_opening_line() {
        let Err(err) = parse(
            "Feature: F\n  Scenario: S\n    Given a payload\n      \"\"\"\n      dangling\n",
            "x.feature",
        ) else {
            panic!("unterminated doc string should fail");
        };
        assert_eq!(err.line, 4);
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn step_with_both_table_and_docstring_is_rejected() {
        let Err(err) = parse(
            "Feature: F\n  Scenario: S\n    Given both\n      | a |\n      \"\"\"\n      text\n      \"\"\"\n",
            "x.feature",
        ) else {
            panic!("both arguments should fail");
        };
        assert!(err.message.contains("not both"));
    }

    #[test]
    fn examples_tags_attach_to_their_block() {
        let doc = parse_ok(
            "Feature: F\n  Scenario Outline: S\n    Given <n> items\n\n  @first\n  Examples:\n    | n |\n    | 1 |\n\n  @second\n  Examples:\n    | n |\n    | 2 |\n",
        );
        let Some(Child::Scenario(scenario)) = doc.feature.children.first() else {
            panic!("expected a scenario child");
        };
        assert_eq!(scenario.examples.len(), 2);
        let first = scenario.examples.first().unwrap_or_else(|| panic!("examples"));
        let second = scenario.examples.last().unwrap_or_else(|| panic!("examples"));
        assert_eq!(first.tags.first().map(|t| t.name.as_str()), Some("first"));
        assert_eq!(second.tags.first().map(|t| t.name.as_str()), Some("second"));
    }

    #[test]
    fn tags_before_the_next_scenario_are_not_stolen_by_examples() {
        let doc = parse_ok(
            "Feature: F\n  Scenario Outline: S\n    Given <n> items\n  Examples:\n    | n |\n    | 1 |\n\n  @next\n  Scenario: T\n    Given an item\n",
        );
        assert_eq!(doc.feature.children.len(), 2);
        let Some(Child::Scenario(second)) = doc.feature.children.last() else {
            panic!("expected a second scenario");
        };
        assert_eq!(second.tags.first().map(|t| t.name.as_str()), Some("next"));
    }

    #[test]
    fn vertical_examples_keyword_sets_orientation() {
        let doc = parse_ok(
            "Feature: F\n  Scenario Outline: S\n    Given <n> items\n  Examples: Vertical\n    | n | 1 | 2 |\n",
        );
        let Some(Child::Scenario(scenario)) = doc.feature.children.first() else {
            panic!("expected a scenario child");
        };
        let block = scenario.examples.first().unwrap_or_else(|| panic!("examples"));
        assert_eq!(block.orientation, Orientation::Vertical);
        assert_eq!(block.name, "");
    }

    #[test]
    fn rules_group_their_scenarios() {
        let doc = parse_ok(
            "Feature: F\n  Rule: First\n    Background:\n      Given common ground\n    Scenario: A\n      Given a\n  Rule: Second\n    Scenario: B\n      Given b\n",
        );
        let rules: Vec<&Rule> = doc
            .feature
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Rule(rule) => Some(rule),
                _ => None,
            })
            .collect();
        assert_eq!(rules.len(), 2);
        let first = rules.first().unwrap_or_else(|| panic!("rule"));
        assert!(first.background.is_some());
        assert_eq!(first.scenarios.len(), 1);
    }

    #[test]
    fn feature_level_examples_are_collected() {
        let doc = parse_ok(
            "Feature: F\n  Examples:\n    | start |\n    | 12    |\n\n  Scenario Outline: S\n    Given <start> items\n",
        );
        assert_eq!(doc.feature.examples.len(), 1);
    }

    #[test]
    fn stray_table_row_is_a_syntax_error() {
        let Err(err) = parse("Feature: F\n  | lost |\n", "x.feature") else {
            panic!("stray table row should fail");
        };
        assert_eq!(err.line, 2);
    }

    #[test]
    fn second_feature_is_rejected() {
        let Err(err) = parse(
            "Feature: F\n  Scenario: S\n    Given a\nFeature: G\n",
            "x.feature",
        ) else {
            panic!("second feature should fail");
        };
        assert!(err.message.contains("only one feature"));
    }
}
