//! Feature-file syntax: the location-tagged raw tree and its parser.
//!
//! [`parse`] turns feature-file text into a [`Document`]. The tree keeps
//! keywords as written and performs no semantic derivation; classification,
//! parent wiring, and validation happen in [`crate::model`].

mod lexer;
mod parser;

pub use parser::parse;

/// 1-based source position of a syntactic node, used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column of the node's first character.
    pub column: u32,
}

impl Location {
    /// Build a location from 1-based line and column numbers.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A label attached to a feature, rule, scenario, or examples block.
///
/// The name is stored without its leading `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the marker.
    pub name: String,
    /// Position of the `@`.
    pub location: Location,
}

/// One cell of a table row, unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    /// Cell text with `\|`, `\\`, and `\n` escapes resolved and
    /// surrounding whitespace trimmed.
    pub value: String,
    /// Position of the cell's content.
    pub location: Location,
}

/// One row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Cells in column order.
    pub cells: Vec<TableCell>,
    /// Position of the row's first `|`.
    pub location: Location,
}

/// An ordered block of table rows, used both for step arguments and for
/// example tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Rows in source order.
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Whether the table carries no usable data: no rows at all, or a
    /// single row with one empty cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.rows.as_slice() {
            [] => true,
            [row] => matches!(row.cells.as_slice(), [cell] if cell.value.is_empty()),
            _ => false,
        }
    }
}

/// A doc-string argument attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocString {
    /// Content with the common leading indentation stripped.
    pub content: String,
    /// The delimiter that opened the block (`"""` or triple backtick).
    pub delimiter: String,
    /// Position of the opening delimiter.
    pub location: Location,
}

/// A step as written, before keyword classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Step keyword as written (`Given`, `And`, …).
    pub keyword: String,
    /// Step text with trailing comments stripped.
    pub text: String,
    /// Position of the keyword.
    pub location: Location,
    /// Optional data-table argument.
    pub table: Option<Table>,
    /// Optional doc-string argument.
    pub docstring: Option<DocString>,
}

/// Orientation of an examples table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// First row names the parameters; each later row is one binding.
    Horizontal,
    /// First column names the parameters; each later column is one binding.
    Vertical,
}

/// An `Examples:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Examples {
    /// Optional block name following the keyword.
    pub name: String,
    /// Tags attached to the block.
    pub tags: Vec<Tag>,
    /// Table orientation.
    pub orientation: Orientation,
    /// The raw table, header included.
    pub table: Table,
    /// Position of the keyword.
    pub location: Location,
}

/// A scenario or scenario outline as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Header keyword as written (`Scenario`, `Scenario Outline`, …).
    pub keyword: String,
    /// Scenario name.
    pub name: String,
    /// Raw description lines under the header.
    pub description: String,
    /// Tags attached to the scenario.
    pub tags: Vec<Tag>,
    /// Steps in source order.
    pub steps: Vec<Step>,
    /// Examples blocks attached to the scenario.
    pub examples: Vec<Examples>,
    /// Position of the header keyword.
    pub location: Location,
}

/// A background block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    /// Optional name after the keyword.
    pub name: String,
    /// Steps in source order.
    pub steps: Vec<Step>,
    /// Position of the header keyword.
    pub location: Location,
}

/// A rule grouping scenarios under a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name.
    pub name: String,
    /// Raw description lines under the header.
    pub description: String,
    /// Tags attached to the rule.
    pub tags: Vec<Tag>,
    /// Background block, if the rule declares one.
    pub background: Option<Background>,
    /// Scenarios in source order.
    pub scenarios: Vec<Scenario>,
    /// Examples blocks found at rule level. Syntactically accepted;
    /// rejected during model validation.
    pub examples: Vec<Examples>,
    /// Position of the header keyword.
    pub location: Location,
}

/// A feature child in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// A background block.
    Background(Background),
    /// A rule block.
    Rule(Rule),
    /// A scenario or scenario outline.
    Scenario(Scenario),
}

/// The feature header and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Header keyword as written (`Feature`).
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Raw description lines under the header.
    pub description: String,
    /// Tags attached to the feature.
    pub tags: Vec<Tag>,
    /// Children in source order.
    pub children: Vec<Child>,
    /// Feature-level examples blocks.
    pub examples: Vec<Examples>,
    /// Position of the header keyword.
    pub location: Location,
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The single feature the file declares.
    pub feature: Feature,
    /// The source split into lines, retained for diagnostics.
    pub lines: Vec<String>,
}

impl Document {
    /// The raw text of a 1-based source line, or `""` when out of range.
    #[must_use]
    pub fn line_text(&self, line: u32) -> &str {
        usize::try_from(line)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.lines.get(idx))
            .map_or("", String::as_str)
    }
}

/// Strip the longest common leading whitespace from every non-blank line.
///
/// Dedenting an already dedented text is a no-op.
pub(crate) fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    let dedented: Vec<String> = text
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(margin).collect()
            }
        })
        .collect();
    dedented.join("\n")
}
