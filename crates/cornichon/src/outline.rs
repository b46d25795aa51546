//! Scenario-outline expansion.
//!
//! An outline's example tables are parsed into parameter bindings, combined
//! across tables by a relational equi-join on shared parameter names (full
//! cross product when none are shared), and each resulting binding is
//! rendered into one concrete [`Pickle`]. Expansion is deterministic: the
//! same feature always yields the same pickles in the same order.

use std::collections::BTreeSet;

use camino::Utf8PathBuf;

use crate::config;
use crate::error::ValidationError;
use crate::keyword::StepKeyword;
use crate::model::{ExamplesTable, Feature, STEP_PARAM_RE, ScenarioTemplate, Step};
use crate::syntax::{Location, Orientation, Tag};

/// One row's worth of example-table substitutions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
    entries: Vec<(String, String)>,
}

impl Binding {
    /// Value bound to `name`, when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the binding carries no substitutions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name/value pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// A rendered step of a concrete scenario instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickleStep {
    /// Keyword as written in the template.
    pub keyword: StepKeyword,
    /// Effective Given/When/Then type.
    pub effective: StepKeyword,
    /// Rendered step text.
    pub text: String,
    raw_text: String,
    /// Rendered doc-string content, when the template step carried one.
    pub docstring: Option<String>,
    /// Rendered data-table cells, when the template step carried a table.
    pub table: Option<Vec<Vec<String>>>,
    /// Source position of the template step.
    pub location: Location,
}

impl PickleStep {
    /// The unrendered step text, frozen when the pickle was produced.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Distinct placeholders of the unrendered text.
    #[must_use]
    pub fn params(&self) -> BTreeSet<String> {
        STEP_PARAM_RE
            .captures_iter(&self.raw_text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// A concrete, fully rendered scenario instance, ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pickle {
    /// Rendered scenario name.
    pub name: String,
    /// Effective tag names: feature tags, then scenario tags, then the
    /// tags of the examples blocks that produced the binding.
    pub tags: Vec<String>,
    /// Rendered steps in execution order, background steps included.
    pub steps: Vec<PickleStep>,
    /// Source position of the template scenario.
    pub location: Location,
    /// The parameter binding this instance was rendered from.
    pub binding: Binding,
    /// Absolute path of the owning feature file.
    pub feature_path: Utf8PathBuf,
}

/// Substitute `<name>` placeholders from `binding` into `input`.
///
/// Names absent from the binding are left as the literal `<name>` text;
/// substitution is a silent no-op, never an error.
pub(crate) fn render_string(input: &str, binding: &Binding) -> String {
    STEP_PARAM_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let name = caps.get(1).map_or("", |m| m.as_str());
            binding.get(name).unwrap_or(whole).to_string()
        })
        .into_owned()
}

/// Expand every scenario of a feature, in collection order.
///
/// # Errors
/// Returns [`ValidationError`] for invalid example tables or parameter
/// mismatches, attributed to the affected scenario.
pub fn expand_feature(feature: &Feature) -> Result<Vec<Pickle>, ValidationError> {
    let mut pickles = Vec::new();
    for scenario in feature.all_scenarios() {
        pickles.extend(expand(feature, scenario)?);
    }
    Ok(pickles)
}

/// Expand one scenario template into its concrete instances.
///
/// Feature-level and scenario-level example tables are combined in declared
/// order. A scenario with no applicable (non-empty) tables yields exactly
/// one instance with an empty binding.
///
/// # Errors
/// Returns [`ValidationError`] for duplicate example parameters, ragged
/// vertical tables, mismatched row widths, and step/example parameter
/// mismatches (unless demoted by [`config::strict_params`]).
pub fn expand(
    feature: &Feature,
    scenario: &ScenarioTemplate,
) -> Result<Vec<Pickle>, ValidationError> {
    let mut tables = Vec::new();
    for block in feature.examples.iter().chain(scenario.examples.iter()) {
        if let Some(bindings) = table_bindings(feature, block)? {
            tables.push(bindings);
        }
    }

    validate_params(feature, scenario, &tables)?;

    let steps: Vec<&Step> = feature.all_steps(scenario);
    let block_tags: Vec<&Tag> = tables.iter().flat_map(|t| t.tags.iter()).collect();

    let mut pickles = Vec::new();
    for binding in joined_bindings(&tables) {
        pickles.push(render_pickle(feature, scenario, &steps, &block_tags, binding));
    }
    Ok(pickles)
}

/// Bindings extracted from one examples table.
struct TableBindings {
    params: Vec<String>,
    rows: Vec<Vec<String>>,
    tags: Vec<Tag>,
}

fn duplicate_param_error(
    feature: &Feature,
    param: &str,
    location: Location,
) -> ValidationError {
    ValidationError::new(
        format!(
            "example tables should contain unique parameters. {param:?} appeared more than once"
        ),
        location,
        feature.line_text(location.line),
        feature.path().as_str(),
    )
}

/// Parse one examples block into parameter names and binding rows.
///
/// Returns `None` for tables that act as the join identity: no rows, a
/// single empty cell, or no binding rows at all.
fn table_bindings(
    feature: &Feature,
    block: &ExamplesTable,
) -> Result<Option<TableBindings>, ValidationError> {
    if block.table.is_empty() {
        return Ok(None);
    }
    let parsed = match block.orientation {
        Orientation::Horizontal => horizontal_bindings(feature, block)?,
        Orientation::Vertical => vertical_bindings(feature, block)?,
    };
    Ok(Some(parsed).filter(|t| !t.rows.is_empty()))
}

fn horizontal_bindings(
    feature: &Feature,
    block: &ExamplesTable,
) -> Result<TableBindings, ValidationError> {
    let Some(header) = block.table.rows.first() else {
        return Ok(TableBindings {
            params: Vec::new(),
            rows: Vec::new(),
            tags: block.tags.clone(),
        });
    };
    let mut params: Vec<String> = Vec::with_capacity(header.cells.len());
    for cell in &header.cells {
        if params.contains(&cell.value) {
            return Err(duplicate_param_error(feature, &cell.value, cell.location));
        }
        params.push(cell.value.clone());
    }
    let mut rows = Vec::new();
    for row in block.table.rows.iter().skip(1) {
        if row.cells.len() != params.len() {
            return Err(ValidationError::new(
                format!(
                    "example row has {} cells, expected {}",
                    row.cells.len(),
                    params.len()
                ),
                row.location,
                feature.line_text(row.location.line),
                feature.path().as_str(),
            ));
        }
        rows.push(row.cells.iter().map(|c| c.value.clone()).collect());
    }
    Ok(TableBindings {
        params,
        rows,
        tags: block.tags.clone(),
    })
}

fn vertical_bindings(
    feature: &Feature,
    block: &ExamplesTable,
) -> Result<TableBindings, ValidationError> {
    let mut params: Vec<String> = Vec::new();
    let mut value_rows: Vec<Vec<String>> = Vec::new();
    // Duplicate parameters are rejected across the whole table before any
    // row-length comparison runs.
    for row in &block.table.rows {
        let Some(head) = row.cells.first() else {
            continue;
        };
        if params.contains(&head.value) {
            return Err(duplicate_param_error(feature, &head.value, head.location));
        }
        params.push(head.value.clone());
        value_rows.push(row.cells.iter().skip(1).map(|c| c.value.clone()).collect());
    }
    let width = value_rows.first().map_or(0, Vec::len);
    for (row, values) in block.table.rows.iter().zip(&value_rows) {
        if values.len() != width {
            return Err(ValidationError::new(
                format!(
                    "vertical example rows must provide the same number of values: \
                     got {}, expected {width}",
                    values.len()
                ),
                row.location,
                feature.line_text(row.location.line),
                feature.path().as_str(),
            ));
        }
    }
    // One binding per value column.
    let rows = (0..width)
        .map(|column| {
            value_rows
                .iter()
                .map(|values| values.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(TableBindings {
        params,
        rows,
        tags: block.tags.clone(),
    })
}

/// Combine the tables' rows by equi-join on shared parameter names.
///
/// Rows are emitted in the lexicographic product order of the tables in
/// declared sequence; when no tables apply, a single empty binding is
/// produced.
fn joined_bindings(tables: &[TableBindings]) -> Vec<Binding> {
    if tables.is_empty() {
        return vec![Binding::default()];
    }
    let mut combined_params: Vec<&str> = Vec::new();
    for table in tables {
        for param in &table.params {
            if !combined_params.contains(&param.as_str()) {
                combined_params.push(param.as_str());
            }
        }
    }

    let mut bindings = Vec::new();
    let mut counters = vec![0usize; tables.len()];
    'odometer: loop {
        let picked: Vec<(&TableBindings, &Vec<String>)> = tables
            .iter()
            .zip(&counters)
            .filter_map(|(table, &row)| table.rows.get(row).map(|r| (table, r)))
            .collect();

        if picked.len() == tables.len() {
            if let Some(entries) = join_row(&combined_params, &picked) {
                bindings.push(Binding { entries });
            }
        }

        // Advance the least-significant counter, carrying leftwards.
        for index in (0..tables.len()).rev() {
            let Some(counter) = counters.get_mut(index) else {
                break 'odometer;
            };
            *counter += 1;
            if tables.get(index).is_some_and(|t| *counter < t.rows.len()) {
                continue 'odometer;
            }
            *counter = 0;
        }
        break;
    }
    bindings
}

/// Produce one combined row when every shared parameter agrees, taking
/// each parameter's value from the first table that declares it.
fn join_row(
    combined_params: &[&str],
    picked: &[(&TableBindings, &Vec<String>)],
) -> Option<Vec<(String, String)>> {
    let mut entries = Vec::with_capacity(combined_params.len());
    for &param in combined_params {
        let mut chosen: Option<&str> = None;
        for (table, row) in picked {
            let Some(position) = table.params.iter().position(|p| p == param) else {
                continue;
            };
            let value = row.get(position).map_or("", String::as_str);
            match chosen {
                None => chosen = Some(value),
                Some(existing) if existing == value => {}
                Some(_) => return None,
            }
        }
        entries.push((param.to_string(), chosen.unwrap_or("").to_string()));
    }
    Some(entries)
}

/// Enforce that step placeholders and example parameters agree.
///
/// Mirrors the collection-time check of the reference behaviour: the check
/// only fires when both sets are non-empty, and a mismatch is demoted to a
/// warning when strict parameter checking is off.
fn validate_params(
    feature: &Feature,
    scenario: &ScenarioTemplate,
    tables: &[TableBindings],
) -> Result<(), ValidationError> {
    let step_params: BTreeSet<String> = feature
        .all_steps(scenario)
        .iter()
        .flat_map(|step| step.params())
        .collect();
    let example_params: BTreeSet<String> = tables
        .iter()
        .flat_map(|t| t.params.iter().cloned())
        .collect();
    if step_params.is_empty() || example_params.is_empty() || step_params == example_params {
        return Ok(());
    }
    let message = format!(
        "scenario {:?} has mismatched examples: the set of step parameters {:?} \
         should match the set of example parameters {:?}",
        scenario.name,
        step_params.iter().collect::<Vec<_>>(),
        example_params.iter().collect::<Vec<_>>(),
    );
    if config::strict_params() {
        return Err(ValidationError::new(
            message,
            scenario.location,
            feature.line_text(scenario.location.line),
            feature.path().as_str(),
        ));
    }
    log::warn!("{message}");
    Ok(())
}

fn render_pickle(
    feature: &Feature,
    scenario: &ScenarioTemplate,
    steps: &[&Step],
    block_tags: &[&Tag],
    binding: Binding,
) -> Pickle {
    let mut tags: Vec<String> = Vec::new();
    for tag in feature
        .tags
        .iter()
        .chain(scenario.tags.iter())
        .chain(block_tags.iter().copied())
    {
        if !tags.contains(&tag.name) {
            tags.push(tag.name.clone());
        }
    }

    let rendered_steps = steps
        .iter()
        .map(|step| PickleStep {
            keyword: step.keyword,
            effective: step.effective,
            text: render_string(step.raw_name(), &binding),
            raw_text: step.raw_name().to_string(),
            docstring: step
                .docstring
                .as_ref()
                .map(|d| render_string(&d.content, &binding)),
            table: step.table.as_ref().map(|table| {
                table
                    .rows
                    .iter()
                    .map(|row| {
                        row.cells
                            .iter()
                            .map(|cell| render_string(&cell.value, &binding))
                            .collect()
                    })
                    .collect()
            }),
            location: step.location,
        })
        .collect();

    Pickle {
        name: render_string(&scenario.name, &binding),
        tags,
        steps: rendered_steps,
        location: scenario.location,
        binding,
        feature_path: feature.abs_path.clone(),
    }
}
