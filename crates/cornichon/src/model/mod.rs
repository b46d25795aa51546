//! Typed, validated document model built from the raw syntax tree.
//!
//! The model owns its nodes top-down (`Feature` → children → steps) and
//! stores only index-based handles pointing back up, resolved through the
//! owning [`Feature`]. Effective Given/When/Then keywords, dedented text,
//! and table shapes are fixed here, once, at build time.

mod builder;

pub use builder::build;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::error::ScenarioNotFound;
use crate::keyword::StepKeyword;
use crate::syntax::{DocString, Location, Orientation, Table, Tag};

/// Matches `<name>` placeholders in step text and example cells.
pub(crate) static STEP_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the placeholder regex is a literal")]
    let re = Regex::new(r"<(.+?)>").expect("placeholder regex must compile");
    re
});

/// Non-owning handle from a scenario back to its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioParent {
    /// The scenario sits directly under the feature.
    Feature,
    /// The scenario belongs to the rule at this index of
    /// [`Feature::children`].
    Rule(usize),
}

/// Non-owning handle from a step back to its parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepParent {
    /// The step belongs to the feature-level background.
    FeatureBackground,
    /// The step belongs to the background of the rule at this children
    /// index.
    RuleBackground(usize),
    /// The step belongs to a scenario: the rule children index (if any)
    /// and the scenario's position within its parent.
    Scenario {
        /// Children index of the owning rule, when nested in one.
        rule: Option<usize>,
        /// Position of the scenario within its parent's scenario list.
        scenario: usize,
    },
}

/// A step with its derived effective keyword and frozen raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Keyword as written.
    pub keyword: StepKeyword,
    /// Effective Given/When/Then type, inherited by `And`/`But` from the
    /// nearest preceding primary keyword in the same step sequence.
    pub effective: StepKeyword,
    /// Step name: comment-stripped text, with doc-string content appended
    /// on a new line when present.
    pub name: String,
    raw_name: String,
    /// Source position of the keyword.
    pub location: Location,
    /// Optional data-table argument, shape-validated.
    pub table: Option<Table>,
    /// Optional doc-string argument.
    pub docstring: Option<DocString>,
    parent: StepParent,
}

impl Step {
    /// The unrendered step name, frozen at build time.
    ///
    /// Placeholder extraction always runs against this copy, so rendering
    /// never changes a step's parameter set.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// The parent handle assigned at build time.
    #[must_use]
    pub const fn parent(&self) -> StepParent {
        self.parent
    }

    /// Distinct `<name>` placeholders in the raw step name.
    #[must_use]
    pub fn params(&self) -> BTreeSet<String> {
        STEP_PARAM_RE
            .captures_iter(&self.raw_name)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// An examples table attached to a feature or scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamplesTable {
    /// Optional name after the keyword.
    pub name: String,
    /// Tags attached to this block only.
    pub tags: Vec<Tag>,
    /// Table orientation.
    pub orientation: Orientation,
    /// The raw table, header included.
    pub table: Table,
    /// Source position of the keyword.
    pub location: Location,
}

/// A scenario template, prior to outline expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioTemplate {
    /// Header keyword as written.
    pub keyword: String,
    /// Scenario name, possibly containing placeholders.
    pub name: String,
    /// Dedented description.
    pub description: String,
    /// Tags attached to the scenario itself.
    pub tags: Vec<Tag>,
    /// The scenario's own steps, background excluded.
    pub steps: Vec<Step>,
    /// Scenario-level examples blocks.
    pub examples: Vec<ExamplesTable>,
    /// Source position of the header.
    pub location: Location,
    parent: ScenarioParent,
}

impl ScenarioTemplate {
    /// The parent handle assigned at build time.
    #[must_use]
    pub const fn parent(&self) -> ScenarioParent {
        self.parent
    }

    /// Distinct placeholders across the scenario's own steps.
    #[must_use]
    pub fn params(&self) -> BTreeSet<String> {
        self.steps.iter().flat_map(Step::params).collect()
    }

    /// Whether the scenario is a template requiring expansion.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        !self.examples.is_empty()
    }
}

/// A background block: steps prepended to every sibling scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    /// Optional name after the keyword.
    pub name: String,
    /// Steps in source order.
    pub steps: Vec<Step>,
    /// Source position of the header.
    pub location: Location,
}

/// A rule grouping scenarios under a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule name.
    pub name: String,
    /// Dedented description.
    pub description: String,
    /// Tags attached to the rule.
    pub tags: Vec<Tag>,
    /// Rule-level background, when declared.
    pub background: Option<Background>,
    /// Scenarios in source order.
    pub scenarios: Vec<ScenarioTemplate>,
    /// Source position of the header.
    pub location: Location,
}

/// A feature child. Exactly one variant is populated per child, enforced
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// The feature-level background.
    Background(Background),
    /// A rule block.
    Rule(Rule),
    /// A top-level scenario.
    Scenario(ScenarioTemplate),
}

/// A fully built feature document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Header keyword as written.
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Dedented description.
    pub description: String,
    /// Tags attached to the feature.
    pub tags: Vec<Tag>,
    /// Children in source order.
    pub children: Vec<Child>,
    /// Feature-level examples blocks.
    pub examples: Vec<ExamplesTable>,
    /// Absolute path of the feature file.
    pub abs_path: Utf8PathBuf,
    /// Path of the feature file as given at collection time.
    pub rel_path: Utf8PathBuf,
    /// Source position of the header.
    pub location: Location,
    lines: Vec<String>,
}

impl Feature {
    /// The feature-level background, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.children.iter().find_map(|child| match child {
            Child::Background(background) => Some(background),
            _ => None,
        })
    }

    /// Rules in source order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.children.iter().filter_map(|child| match child {
            Child::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// Top-level scenarios in source order, rule children excluded.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioTemplate> {
        self.children.iter().filter_map(|child| match child {
            Child::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    /// Every scenario in collection order: top-level ones and rule
    /// children, as written.
    pub fn all_scenarios(&self) -> impl Iterator<Item = &ScenarioTemplate> {
        self.children.iter().flat_map(|child| {
            let scenarios: &[ScenarioTemplate] = match child {
                Child::Scenario(scenario) => std::slice::from_ref(scenario),
                Child::Rule(rule) => &rule.scenarios,
                Child::Background(_) => &[],
            };
            scenarios.iter()
        })
    }

    /// Find a scenario by name anywhere in the feature.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioTemplate> {
        self.all_scenarios().find(|scenario| scenario.name == name)
    }

    /// Find a scenario by name, failing with [`ScenarioNotFound`].
    ///
    /// # Errors
    /// Returns [`ScenarioNotFound`] when no scenario has that name.
    pub fn require_scenario(&self, name: &str) -> Result<&ScenarioTemplate, ScenarioNotFound> {
        self.scenario(name).ok_or_else(|| ScenarioNotFound {
            name: name.to_string(),
            feature: self.name.clone(),
            path: self.abs_path.to_string(),
        })
    }

    /// A scenario's combined step list: feature background steps, then the
    /// owning rule's background steps, then the scenario's own steps.
    /// Neither the backgrounds nor the scenario are mutated.
    #[must_use]
    pub fn all_steps<'f>(&'f self, scenario: &'f ScenarioTemplate) -> Vec<&'f Step> {
        let mut steps: Vec<&Step> = Vec::new();
        if let Some(background) = self.background() {
            steps.extend(background.steps.iter());
        }
        if let ScenarioParent::Rule(index) = scenario.parent() {
            if let Some(Child::Rule(rule)) = self.children.get(index) {
                if let Some(background) = &rule.background {
                    steps.extend(background.steps.iter());
                }
            }
        }
        steps.extend(scenario.steps.iter());
        steps
    }

    /// The raw text of a 1-based source line, or `""` when out of range.
    #[must_use]
    pub fn line_text(&self, line: u32) -> &str {
        usize::try_from(line)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.lines.get(idx))
            .map_or("", String::as_str)
    }

    /// Base name of the feature file, for collection ordering and display.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.abs_path.file_name().unwrap_or(self.abs_path.as_str())
    }

    /// The key features sort by during collection: the feature name when
    /// non-empty, otherwise the file name.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        if self.name.is_empty() {
            self.file_name()
        } else {
            &self.name
        }
    }

    /// Path of the feature file as a UTF-8 path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.abs_path
    }
}
