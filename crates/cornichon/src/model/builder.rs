//! Single-pass construction of the document model from a syntax tree.

use camino::Utf8PathBuf;

use crate::error::ValidationError;
use crate::keyword::StepKeyword;
use crate::syntax::{self, Document, Location, Table};

use super::{
    Background, Child, ExamplesTable, Feature, Rule, ScenarioParent, ScenarioTemplate, Step,
    StepParent,
};

/// Build a validated [`Feature`] from a parsed document.
///
/// The walk assigns parent handles, resolves the Given/When/Then
/// inheritance chain per step sequence, and validates table shapes and
/// rule-level constraints.
///
/// # Errors
/// Returns [`ValidationError`] when the tree is structurally sound but
/// semantically invalid: a step sequence opening with `And`/`But`, a data
/// table with ragged rows, or examples attached to a rule.
pub fn build(
    document: Document,
    abs_path: Utf8PathBuf,
    rel_path: Utf8PathBuf,
) -> Result<Feature, ValidationError> {
    let builder = Builder {
        document: &document,
        path: abs_path.as_str(),
    };
    let feature = &document.feature;

    let mut children = Vec::with_capacity(feature.children.len());
    for (index, child) in feature.children.iter().enumerate() {
        let built = match child {
            syntax::Child::Background(background) => Child::Background(
                builder.build_background(background, StepParent::FeatureBackground)?,
            ),
            syntax::Child::Rule(rule) => Child::Rule(builder.build_rule(rule, index)?),
            syntax::Child::Scenario(scenario) => Child::Scenario(builder.build_scenario(
                scenario,
                ScenarioParent::Feature,
                StepParent::Scenario {
                    rule: None,
                    scenario: index,
                },
            )?),
        };
        children.push(built);
    }

    let examples = feature
        .examples
        .iter()
        .map(|block| builder.build_examples(block))
        .collect();

    Ok(Feature {
        keyword: feature.keyword.clone(),
        name: feature.name.clone(),
        description: feature.description.clone(),
        tags: feature.tags.clone(),
        children,
        examples,
        abs_path,
        rel_path,
        location: feature.location,
        lines: document.lines,
    })
}

struct Builder<'a> {
    document: &'a Document,
    path: &'a str,
}

impl Builder<'_> {
    fn validation_error(&self, message: impl Into<String>, location: Location) -> ValidationError {
        ValidationError::new(
            message,
            location,
            self.document.line_text(location.line),
            self.path,
        )
    }

    fn build_rule(&self, rule: &syntax::Rule, rule_index: usize) -> Result<Rule, ValidationError> {
        if let Some(block) = rule.examples.first() {
            return Err(self.validation_error(
                format!("examples are not supported on rules (rule {:?})", rule.name),
                block.location,
            ));
        }
        let background = rule
            .background
            .as_ref()
            .map(|background| {
                self.build_background(background, StepParent::RuleBackground(rule_index))
            })
            .transpose()?;
        let mut scenarios = Vec::with_capacity(rule.scenarios.len());
        for (index, scenario) in rule.scenarios.iter().enumerate() {
            scenarios.push(self.build_scenario(
                scenario,
                ScenarioParent::Rule(rule_index),
                StepParent::Scenario {
                    rule: Some(rule_index),
                    scenario: index,
                },
            )?);
        }
        Ok(Rule {
            name: rule.name.clone(),
            description: rule.description.clone(),
            tags: rule.tags.clone(),
            background,
            scenarios,
            location: rule.location,
        })
    }

    fn build_background(
        &self,
        background: &syntax::Background,
        parent: StepParent,
    ) -> Result<Background, ValidationError> {
        Ok(Background {
            name: background.name.clone(),
            steps: self.build_steps(&background.steps, parent)?,
            location: background.location,
        })
    }

    fn build_scenario(
        &self,
        scenario: &syntax::Scenario,
        parent: ScenarioParent,
        step_parent: StepParent,
    ) -> Result<ScenarioTemplate, ValidationError> {
        Ok(ScenarioTemplate {
            keyword: scenario.keyword.clone(),
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            tags: scenario.tags.clone(),
            steps: self.build_steps(&scenario.steps, step_parent)?,
            examples: scenario
                .examples
                .iter()
                .map(|block| self.build_examples(block))
                .collect(),
            location: scenario.location,
            parent,
        })
    }

    fn build_examples(&self, block: &syntax::Examples) -> ExamplesTable {
        ExamplesTable {
            name: block.name.clone(),
            tags: block.tags.clone(),
            orientation: block.orientation,
            table: block.table.clone(),
            location: block.location,
        }
    }

    /// Build one step sequence. The effective-keyword chain is seeded here
    /// and never crosses into another sequence.
    fn build_steps(
        &self,
        steps: &[syntax::Step],
        parent: StepParent,
    ) -> Result<Vec<Step>, ValidationError> {
        let mut built = Vec::with_capacity(steps.len());
        let mut prev: Option<StepKeyword> = None;
        for step in steps {
            let keyword: StepKeyword = step
                .keyword
                .parse()
                .map_err(|e| self.validation_error(format!("{e}"), step.location))?;
            let Some(effective) = keyword.resolve(&mut prev) else {
                return Err(self.validation_error(
                    format!(
                        "the first step of a scenario or background must start with \
                         'Given', 'When' or 'Then', but got {:?}",
                        keyword.as_str()
                    ),
                    step.location,
                ));
            };
            if let Some(table) = &step.table {
                self.check_table_shape(table)?;
            }
            let mut name = step.text.clone();
            if let Some(docstring) = &step.docstring {
                name.push('\n');
                name.push_str(&docstring.content);
            }
            built.push(Step {
                keyword,
                effective,
                raw_name: name.clone(),
                name,
                location: step.location,
                table: step.table.clone(),
                docstring: step.docstring.clone(),
                parent,
            });
        }
        Ok(built)
    }

    /// Step data tables must be rectangular.
    fn check_table_shape(&self, table: &Table) -> Result<(), ValidationError> {
        let Some(header) = table.rows.first() else {
            return Ok(());
        };
        let width = header.cells.len();
        for row in table.rows.iter().skip(1) {
            if row.cells.len() != width {
                return Err(self.validation_error(
                    format!(
                        "data table row has {} cells, expected {}",
                        row.cells.len(),
                        width
                    ),
                    row.location,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn build_feature(text: &str) -> Result<Feature, ValidationError> {
        let document =
            parse(text, "test.feature").unwrap_or_else(|e| panic!("feature should parse: {e}"));
        build(document, "test.feature".into(), "test.feature".into())
    }

    fn built(text: &str) -> Feature {
        build_feature(text).unwrap_or_else(|e| panic!("feature should build: {e}"))
    }

    #[test]
    fn conjunctions_inherit_the_first_primary_keyword() {
        let feature = built(
            "Feature: F\n  Scenario: S\n    Given a\n    And b\n    But c\n    When d\n    And e\n",
        );
        let scenario = feature
            .scenarios()
            .next()
            .unwrap_or_else(|| panic!("expected a scenario"));
        let effective: Vec<StepKeyword> = scenario.steps.iter().map(|s| s.effective).collect();
        assert_eq!(
            effective,
            [
                StepKeyword::Given,
                StepKeyword::Given,
                StepKeyword::Given,
                StepKeyword::When,
                StepKeyword::When,
            ]
        );
    }

    #[test]
    fn inheritance_chain_does_not_cross_from_background_into_scenario() {
        let Err(err) = build_feature(
            "Feature: F\n  Background:\n    Given ground\n  Scenario: S\n    And floating\n",
        ) else {
            panic!("scenario starting with And should fail");
        };
        assert!(err.message.contains("must start with"));
        assert_eq!(err.line, 5);
    }

    #[test]
    fn leading_conjunction_in_background_is_rejected() {
        let Err(err) = build_feature("Feature: F\n  Background:\n    And stray\n") else {
            panic!("background starting with And should fail");
        };
        assert!(err.message.contains("'Given', 'When' or 'Then'"));
    }

    #[test]
    fn step_name_includes_docstring_and_raw_name_is_frozen() {
        let feature = built(
            "Feature: F\n  Scenario: S\n    Given a payload of <kind>\n      \"\"\"\n      body <kind>\n      \"\"\"\n",
        );
        let scenario = feature
            .scenarios()
            .next()
            .unwrap_or_else(|| panic!("expected a scenario"));
        let step = scenario
            .steps
            .first()
            .unwrap_or_else(|| panic!("expected a step"));
        assert_eq!(step.name, "a payload of <kind>\nbody <kind>");
        assert_eq!(step.raw_name(), step.name);
        assert_eq!(
            step.params().into_iter().collect::<Vec<_>>(),
            ["kind".to_string()]
        );
    }

    #[test]
    fn ragged_data_table_is_rejected() {
        let Err(err) = build_feature(
            "Feature: F\n  Scenario: S\n    Given users:\n      | name | role |\n      | ada  |\n",
        ) else {
            panic!("ragged table should fail");
        };
        assert!(err.message.contains("expected 2"));
        assert_eq!(err.line, 5);
        assert_eq!(err.line_text.trim(), "| ada  |");
    }

    #[test]
    fn rule_level_examples_are_rejected() {
        let Err(err) = build_feature(
            "Feature: F\n  Rule: R\n    Examples:\n      | n |\n      | 1 |\n    Scenario: S\n      Given a\n",
        ) else {
            panic!("rule-level examples should fail");
        };
        assert!(err.message.contains("not supported on rules"));
    }

    #[test]
    fn all_steps_orders_feature_rule_then_scenario() {
        let feature = built(
            "Feature: F\n  Background:\n    Given feature ground\n  Rule: R\n    Background:\n      Given rule ground\n    Scenario: S\n      Given own step\n",
        );
        let scenario = feature
            .all_scenarios()
            .next()
            .unwrap_or_else(|| panic!("expected a scenario"));
        let names: Vec<&str> = feature
            .all_steps(scenario)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["feature ground", "rule ground", "own step"]);
        assert_eq!(scenario.steps.len(), 1, "own step list is untouched");
    }

    #[test]
    fn scenario_lookup_by_name_covers_rules() {
        let feature =
            built("Feature: F\n  Rule: R\n    Scenario: Nested\n      Given a\n");
        assert!(feature.scenario("Nested").is_some());
        let Err(err) = feature.require_scenario("Missing") else {
            panic!("missing scenario should fail");
        };
        assert_eq!(err.name, "Missing");
        assert_eq!(err.feature, "F");
    }
}
