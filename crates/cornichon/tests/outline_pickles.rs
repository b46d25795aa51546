//! End-to-end outline expansion against parsed feature text.

use cornichon::model::Feature;
use cornichon::{expand, expand_feature};

fn feature(text: &str) -> Feature {
    let document = cornichon::syntax::parse(text, "outline.feature")
        .unwrap_or_else(|e| panic!("feature should parse: {e}"));
    cornichon::model::build(document, "outline.feature".into(), "outline.feature".into())
        .unwrap_or_else(|e| panic!("feature should build: {e}"))
}

const CUCUMBERS: &str = "\
Feature: Cucumber basket
  Scenario Outline: Eating cucumbers
    Given there are <start> cucumbers
    When I eat <eat> cucumbers
    Then I should have <left> cucumbers

  Examples:
    | start | eat | left |
    | 12    | 5   | 7    |
    | 5     | 4   | 1    |
";

#[test]
fn horizontal_examples_produce_one_instance_per_row() {
    let feature = feature(CUCUMBERS);
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    assert_eq!(pickles.len(), 2);
    let given: Vec<&str> = pickles
        .iter()
        .filter_map(|p| p.steps.first())
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(given, ["there are 12 cucumbers", "there are 5 cucumbers"]);
}

#[test]
fn rendered_steps_keep_their_unrendered_text() {
    let feature = feature(CUCUMBERS);
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    let step = pickles
        .first()
        .and_then(|p| p.steps.first())
        .unwrap_or_else(|| panic!("expected a step"));
    assert_eq!(step.raw_text(), "there are <start> cucumbers");
    assert_eq!(
        step.params().into_iter().collect::<Vec<_>>(),
        ["start".to_string()]
    );
}

#[test]
fn feature_and_scenario_tables_cross_join_when_disjoint() {
    let feature = feature(
        "\
Feature: Fruit basket
  Examples:
    | fruits  |
    | apples  |
    | oranges |

  Scenario Outline: Eating fruit
    Given there are <start> <fruits>
    When I eat <eat> of them
    Then I should have <left> left

  Examples:
    | start | eat | left |
    | 12    | 5   | 7    |
",
    );
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    assert_eq!(pickles.len(), 2);
    for (pickle, fruit) in pickles.iter().zip(["apples", "oranges"]) {
        assert_eq!(pickle.binding.get("fruits"), Some(fruit));
        assert_eq!(pickle.binding.get("start"), Some("12"));
        assert_eq!(pickle.binding.get("eat"), Some("5"));
        assert_eq!(pickle.binding.get("left"), Some("7"));
    }
}

#[test]
fn unbound_placeholders_stay_literal_without_examples() {
    let feature = feature(
        "Feature: F\n  Scenario: No examples here\n    Given there are <n> cucumbers\n",
    );
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    let step = pickles
        .first()
        .and_then(|p| p.steps.first())
        .unwrap_or_else(|| panic!("expected a step"));
    assert_eq!(step.text, "there are <n> cucumbers");
}

#[test]
fn scenario_names_render_like_step_text() {
    let feature = feature(
        "Feature: F\n  Scenario Outline: Eating <start> cucumbers\n    Given there are <start> cucumbers\n  Examples:\n    | start |\n    | 12    |\n    | 5     |\n",
    );
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    let names: Vec<&str> = pickles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Eating 12 cucumbers", "Eating 5 cucumbers"]);
}

#[test]
fn expand_feature_walks_rules_in_collection_order() {
    let feature = feature(
        "\
Feature: Grouped
  Scenario: Top
    Given a thing

  Rule: Limits
    Background:
      Given a limit of ten
    Scenario Outline: Under the limit
      Given <n> items
    Examples:
      | n |
      | 3 |
      | 9 |
",
    );
    let pickles =
        expand_feature(&feature).unwrap_or_else(|e| panic!("expansion should work: {e}"));
    let names: Vec<&str> = pickles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Top", "Under the limit", "Under the limit"]);
    let rule_pickle = pickles.last().unwrap_or_else(|| panic!("pickle"));
    let texts: Vec<&str> = rule_pickle.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["a limit of ten", "9 items"]);
}

#[test]
fn block_tags_follow_their_rows() {
    let feature = feature(
        "\
@basket
Feature: Tagged
  @outline
  Scenario Outline: S
    Given <n> items
  @smoke
  Examples:
    | n |
    | 1 |
",
    );
    let scenario = feature
        .scenarios()
        .next()
        .unwrap_or_else(|| panic!("expected a scenario"));
    let pickles = expand(&feature, scenario)
        .unwrap_or_else(|e| panic!("expansion should work: {e}"));
    let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
    assert_eq!(pickle.tags, ["basket", "outline", "smoke"]);
}
