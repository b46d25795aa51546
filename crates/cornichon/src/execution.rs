//! Sequential execution of one scenario instance.
//!
//! Steps run strictly in declared order. The first failure, whether in
//! resolution, conversion, or the implementation itself, stops the instance;
//! remaining steps are recorded as skipped, never run, and the original
//! error is preserved unchanged in the outcome. Sibling instances are
//! unaffected: the driver holds no state beyond what it is handed.

use crate::context::StepContext;
use crate::error::ExecutionError;
use crate::outline::{Pickle, PickleStep};
use crate::registry::{StepInvocation, StepRegistry};

/// Per-step callbacks exposed to the host runner.
///
/// All hooks default to no-ops; runners implement what they report on.
pub trait ScenarioHooks {
    /// Called before a step is resolved.
    fn before_step(&mut self, step: &PickleStep) {
        let _ = step;
    }

    /// Called after a step ran successfully.
    fn after_step(&mut self, step: &PickleStep) {
        let _ = step;
    }

    /// Called when a step fails, before the remaining steps are skipped.
    fn on_step_error(&mut self, step: &PickleStep, error: &ExecutionError) {
        let _ = (step, error);
    }
}

/// Hook implementation that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ScenarioHooks for NoHooks {}

/// What happened to one step of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step resolved and its implementation returned `Ok`.
    Passed,
    /// The step failed; the outcome's error describes why.
    Failed,
    /// The step never ran because an earlier step failed.
    Skipped,
}

/// The result of driving one scenario instance.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Per-step statuses, aligned with the pickle's step order.
    pub statuses: Vec<StepStatus>,
    /// Index of the failing step, when one failed.
    pub failed_step: Option<usize>,
    /// The failure, with the implementation's error preserved as its
    /// source.
    pub error: Option<ExecutionError>,
}

impl ScenarioOutcome {
    /// Whether every step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Run every step of a pickle against the registry.
///
/// The context carries fixture state across the instance's steps; each
/// instance gets its own context.
pub fn run_pickle(
    pickle: &Pickle,
    registry: &StepRegistry,
    ctx: &mut StepContext<'_>,
    hooks: &mut dyn ScenarioHooks,
) -> ScenarioOutcome {
    let mut statuses = Vec::with_capacity(pickle.steps.len());
    let mut failed_step = None;
    let mut error = None;

    for (index, step) in pickle.steps.iter().enumerate() {
        if error.is_some() {
            statuses.push(StepStatus::Skipped);
            continue;
        }
        hooks.before_step(step);
        match execute_step(index, step, registry, ctx) {
            Ok(()) => {
                statuses.push(StepStatus::Passed);
                hooks.after_step(step);
            }
            Err(step_error) => {
                hooks.on_step_error(step, &step_error);
                statuses.push(StepStatus::Failed);
                failed_step = Some(index);
                error = Some(step_error);
            }
        }
    }

    ScenarioOutcome {
        statuses,
        failed_step,
        error,
    }
}

/// Resolve and invoke one step.
///
/// # Errors
/// Returns [`ExecutionError::Resolve`] when the step has no unambiguous
/// implementation or an argument fails conversion, and
/// [`ExecutionError::StepFailed`] carrying the implementation's error
/// otherwise.
pub fn execute_step(
    index: usize,
    step: &PickleStep,
    registry: &StepRegistry,
    ctx: &mut StepContext<'_>,
) -> Result<(), ExecutionError> {
    let resolved = registry
        .resolve(step.effective, &step.text)
        .map_err(|source| ExecutionError::Resolve {
            index,
            keyword: step.effective,
            text: step.text.clone(),
            line: step.location.line,
            source,
        })?;
    let invocation = StepInvocation {
        text: &step.text,
        args: &resolved.args,
        docstring: step.docstring.as_deref(),
        table: step.table.as_deref(),
    };
    (resolved.run)(ctx, &invocation).map_err(|source| ExecutionError::StepFailed {
        index,
        keyword: step.effective,
        text: step.text.clone(),
        line: step.location.line,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DynStepError;
    use crate::keyword::StepKeyword;
    use crate::model::build;
    use crate::outline::expand;
    use crate::pattern::StepPattern;
    use crate::syntax::parse;
    use std::cell::RefCell;

    fn pickles(text: &str) -> Vec<Pickle> {
        let document =
            parse(text, "test.feature").unwrap_or_else(|e| panic!("feature should parse: {e}"));
        let feature = build(document, "test.feature".into(), "test.feature".into())
            .unwrap_or_else(|e| panic!("feature should build: {e}"));
        let scenario = feature
            .all_scenarios()
            .next()
            .unwrap_or_else(|| panic!("expected a scenario"));
        expand(&feature, scenario).unwrap_or_else(|e| panic!("expansion should work: {e}"))
    }

    fn record(ctx: &mut StepContext<'_>, entry: &str) {
        if let Some(log) = ctx.get::<RefCell<Vec<String>>>("log") {
            log.borrow_mut().push(entry.to_string());
        }
    }

    fn given_ok(
        ctx: &mut StepContext<'_>,
        step: &StepInvocation<'_>,
    ) -> Result<(), DynStepError> {
        record(ctx, &format!("given: {}", step.text));
        Ok(())
    }

    fn when_fails(
        ctx: &mut StepContext<'_>,
        _step: &StepInvocation<'_>,
    ) -> Result<(), DynStepError> {
        record(ctx, "when: about to fail");
        Err("the kettle is broken".into())
    }

    fn then_ok(
        ctx: &mut StepContext<'_>,
        step: &StepInvocation<'_>,
    ) -> Result<(), DynStepError> {
        record(ctx, &format!("then: {}", step.text));
        Ok(())
    }

    fn registry() -> StepRegistry {
        let mut registry = StepRegistry::new();
        registry
            .register(
                StepKeyword::Given,
                StepPattern::template("a {item}"),
                given_ok,
            )
            .unwrap_or_else(|e| panic!("register should work: {e}"));
        registry
            .register(StepKeyword::When, StepPattern::exact("I brew tea"), when_fails)
            .unwrap_or_else(|e| panic!("register should work: {e}"));
        registry
            .register(
                StepKeyword::Then,
                StepPattern::template("{anything}"),
                then_ok,
            )
            .unwrap_or_else(|e| panic!("register should work: {e}"));
        registry
    }

    #[test]
    fn all_steps_pass_in_declared_order() {
        let pickles =
            pickles("Feature: F\n  Scenario: S\n    Given a cup\n    Then tea is served\n");
        let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
        let log: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut ctx = StepContext::default();
        ctx.insert("log", &log);
        let outcome = run_pickle(pickle, &registry(), &mut ctx, &mut NoHooks);
        assert!(outcome.passed());
        assert_eq!(
            outcome.statuses,
            [StepStatus::Passed, StepStatus::Passed]
        );
        assert_eq!(
            log.borrow().as_slice(),
            ["given: a cup", "then: tea is served"]
        );
    }

    #[test]
    fn failure_skips_remaining_steps_and_preserves_the_error() {
        let pickles = pickles(
            "Feature: F\n  Scenario: S\n    Given a cup\n    When I brew tea\n    Then tea is served\n",
        );
        let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
        let log: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut ctx = StepContext::default();
        ctx.insert("log", &log);
        let outcome = run_pickle(pickle, &registry(), &mut ctx, &mut NoHooks);
        assert!(!outcome.passed());
        assert_eq!(outcome.failed_step, Some(1));
        assert_eq!(
            outcome.statuses,
            [StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped]
        );
        let error = outcome.error.unwrap_or_else(|| panic!("expected an error"));
        let source = std::error::Error::source(&error)
            .unwrap_or_else(|| panic!("the implementation error should be the source"));
        assert_eq!(source.to_string(), "the kettle is broken");
        assert_eq!(
            log.borrow().last().map(String::as_str),
            Some("when: about to fail"),
            "the Then step never ran"
        );
    }

    #[test]
    fn unresolvable_step_fails_with_a_resolve_error() {
        let pickles = pickles("Feature: F\n  Scenario: S\n    When I brew coffee\n");
        let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
        let mut ctx = StepContext::default();
        let outcome = run_pickle(pickle, &registry(), &mut ctx, &mut NoHooks);
        assert_eq!(outcome.failed_step, Some(0));
        assert!(matches!(
            outcome.error,
            Some(ExecutionError::Resolve { line: 3, .. })
        ));
    }

    #[test]
    fn hooks_fire_in_sequence() {
        #[derive(Default)]
        struct Recorder {
            events: Vec<String>,
        }
        impl ScenarioHooks for Recorder {
            fn before_step(&mut self, step: &PickleStep) {
                self.events.push(format!("before {}", step.text));
            }
            fn after_step(&mut self, step: &PickleStep) {
                self.events.push(format!("after {}", step.text));
            }
            fn on_step_error(&mut self, step: &PickleStep, _error: &ExecutionError) {
                self.events.push(format!("error {}", step.text));
            }
        }

        let pickles = pickles(
            "Feature: F\n  Scenario: S\n    Given a cup\n    When I brew tea\n    Then tea is served\n",
        );
        let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
        let mut ctx = StepContext::default();
        let mut recorder = Recorder::default();
        let outcome = run_pickle(pickle, &registry(), &mut ctx, &mut recorder);
        assert!(!outcome.passed());
        assert_eq!(
            recorder.events,
            [
                "before a cup",
                "after a cup",
                "before I brew tea",
                "error I brew tea",
            ]
        );
    }

    #[test]
    fn and_steps_execute_under_their_inherited_keyword() {
        let pickles = pickles(
            "Feature: F\n  Scenario: S\n    Given a cup\n    And a saucer\n",
        );
        let pickle = pickles.first().unwrap_or_else(|| panic!("pickle"));
        let log: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let mut ctx = StepContext::default();
        ctx.insert("log", &log);
        let outcome = run_pickle(pickle, &registry(), &mut ctx, &mut NoHooks);
        assert!(outcome.passed(), "And resolves under the Given registry");
        assert_eq!(
            log.borrow().as_slice(),
            ["given: a cup", "given: a saucer"]
        );
    }
}
