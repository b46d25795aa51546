//! Gherkin-to-executable-scenario pipeline.
//!
//! `cornichon` maps feature files onto executable test cases in four
//! stages: [`syntax::parse`] turns text into a located raw tree,
//! [`model::build`] produces a validated document model,
//! [`outline::expand`] renders scenario outlines against their example
//! tables into concrete [`Pickle`]s, and a [`StepRegistry`] resolves each
//! rendered step to a registered implementation with unambiguous
//! precedence. The host test runner owns discovery, fixtures, and
//! reporting; it feeds the registry and a [`StepContext`] in, and drives
//! [`execution::run_pickle`].
//!
//! ```
//! use cornichon::{
//!     ArgValue, NoHooks, StepContext, StepInvocation, StepKeyword, StepPattern, StepRegistry,
//! };
//!
//! fn have_cucumbers(
//!     _ctx: &mut StepContext<'_>,
//!     step: &StepInvocation<'_>,
//! ) -> Result<(), cornichon::DynStepError> {
//!     assert_eq!(step.args.get("count").and_then(ArgValue::as_int), Some(12));
//!     Ok(())
//! }
//!
//! let text = "Feature: Basket\n  Scenario Outline: Eating\n    Given there are <start> cucumbers\n  Examples:\n    | start |\n    | 12    |\n";
//! let document = cornichon::syntax::parse(text, "basket.feature")?;
//! let feature =
//!     cornichon::model::build(document, "basket.feature".into(), "basket.feature".into())?;
//! let scenario = feature.scenarios().next().ok_or("no scenario")?;
//! let pickles = cornichon::outline::expand(&feature, scenario)?;
//!
//! let mut registry = StepRegistry::new();
//! registry.register(
//!     StepKeyword::Given,
//!     StepPattern::template("there are {count:u32} cucumbers"),
//!     have_cucumbers,
//! )?;
//!
//! for pickle in &pickles {
//!     let mut ctx = StepContext::default();
//!     let outcome = cornichon::execution::run_pickle(pickle, &registry, &mut ctx, &mut NoHooks);
//!     assert!(outcome.passed());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod execution;
pub mod model;
pub mod outline;
pub mod registry;
pub mod syntax;

mod args;
mod context;
mod keyword;
mod pattern;

pub use inventory::{iter, submit};

pub use args::{ArgValue, StepArgs};
pub use collect::{FeatureCache, collect_features};
pub use context::StepContext;
pub use error::{
    CollectError, DynStepError, ExecutionError, ResolveError, ScenarioNotFound, SyntaxError,
    ValidationError,
};
pub use execution::{NoHooks, ScenarioHooks, ScenarioOutcome, StepStatus, run_pickle};
pub use keyword::{StepKeyword, StepKeywordParseError};
pub use model::{Feature, ScenarioTemplate};
pub use outline::{Binding, Pickle, PickleStep, expand, expand_feature};
pub use pattern::{PatternKind, StepPattern};
pub use registry::{RegisteredStep, Resolved, StepDef, StepFn, StepInvocation, StepRegistry};
