//! Step registration and resolution.
//!
//! Definitions reach a [`StepRegistry`] two ways: the [`step!`](crate::step)
//! macro submits [`StepDef`] records to a process-wide `inventory`
//! collection that [`StepRegistry::from_inventory`] drains, and runners can
//! [`register`](StepRegistry::register) directly. Resolution filters by the
//! step's effective keyword, requires a full-text match, and disambiguates
//! by pattern kind (exact over regex over template), then by specificity.
//! A tie inside the winning kind is an error, never a registration-order
//! race.

use std::sync::Mutex;

use hashbrown::{HashMap, HashSet};
use inventory::iter;

use crate::args::{ArgValue, StepArgs, convert_capture};
use crate::context::StepContext;
use crate::error::{DynStepError, ResolveError};
use crate::keyword::StepKeyword;
use crate::pattern::{PatternKind, StepPattern};
use cornichon_patterns::PatternError;

/// One step's worth of data handed to an implementation.
#[derive(Debug)]
pub struct StepInvocation<'a> {
    /// The rendered step text that matched.
    pub text: &'a str,
    /// Arguments captured by the pattern.
    pub args: &'a StepArgs,
    /// Rendered doc-string content, when the step carried one.
    pub docstring: Option<&'a str>,
    /// Rendered data-table cells, when the step carried a table.
    pub table: Option<&'a [Vec<String>]>,
}

/// Signature of a registered step implementation.
pub type StepFn =
    for<'a> fn(&mut StepContext<'a>, &StepInvocation<'_>) -> Result<(), DynStepError>;

/// A step definition registered through the global `inventory` collection.
#[derive(Debug)]
pub struct StepDef {
    /// Keyword the definition registers under.
    pub keyword: StepKeyword,
    /// Matcher kind of the pattern text.
    pub kind: PatternKind,
    /// Pattern text.
    pub pattern: &'static str,
    /// Implementation invoked on a match.
    pub run: StepFn,
    /// Source file of the definition.
    pub file: &'static str,
    /// Source line of the definition.
    pub line: u32,
}

inventory::collect!(StepDef);

/// Register a step definition with the global collection.
///
/// The pattern is an exact string by default; prefix it with `regex` or
/// `parse` to register the other matcher kinds.
///
/// # Examples
/// ```
/// use cornichon::{StepInvocation, StepContext, StepKeyword, step};
///
/// fn noop(
///     _ctx: &mut StepContext<'_>,
///     _step: &StepInvocation<'_>,
/// ) -> Result<(), cornichon::DynStepError> {
///     Ok(())
/// }
///
/// step!(StepKeyword::Given, "a quiet afternoon", noop);
/// step!(StepKeyword::When, parse "I eat {count:u32} cucumbers", noop);
/// step!(StepKeyword::Then, regex r"(?P<left>\d+) remain", noop);
/// ```
#[macro_export]
macro_rules! step {
    ($keyword:expr, regex $pattern:expr, $handler:path $(,)?) => {
        $crate::submit! {
            $crate::StepDef {
                keyword: $keyword,
                kind: $crate::PatternKind::Regex,
                pattern: $pattern,
                run: $handler,
                file: file!(),
                line: line!(),
            }
        }
    };
    ($keyword:expr, parse $pattern:expr, $handler:path $(,)?) => {
        $crate::submit! {
            $crate::StepDef {
                keyword: $keyword,
                kind: $crate::PatternKind::Template,
                pattern: $pattern,
                run: $handler,
                file: file!(),
                line: line!(),
            }
        }
    };
    ($keyword:expr, $pattern:expr, $handler:path $(,)?) => {
        $crate::submit! {
            $crate::StepDef {
                keyword: $keyword,
                kind: $crate::PatternKind::Exact,
                pattern: $pattern,
                run: $handler,
                file: file!(),
                line: line!(),
            }
        }
    };
}

/// A step definition held by a [`StepRegistry`].
#[derive(Debug)]
pub struct RegisteredStep {
    /// Keyword the definition registers under.
    pub keyword: StepKeyword,
    /// The compiled pattern.
    pub pattern: StepPattern,
    /// Implementation invoked on a match.
    pub run: StepFn,
    /// Source location of the definition (`file:line`), when known.
    pub location: String,
}

/// A resolved step: the implementation plus its extracted arguments.
#[derive(Debug)]
pub struct Resolved<'r> {
    /// Implementation to invoke.
    pub run: StepFn,
    /// Converted named arguments.
    pub args: StepArgs,
    /// The winning pattern.
    pub pattern: &'r StepPattern,
    /// Source location of the winning definition.
    pub location: &'r str,
}

/// The set of step definitions a run resolves against.
///
/// The registry tracks which definitions have resolved at least once, so
/// dead definitions can be reported after a run.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<RegisteredStep>,
    used: Mutex<HashSet<usize>>,
}

impl StepRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every `step!`-submitted definition in the
    /// process.
    ///
    /// # Errors
    /// Returns [`PatternError`] when any submitted pattern does not
    /// compile, naming the definition's source location.
    pub fn from_inventory() -> Result<Self, PatternError> {
        let mut registry = Self::new();
        for def in iter::<StepDef> {
            registry.register_at(
                def.keyword,
                StepPattern::new(def.kind, def.pattern),
                def.run,
                format!("{}:{}", def.file, def.line),
            )?;
        }
        Ok(registry)
    }

    /// Register one step definition, compiling its pattern eagerly.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern does not compile.
    pub fn register(
        &mut self,
        keyword: StepKeyword,
        pattern: StepPattern,
        run: StepFn,
    ) -> Result<(), PatternError> {
        self.register_at(keyword, pattern, run, "<runtime>".to_string())
    }

    /// Register one step definition with an explicit source location.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern does not compile.
    pub fn register_at(
        &mut self,
        keyword: StepKeyword,
        pattern: StepPattern,
        run: StepFn,
        location: String,
    ) -> Result<(), PatternError> {
        pattern.compile()?;
        self.steps.push(RegisteredStep {
            keyword,
            pattern,
            run,
            location,
        });
        Ok(())
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the registry holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve a rendered step against the registry.
    ///
    /// Only definitions registered under the step's *effective* keyword are
    /// candidates, and a candidate must match the entire text.
    ///
    /// # Errors
    /// - [`ResolveError::NotFound`] when nothing matches.
    /// - [`ResolveError::Ambiguous`] when two or more definitions of the
    ///   winning kind tie on specificity.
    /// - [`ResolveError::Conversion`] when a captured value does not
    ///   convert to its hinted type.
    pub fn resolve(&self, keyword: StepKeyword, text: &str) -> Result<Resolved<'_>, ResolveError> {
        let matches: Vec<(usize, Vec<(String, String)>)> = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.keyword == keyword)
            .filter_map(|(index, step)| {
                step.pattern.match_text(text).map(|caps| (index, caps))
            })
            .collect();

        if matches.is_empty() {
            return Err(ResolveError::NotFound {
                keyword,
                text: text.to_string(),
            });
        }

        let (index, captures) = self.pick_winner(text, matches)?;
        let Some(step) = self.steps.get(index) else {
            return Err(ResolveError::NotFound {
                keyword,
                text: text.to_string(),
            });
        };
        self.mark_used(index);
        let args = self.convert_captures(step, captures)?;
        Ok(Resolved {
            run: step.run,
            args,
            pattern: &step.pattern,
            location: &step.location,
        })
    }

    /// Apply the kind-then-specificity precedence to the match set.
    fn pick_winner(
        &self,
        text: &str,
        matches: Vec<(usize, Vec<(String, String)>)>,
    ) -> Result<(usize, Vec<(String, String)>), ResolveError> {
        for kind in [PatternKind::Exact, PatternKind::Regex, PatternKind::Template] {
            let mut of_kind: Vec<(usize, Vec<(String, String)>)> = matches
                .iter()
                .filter(|(index, _)| {
                    self.steps
                        .get(*index)
                        .is_some_and(|s| s.pattern.kind() == kind)
                })
                .cloned()
                .collect();
            if of_kind.is_empty() {
                continue;
            }
            let best = of_kind
                .iter()
                .filter_map(|(index, _)| self.steps.get(*index))
                .map(|s| s.pattern.specificity())
                .max()
                .unwrap_or_default();
            of_kind.retain(|(index, _)| {
                self.steps
                    .get(*index)
                    .is_some_and(|s| s.pattern.specificity() == best)
            });
            if of_kind.len() > 1 {
                let contenders = of_kind
                    .iter()
                    .filter_map(|(index, _)| self.steps.get(*index))
                    .map(|s| format!("`{}` at {}", s.pattern.as_str(), s.location))
                    .collect();
                return Err(ResolveError::Ambiguous {
                    text: text.to_string(),
                    contenders,
                });
            }
            if let Some(winner) = of_kind.pop() {
                return Ok(winner);
            }
        }
        // Unreachable: the caller checked that `matches` is non-empty and
        // every match has one of the three kinds.
        Err(ResolveError::NotFound {
            keyword: StepKeyword::Given,
            text: text.to_string(),
        })
    }

    /// Convert raw captures into typed arguments per the pattern's hints.
    fn convert_captures(
        &self,
        step: &RegisteredStep,
        captures: Vec<(String, String)>,
    ) -> Result<StepArgs, ResolveError> {
        let mut entries: Vec<(String, ArgValue)> = Vec::with_capacity(captures.len());
        for (name, value) in captures {
            let hint = step
                .pattern
                .placeholders()
                .iter()
                .find(|spec| spec.name == name)
                .and_then(|spec| spec.hint.as_deref());
            let converted = convert_capture(&name, value, hint)?;
            entries.push((name, converted));
        }
        Ok(StepArgs::from_entries(entries))
    }

    fn mark_used(&self, index: usize) {
        self.used
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(index);
    }

    /// Definitions that never resolved during this registry's lifetime.
    #[must_use]
    pub fn unused_steps(&self) -> Vec<&RegisteredStep> {
        let used = self
            .used
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.steps
            .iter()
            .enumerate()
            .filter(|(index, _)| !used.contains(index))
            .map(|(_, step)| step)
            .collect()
    }

    /// Groups of definitions sharing a keyword and pattern.
    #[must_use]
    pub fn duplicate_steps(&self) -> Vec<Vec<&RegisteredStep>> {
        let mut groups: HashMap<(StepKeyword, PatternKind, &str), Vec<&RegisteredStep>> =
            HashMap::new();
        for step in &self.steps {
            groups
                .entry((step.keyword, step.pattern.kind(), step.pattern.as_str()))
                .or_default()
                .push(step);
        }
        groups.into_values().filter(|group| group.len() > 1).collect()
    }

    /// Serialise the registry to JSON for diagnostic tooling.
    ///
    /// Each entry records the keyword, pattern kind and text, source
    /// location, and whether the definition has resolved at least once.
    ///
    /// # Errors
    /// Returns an error when serialisation fails.
    #[cfg(feature = "diagnostics")]
    pub fn dump(&self) -> serde_json::Result<String> {
        let used = self
            .used
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let steps: Vec<serde_json::Value> = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                serde_json::json!({
                    "keyword": step.keyword.as_str(),
                    "kind": step.pattern.kind().as_str(),
                    "pattern": step.pattern.as_str(),
                    "location": step.location,
                    "used": used.contains(&index),
                })
            })
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({ "steps": steps }))
    }
}
