//! Ambient context supplied by the host runner.
//!
//! A [`StepContext`] resolves names to fixture references for step
//! implementation arguments not bound by pattern matching, and carries
//! side-effecting state across the Given/When/Then sequence of one scenario
//! instance. Contexts are never shared between instances.

use std::any::{Any, TypeId};

use hashbrown::HashMap;

/// Name-and-type keyed access to the runner's fixtures.
#[derive(Default)]
pub struct StepContext<'a> {
    fixtures: HashMap<&'static str, (&'a dyn Any, TypeId)>,
    values: HashMap<&'static str, Box<dyn Any>>,
}

impl<'a> StepContext<'a> {
    /// Insert a fixture reference under `name`.
    ///
    /// # Examples
    /// ```
    /// use cornichon::StepContext;
    ///
    /// let count = 42u32;
    /// let mut ctx = StepContext::default();
    /// ctx.insert("count", &count);
    /// assert_eq!(ctx.get::<u32>("count"), Some(&42));
    /// ```
    pub fn insert<T: Any>(&mut self, name: &'static str, value: &'a T) {
        self.fixtures.insert(name, (value, TypeId::of::<T>()));
    }

    /// Resolve `name` to a reference of type `T`.
    ///
    /// Values stored by earlier steps shadow fixtures of the same name, so
    /// a step's output can feed later assertions without a dedicated
    /// fixture.
    #[must_use]
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        if let Some(value) = self.values.get(name) {
            return value.downcast_ref::<T>();
        }
        self.fixtures
            .get(name)
            .and_then(|(value, _)| value.downcast_ref::<T>())
    }

    /// Whether `name` resolves to anything.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name) || self.fixtures.contains_key(name)
    }

    /// Store a value produced by a step.
    ///
    /// The value shadows a fixture only when exactly one fixture shares its
    /// type; otherwise it is dropped to avoid guessing. Last write wins.
    pub fn provide(&mut self, value: Box<dyn Any>) {
        let type_id = value.as_ref().type_id();
        let mut matching = self
            .fixtures
            .iter()
            .filter(|&(_, &(_, fixture_type))| fixture_type == type_id)
            .map(|(&name, _)| name);
        if let (Some(name), None) = (matching.next(), matching.next()) {
            self.values.insert(name, value);
        }
    }

    /// Names of every resolvable fixture.
    pub fn available(&self) -> impl Iterator<Item = &'static str> {
        self.fixtures.keys().copied()
    }
}
