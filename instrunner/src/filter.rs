// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filters that prune a runner tree before execution.
//!
//! Every filter is a predicate over [`Description`]s. A request carries a single [`AllOfFilter`]
//! composed from every configured criterion: a test runs only if all of them accept it.

mod annotation;
mod class_method;
mod device;
mod sharding;
mod size;
mod tests_regex;

pub use annotation::*;
pub use class_method::*;
pub use device::*;
pub use sharding::*;
pub use size::*;
pub use tests_regex::*;

use crate::description::Description;
use itertools::Itertools;
use std::{fmt, sync::Arc};

/// A predicate deciding which tests run.
pub trait Filter: fmt::Debug {
    /// Returns true if the described test, or any test within the described suite, should run.
    ///
    /// The default implementation evaluates tests with [`Self::evaluate_test`] and keeps a suite
    /// if any of its children should run.
    fn should_run(&self, description: &Description) -> bool {
        if description.is_test() {
            return self.evaluate_test(description);
        }
        description
            .children()
            .iter()
            .any(|child| self.should_run(child))
    }

    /// Returns true if a single test should run.
    fn evaluate_test(&self, description: &Description) -> bool;

    /// Returns a human-readable description of this filter.
    fn describe(&self) -> String;
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn should_run(&self, description: &Description) -> bool {
        (**self).should_run(description)
    }

    fn evaluate_test(&self, description: &Description) -> bool {
        (**self).evaluate_test(description)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<F: Filter + ?Sized> Filter for Arc<F> {
    fn should_run(&self, description: &Description) -> bool {
        (**self).should_run(description)
    }

    fn evaluate_test(&self, description: &Description) -> bool {
        (**self).evaluate_test(description)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Accepts a description only if every contained filter does.
#[derive(Debug, Default)]
pub struct AllOfFilter {
    filters: Vec<Box<dyn Filter>>,
}

impl AllOfFilter {
    /// Creates an empty filter, which accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Returns the number of contained filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if there are no contained filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for AllOfFilter {
    // Each filter decides on suites by its own rules, so evaluate them one by one on the whole
    // description.
    fn should_run(&self, description: &Description) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.should_run(description))
    }

    fn evaluate_test(&self, description: &Description) -> bool {
        self.should_run(description)
    }

    fn describe(&self) -> String {
        if self.filters.is_empty() {
            return "all tests".to_owned();
        }
        self.filters.iter().map(|filter| filter.describe()).join(" and ")
    }
}
