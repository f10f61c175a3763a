// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{NoTestsRemain, RunNotifier, Runner, statement::run_test_method};
use crate::{
    annotation::{IGNORE, TEST},
    description::Description,
    errors::InitializationError,
    filter::Filter,
    registry::{LoadedClass, MethodDef},
};
use std::time::Duration;

/// Message reported for a JUnit4 class with no `@Test` methods.
pub const NO_RUNNABLE_METHODS: &str = "No runnable methods";

/// Runs the `@Test` methods of a JUnit4-style class.
///
/// Methods annotated with `@Ignore` are reported as ignored.
#[derive(Clone, Debug)]
pub struct JUnit4ClassRunner {
    class: LoadedClass,
    methods: Vec<MethodDef>,
    timeout: Option<Duration>,
}

impl JUnit4ClassRunner {
    /// Creates a runner for `class`, failing if it has no `@Test` methods.
    ///
    /// With a timeout, each test body runs on a helper thread and fails if it takes longer.
    pub fn new(
        class: LoadedClass,
        timeout: Option<Duration>,
    ) -> Result<Self, InitializationError> {
        let methods: Vec<_> = class
            .methods()
            .iter()
            .filter(|method| method.annotations().contains(TEST))
            .cloned()
            .collect();
        if methods.is_empty() {
            return Err(InitializationError::new(NO_RUNNABLE_METHODS));
        }
        Ok(Self {
            class,
            methods,
            timeout,
        })
    }

    /// Returns the class this runner runs.
    pub fn class(&self) -> &LoadedClass {
        &self.class
    }
}

impl Runner for JUnit4ClassRunner {
    fn description(&self) -> Description {
        let mut description = Description::for_class(&self.class);
        for method in &self.methods {
            description.add_child(Description::for_method(&self.class, method));
        }
        description
    }

    fn run(&self, notifier: &mut RunNotifier) {
        for method in &self.methods {
            let description = Description::for_method(&self.class, method);
            if method.annotations().contains(IGNORE) {
                notifier.fire_test_ignored(&description);
            } else {
                run_test_method(notifier, &description, method, self.timeout);
            }
        }
    }

    fn filter(&mut self, filter: &dyn Filter) -> Result<(), NoTestsRemain> {
        let class = &self.class;
        self.methods
            .retain(|method| filter.should_run(&Description::for_method(class, method)));
        if self.methods.is_empty() {
            Err(NoTestsRemain)
        } else {
            Ok(())
        }
    }
}
