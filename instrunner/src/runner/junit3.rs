// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{NoTestsRemain, RunNotifier, Runner, statement::run_test_method};
use crate::{
    description::Description,
    filter::Filter,
    registry::{LoadedClass, MethodDef},
};
use std::{sync::Arc, time::Duration};

/// The prefix JUnit3 test method names start with.
pub const JUNIT3_TEST_PREFIX: &str = "test";

/// A JUnit3 test: a single `TestCase` method, or a suite of tests.
#[derive(Clone, Debug)]
pub enum JUnit3Test {
    /// One test method of a `TestCase` class.
    Case {
        /// The class the method belongs to.
        class: Arc<LoadedClass>,

        /// The test method.
        method: MethodDef,
    },

    /// A test that always fails, standing in for a class that produced no tests.
    Warning {
        /// The class that produced no tests.
        class_name: String,

        /// The failure message.
        message: String,
    },

    /// A group of tests.
    Suite {
        /// The suite's display name.
        name: String,

        /// The class the suite was built from, if any.
        class: Option<Arc<LoadedClass>>,

        /// The tests in the suite.
        tests: Vec<JUnit3Test>,
    },
}

impl JUnit3Test {
    /// Builds a suite from the `test*` methods of a `TestCase` class.
    ///
    /// A class with no test methods produces a suite with a single failing warning test.
    pub fn for_test_case(class: LoadedClass) -> Self {
        let class = Arc::new(class);
        let mut tests: Vec<_> = junit3_test_methods(&class)
            .map(|method| Self::Case {
                class: Arc::clone(&class),
                method: method.clone(),
            })
            .collect();
        if tests.is_empty() {
            tests.push(Self::Warning {
                class_name: class.name().to_owned(),
                message: format!("No tests found in {}", class.name()),
            });
        }
        Self::Suite {
            name: class.name().to_owned(),
            class: Some(class),
            tests,
        }
    }

    /// Returns the description of this test.
    pub fn description(&self) -> Description {
        match self {
            Self::Case { class, method } => Description::for_method(class, method),
            Self::Warning { class_name, .. } => Description::for_test(class_name, "warning", None),
            Self::Suite { name, class, tests } => {
                let mut description = match class {
                    Some(class) => Description::for_class(class),
                    None => Description::suite(name),
                };
                for test in tests {
                    description.add_child(test.description());
                }
                description
            }
        }
    }

    // Returns false if nothing is left.
    fn prune(&mut self, filter: &dyn Filter) -> bool {
        match self {
            Self::Suite { tests, .. } => {
                tests.retain_mut(|test| filter.should_run(&test.description()) && test.prune(filter));
                !tests.is_empty()
            }
            Self::Case { .. } | Self::Warning { .. } => filter.should_run(&self.description()),
        }
    }
}

/// Returns true if `class` has at least one JUnit3 test method.
pub fn has_junit3_test_methods(class: &LoadedClass) -> bool {
    junit3_test_methods(class).next().is_some()
}

fn junit3_test_methods(class: &LoadedClass) -> impl Iterator<Item = &MethodDef> + '_ {
    class
        .methods()
        .iter()
        .filter(|method| method.name().starts_with(JUNIT3_TEST_PREFIX))
}

/// Runs a JUnit3 test or suite.
///
/// In log-only mode each test is reported as started and finished without running its body.
#[derive(Clone, Debug)]
pub struct JUnit38ClassRunner {
    test: JUnit3Test,
    timeout: Option<Duration>,
    execute: bool,
}

impl JUnit38ClassRunner {
    /// Creates a runner that executes `test`.
    pub fn new(test: JUnit3Test, timeout: Option<Duration>) -> Self {
        Self {
            test,
            timeout,
            execute: true,
        }
    }

    /// Creates a runner that reports `test` without executing it.
    pub fn non_executing(test: JUnit3Test) -> Self {
        Self {
            test,
            timeout: None,
            execute: false,
        }
    }

    fn run_test(&self, test: &JUnit3Test, notifier: &mut RunNotifier) {
        match test {
            JUnit3Test::Suite { tests, .. } => {
                for test in tests {
                    self.run_test(test, notifier);
                }
            }
            JUnit3Test::Case { class, method } => {
                let description = Description::for_method(class, method);
                if self.execute {
                    run_test_method(notifier, &description, method, self.timeout);
                } else {
                    notifier.fire_test_started(&description);
                    notifier.fire_test_finished(&description);
                }
            }
            JUnit3Test::Warning { message, .. } => {
                let description = test.description();
                if self.execute {
                    notifier.fire_failing_test(&description, message);
                } else {
                    notifier.fire_test_started(&description);
                    notifier.fire_test_finished(&description);
                }
            }
        }
    }
}

impl Runner for JUnit38ClassRunner {
    fn description(&self) -> Description {
        self.test.description()
    }

    fn run(&self, notifier: &mut RunNotifier) {
        self.run_test(&self.test, notifier);
    }

    fn filter(&mut self, filter: &dyn Filter) -> Result<(), NoTestsRemain> {
        if self.test.prune(filter) {
            Ok(())
        } else {
            Err(NoTestsRemain)
        }
    }
}
