// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Choosing a runner for each test class.
//!
//! [`AndroidRunnerBuilder`] applies a fixed sequence of rules to a class, first match wins:
//!
//! 1. Custom [`RunnerBuilder`]s, in the order they were added.
//! 2. Classes annotated with `@Ignore` are reported as ignored.
//! 3. `@RunWith`: a suite, the JUnit4 runner, or a custom runner plugin.
//! 4. A JUnit3 static `suite()` method, unless suite methods are ignored.
//! 5. A JUnit3 `TestCase` class.
//! 6. A JUnit4 class with `@Test` methods.
//!
//! Classes that match none of these are skipped while scanning, and reported as failing
//! otherwise.

use crate::{
    annotation::IGNORE,
    description::Description,
    errors::InitializationError,
    plugin::PluginRegistry,
    registry::{ClassShape, LoadedClass, RunWith, SuiteSource, TestRegistry},
    runner::{
        ErrorReportingRunner, IgnoredClassRunner, JUnit3Test, JUnit4ClassRunner,
        JUnit38ClassRunner, NonExecutingRunner, Runner, SuiteRunner, has_junit3_test_methods,
    },
};
use std::{fmt, time::Duration};
use tracing::debug;

/// Chooses a runner for a class, or declines so that later rules can.
///
/// Implemented by runner builder plugins.
pub trait RunnerBuilder: fmt::Debug {
    /// Returns a runner for `class`, or `None` to defer.
    fn runner_for_class(&self, class: &LoadedClass) -> Option<Box<dyn Runner>>;
}

/// Parameters that affect how runners are built.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunnerParams {
    per_test_timeout: Option<Duration>,
    ignore_suite_methods: bool,
}

impl RunnerParams {
    /// Creates the default parameters: no timeout, and suite methods are honored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-test timeout.
    pub fn with_per_test_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.per_test_timeout = timeout;
        self
    }

    /// Sets whether JUnit3 `suite()` methods are ignored.
    pub fn with_ignore_suite_methods(mut self, ignore: bool) -> Self {
        self.ignore_suite_methods = ignore;
        self
    }

    /// Returns the per-test timeout.
    pub fn per_test_timeout(&self) -> Option<Duration> {
        self.per_test_timeout
    }

    /// Returns true if JUnit3 `suite()` methods are ignored.
    pub fn ignore_suite_methods(&self) -> bool {
        self.ignore_suite_methods
    }
}

/// The standard set of rules for building runners.
#[derive(Debug)]
pub struct AndroidRunnerBuilder<'a> {
    registry: &'a TestRegistry,
    plugins: &'a PluginRegistry,
    custom_builders: Vec<Box<dyn RunnerBuilder>>,
    params: RunnerParams,
    skip_execution: bool,
    scanning: bool,
}

impl<'a> AndroidRunnerBuilder<'a> {
    /// Creates a new builder.
    ///
    /// While `scanning`, classes that aren't tests are skipped rather than reported as failing.
    pub fn new(
        registry: &'a TestRegistry,
        plugins: &'a PluginRegistry,
        params: RunnerParams,
        scanning: bool,
    ) -> Self {
        Self {
            registry,
            plugins,
            custom_builders: Vec::new(),
            params,
            skip_execution: false,
            scanning,
        }
    }

    /// Adds custom runner builders, consulted before the built-in rules.
    pub fn with_custom_builders(
        mut self,
        builders: impl IntoIterator<Item = Box<dyn RunnerBuilder>>,
    ) -> Self {
        self.custom_builders.extend(builders);
        self
    }

    /// Builds runners that report tests without executing them.
    pub fn with_skip_execution(mut self, skip_execution: bool) -> Self {
        self.skip_execution = skip_execution;
        self
    }

    /// Returns true if this builder is building runners for a class path scan.
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Returns the registry classes are loaded from.
    pub fn registry(&self) -> &'a TestRegistry {
        self.registry
    }

    /// Returns a runner for `class`, or `None` if it should be skipped.
    pub fn runner_for_class(&self, class: &LoadedClass) -> Option<Box<dyn Runner>> {
        self.runner_for_class_in(class, &mut Vec::new())
    }

    // `parents` holds the suite classes currently being built, outermost first.
    fn runner_for_class_in(
        &self,
        class: &LoadedClass,
        parents: &mut Vec<String>,
    ) -> Option<Box<dyn Runner>> {
        for builder in &self.custom_builders {
            if let Some(runner) = builder.runner_for_class(class) {
                debug!("custom runner builder {builder:?} chose a runner for {}", class.name());
                return Some(self.maybe_non_executing(runner));
            }
        }

        if class.annotations().contains(IGNORE) {
            return Some(Box::new(IgnoredClassRunner::new(class.clone())));
        }

        if let ClassShape::RunWith(run_with) = class.shape() {
            return self.run_with_runner(class, run_with, parents);
        }

        if !self.params.ignore_suite_methods
            && !self.scanning
            && let Some(source) = class.suite_method()
        {
            return Some(self.suite_method_runner(class, source));
        }

        match class.shape() {
            ClassShape::TestCase => {
                if self.scanning && !has_junit3_test_methods(class) {
                    debug!("skipping {}: no JUnit3 test methods", class.name());
                    return None;
                }
                Some(self.junit3_runner(JUnit3Test::for_test_case(class.clone())))
            }
            ClassShape::Plain | ClassShape::RunWith(_) => {
                match JUnit4ClassRunner::new(class.clone(), self.params.per_test_timeout) {
                    Ok(runner) => Some(self.maybe_non_executing(Box::new(runner))),
                    Err(_) if self.scanning => {
                        debug!("skipping {}: no test methods", class.name());
                        None
                    }
                    Err(err) => Some(error_runner(class, &err)),
                }
            }
        }
    }

    fn run_with_runner(
        &self,
        class: &LoadedClass,
        run_with: &RunWith,
        parents: &mut Vec<String>,
    ) -> Option<Box<dyn Runner>> {
        match run_with {
            RunWith::Suite(suite_classes) => self.suite_runner(class, suite_classes, parents),
            RunWith::JUnit4 | RunWith::AndroidJUnit4 => {
                match JUnit4ClassRunner::new(class.clone(), self.params.per_test_timeout) {
                    Ok(runner) => Some(self.maybe_non_executing(Box::new(runner))),
                    Err(err) => Some(error_runner(class, &err)),
                }
            }
            RunWith::Custom(runner_name) => match self.plugins.load_runner(runner_name) {
                Ok(factory) => Some(self.maybe_non_executing(factory(class))),
                Err(err) => Some(error_runner(class, &err)),
            },
        }
    }

    fn suite_runner(
        &self,
        class: &LoadedClass,
        suite_classes: &[String],
        parents: &mut Vec<String>,
    ) -> Option<Box<dyn Runner>> {
        if parents.iter().any(|parent| parent == class.name()) {
            return Some(error_runner(
                class,
                &format!(
                    "class '{}' (possibly indirectly) contains itself as a SuiteClass",
                    class.name()
                ),
            ));
        }

        parents.push(class.name().to_owned());
        let children: Vec<_> = suite_classes
            .iter()
            .filter_map(|name| match self.registry.load(name) {
                Ok(child) => self.runner_for_class_in(&child, parents),
                Err(err) => Some(
                    Box::new(ErrorReportingRunner::new(name, None, err.to_string()))
                        as Box<dyn Runner>,
                ),
            })
            .collect();
        parents.pop();

        if children.is_empty() && self.scanning {
            return None;
        }
        Some(Box::new(SuiteRunner::new(
            Description::for_class(class),
            children,
        )))
    }

    fn suite_method_runner(&self, class: &LoadedClass, source: &SuiteSource) -> Box<dyn Runner> {
        match source {
            SuiteSource::Suite(test_classes) => {
                let tests = test_classes
                    .iter()
                    .map(|name| match self.registry.load(name) {
                        Ok(test_class) => JUnit3Test::for_test_case(test_class),
                        Err(err) => JUnit3Test::Warning {
                            class_name: name.clone(),
                            message: err.to_string(),
                        },
                    })
                    .collect();
                self.junit3_runner(JUnit3Test::Suite {
                    name: class.name().to_owned(),
                    class: None,
                    tests,
                })
            }
            // Only a `TestSuite` can be broken down into tests.
            SuiteSource::Direct(_) => error_runner(
                class,
                &InitializationError::new(format!(
                    "{}#suite() did not return a TestSuite",
                    class.name()
                )),
            ),
        }
    }

    fn junit3_runner(&self, test: JUnit3Test) -> Box<dyn Runner> {
        if self.skip_execution {
            Box::new(JUnit38ClassRunner::non_executing(test))
        } else {
            Box::new(JUnit38ClassRunner::new(test, self.params.per_test_timeout))
        }
    }

    fn maybe_non_executing(&self, runner: Box<dyn Runner>) -> Box<dyn Runner> {
        if self.skip_execution {
            Box::new(NonExecutingRunner::new(runner))
        } else {
            runner
        }
    }
}

fn error_runner(class: &LoadedClass, message: &dyn fmt::Display) -> Box<dyn Runner> {
    Box::new(ErrorReportingRunner::new(
        class.name(),
        Some(class.annotations().clone()),
        message.to_string(),
    ))
}
