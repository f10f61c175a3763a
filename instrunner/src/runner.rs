// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runners, and the notifications they produce.
//!
//! A [`Runner`] owns a tree of tests. Running it reports start, finish, failure and ignore
//! events through a [`RunNotifier`] to every registered [`RunListener`].

mod blank;
mod error_reporting;
mod ignored;
mod junit3;
mod junit4;
mod non_executing;
mod statement;
mod suite;

pub use blank::*;
pub use error_reporting::*;
pub use ignored::*;
pub use junit3::*;
pub use junit4::*;
pub use non_executing::*;
pub use suite::*;

use crate::{description::Description, filter::Filter};
use std::{
    fmt,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::debug;

/// An executable tree of tests.
pub trait Runner: fmt::Debug {
    /// Returns the description of every test this runner will run.
    fn description(&self) -> Description;

    /// Runs the tests, reporting through `notifier`.
    fn run(&self, notifier: &mut RunNotifier);

    /// Removes every test `filter` rejects.
    ///
    /// Returns [`NoTestsRemain`] if nothing is left. Runners that can't be pruned keep
    /// everything; their parent decides whether to keep them as a whole.
    fn filter(&mut self, _filter: &dyn Filter) -> Result<(), NoTestsRemain> {
        Ok(())
    }
}

/// Returned by [`Runner::filter`] when a filter rejects every test.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("no tests remain after filtering")]
pub struct NoTestsRemain;

/// Applies `filter` to `runner`.
///
/// A runner the filter rejects as a whole is reported as empty without being pruned.
pub fn apply_filter(runner: &mut dyn Runner, filter: &dyn Filter) -> Result<(), NoTestsRemain> {
    if !filter.should_run(&runner.description()) {
        return Err(NoTestsRemain);
    }
    runner.filter(filter)
}

/// A failed test, or a test whose assumptions were violated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    description: Description,
    message: String,
}

impl Failure {
    /// Creates a new failure.
    pub fn new(description: Description, message: impl Into<String>) -> Self {
        Self {
            description,
            message: message.into(),
        }
    }

    /// Returns the test that failed.
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.message)
    }
}

/// Aggregate results of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunResult {
    /// The number of tests that finished.
    pub run_count: usize,

    /// The failures, in the order they were reported.
    pub failures: Vec<Failure>,

    /// The number of ignored tests.
    pub ignore_count: usize,

    /// The number of tests whose assumptions were violated.
    pub assumption_failure_count: usize,

    /// The wall-clock time of the run.
    pub run_time: Duration,
}

impl RunResult {
    /// Returns the number of failed tests.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if no tests failed. A run with no tests is successful.
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Receives events from a run.
///
/// All methods have empty default implementations.
pub trait RunListener: fmt::Debug {
    /// Called before any test runs.
    fn test_run_started(&mut self, _description: &Description) {}

    /// Called after every test has finished.
    fn test_run_finished(&mut self, _result: &RunResult) {}

    /// Called when a test starts.
    fn test_started(&mut self, _description: &Description) {}

    /// Called when a test finishes, whether it passed or not.
    fn test_finished(&mut self, _description: &Description) {}

    /// Called when a test fails.
    fn test_failure(&mut self, _failure: &Failure) {}

    /// Called when a test's assumptions are violated.
    fn test_assumption_failure(&mut self, _failure: &Failure) {}

    /// Called when a test is ignored. Ignored tests are not started or finished.
    fn test_ignored(&mut self, _description: &Description) {}

    /// Appends this listener's contribution to the final instrumentation output.
    fn instrumentation_run_finished(&mut self, _out: &mut String, _result: &RunResult) {}
}

/// Dispatches run events to listeners, and tallies the [`RunResult`].
#[derive(Debug, Default)]
pub struct RunNotifier {
    listeners: Vec<Box<dyn RunListener>>,
    result: RunResult,
    start: Option<Instant>,
}

impl RunNotifier {
    /// Creates a notifier with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Listeners are notified in the order they were added.
    pub fn add_listener(&mut self, listener: Box<dyn RunListener>) {
        debug!("adding run listener {listener:?}");
        self.listeners.push(listener);
    }

    /// Returns the results so far.
    pub fn result(&self) -> &RunResult {
        &self.result
    }

    /// Returns the listeners.
    pub fn listeners_mut(&mut self) -> &mut [Box<dyn RunListener>] {
        &mut self.listeners
    }

    /// Reports that the run is starting.
    pub fn fire_test_run_started(&mut self, description: &Description) {
        self.start = Some(Instant::now());
        for listener in &mut self.listeners {
            listener.test_run_started(description);
        }
    }

    /// Reports that the run has finished, and returns the final result.
    pub fn fire_test_run_finished(&mut self) -> RunResult {
        if let Some(start) = self.start.take() {
            self.result.run_time = start.elapsed();
        }
        for listener in &mut self.listeners {
            listener.test_run_finished(&self.result);
        }
        self.result.clone()
    }

    /// Reports that a test is starting.
    pub fn fire_test_started(&mut self, description: &Description) {
        for listener in &mut self.listeners {
            listener.test_started(description);
        }
    }

    /// Reports that a test has finished.
    pub fn fire_test_finished(&mut self, description: &Description) {
        self.result.run_count += 1;
        for listener in &mut self.listeners {
            listener.test_finished(description);
        }
    }

    /// Reports that a test has failed.
    pub fn fire_test_failure(&mut self, failure: Failure) {
        for listener in &mut self.listeners {
            listener.test_failure(&failure);
        }
        self.result.failures.push(failure);
    }

    /// Reports that a test's assumptions were violated.
    pub fn fire_test_assumption_failure(&mut self, failure: Failure) {
        self.result.assumption_failure_count += 1;
        for listener in &mut self.listeners {
            listener.test_assumption_failure(&failure);
        }
    }

    /// Reports that a test was ignored.
    pub fn fire_test_ignored(&mut self, description: &Description) {
        self.result.ignore_count += 1;
        for listener in &mut self.listeners {
            listener.test_ignored(description);
        }
    }

    /// Collects every listener's contribution to the final instrumentation output.
    pub fn instrumentation_run_finished(&mut self, result: &RunResult) -> String {
        let mut out = String::new();
        for listener in &mut self.listeners {
            listener.instrumentation_run_finished(&mut out, result);
        }
        out
    }

    /// Reports a test that fails with `message` without running anything.
    pub fn fire_failing_test(&mut self, description: &Description, message: &str) {
        self.fire_test_started(description);
        self.fire_test_failure(Failure::new(description.clone(), message));
        self.fire_test_finished(description);
    }
}

#[cfg(test)]
pub(crate) mod test_listener {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A single event recorded by [`RecordingListener`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub(crate) enum Event {
        RunStarted(usize),
        Started(String),
        Finished(String),
        Failure(String, String),
        AssumptionFailure(String),
        Ignored(String),
        RunFinished(usize),
    }

    /// Records events into a shared log.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct RecordingListener {
        pub(crate) events: Arc<Mutex<Vec<Event>>>,
    }

    impl RecordingListener {
        pub(crate) fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RunListener for RecordingListener {
        fn test_run_started(&mut self, description: &Description) {
            self.push(Event::RunStarted(description.test_count()));
        }

        fn test_run_finished(&mut self, result: &RunResult) {
            self.push(Event::RunFinished(result.run_count));
        }

        fn test_started(&mut self, description: &Description) {
            self.push(Event::Started(description.display_name().to_owned()));
        }

        fn test_finished(&mut self, description: &Description) {
            self.push(Event::Finished(description.display_name().to_owned()));
        }

        fn test_failure(&mut self, failure: &Failure) {
            self.push(Event::Failure(
                failure.description().display_name().to_owned(),
                failure.message().to_owned(),
            ));
        }

        fn test_assumption_failure(&mut self, failure: &Failure) {
            self.push(Event::AssumptionFailure(
                failure.description().display_name().to_owned(),
            ));
        }

        fn test_ignored(&mut self, description: &Description) {
            self.push(Event::Ignored(description.display_name().to_owned()));
        }
    }
}
