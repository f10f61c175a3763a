// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running a [`Request`] and reporting to listeners.

use crate::{
    request::Request,
    runner::{RunListener, RunNotifier, RunResult},
};
use tracing::debug;

/// Runs a fully-resolved [`Request`], notifying each listener of every event.
///
/// No selection happens here: the request's filter has already decided which tests run.
#[derive(Debug)]
pub struct TestExecutor {
    listeners: Vec<Box<dyn RunListener>>,
}

impl TestExecutor {
    /// Returns a builder for a new executor.
    pub fn builder() -> TestExecutorBuilder {
        TestExecutorBuilder::default()
    }

    /// Runs the request.
    ///
    /// Returns the aggregate result along with the final output contributed by each listener.
    pub fn execute(self, request: Request) -> ExecutionReport {
        let mut notifier = RunNotifier::new();
        for listener in self.listeners {
            notifier.add_listener(listener);
        }

        let runner = request.into_runner();
        let description = runner.description();
        debug!("running {} tests", description.test_count());

        notifier.fire_test_run_started(&description);
        runner.run(&mut notifier);
        let result = notifier.fire_test_run_finished();
        let stream = notifier.instrumentation_run_finished(&result);

        ExecutionReport { result, stream }
    }
}

/// Builds a [`TestExecutor`].
#[derive(Debug, Default)]
pub struct TestExecutorBuilder {
    listeners: Vec<Box<dyn RunListener>>,
}

impl TestExecutorBuilder {
    /// Adds a listener. Listeners are notified in the order they were added.
    pub fn add_run_listener(&mut self, listener: Box<dyn RunListener>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    /// Builds the executor.
    pub fn build(self) -> TestExecutor {
        TestExecutor {
            listeners: self.listeners,
        }
    }
}

/// The outcome of [`TestExecutor::execute`].
#[derive(Clone, Debug)]
pub struct ExecutionReport {
    /// The aggregate result.
    pub result: RunResult,

    /// The final output, such as a run summary, contributed by listeners.
    pub stream: String,
}
