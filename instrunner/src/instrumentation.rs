// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running instrumentation arguments end to end.
//!
//! [`InstrumentationRunner`] takes parsed [`RunnerArgs`], builds a request from them and runs it
//! with the standard set of listeners, writing instrumentation status output as it goes.

use crate::{
    annotation::IGNORE,
    device::DeviceBuild,
    errors::TestRequestBuilderError,
    executor::{TestExecutor, TestExecutorBuilder},
    plugin::PluginRegistry,
    registry::TestRegistry,
    reporter::{
        DelayInjector, InstrumentationResultPrinter, LogRunListener, StatusWriter,
        SuiteAssignmentPrinter,
    },
    request::{Request, TestRequestBuilder},
    runner::{RunListener, RunResult},
    runner_args::RunnerArgs,
};
use instrunner_metadata::{TestListEntry, TestListSummary};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// The result code reported at the end of every instrumentation run.
pub const INSTRUMENTATION_RESULT_CODE: i32 = -1;

/// Builds and runs requests from instrumentation arguments.
#[derive(Debug)]
pub struct InstrumentationRunner<'a> {
    registry: &'a TestRegistry,
    plugins: &'a PluginRegistry,
    device: Arc<dyn DeviceBuild>,
    writer: StatusWriter,
    extra_listeners: Vec<Box<dyn RunListener>>,
}

impl<'a> InstrumentationRunner<'a> {
    /// Creates a runner over the classes in `registry`, writing status output to `writer`.
    pub fn new(
        registry: &'a TestRegistry,
        plugins: &'a PluginRegistry,
        device: Arc<dyn DeviceBuild>,
        writer: StatusWriter,
    ) -> Self {
        Self {
            registry,
            plugins,
            device,
            writer,
            extra_listeners: Vec::new(),
        }
    }

    /// Adds a listener to notify after the standard ones.
    pub fn add_run_listener(&mut self, listener: Box<dyn RunListener>) -> &mut Self {
        self.extra_listeners.push(listener);
        self
    }

    /// Builds the request described by `args`, without running it.
    pub fn build_request(&self, args: &RunnerArgs) -> Result<Request, TestRequestBuilderError> {
        let mut builder =
            TestRequestBuilder::new(self.registry, self.plugins, Arc::clone(&self.device));
        builder.add_from_runner_args(args);
        builder.build()
    }

    /// Lists the tests that `args` selects, in execution order.
    pub fn list_tests(
        &self,
        args: &RunnerArgs,
    ) -> Result<TestListSummary, TestRequestBuilderError> {
        let runner = self.build_request(args)?.into_runner();
        let description = runner.description();
        let tests = description
            .tests()
            .filter_map(|test| {
                let id = test.id()?;
                Some(TestListEntry {
                    id,
                    ignored: test.has_annotation(IGNORE),
                })
            })
            .collect();
        Ok(TestListSummary::new(tests))
    }

    /// Runs the tests that `args` selects.
    ///
    /// Always finishes by writing an `INSTRUMENTATION_RESULT` block. If the request can't be
    /// built, the block describes the error, and the error is returned.
    pub fn run(self, args: &RunnerArgs) -> Result<RunResult, TestRequestBuilderError> {
        if args.debug {
            info!("debug mode requested: no debugger to wait for, continuing");
        }
        if args.code_coverage {
            warn!("code coverage is not supported, ignoring");
        }

        let writer = self.writer.clone();
        let request = match self.build_request(args) {
            Ok(request) => request,
            Err(err) => {
                writer.send_result(
                    INSTRUMENTATION_RESULT_CODE,
                    &format!("Fatal exception when running tests\n{err}\n"),
                );
                return Err(err);
            }
        };

        let mut executor = TestExecutor::builder();
        self.add_listeners(&mut executor, args);
        let report = executor.build().execute(request);

        writer.send_result(INSTRUMENTATION_RESULT_CODE, &report.stream);
        Ok(report.result)
    }

    fn add_listeners(self, executor: &mut TestExecutorBuilder, args: &RunnerArgs) {
        let Self {
            writer,
            extra_listeners,
            ..
        } = self;

        if args.new_run_listener_mode {
            add_user_listeners(executor, args, extra_listeners);
            add_standard_listeners(executor, args, writer);
        } else {
            add_standard_listeners(executor, args, writer);
            add_user_listeners(executor, args, extra_listeners);
        }
    }
}

fn add_standard_listeners(
    executor: &mut TestExecutorBuilder,
    args: &RunnerArgs,
    writer: StatusWriter,
) {
    if args.suite_assignment {
        executor.add_run_listener(Box::new(SuiteAssignmentPrinter::new(writer)));
        return;
    }

    executor.add_run_listener(Box::new(LogRunListener::new()));
    executor.add_run_listener(Box::new(InstrumentationResultPrinter::new(writer)));
    if let Some(delay) = args.delay_in_millis.filter(|&delay| delay > 0) {
        debug!("delaying {delay}ms between tests");
        executor.add_run_listener(Box::new(DelayInjector::new(Duration::from_millis(delay))));
    }
}

fn add_user_listeners(
    executor: &mut TestExecutorBuilder,
    args: &RunnerArgs,
    extra_listeners: Vec<Box<dyn RunListener>>,
) {
    for class in &args.listeners {
        debug!("adding listener {}", class.name());
        executor.add_run_listener(class.instantiate());
    }
    for listener in extra_listeners {
        executor.add_run_listener(listener);
    }
}
