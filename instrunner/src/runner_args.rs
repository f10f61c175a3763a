// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instrumentation arguments, parsed.
//!
//! Arguments arrive as a flat [`Bundle`] of strings. [`RunnerArgsBuilder`] parses them into a
//! [`RunnerArgs`], which is immutable once built.
//!
//! Default arguments can be provided in a TOML file:
//!
//! ```toml
//! [instrumentation.args]
//! package = "com.example.tests"
//! numShards = 4
//! log = false
//! ```
//!
//! Arguments from a bundle applied later override scalar values and add to list values.

use crate::{
    bundle::Bundle,
    errors::RunnerArgsError,
    filter::Filter,
    plugin::{PluginRegistry, RunListenerClass, RunnerBuilderClass},
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use instrunner_metadata::TestIdentifier;
use serde::Deserialize;
use std::{fs, io, sync::Arc};
use tracing::debug;

/// Classes or methods to run: `a.FooTest,a.BarTest#testOne`.
pub const ARGUMENT_TEST_CLASS: &str = "class";
/// Paths to scan for test classes, separated by `:`.
pub const ARGUMENT_CLASSPATH_TO_SCAN: &str = "classpathToScan";
/// Classes or methods to skip.
pub const ARGUMENT_NOT_TEST_CLASS: &str = "notClass";
/// The test size to run: `small`, `medium` or `large`.
pub const ARGUMENT_TEST_SIZE: &str = "size";
/// Report tests without running them.
pub const ARGUMENT_LOG_ONLY: &str = "log";
/// Annotations that tests must carry, at least one of.
pub const ARGUMENT_ANNOTATION: &str = "annotation";
/// Annotations that exclude tests.
pub const ARGUMENT_NOT_ANNOTATION: &str = "notAnnotation";
/// The number of shards.
pub const ARGUMENT_NUM_SHARDS: &str = "numShards";
/// The shard to run, counting from 0.
pub const ARGUMENT_SHARD_INDEX: &str = "shardIndex";
/// Milliseconds to wait between tests.
pub const ARGUMENT_DELAY_IN_MILLIS: &str = "delay_msec";
/// Collect code coverage.
pub const ARGUMENT_COVERAGE: &str = "coverage";
/// Where to write code coverage.
pub const ARGUMENT_COVERAGE_PATH: &str = "coverageFile";
/// Report the size bucket each test belongs to, without applying other filters.
pub const ARGUMENT_SUITE_ASSIGNMENT: &str = "suiteAssignment";
/// Wait for a debugger.
pub const ARGUMENT_DEBUG: &str = "debug";
/// Run listener plugins.
pub const ARGUMENT_LISTENER: &str = "listener";
/// Filter plugins.
pub const ARGUMENT_FILTER: &str = "filter";
/// Runner builder plugins.
pub const ARGUMENT_RUNNER_BUILDER: &str = "runnerBuilder";
/// Packages to run.
pub const ARGUMENT_TEST_PACKAGE: &str = "package";
/// Packages to skip.
pub const ARGUMENT_NOT_TEST_PACKAGE: &str = "notPackage";
/// Per-test timeout in milliseconds.
pub const ARGUMENT_TIMEOUT: &str = "timeout_msec";
/// A file listing classes, methods and packages to run.
pub const ARGUMENT_TEST_FILE: &str = "testFile";
/// A file listing classes, methods and packages to skip.
pub const ARGUMENT_NOT_TEST_FILE: &str = "notTestFile";
/// Disable usage analytics.
pub const ARGUMENT_DISABLE_ANALYTICS: &str = "disableAnalytics";
/// A method to invoke before running tests.
pub const ARGUMENT_REMOTE_INIT_METHOD: &str = "remoteMethod";
/// The process the tests target.
pub const ARGUMENT_TARGET_PROCESS: &str = "targetProcess";
/// The orchestrator service to connect to.
pub const ARGUMENT_ORCHESTRATOR_SERVICE: &str = "orchestratorService";
/// List tests for the orchestrator rather than running them.
pub const ARGUMENT_LIST_TESTS_FOR_ORCHESTRATOR: &str = "listTestsForOrchestrator";
/// The test discovery service to report to.
pub const ARGUMENT_ORCHESTRATOR_DISCOVERY_SERVICE: &str = "testDiscoveryService";
/// The test run events service to report to.
pub const ARGUMENT_ORCHESTRATOR_RUN_EVENTS_SERVICE: &str = "testRunEventsService";
/// The key for the shell execution binder.
pub const ARGUMENT_SHELL_EXEC_BINDER_KEY: &str = "shellExecBinderKey";
/// Notify user listeners before the built-in ones.
pub const ARGUMENT_RUN_LISTENER_NEW_ORDER: &str = "newRunListenerMode";
/// A regex that `Class#method` names must match.
pub const ARGUMENT_TESTS_REGEX: &str = "tests_regex";

const CLASS_SEPARATOR: char = ',';
const CLASSPATH_SEPARATOR: char = ':';

/// Parsed instrumentation arguments.
///
/// Numeric values that weren't provided are `None`.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct RunnerArgs {
    /// Wait for a debugger before running.
    pub debug: bool,
    /// Report the size bucket of each test.
    pub suite_assignment: bool,
    /// Collect code coverage.
    pub code_coverage: bool,
    /// Where to write code coverage.
    pub code_coverage_path: Option<String>,
    /// Milliseconds to wait between tests.
    pub delay_in_millis: Option<u64>,
    /// Report tests without running them.
    pub log_only: bool,
    /// Packages to run.
    pub test_packages: Vec<String>,
    /// Packages to skip.
    pub not_test_packages: Vec<String>,
    /// The test size to run.
    pub test_size: Option<String>,
    /// Annotations that tests must carry, at least one of.
    pub annotations: Vec<String>,
    /// Annotations that exclude tests.
    pub not_annotations: Vec<String>,
    /// Per-test timeout in milliseconds.
    pub test_timeout: Option<u64>,
    /// Run listener plugins.
    pub listeners: Vec<RunListenerClass>,
    /// Filter plugins, instantiated.
    pub filters: Vec<Arc<dyn Filter>>,
    /// Runner builder plugins. These are instantiated when the request is built.
    pub runner_builder_classes: Vec<RunnerBuilderClass>,
    /// Classes and methods to run, in the order given.
    pub tests: Vec<TestIdentifier>,
    /// Classes and methods to skip, in the order given.
    pub not_tests: Vec<TestIdentifier>,
    /// The number of shards.
    pub num_shards: Option<u64>,
    /// The shard to run.
    pub shard_index: Option<u64>,
    /// Disable usage analytics.
    pub disable_analytics: bool,
    /// Paths to scan for test classes.
    pub classpath_to_scan: IndexSet<Utf8PathBuf>,
    /// A method to invoke before running tests.
    pub remote_method: Option<TestIdentifier>,
    /// The orchestrator service to connect to.
    pub orchestrator_service: Option<String>,
    /// List tests for the orchestrator rather than running them.
    pub list_tests_for_orchestrator: bool,
    /// The test discovery service to report to.
    pub test_discovery_service: Option<String>,
    /// The test run events service to report to.
    pub test_run_events_service: Option<String>,
    /// The process the tests target.
    pub target_process: Option<String>,
    /// The key for the shell execution binder.
    pub shell_exec_binder_key: Option<String>,
    /// Notify user listeners before the built-in ones.
    pub new_run_listener_mode: bool,
    /// A regex that `Class#method` names must match.
    pub tests_regex: Option<String>,
}

/// Builds [`RunnerArgs`] from one or more argument sources.
#[derive(Clone, Debug, Default)]
pub struct RunnerArgsBuilder {
    args: RunnerArgs,
}

impl RunnerArgsBuilder {
    /// Creates a builder with no arguments set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies default arguments from the `[instrumentation.args]` table of a TOML file.
    pub fn with_args_file(
        self,
        plugins: &PluginRegistry,
        path: &Utf8Path,
    ) -> Result<Self, RunnerArgsError> {
        let contents = fs::read_to_string(path).map_err(|err| RunnerArgsError::ArgsFileRead {
            path: path.to_owned(),
            err,
        })?;
        let file: ArgsFile =
            toml::from_str(&contents).map_err(|err| RunnerArgsError::ArgsFileParse {
                path: path.to_owned(),
                err: Box::new(err),
            })?;

        let mut bundle = Bundle::new();
        for (key, value) in file.instrumentation.args {
            let value = match value {
                toml::Value::String(value) => value,
                toml::Value::Integer(value) => value.to_string(),
                toml::Value::Boolean(value) => value.to_string(),
                _ => {
                    return Err(RunnerArgsError::ArgsFileValue {
                        path: path.to_owned(),
                        key,
                    });
                }
            };
            bundle.insert(key, value);
        }
        debug!("read {} instrumentation args from {path}", bundle.len());
        self.with_bundle(plugins, &bundle)
    }

    /// Applies arguments from a bundle.
    ///
    /// Scalar values present in the bundle replace earlier ones. List values are appended.
    pub fn with_bundle(
        mut self,
        plugins: &PluginRegistry,
        bundle: &Bundle,
    ) -> Result<Self, RunnerArgsError> {
        let args = &mut self.args;

        set_bool(&mut args.debug, bundle, ARGUMENT_DEBUG);
        set_unsigned(&mut args.delay_in_millis, bundle, ARGUMENT_DELAY_IN_MILLIS)?;

        args.tests
            .extend(parse_test_classes(bundle.get(ARGUMENT_TEST_CLASS)));
        args.not_tests
            .extend(parse_test_classes(bundle.get(ARGUMENT_NOT_TEST_CLASS)));
        args.test_packages
            .extend(parse_strings(bundle.get(ARGUMENT_TEST_PACKAGE)));
        args.not_test_packages
            .extend(parse_strings(bundle.get(ARGUMENT_NOT_TEST_PACKAGE)));

        if let Some(path) = bundle.get(ARGUMENT_TEST_FILE) {
            let file_args = parse_from_file(Utf8Path::new(path))?;
            args.tests.extend(file_args.tests);
            args.test_packages.extend(file_args.packages);
        }
        if let Some(path) = bundle.get(ARGUMENT_NOT_TEST_FILE) {
            let file_args = parse_from_file(Utf8Path::new(path))?;
            args.not_tests.extend(file_args.tests);
            args.not_test_packages.extend(file_args.packages);
        }

        for name in parse_strings(bundle.get(ARGUMENT_LISTENER)) {
            args.listeners.push(plugins.load_run_listener(&name)?);
        }
        for name in parse_strings(bundle.get(ARGUMENT_FILTER)) {
            args.filters.push(plugins.load_filter(&name, bundle)?);
        }
        for name in parse_strings(bundle.get(ARGUMENT_RUNNER_BUILDER)) {
            args.runner_builder_classes
                .push(plugins.load_runner_builder(&name)?);
        }

        set_string(&mut args.test_size, bundle, ARGUMENT_TEST_SIZE);
        args.annotations
            .extend(parse_strings(bundle.get(ARGUMENT_ANNOTATION)));
        args.not_annotations
            .extend(parse_strings(bundle.get(ARGUMENT_NOT_ANNOTATION)));
        set_unsigned(&mut args.test_timeout, bundle, ARGUMENT_TIMEOUT)?;
        set_unsigned(&mut args.num_shards, bundle, ARGUMENT_NUM_SHARDS)?;
        set_unsigned(&mut args.shard_index, bundle, ARGUMENT_SHARD_INDEX)?;
        set_bool(&mut args.log_only, bundle, ARGUMENT_LOG_ONLY);
        set_bool(&mut args.disable_analytics, bundle, ARGUMENT_DISABLE_ANALYTICS);
        set_bool(&mut args.code_coverage, bundle, ARGUMENT_COVERAGE);
        set_string(&mut args.code_coverage_path, bundle, ARGUMENT_COVERAGE_PATH);
        set_bool(&mut args.suite_assignment, bundle, ARGUMENT_SUITE_ASSIGNMENT);

        if let Some(classpath) = bundle.get(ARGUMENT_CLASSPATH_TO_SCAN) {
            args.classpath_to_scan.extend(
                classpath
                    .split(CLASSPATH_SEPARATOR)
                    .filter(|path| !path.is_empty())
                    .map(Utf8PathBuf::from),
            );
        }
        if let Some(remote_method) = bundle.get(ARGUMENT_REMOTE_INIT_METHOD) {
            args.remote_method = TestIdentifier::parse(remote_method);
        }

        set_string(&mut args.orchestrator_service, bundle, ARGUMENT_ORCHESTRATOR_SERVICE);
        set_bool(
            &mut args.list_tests_for_orchestrator,
            bundle,
            ARGUMENT_LIST_TESTS_FOR_ORCHESTRATOR,
        );
        set_string(
            &mut args.test_discovery_service,
            bundle,
            ARGUMENT_ORCHESTRATOR_DISCOVERY_SERVICE,
        );
        set_string(
            &mut args.test_run_events_service,
            bundle,
            ARGUMENT_ORCHESTRATOR_RUN_EVENTS_SERVICE,
        );
        set_string(&mut args.target_process, bundle, ARGUMENT_TARGET_PROCESS);
        set_string(&mut args.shell_exec_binder_key, bundle, ARGUMENT_SHELL_EXEC_BINDER_KEY);
        set_bool(&mut args.new_run_listener_mode, bundle, ARGUMENT_RUN_LISTENER_NEW_ORDER);
        set_string(&mut args.tests_regex, bundle, ARGUMENT_TESTS_REGEX);

        Ok(self)
    }

    /// Returns the parsed arguments.
    pub fn build(self) -> RunnerArgs {
        self.args
    }
}

/// Returns true if a line from a test file names a class or method rather than packages.
///
/// Package names are lowercase by convention, so any uppercase character or a method separator
/// marks a class.
pub fn is_class_or_method(line: &str) -> bool {
    line.chars().any(|c| c == '#' || c.is_uppercase())
}

#[derive(Debug, Default, Deserialize)]
struct ArgsFile {
    #[serde(default)]
    instrumentation: InstrumentationSection,
}

#[derive(Debug, Default, Deserialize)]
struct InstrumentationSection {
    #[serde(default)]
    args: IndexMap<String, toml::Value>,
}

#[derive(Debug, Default)]
struct TestFileArgs {
    tests: Vec<TestIdentifier>,
    packages: Vec<String>,
}

fn parse_from_file(path: &Utf8Path) -> Result<TestFileArgs, RunnerArgsError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            RunnerArgsError::TestFileNotFound {
                path: path.to_owned(),
                err,
            }
        } else {
            RunnerArgsError::TestFileRead {
                path: path.to_owned(),
                err,
            }
        }
    })?;

    let mut args = TestFileArgs::default();
    for line in contents.lines().filter(|line| !line.is_empty()) {
        if is_class_or_method(line) {
            args.tests.extend(TestIdentifier::parse(line));
        } else {
            args.packages.extend(parse_strings(Some(line)));
        }
    }
    debug!(
        "read {} tests and {} packages from {path}",
        args.tests.len(),
        args.packages.len()
    );
    Ok(args)
}

fn parse_strings(value: Option<&str>) -> Vec<String> {
    value
        .into_iter()
        .flat_map(|value| value.split(CLASS_SEPARATOR))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_test_classes(value: Option<&str>) -> Vec<TestIdentifier> {
    value
        .into_iter()
        .flat_map(|value| value.split(CLASS_SEPARATOR))
        .filter_map(TestIdentifier::parse)
        .collect()
}

// Only the exact string "true" is true. Anything else, including "TRUE", is false.
fn set_bool(field: &mut bool, bundle: &Bundle, name: &str) {
    if let Some(value) = bundle.get(name) {
        *field = value == "true";
    }
}

fn set_string(field: &mut Option<String>, bundle: &Bundle, name: &str) {
    if let Some(value) = bundle.get(name) {
        *field = Some(value.to_owned());
    }
}

fn set_unsigned(
    field: &mut Option<u64>,
    bundle: &Bundle,
    name: &'static str,
) -> Result<(), RunnerArgsError> {
    if let Some(value) = bundle.get(name) {
        *field = Some(parse_unsigned(value, name)?);
    }
    Ok(())
}

fn parse_unsigned(value: &str, name: &'static str) -> Result<u64, RunnerArgsError> {
    let parsed: i64 = value
        .parse()
        .map_err(|err| RunnerArgsError::InvalidNumber {
            name,
            value: value.to_owned(),
            err,
        })?;
    u64::try_from(parsed).map_err(|_| RunnerArgsError::Negative { name })
}
