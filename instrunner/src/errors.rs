// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by instrunner.

use crate::plugin::PluginKind;
use camino::Utf8PathBuf;
use itertools::Itertools;
use std::{io, num::ParseIntError, path::PathBuf};
use thiserror::Error;

/// An error that occurred while parsing instrumentation arguments into
/// [`RunnerArgs`](crate::runner_args::RunnerArgs).
///
/// All of these are fatal: they are raised before any test runs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerArgsError {
    /// A numeric argument could not be parsed.
    #[error("failed to parse `{name}` value `{value}` as an integer")]
    InvalidNumber {
        /// The argument name.
        name: &'static str,

        /// The value that failed to parse.
        value: String,

        /// The underlying error.
        #[source]
        err: ParseIntError,
    },

    /// A numeric argument was negative.
    #[error("{name} can not be negative")]
    Negative {
        /// The argument name.
        name: &'static str,
    },

    /// A `testFile` or `notTestFile` argument named a file that doesn't exist.
    #[error("testfile not found: {path}")]
    TestFileNotFound {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// A `testFile` or `notTestFile` argument named a file that couldn't be read.
    #[error("Could not read test file {path}")]
    TestFileRead {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The instrumentation args file couldn't be read.
    #[error("failed to read instrumentation args file at `{path}`")]
    ArgsFileRead {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The instrumentation args file couldn't be parsed.
    #[error("failed to parse instrumentation args file at `{path}`")]
    ArgsFileParse {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: Box<toml::de::Error>,
    },

    /// The instrumentation args file contained a value that isn't a string, integer or boolean.
    #[error("in instrumentation args file at `{path}`, value for `{key}` must be a string, integer or boolean")]
    ArgsFileValue {
        /// The path to the file.
        path: Utf8PathBuf,

        /// The key with the unsupported value.
        key: String,
    },

    /// A plugin named by an argument could not be loaded.
    #[error(transparent)]
    PluginLoad(#[from] PluginLoadError),
}

/// An error that occurred while resolving a plugin name against the
/// [`PluginRegistry`](crate::plugin::PluginRegistry).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum PluginLoadError {
    /// No plugin was registered under this name.
    #[error("Could not find extra class {name}")]
    NotFound {
        /// The plugin name.
        name: String,
    },

    /// A plugin was registered under this name, but it is of a different kind.
    #[error("{name} does not extend {expected}")]
    WrongKind {
        /// The plugin name.
        name: String,

        /// The kind of plugin that was expected.
        expected: PluginKind,
    },

    /// A filter plugin has neither a no-argument nor a bundle-aware constructor.
    #[error("Must have no argument constructor for class {name}")]
    MissingConstructor {
        /// The plugin name.
        name: String,
    },

    /// A runner builder plugin could not be instantiated.
    #[error(
        "Could not create instance of {name}, make sure that it is a public concrete class \
         with a public no-argument constructor"
    )]
    RunnerBuilderConstructor {
        /// The plugin name.
        name: String,
    },
}

/// An error that occurred while building a [`Request`](crate::request::Request).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestRequestBuilderError {
    /// Neither test classes nor paths to scan were provided.
    #[error("Must provide either classes to run, or paths to scan")]
    MissingArguments,

    /// The same classes were both included and excluded.
    #[error(
        "Ambiguous arguments: cannot both include and exclude test class(es) {}",
        .classes.iter().join(", ")
    )]
    AmbiguousArguments {
        /// The classes that were both included and excluded.
        classes: Vec<String>,
    },

    /// The sharding filter names a shard that doesn't exist.
    #[error("invalid sharding: shard index {shard_index} is out of range for {num_shards} shards")]
    InvalidSharding {
        /// The number of shards.
        num_shards: u64,

        /// The index of the shard to run.
        shard_index: u64,
    },

    /// The tests regex failed to compile.
    #[error("invalid tests regex `{pattern}`")]
    InvalidTestsRegex {
        /// The pattern.
        pattern: String,

        /// The underlying error.
        #[source]
        err: regex::Error,
    },

    /// Scanning the class path failed.
    #[error("failed to scan class path")]
    Scan(#[from] ClassPathScanError),

    /// A custom runner builder could not be instantiated.
    #[error(transparent)]
    PluginLoad(#[from] PluginLoadError),
}

/// An error that occurred while scanning the class path for test classes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassPathScanError {
    /// A class path entry couldn't be read.
    #[error("error reading class path entry `{path}`")]
    Read {
        /// The class path entry.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// A class path directory couldn't be walked.
    #[error("error walking class path directory `{path}`")]
    Walk {
        /// The class path directory.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: walkdir::Error,
    },

    /// A class file within a class path directory had a non-UTF-8 path.
    #[error("class file `{}` has a non-UTF-8 path", .path.display())]
    NonUtf8Path {
        /// The path to the class file.
        path: PathBuf,
    },
}

/// An error that occurred while loading a test manifest into a
/// [`TestRegistry`](crate::registry::TestRegistry).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// The manifest couldn't be read.
    #[error("error reading test manifest at `{path}`")]
    Read {
        /// The path to the manifest.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The manifest couldn't be parsed.
    #[error("error parsing test manifest at `{path}`")]
    Parse {
        /// The path to the manifest.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// A class was listed more than once.
    #[error("class `{name}` is listed more than once in the test manifest")]
    DuplicateClass {
        /// The class name.
        name: String,
    },

    /// A class named the suite runner but listed no suite classes.
    #[error("class `{name}` runs with the suite runner but lists no suite classes")]
    EmptySuite {
        /// The class name.
        name: String,
    },
}

/// An error that occurred while loading a single test class.
///
/// These are never returned to callers of [`TestRequestBuilder::build`]: explicitly requested
/// classes that fail to load turn into failing tests, and classes found while scanning are
/// skipped.
///
/// [`TestRequestBuilder::build`]: crate::request::TestRequestBuilder::build
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ClassLoadError {
    /// The class is not in the registry.
    #[error("class `{name}` not found")]
    NotFound {
        /// The class name.
        name: String,
    },

    /// The class failed to initialize.
    #[error("class `{name}` failed to initialize: {message}")]
    Initialization {
        /// The class name.
        name: String,

        /// The initialization error message.
        message: String,
    },

    /// The class's superclass chain loops back on itself.
    #[error("superclass chain of `{name}` contains a cycle")]
    SuperclassCycle {
        /// The class name.
        name: String,
    },
}

/// A test class that can be loaded but not run.
///
/// Reported as a failing `initializationError` test by an
/// [`ErrorReportingRunner`](crate::runner::ErrorReportingRunner).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct InitializationError {
    message: String,
}

impl InitializationError {
    /// Creates a new error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message reported for the failing test.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error that occurred while writing a JUnit XML report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteJunitError {
    /// The run has not finished, so there is no report to write.
    #[error("no JUnit report is available: the run has not finished")]
    NotFinished,

    /// An error occurred while creating the report file or its directory.
    #[error("error writing to {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: quick_junit::SerializeError,
    },
}
