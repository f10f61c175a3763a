// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for instrunner, an instrumentation test runner.
//!
//! The basic flow of operations is:
//!
//! 1. A flat [`Bundle`](bundle::Bundle) of instrumentation arguments is parsed into
//!    [`RunnerArgs`](runner_args::RunnerArgs).
//! 2. A [`TestRequestBuilder`](request::TestRequestBuilder) turns those arguments, a
//!    [`TestRegistry`](registry::TestRegistry) of known classes and an optional class path scan
//!    into a [`Request`](request::Request): a runner tree plus a composed filter.
//! 3. A [`TestExecutor`](executor::TestExecutor) runs the request and reports to
//!    [listeners](reporter).
//!
//! [`InstrumentationRunner`](instrumentation::InstrumentationRunner) wires all of these together.

pub mod annotation;
pub mod bundle;
pub mod classpath;
pub mod description;
pub mod device;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod instrumentation;
pub mod loader;
pub mod manifest;
pub mod plugin;
pub mod registry;
pub mod reporter;
pub mod request;
pub mod runner;
pub mod runner_args;
pub mod runner_builder;
#[cfg(test)]
mod test_helpers;
pub mod test_size;
