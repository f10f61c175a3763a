// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    description::Description,
    runner::{Failure, RunListener, RunResult},
};
use tracing::{debug, info, warn};

/// Logs every run event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRunListener;

impl LogRunListener {
    /// Creates a new listener.
    pub fn new() -> Self {
        Self
    }
}

impl RunListener for LogRunListener {
    fn test_run_started(&mut self, description: &Description) {
        info!(
            test_count = description.test_count(),
            "run started: {} tests",
            description.test_count()
        );
    }

    fn test_run_finished(&mut self, result: &RunResult) {
        info!(
            run_count = result.run_count,
            failure_count = result.failure_count(),
            ignore_count = result.ignore_count,
            "run finished: {} tests, {} failed, {} ignored",
            result.run_count,
            result.failure_count(),
            result.ignore_count,
        );
    }

    fn test_started(&mut self, description: &Description) {
        debug!(test = %description, "started");
    }

    fn test_finished(&mut self, description: &Description) {
        debug!(test = %description, "finished");
    }

    fn test_failure(&mut self, failure: &Failure) {
        warn!(test = %failure.description(), "failed: {}", failure.message());
    }

    fn test_assumption_failure(&mut self, failure: &Failure) {
        info!(
            test = %failure.description(),
            "assumption failed: {}",
            failure.message()
        );
    }

    fn test_ignored(&mut self, description: &Description) {
        info!(test = %description, "ignored");
    }
}
