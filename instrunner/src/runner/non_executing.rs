// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{NoTestsRemain, RunNotifier, Runner};
use crate::{annotation::IGNORE, description::Description, filter::Filter};

/// Reports every test of the wrapped runner without running any of them.
///
/// Each test is reported as started and finished, or as ignored if it carries `@Ignore`. The
/// description tree is the wrapped runner's, unchanged.
#[derive(Debug)]
pub struct NonExecutingRunner {
    inner: Box<dyn Runner>,
}

impl NonExecutingRunner {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn Runner>) -> Self {
        Self { inner }
    }

    fn report(notifier: &mut RunNotifier, description: &Description) {
        if description.is_suite() {
            for child in description.children() {
                Self::report(notifier, child);
            }
        } else if description.annotations().contains(IGNORE) {
            notifier.fire_test_ignored(description);
        } else {
            notifier.fire_test_started(description);
            notifier.fire_test_finished(description);
        }
    }
}

impl Runner for NonExecutingRunner {
    fn description(&self) -> Description {
        self.inner.description()
    }

    fn run(&self, notifier: &mut RunNotifier) {
        Self::report(notifier, &self.inner.description());
    }

    fn filter(&mut self, filter: &dyn Filter) -> Result<(), NoTestsRemain> {
        self.inner.filter(filter)
    }
}
