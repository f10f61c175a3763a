// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{description::Description, runner::RunListener};
use std::{thread, time::Duration};

/// Sleeps before the first test and after every test.
///
/// Used to give a device time to settle between tests.
#[derive(Clone, Copy, Debug)]
pub struct DelayInjector {
    delay: Duration,
}

impl DelayInjector {
    /// Creates an injector sleeping for `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn delay(&self) {
        thread::sleep(self.delay);
    }
}

impl RunListener for DelayInjector {
    fn test_run_started(&mut self, _description: &Description) {
        self.delay();
    }

    fn test_finished(&mut self, _description: &Description) {
        self.delay();
    }
}
