// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunNotifier, Runner};
use crate::description::Description;

/// The display name of a [`BlankRunner`].
pub const NO_TESTS_FOUND: &str = "no tests found";

/// Stands in for a request whose filter removed every test. Running it does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlankRunner;

impl Runner for BlankRunner {
    fn description(&self) -> Description {
        Description::suite(NO_TESTS_FOUND)
    }

    fn run(&self, _notifier: &mut RunNotifier) {}
}
