// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunNotifier, Runner};
use crate::{description::Description, registry::LoadedClass};

/// Reports a class annotated with `@Ignore` as a single ignored test.
#[derive(Clone, Debug)]
pub struct IgnoredClassRunner {
    class: LoadedClass,
}

impl IgnoredClassRunner {
    /// Creates a new runner.
    pub fn new(class: LoadedClass) -> Self {
        Self { class }
    }
}

impl Runner for IgnoredClassRunner {
    fn description(&self) -> Description {
        Description::for_class(&self.class)
    }

    fn run(&self, notifier: &mut RunNotifier) {
        notifier.fire_test_ignored(&self.description());
    }
}
