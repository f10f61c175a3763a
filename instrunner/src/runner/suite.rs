// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{NoTestsRemain, RunNotifier, Runner};
use crate::{description::Description, filter::Filter};

/// Runs a sequence of child runners as one suite.
///
/// Used for `@RunWith(Suite.class)` classes and for the root of every request.
#[derive(Debug)]
pub struct SuiteRunner {
    description: Description,
    children: Vec<Box<dyn Runner>>,
}

impl SuiteRunner {
    /// Creates a suite described by `description`, which must have no children of its own.
    pub fn new(description: Description, children: Vec<Box<dyn Runner>>) -> Self {
        Self {
            description,
            children,
        }
    }

    /// Returns the child runners.
    pub fn children(&self) -> &[Box<dyn Runner>] {
        &self.children
    }
}

impl Runner for SuiteRunner {
    fn description(&self) -> Description {
        let mut description = self.description.clone();
        for child in &self.children {
            description.add_child(child.description());
        }
        description
    }

    fn run(&self, notifier: &mut RunNotifier) {
        for child in &self.children {
            child.run(notifier);
        }
    }

    fn filter(&mut self, filter: &dyn Filter) -> Result<(), NoTestsRemain> {
        self.children.retain_mut(|child| {
            filter.should_run(&child.description()) && child.filter(filter).is_ok()
        });
        if self.children.is_empty() {
            Err(NoTestsRemain)
        } else {
            Ok(())
        }
    }
}
