// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading test classes by name and building their runners.

use crate::{
    runner::{ErrorReportingRunner, Runner},
    runner_builder::AndroidRunnerBuilder,
};
use indexmap::{IndexMap, map::Entry};
use tracing::{debug, warn};

/// Builds one runner per class name, in the order the names were first seen.
///
/// Each class is resolved at most once: repeated names share the first result.
#[derive(Debug)]
pub struct TestLoader<'a> {
    builder: AndroidRunnerBuilder<'a>,
    runners: IndexMap<String, Option<Box<dyn Runner>>>,
}

impl<'a> TestLoader<'a> {
    /// Creates a new loader.
    pub fn new(builder: AndroidRunnerBuilder<'a>) -> Self {
        Self {
            builder,
            runners: IndexMap::new(),
        }
    }

    /// Returns runners for `class_names`.
    ///
    /// While scanning, classes that can't be loaded or aren't tests are skipped. Otherwise a
    /// class that can't be loaded produces a runner reporting a single failing test.
    pub fn get_runners_for<I, S>(mut self, class_names: I) -> Vec<Box<dyn Runner>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for class_name in class_names {
            self.do_create_runner(class_name.as_ref());
        }
        self.runners.into_values().flatten().collect()
    }

    fn do_create_runner(&mut self, class_name: &str) {
        let entry = match self.runners.entry(class_name.to_owned()) {
            Entry::Occupied(_) => return,
            Entry::Vacant(entry) => entry,
        };

        let runner = match self.builder.registry().load(class_name) {
            Ok(class) => self.builder.runner_for_class(&class),
            Err(err) if self.builder.is_scanning() => {
                warn!("skipping {class_name} while scanning: {err}");
                None
            }
            Err(err) => {
                debug!("reporting unloadable class {class_name}: {err}");
                Some(Box::new(ErrorReportingRunner::new(class_name, None, err.to_string()))
                    as Box<dyn Runner>)
            }
        };
        entry.insert(runner);
    }
}
