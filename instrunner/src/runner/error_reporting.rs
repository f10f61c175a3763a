// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunNotifier, Runner};
use crate::{annotation::AnnotationSet, description::Description, filter::INITIALIZATION_ERROR};

/// Reports a class that can't be run as a single failing `initializationError` test.
///
/// This runner can't be pruned: a filter either keeps or drops it as a whole.
#[derive(Clone, Debug)]
pub struct ErrorReportingRunner {
    class_name: String,
    class_annotations: Option<AnnotationSet>,
    message: String,
}

impl ErrorReportingRunner {
    /// Creates a new runner.
    ///
    /// `class_annotations` is `None` for classes that couldn't be loaded at all.
    pub fn new(
        class_name: impl Into<String>,
        class_annotations: Option<AnnotationSet>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            class_annotations,
            message: message.into(),
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn test_description(&self) -> Description {
        Description::for_test(
            &self.class_name,
            INITIALIZATION_ERROR,
            self.class_annotations.clone(),
        )
    }
}

impl Runner for ErrorReportingRunner {
    fn description(&self) -> Description {
        let mut description = Description::for_class_name(&self.class_name);
        description.add_child(self.test_description());
        description
    }

    fn run(&self, notifier: &mut RunNotifier) {
        notifier.fire_failing_test(&self.test_description(), &self.message);
    }
}
