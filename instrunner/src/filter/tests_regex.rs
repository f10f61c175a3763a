// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::description::Description;
use instrunner_metadata::METHOD_SEPARATOR;
use regex::Regex;

/// Runs only tests whose `Class#method` name contains a match for a regex.
#[derive(Clone, Debug)]
pub struct TestsRegexFilter {
    regex: Regex,
}

impl TestsRegexFilter {
    /// Creates a new filter.
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl Filter for TestsRegexFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        let name = format!(
            "{}{METHOD_SEPARATOR}{}",
            description.class_name().unwrap_or_default(),
            description.method_name().unwrap_or_default()
        );
        self.regex.is_match(&name)
    }

    fn describe(&self) -> String {
        format!("tests matching {}", self.regex)
    }
}
