// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestIdentifier;
use serde::{Deserialize, Serialize};

/// The list of tests selected by a set of instrumentation arguments.
///
/// Produced by `instrunner list --message-format json`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestListSummary {
    /// The number of tests that would run.
    pub test_count: usize,

    /// The tests, in execution order.
    pub tests: Vec<TestListEntry>,
}

impl TestListSummary {
    /// Creates a summary from a list of entries.
    pub fn new(tests: Vec<TestListEntry>) -> Self {
        Self {
            test_count: tests.len(),
            tests,
        }
    }
}

/// A single test in a [`TestListSummary`].
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestListEntry {
    /// The test's identifier.
    pub id: TestIdentifier,

    /// Whether the test is marked as ignored.
    #[serde(default)]
    pub ignored: bool,
}
