// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::{description::Description, test_size::TestSize};

/// Runs only tests of a given size.
///
/// A test's size is resolved by [`TestSize::from_description`]: a method-level size always
/// overrides the class-level one.
#[derive(Clone, Debug)]
pub struct SizeFilter {
    size: TestSize,
}

impl SizeFilter {
    /// Creates a new filter.
    pub fn new(size: TestSize) -> Self {
        Self { size }
    }
}

impl Filter for SizeFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        TestSize::from_description(description) == self.size
    }

    fn describe(&self) -> String {
        format!("size {}", self.size)
    }
}
