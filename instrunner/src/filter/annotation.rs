// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::description::Description;
use itertools::Itertools;

/// Runs only tests whose method or class carries at least one of the given annotations.
#[derive(Clone, Debug)]
pub struct AnnotationInclusionFilter {
    annotations: Vec<String>,
}

impl AnnotationInclusionFilter {
    /// Creates a new filter. With no annotations, the filter accepts every test.
    pub fn new(annotations: impl IntoIterator<Item = String>) -> Self {
        Self {
            annotations: annotations.into_iter().collect(),
        }
    }
}

impl Filter for AnnotationInclusionFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        self.annotations.is_empty()
            || self
                .annotations
                .iter()
                .any(|annotation| description.has_annotation(annotation))
    }

    fn describe(&self) -> String {
        format!("annotation {}", self.annotations.iter().join(" or "))
    }
}

/// Skips tests whose method or class carries the given annotation.
#[derive(Clone, Debug)]
pub struct AnnotationExclusionFilter {
    annotation: String,
}

impl AnnotationExclusionFilter {
    /// Creates a new filter.
    pub fn new(annotation: impl Into<String>) -> Self {
        Self {
            annotation: annotation.into(),
        }
    }

    /// Returns the excluded annotation.
    pub fn annotation(&self) -> &str {
        &self.annotation
    }
}

impl Filter for AnnotationExclusionFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        !description.has_annotation(&self.annotation)
    }

    fn describe(&self) -> String {
        format!("not annotation {}", self.annotation)
    }
}
