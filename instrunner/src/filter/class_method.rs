// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::description::Description;
use indexmap::IndexMap;
use std::collections::HashSet;

/// The method name JUnit reports for a class that fails to initialize.
pub const INITIALIZATION_ERROR: &str = "initializationError";

/// Includes and excludes individual methods, per class.
///
/// Classes with no method-level entries are unaffected.
#[derive(Debug, Default)]
pub struct ClassAndMethodFilter {
    method_filters: IndexMap<String, MethodFilter>,
}

impl ClassAndMethodFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts `class_name` to `method_name` and any other included methods.
    pub fn add_method(&mut self, class_name: &str, method_name: &str) {
        self.method_filter_mut(class_name)
            .included
            .insert(method_name.to_owned());
    }

    /// Excludes `method_name` from `class_name`.
    pub fn remove_method(&mut self, class_name: &str, method_name: &str) {
        self.method_filter_mut(class_name)
            .excluded
            .insert(method_name.to_owned());
    }

    /// Returns true if no methods were included or excluded.
    pub fn is_empty(&self) -> bool {
        self.method_filters.is_empty()
    }

    fn method_filter_mut(&mut self, class_name: &str) -> &mut MethodFilter {
        self.method_filters
            .entry(class_name.to_owned())
            .or_insert_with(|| MethodFilter::new(class_name))
    }
}

impl Filter for ClassAndMethodFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        let Some(method_filter) = description
            .class_name()
            .and_then(|class_name| self.method_filters.get(class_name))
        else {
            return true;
        };
        method_filter.should_run(description)
    }

    fn describe(&self) -> String {
        "Class and method filter".to_owned()
    }
}

/// Includes and excludes methods of a single class.
#[derive(Clone, Debug)]
pub struct MethodFilter {
    class_name: String,
    included: HashSet<String>,
    excluded: HashSet<String>,
}

impl MethodFilter {
    /// Creates a filter for `class_name` that accepts every method.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            included: HashSet::new(),
            excluded: HashSet::new(),
        }
    }
}

impl Filter for MethodFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        // An ignored class is described without a method: nothing here can match it.
        let Some(method_name) = description.method_name() else {
            return false;
        };
        let method_name = strip_parameterized_suffix(method_name);
        if self.excluded.contains(method_name) {
            return false;
        }
        self.included.is_empty()
            || self.included.contains(method_name)
            || method_name == INITIALIZATION_ERROR
    }

    fn describe(&self) -> String {
        format!("Method filter for {} class", self.class_name)
    }
}

/// Strips the `[N]` suffix that parameterized runners append to method names.
pub fn strip_parameterized_suffix(name: &str) -> &str {
    let Some(without_bracket) = name.strip_suffix(']') else {
        return name;
    };
    match without_bracket.rfind('[') {
        Some(index)
            if index > 0
                && index + 1 < without_bracket.len()
                && without_bracket[index + 1..]
                    .bytes()
                    .all(|b| b.is_ascii_digit()) =>
        {
            &name[..index]
        }
        _ => name,
    }
}
