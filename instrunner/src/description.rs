// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural descriptions of tests and test groups.

use crate::{
    annotation::AnnotationSet,
    registry::{LoadedClass, MethodDef},
};
use instrunner_metadata::TestIdentifier;
use std::fmt;

/// Describes a single test, or a group of tests.
///
/// A description with no children is a test. Everything else is a suite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Description {
    display_name: String,
    class_name: Option<String>,
    method_name: Option<String>,
    annotations: AnnotationSet,
    class_annotations: Option<AnnotationSet>,
    children: Vec<Description>,
}

impl Description {
    /// Creates a description for a group of tests that isn't tied to a class.
    pub fn suite(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            class_name: None,
            method_name: None,
            annotations: AnnotationSet::new(),
            class_annotations: None,
            children: Vec::new(),
        }
    }

    /// Creates a description for a loaded class.
    pub fn for_class(class: &LoadedClass) -> Self {
        Self {
            display_name: class.name().to_owned(),
            class_name: Some(class.name().to_owned()),
            method_name: None,
            annotations: class.annotations().clone(),
            class_annotations: Some(class.annotations().clone()),
            children: Vec::new(),
        }
    }

    /// Creates a description for a class that couldn't be loaded.
    pub fn for_class_name(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            display_name: class_name.clone(),
            class_name: Some(class_name),
            method_name: None,
            annotations: AnnotationSet::new(),
            class_annotations: None,
            children: Vec::new(),
        }
    }

    /// Creates a description for a test method on a loaded class.
    pub fn for_method(class: &LoadedClass, method: &MethodDef) -> Self {
        Self {
            display_name: format!("{}({})", method.name(), class.name()),
            class_name: Some(class.name().to_owned()),
            method_name: Some(method.name().to_owned()),
            annotations: method.annotations().clone(),
            class_annotations: Some(class.annotations().clone()),
            children: Vec::new(),
        }
    }

    /// Creates a description for a synthetic test with no annotations, such as an
    /// `initializationError`.
    pub fn for_test(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        class_annotations: Option<AnnotationSet>,
    ) -> Self {
        let class_name = class_name.into();
        let method_name = method_name.into();
        Self {
            display_name: format!("{method_name}({class_name})"),
            class_name: Some(class_name),
            method_name: Some(method_name),
            annotations: AnnotationSet::new(),
            class_annotations,
            children: Vec::new(),
        }
    }

    /// Adds a child.
    pub fn add_child(&mut self, child: Description) {
        self.children.push(child);
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the class this description belongs to, if any.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Returns the method this description belongs to, if any.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// Returns the annotations on the described element: the method for a test, or the class
    /// for a class-level description.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Returns the annotations on the test's class, including inherited ones.
    ///
    /// `None` if the description isn't tied to a loaded class.
    pub fn class_annotations(&self) -> Option<&AnnotationSet> {
        self.class_annotations.as_ref()
    }

    /// Returns true if the described element or its class carries the named annotation.
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.contains(name)
            || self
                .class_annotations
                .as_ref()
                .is_some_and(|annotations| annotations.contains(name))
    }

    /// Returns the children.
    pub fn children(&self) -> &[Description] {
        &self.children
    }

    /// Returns true if this describes a single test.
    pub fn is_test(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if this describes a group of tests.
    pub fn is_suite(&self) -> bool {
        !self.is_test()
    }

    /// Returns the number of tests described.
    pub fn test_count(&self) -> usize {
        if self.is_test() {
            1
        } else {
            self.children.iter().map(|child| child.test_count()).sum()
        }
    }

    /// Returns the identifier for this description, if it is tied to a class.
    pub fn id(&self) -> Option<TestIdentifier> {
        let class_name = self.class_name.as_ref()?;
        Some(TestIdentifier {
            class_name: class_name.clone(),
            method_name: self.method_name.clone(),
        })
    }

    /// Iterates over every test in this tree, depth-first.
    pub fn tests(&self) -> impl Iterator<Item = &Description> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            while let Some(next) = stack.pop() {
                if next.is_test() {
                    return Some(next);
                }
                stack.extend(next.children.iter().rev());
            }
            None
        })
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
