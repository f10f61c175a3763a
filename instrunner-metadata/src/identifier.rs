// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separates a fully-qualified class name from one of its methods.
pub const METHOD_SEPARATOR: char = '#';

/// A test class, or a single method within a test class.
///
/// Serialized as the string form accepted by the instrumentation command line:
/// `com.example.FooTest` or `com.example.FooTest#testBar`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TestIdentifier {
    /// The fully-qualified class name.
    pub class_name: String,

    /// The method name, if this identifies a single method.
    pub method_name: Option<String>,
}

impl TestIdentifier {
    /// Creates an identifier for an entire class.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
        }
    }

    /// Creates an identifier for a single method.
    pub fn method(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: Some(method_name.into()),
        }
    }

    /// Parses `Class` or `Class#method`.
    ///
    /// Returns `None` for an empty input. A leading `#` is not treated as a method separator, so
    /// `#foo` identifies a class named `#foo`.
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() {
            return None;
        }
        match input.find(METHOD_SEPARATOR) {
            Some(index) if index > 0 => Some(Self::method(
                &input[..index],
                &input[index + METHOD_SEPARATOR.len_utf8()..],
            )),
            _ => Some(Self::class(input)),
        }
    }

    /// Returns true if this identifies an entire class.
    pub fn is_class(&self) -> bool {
        self.method_name.is_none()
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method_name {
            Some(method_name) => write!(f, "{}{METHOD_SEPARATOR}{}", self.class_name, method_name),
            None => write!(f, "{}", self.class_name),
        }
    }
}

impl Serialize for TestIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TestIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom("test identifier must not be empty"))
    }
}
