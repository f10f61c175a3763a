// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Annotations on test classes and methods.
//!
//! Annotations are plain data recorded when a class is registered. Filters match on them by
//! fully-qualified name.

use instrunner_metadata::{ManifestAnnotation, ManifestSdkSuppress};

/// Marks a JUnit4 test method.
pub const TEST: &str = "org.junit.Test";

/// Marks a class or method as ignored.
pub const IGNORE: &str = "org.junit.Ignore";

/// Restricts a class or method to a range of SDK versions.
pub const SDK_SUPPRESS: &str = "androidx.test.filters.SdkSuppress";

/// Skips a class or method when running on an emulator.
pub const REQUIRES_DEVICE: &str = "androidx.test.filters.RequiresDevice";

/// Excludes a class or method from every run.
pub const SUPPRESS: &str = "androidx.test.filters.Suppress";

/// The legacy platform variant of [`SUPPRESS`].
pub const PLATFORM_SUPPRESS: &str = "android.test.suitebuilder.annotation.Suppress";

/// Marks a test as flaky.
pub const FLAKY_TEST: &str = "androidx.test.filters.FlakyTest";

/// A single annotation on a class or method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Annotation {
    /// A marker annotation, identified by its fully-qualified name.
    Marker(String),

    /// An `@SdkSuppress` annotation.
    SdkSuppress(SdkSuppress),
}

impl Annotation {
    /// Creates a marker annotation.
    pub fn marker(name: impl Into<String>) -> Self {
        Self::Marker(name.into())
    }

    /// Returns the fully-qualified name of this annotation.
    pub fn name(&self) -> &str {
        match self {
            Self::Marker(name) => name,
            Self::SdkSuppress(_) => SDK_SUPPRESS,
        }
    }
}

impl From<&ManifestAnnotation> for Annotation {
    fn from(annotation: &ManifestAnnotation) -> Self {
        match annotation {
            ManifestAnnotation::Marker(name) => Self::Marker(name.clone()),
            ManifestAnnotation::SdkSuppress { sdk_suppress } => {
                Self::SdkSuppress(SdkSuppress::from(sdk_suppress))
            }
        }
    }
}

/// The parameters of an `@SdkSuppress` annotation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SdkSuppress {
    /// The minimum SDK version, inclusive.
    pub min_sdk_version: i32,

    /// The maximum SDK version, inclusive.
    pub max_sdk_version: i32,

    /// A pre-release codename on which the test runs regardless of the SDK range.
    pub code_name: Option<String>,

    /// SDK versions within the range on which the test is still skipped.
    pub excluded_sdks: Vec<i32>,
}

impl Default for SdkSuppress {
    fn default() -> Self {
        Self {
            min_sdk_version: 1,
            max_sdk_version: i32::MAX,
            code_name: None,
            excluded_sdks: Vec::new(),
        }
    }
}

impl SdkSuppress {
    /// Returns an `@SdkSuppress(minSdkVersion = min)`.
    pub fn min(min_sdk_version: i32) -> Self {
        Self {
            min_sdk_version,
            ..Self::default()
        }
    }

    /// Returns an `@SdkSuppress(maxSdkVersion = max)`.
    pub fn max(max_sdk_version: i32) -> Self {
        Self {
            max_sdk_version,
            ..Self::default()
        }
    }

    /// Returns true if a device with this SDK version and codename should run the test.
    pub fn allows(&self, sdk_int: i32, codename: &str) -> bool {
        if self
            .code_name
            .as_deref()
            .is_some_and(|code_name| code_name == codename)
        {
            return true;
        }
        (self.min_sdk_version..=self.max_sdk_version).contains(&sdk_int)
            && !self.excluded_sdks.contains(&sdk_int)
    }
}

impl From<&ManifestSdkSuppress> for SdkSuppress {
    fn from(value: &ManifestSdkSuppress) -> Self {
        let defaults = Self::default();
        Self {
            min_sdk_version: value.min_sdk_version.unwrap_or(defaults.min_sdk_version),
            max_sdk_version: value.max_sdk_version.unwrap_or(defaults.max_sdk_version),
            code_name: value.code_name.clone(),
            excluded_sdks: value.excluded_sdks.clone(),
        }
    }
}

/// The annotations present on a class or method.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an annotation. An annotation with the same name replaces the existing one.
    pub fn insert(&mut self, annotation: Annotation) {
        match self
            .annotations
            .iter_mut()
            .find(|existing| existing.name() == annotation.name())
        {
            Some(existing) => *existing = annotation,
            None => self.annotations.push(annotation),
        }
    }

    /// Returns true if an annotation with this fully-qualified name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name() == name)
    }

    /// Returns the `@SdkSuppress` annotation, if present.
    pub fn sdk_suppress(&self) -> Option<&SdkSuppress> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::SdkSuppress(sdk_suppress) => Some(sdk_suppress),
            Annotation::Marker(_) => None,
        })
    }

    /// Iterates over the annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter()
    }

    /// Returns true if there are no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Adds every annotation in `inherited` that isn't already present.
    ///
    /// Used to merge a superclass's annotations into a subclass: the subclass's own annotations
    /// take precedence.
    pub fn inherit_from(&mut self, inherited: &AnnotationSet) {
        for annotation in &inherited.annotations {
            if !self.contains(annotation.name()) {
                self.annotations.push(annotation.clone());
            }
        }
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut set = Self::new();
        for annotation in iter {
            set.insert(annotation);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(SdkSuppress::min(30), 29, "REL", false ; "below min")]
    #[test_case(SdkSuppress::min(30), 30, "REL", true ; "at min")]
    #[test_case(SdkSuppress::max(28), 28, "REL", true ; "at max")]
    #[test_case(SdkSuppress::max(28), 29, "REL", false ; "above max")]
    #[test_case(
        SdkSuppress { excluded_sdks: vec![31], ..SdkSuppress::min(30) }, 31, "REL", false
        ; "excluded"
    )]
    #[test_case(
        SdkSuppress { code_name: Some("Baklava".to_owned()), ..SdkSuppress::min(40) }, 35, "Baklava", true
        ; "matching codename"
    )]
    #[test_case(
        SdkSuppress { code_name: Some("Baklava".to_owned()), ..SdkSuppress::min(40) }, 35, "REL", false
        ; "other codename"
    )]
    fn sdk_suppress_allows(sdk_suppress: SdkSuppress, sdk_int: i32, codename: &str, expected: bool) {
        assert_eq!(sdk_suppress.allows(sdk_int, codename), expected);
    }

    #[test]
    fn inherit_keeps_own_annotations() {
        let mut own: AnnotationSet = [
            Annotation::marker("a.Own"),
            Annotation::SdkSuppress(SdkSuppress::min(30)),
        ]
        .into_iter()
        .collect();
        let parent: AnnotationSet = [
            Annotation::marker("a.Parent"),
            Annotation::SdkSuppress(SdkSuppress::min(21)),
        ]
        .into_iter()
        .collect();

        own.inherit_from(&parent);
        assert!(own.contains("a.Own"));
        assert!(own.contains("a.Parent"));
        assert_eq!(own.sdk_suppress(), Some(&SdkSuppress::min(30)));
    }
}
