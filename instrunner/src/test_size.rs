// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test size buckets.
//!
//! Sizes are recognized from both the runner filter annotations (`androidx.test.filters`) and the
//! legacy platform annotations (`android.test.suitebuilder.annotation`).

use crate::description::Description;
use std::{cmp::Ordering, fmt, time::Duration};

/// A test size bucket.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum TestSize {
    /// `@SmallTest`.
    Small,

    /// `@MediumTest`.
    Medium,

    /// `@LargeTest`.
    Large,

    /// No size, or an unrecognized one.
    #[default]
    None,
}

impl TestSize {
    /// The three real sizes, smallest first.
    pub const ALL: [TestSize; 3] = [TestSize::Small, TestSize::Medium, TestSize::Large];

    /// Returns the name used for this size on the command line.
    pub fn qualifier_name(self) -> &'static str {
        match self {
            TestSize::Small => "small",
            TestSize::Medium => "medium",
            TestSize::Large => "large",
            TestSize::None => "",
        }
    }

    /// Parses a size name. Unknown names map to [`TestSize::None`].
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|size| size.qualifier_name() == name)
            .unwrap_or(TestSize::None)
    }

    /// Returns the runner filter annotation for this size.
    pub fn runner_annotation(self) -> Option<&'static str> {
        match self {
            TestSize::Small => Some("androidx.test.filters.SmallTest"),
            TestSize::Medium => Some("androidx.test.filters.MediumTest"),
            TestSize::Large => Some("androidx.test.filters.LargeTest"),
            TestSize::None => None,
        }
    }

    /// Returns the legacy platform annotation for this size.
    pub fn platform_annotation(self) -> Option<&'static str> {
        match self {
            TestSize::Small => Some("android.test.suitebuilder.annotation.SmallTest"),
            TestSize::Medium => Some("android.test.suitebuilder.annotation.MediumTest"),
            TestSize::Large => Some("android.test.suitebuilder.annotation.LargeTest"),
            TestSize::None => None,
        }
    }

    /// Returns the longest run time a test of this size is expected to take, exclusive.
    ///
    /// `None` for [`TestSize::Large`], which has no upper bound.
    pub fn run_time_threshold(self) -> Option<Duration> {
        match self {
            TestSize::Small => Some(Duration::from_millis(200)),
            TestSize::Medium => Some(Duration::from_millis(1000)),
            TestSize::Large => None,
            TestSize::None => Some(Duration::ZERO),
        }
    }

    /// Maps a run time to the smallest size whose threshold it is under.
    pub fn for_run_time(run_time: Duration) -> Self {
        for size in [TestSize::Small, TestSize::Medium] {
            if let Some(threshold) = size.run_time_threshold()
                && run_time < threshold
            {
                return size;
            }
        }
        TestSize::Large
    }

    /// Returns true if `annotation` is any of the six size annotations.
    pub fn is_any_test_size(annotation: &str) -> bool {
        Self::ALL.into_iter().any(|size| size.is_annotation(annotation))
    }

    /// Returns true if the test method in `description` carries this size.
    pub fn test_method_is_annotated_with_test_size(self, description: &Description) -> bool {
        self.annotation_names()
            .any(|name| description.annotations().contains(name))
    }

    /// Returns true if the test class in `description` carries this size.
    pub fn test_class_is_annotated_with_test_size(self, description: &Description) -> bool {
        let Some(class_annotations) = description.class_annotations() else {
            return false;
        };
        self.annotation_names()
            .any(|name| class_annotations.contains(name))
    }

    /// Resolves the effective size of a test.
    ///
    /// A size on the method wins over a size on the class.
    pub fn from_description(description: &Description) -> Self {
        Self::ALL
            .into_iter()
            .find(|size| size.test_method_is_annotated_with_test_size(description))
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|size| size.test_class_is_annotated_with_test_size(description))
            })
            .unwrap_or(TestSize::None)
    }

    fn is_annotation(self, annotation: &str) -> bool {
        self.annotation_names().any(|name| name == annotation)
    }

    fn annotation_names(self) -> impl Iterator<Item = &'static str> {
        self.runner_annotation()
            .into_iter()
            .chain(self.platform_annotation())
    }
}

impl PartialOrd for TestSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        fn rank(size: TestSize) -> Option<u8> {
            match size {
                TestSize::Small => Some(0),
                TestSize::Medium => Some(1),
                TestSize::Large => Some(2),
                TestSize::None => None,
            }
        }
        match (rank(*self), rank(*other)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for TestSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualifier_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::Annotation,
        registry::{ClassDef, MethodDef, TestRegistry},
    };
    use test_case::test_case;
    use test_strategy::{Arbitrary, proptest};

    #[derive(Arbitrary, Clone, Copy, Debug)]
    enum SizeChoice {
        Small,
        Medium,
        Large,
        None,
        PlatformSmall,
        PlatformLarge,
    }

    impl SizeChoice {
        fn annotation(self) -> Option<&'static str> {
            match self {
                SizeChoice::Small => TestSize::Small.runner_annotation(),
                SizeChoice::Medium => TestSize::Medium.runner_annotation(),
                SizeChoice::Large => TestSize::Large.runner_annotation(),
                SizeChoice::None => None,
                SizeChoice::PlatformSmall => TestSize::Small.platform_annotation(),
                SizeChoice::PlatformLarge => TestSize::Large.platform_annotation(),
            }
        }

        fn size(self) -> TestSize {
            match self {
                SizeChoice::Small | SizeChoice::PlatformSmall => TestSize::Small,
                SizeChoice::Medium => TestSize::Medium,
                SizeChoice::Large | SizeChoice::PlatformLarge => TestSize::Large,
                SizeChoice::None => TestSize::None,
            }
        }
    }

    fn describe(class_size: SizeChoice, method_size: SizeChoice) -> Description {
        let mut class = ClassDef::new("a.SizedTest");
        if let Some(name) = class_size.annotation() {
            class = class.with_annotation(Annotation::marker(name));
        }
        let mut method = MethodDef::test("testSized");
        if let Some(name) = method_size.annotation() {
            method = method.with_marker(name);
        }
        let mut registry = TestRegistry::new();
        registry.register(class.with_method(method));
        let loaded = registry.load("a.SizedTest").expect("class loads");
        Description::for_method(&loaded, &loaded.methods()[0])
    }

    #[proptest(cases = 64)]
    fn method_size_overrides_class_size(class_size: SizeChoice, method_size: SizeChoice) {
        let description = describe(class_size, method_size);
        let expected = match method_size.size() {
            TestSize::None => class_size.size(),
            size => size,
        };
        assert_eq!(TestSize::from_description(&description), expected);
    }

    #[test_case(Duration::ZERO, TestSize::Small ; "zero")]
    #[test_case(Duration::from_millis(199), TestSize::Small ; "just under small")]
    #[test_case(Duration::from_millis(200), TestSize::Medium ; "small threshold")]
    #[test_case(Duration::from_millis(999), TestSize::Medium ; "just under medium")]
    #[test_case(Duration::from_millis(1000), TestSize::Large ; "medium threshold")]
    #[test_case(Duration::from_secs(3600), TestSize::Large ; "an hour")]
    fn for_run_time(run_time: Duration, expected: TestSize) {
        assert_eq!(TestSize::for_run_time(run_time), expected);
    }

    #[test]
    fn names_and_annotations() {
        assert_eq!(TestSize::from_name("small"), TestSize::Small);
        assert_eq!(TestSize::from_name("large"), TestSize::Large);
        assert_eq!(TestSize::from_name("Small"), TestSize::None);
        assert_eq!(TestSize::from_name(""), TestSize::None);

        assert!(TestSize::is_any_test_size("androidx.test.filters.MediumTest"));
        assert!(TestSize::is_any_test_size(
            "android.test.suitebuilder.annotation.LargeTest"
        ));
        assert!(!TestSize::is_any_test_size("androidx.test.filters.FlakyTest"));
    }

    #[test]
    fn ordering() {
        assert!(TestSize::Small < TestSize::Medium);
        assert!(TestSize::Medium < TestSize::Large);
        assert_eq!(TestSize::None.partial_cmp(&TestSize::Small), None);
        assert_eq!(
            TestSize::None.partial_cmp(&TestSize::None),
            Some(Ordering::Equal)
        );
    }
}
