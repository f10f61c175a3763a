// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::TestIdentifier;
use serde::{Deserialize, Serialize};

/// The registration-phase description of a set of test classes.
///
/// A manifest is produced by whatever tool compiles the tests, and stands in for runtime
/// reflection: every class, method and annotation instrunner filters on is listed here.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestManifest {
    /// The classes in this manifest.
    #[serde(default)]
    pub classes: Vec<ManifestClass>,
}

impl TestManifest {
    /// Parses a manifest from JSON.
    pub fn parse_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A single class in a [`TestManifest`].
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestClass {
    /// The fully-qualified class name.
    pub name: String,

    /// The fully-qualified name of the superclass, if it is itself listed in the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,

    /// How test methods are discovered within this class.
    #[serde(default)]
    pub kind: ManifestClassKind,

    /// The runner named by a `@RunWith` annotation on the class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_with: Option<String>,

    /// The classes listed in `@SuiteClasses`, used when `run_with` names the suite runner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suite_classes: Vec<String>,

    /// What a static `suite()` method on this class returns, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_method: Option<ManifestSuiteMethod>,

    /// Class-level annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ManifestAnnotation>,

    /// Methods declared on this class.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<ManifestMethod>,

    /// Set if loading this class fails, for example because its static initializer throws.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_error: Option<String>,
}

/// How test methods are discovered within a [`ManifestClass`].
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestClassKind {
    /// A JUnit4-style class: test methods carry `@Test`.
    #[default]
    Plain,

    /// A JUnit3 `TestCase` subclass: test methods are named `test*`.
    TestCase,
}

/// The value returned by a JUnit3 static `suite()` method.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(tag = "returns", rename_all = "kebab-case")]
pub enum ManifestSuiteMethod {
    /// A `TestSuite` aggregating the given `TestCase` classes.
    TestSuite {
        /// The aggregated classes.
        #[serde(default)]
        classes: Vec<String>,
    },

    /// A custom `Test` implementation that is not a `TestSuite`.
    Test {
        /// The test the custom implementation represents.
        test: TestIdentifier,
    },
}

/// An annotation on a class or method.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum ManifestAnnotation {
    /// A marker annotation, identified by its fully-qualified name.
    Marker(String),

    /// An `@SdkSuppress` annotation.
    SdkSuppress {
        /// The annotation's parameters.
        #[serde(rename = "sdk-suppress")]
        sdk_suppress: ManifestSdkSuppress,
    },
}

/// Parameters of an `@SdkSuppress` annotation. Missing values take the annotation's defaults.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestSdkSuppress {
    /// The minimum SDK version to run on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sdk_version: Option<i32>,

    /// The maximum SDK version to run on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sdk_version: Option<i32>,

    /// A pre-release codename to run on regardless of the SDK range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,

    /// SDK versions to skip even when inside the range.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_sdks: Vec<i32>,
}

/// A method declared on a [`ManifestClass`].
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestMethod {
    /// The method name.
    pub name: String,

    /// Method-level annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ManifestAnnotation>,

    /// A recorded failure message, replayed when the method is run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_manifest() {
        let json = indoc! {r#"
            {
                "classes": [
                    {
                        "name": "com.example.FooTest",
                        "annotations": ["androidx.test.filters.SmallTest"],
                        "methods": [
                            { "name": "testFoo", "annotations": ["org.junit.Test"] },
                            {
                                "name": "testNew",
                                "annotations": [
                                    "org.junit.Test",
                                    { "sdk-suppress": { "min-sdk-version": 30, "excluded-sdks": [31] } }
                                ],
                                "failure": "boom"
                            }
                        ]
                    },
                    {
                        "name": "com.example.LegacySuite",
                        "kind": "test-case",
                        "suite-method": { "returns": "test-suite", "classes": ["com.example.Old"] }
                    },
                    {
                        "name": "com.example.Custom",
                        "suite-method": { "returns": "test", "test": "com.example.Custom#run" }
                    }
                ]
            }
        "#};

        let manifest = TestManifest::parse_json(json).expect("manifest parses");
        assert_eq!(manifest.classes.len(), 3);

        let foo = &manifest.classes[0];
        assert_eq!(foo.kind, ManifestClassKind::Plain);
        assert_eq!(
            foo.annotations,
            vec![ManifestAnnotation::Marker(
                "androidx.test.filters.SmallTest".to_owned()
            )]
        );
        assert_eq!(
            foo.methods[1].annotations[1],
            ManifestAnnotation::SdkSuppress {
                sdk_suppress: ManifestSdkSuppress {
                    min_sdk_version: Some(30),
                    excluded_sdks: vec![31],
                    ..Default::default()
                }
            }
        );
        assert_eq!(foo.methods[1].failure.as_deref(), Some("boom"));

        assert_eq!(manifest.classes[1].kind, ManifestClassKind::TestCase);
        assert_eq!(
            manifest.classes[1].suite_method,
            Some(ManifestSuiteMethod::TestSuite {
                classes: vec!["com.example.Old".to_owned()]
            })
        );
        assert_eq!(
            manifest.classes[2].suite_method,
            Some(ManifestSuiteMethod::Test {
                test: TestIdentifier::method("com.example.Custom", "run")
            })
        );
    }
}
