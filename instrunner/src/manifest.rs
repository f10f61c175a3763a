// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Populating a [`TestRegistry`] from a [`TestManifest`].

use crate::{
    annotation::Annotation,
    errors::ManifestError,
    registry::{
        ClassDef, ClassShape, MethodDef, RunWith, SUITE_RUNNER, SuiteSource, TestRegistry,
    },
};
use camino::Utf8Path;
use instrunner_metadata::{
    ManifestClass, ManifestClassKind, ManifestMethod, ManifestSuiteMethod, TestManifest,
};
use std::collections::HashSet;
use tracing::debug;

impl TestRegistry {
    /// Reads and parses the JSON manifest at `path`, and registers every class in it.
    pub fn from_manifest_path(path: &Utf8Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|err| ManifestError::Read {
            path: path.to_owned(),
            err,
        })?;
        let manifest = TestManifest::parse_json(&json).map_err(|err| ManifestError::Parse {
            path: path.to_owned(),
            err,
        })?;
        debug!(
            "loaded {} classes from test manifest at `{path}`",
            manifest.classes.len()
        );
        Self::from_manifest(&manifest)
    }

    /// Registers every class in `manifest`.
    ///
    /// Superclasses that aren't listed in the manifest are dropped, so that classes extending
    /// framework base classes still load.
    pub fn from_manifest(manifest: &TestManifest) -> Result<Self, ManifestError> {
        let listed: HashSet<&str> = manifest
            .classes
            .iter()
            .map(|class| class.name.as_str())
            .collect();

        let mut registry = TestRegistry::new();
        for class in &manifest.classes {
            let def = class_def(class, &listed)?;
            if registry.register(def).is_some() {
                return Err(ManifestError::DuplicateClass {
                    name: class.name.clone(),
                });
            }
        }
        Ok(registry)
    }
}

fn class_def(class: &ManifestClass, listed: &HashSet<&str>) -> Result<ClassDef, ManifestError> {
    let mut def = ClassDef::new(&class.name);

    if let Some(superclass) = &class.superclass {
        if listed.contains(superclass.as_str()) {
            def = def.with_superclass(superclass);
        } else {
            debug!(
                "class `{}` extends `{superclass}`, which isn't in the manifest",
                class.name
            );
        }
    }

    let shape = match (&class.run_with, class.kind) {
        (Some(runner), _) => {
            if runner == SUITE_RUNNER && class.suite_classes.is_empty() {
                return Err(ManifestError::EmptySuite {
                    name: class.name.clone(),
                });
            }
            ClassShape::RunWith(RunWith::from_runner_name(
                runner,
                class.suite_classes.clone(),
            ))
        }
        (None, ManifestClassKind::TestCase) => ClassShape::TestCase,
        (None, ManifestClassKind::Plain) => ClassShape::Plain,
    };
    def = def.with_shape(shape);

    match &class.suite_method {
        Some(ManifestSuiteMethod::TestSuite { classes }) => {
            def = def.with_suite_method(SuiteSource::Suite(classes.clone()));
        }
        Some(ManifestSuiteMethod::Test { test }) => {
            def = def.with_suite_method(SuiteSource::Direct(test.clone()));
        }
        None => {}
    }

    for annotation in &class.annotations {
        def = def.with_annotation(Annotation::from(annotation));
    }
    for method in &class.methods {
        def = def.with_method(method_def(method));
    }
    if let Some(message) = &class.init_error {
        def = def.with_init_error(message);
    }
    Ok(def)
}

fn method_def(method: &ManifestMethod) -> MethodDef {
    let mut def = MethodDef::new(&method.name);
    for annotation in &method.annotations {
        def = def.with_annotation(Annotation::from(annotation));
    }
    match &method.failure {
        Some(message) => def.failing(message),
        None => def,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::TEST,
        errors::ClassLoadError,
        registry::TestFailureKind,
    };
    use camino_tempfile::NamedUtf8TempFile;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const MANIFEST: &str = indoc! {r#"
        {
            "classes": [
                {
                    "name": "com.example.BaseTest",
                    "superclass": "java.lang.Object",
                    "annotations": ["androidx.test.filters.SmallTest"],
                    "methods": [{ "name": "testBase", "annotations": ["org.junit.Test"] }]
                },
                {
                    "name": "com.example.FooTest",
                    "superclass": "com.example.BaseTest",
                    "run-with": "androidx.test.ext.junit.runners.AndroidJUnit4",
                    "methods": [
                        { "name": "testFoo", "annotations": ["org.junit.Test"] },
                        {
                            "name": "testBroken",
                            "annotations": ["org.junit.Test"],
                            "failure": "expected:<1> but was:<2>"
                        }
                    ]
                },
                {
                    "name": "com.example.LegacyTest",
                    "superclass": "junit.framework.TestCase",
                    "kind": "test-case",
                    "methods": [{ "name": "testLegacy" }]
                },
                {
                    "name": "com.example.AllTests",
                    "run-with": "org.junit.runners.Suite",
                    "suite-classes": ["com.example.FooTest", "com.example.LegacyTest"]
                },
                {
                    "name": "com.example.BrokenTest",
                    "init-error": "java.lang.ExceptionInInitializerError"
                }
            ]
        }
    "#};

    fn registry() -> TestRegistry {
        let manifest = TestManifest::parse_json(MANIFEST).expect("manifest parses");
        TestRegistry::from_manifest(&manifest).expect("manifest is valid")
    }

    #[test]
    fn classes_resolve_against_superclasses() {
        let registry = registry();
        assert_eq!(registry.len(), 5);

        let foo = registry.load("com.example.FooTest").expect("FooTest loads");
        assert_eq!(foo.shape(), &ClassShape::RunWith(RunWith::AndroidJUnit4));
        assert!(foo.annotations().contains("androidx.test.filters.SmallTest"));
        let names: Vec<_> = foo.methods().iter().map(|method| method.name()).collect();
        assert_eq!(names, ["testBase", "testFoo", "testBroken"]);
        assert!(foo.methods()[1].annotations().contains(TEST));

        let failure = foo.methods()[2].invoke().unwrap_err();
        assert_eq!(failure.kind(), TestFailureKind::Failure);
        assert_eq!(failure.message(), "expected:<1> but was:<2>");
        assert_eq!(foo.methods()[1].invoke(), Ok(()));

        let legacy = registry
            .load("com.example.LegacyTest")
            .expect("LegacyTest loads without its framework superclass");
        assert_eq!(legacy.shape(), &ClassShape::TestCase);

        let suite = registry.load("com.example.AllTests").expect("AllTests loads");
        assert_eq!(
            suite.shape(),
            &ClassShape::RunWith(RunWith::Suite(vec![
                "com.example.FooTest".to_owned(),
                "com.example.LegacyTest".to_owned(),
            ]))
        );

        assert!(matches!(
            registry.load("com.example.BrokenTest"),
            Err(ClassLoadError::Initialization { .. })
        ));
    }

    #[test]
    fn duplicate_class() {
        let manifest = TestManifest::parse_json(indoc! {r#"
            { "classes": [{ "name": "com.example.A" }, { "name": "com.example.A" }] }
        "#})
        .expect("manifest parses");
        let err = TestRegistry::from_manifest(&manifest).unwrap_err();
        assert_eq!(
            err.to_string(),
            "class `com.example.A` is listed more than once in the test manifest"
        );
    }

    #[test]
    fn empty_suite() {
        let manifest = TestManifest::parse_json(indoc! {r#"
            { "classes": [{ "name": "com.example.A", "run-with": "org.junit.runners.Suite" }] }
        "#})
        .expect("manifest parses");
        assert!(matches!(
            TestRegistry::from_manifest(&manifest),
            Err(ManifestError::EmptySuite { .. })
        ));
    }

    #[test]
    fn from_path() {
        let mut file = NamedUtf8TempFile::new().expect("created temp file");
        file.write_all(MANIFEST.as_bytes()).expect("wrote manifest");
        let registry = TestRegistry::from_manifest_path(file.path()).expect("manifest loads");
        assert!(registry.contains("com.example.AllTests"));

        let err = TestRegistry::from_manifest_path(Utf8Path::new("/nonexistent/manifest.json"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }), "{err}");

        let mut bad = NamedUtf8TempFile::new().expect("created temp file");
        bad.write_all(b"{ not json").expect("wrote manifest");
        let err = TestRegistry::from_manifest_path(bad.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }), "{err}");
    }
}
