// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample test classes shared by unit tests.

use crate::{
    annotation::{Annotation, IGNORE, REQUIRES_DEVICE, SUPPRESS, SdkSuppress},
    registry::{ClassDef, ClassShape, MethodDef, RunWith, SuiteSource, TestFailure, TestRegistry},
};
use camino::{Utf8Path, Utf8PathBuf};
use instrunner_metadata::TestIdentifier;
use std::fs;

pub(crate) const SMALL_TEST: &str = "androidx.test.filters.SmallTest";
pub(crate) const MEDIUM_TEST: &str = "androidx.test.filters.MediumTest";
pub(crate) const PLATFORM_SMALL_TEST: &str = "android.test.suitebuilder.annotation.SmallTest";
pub(crate) const MY_ANNOTATION: &str = "androidx.test.MyAnnotation";

pub(crate) const TEST_CASE: &str = "junit.framework.TestCase";
pub(crate) const SAMPLE_JUNIT4: &str = "androidx.test.SampleJUnit4Test";
pub(crate) const SAMPLE_SIZE: &str = "androidx.test.SampleRunnerFilterSizeTest";
pub(crate) const SAMPLE_CLASS_SIZE: &str = "androidx.test.SampleClassSize";
pub(crate) const SAMPLE_JUNIT3: &str = "androidx.test.SampleJUnit3Test";
pub(crate) const SAMPLE_JUNIT3_SUITE_METHOD: &str = "androidx.test.SampleJUnit3SuiteMethod";
pub(crate) const SAMPLE_ALL_TESTS: &str = "androidx.test.SampleAllTests";
pub(crate) const SAMPLE_RUN_WITH_SUITE: &str = "androidx.test.SampleRunWithSuite";
pub(crate) const SAMPLE_SDK_SUPPRESS: &str = "androidx.test.SampleSdkSuppress";
pub(crate) const SAMPLE_REQUIRES_DEVICE: &str = "androidx.test.SampleRequiresDevice";
pub(crate) const SAMPLE_IGNORED_CLASS: &str = "androidx.test.SampleIgnoredClass";
pub(crate) const SAMPLE_ANNOTATED: &str = "androidx.test.SampleAnnotated";
pub(crate) const SAMPLE_PARAMETERIZED: &str = "androidx.test.SampleParameterized";
pub(crate) const SAMPLE_FAILING: &str = "androidx.test.SampleFailing";
pub(crate) const SAMPLE_NO_TESTS: &str = "androidx.test.SampleNoTests";
pub(crate) const SAMPLE_INIT_ERROR: &str = "androidx.test.SampleInitError";
pub(crate) const SAMPLE_INNER: &str = "androidx.test.SampleJUnit4Test$Inner";
pub(crate) const PKG1_TEST: &str = "androidx.test.pkg1.Pkg1Test";
pub(crate) const PKG2_TEST: &str = "androidx.test.pkg2.Pkg2Test";
pub(crate) const JUNIT_INTERNAL: &str = "org.junit.internal.SampleInternalTest";

/// Returns a registry with the sample classes.
pub(crate) fn fixture_registry() -> TestRegistry {
    let mut registry = TestRegistry::new();

    registry.register(ClassDef::new(TEST_CASE).with_shape(ClassShape::TestCase));
    registry.register(
        ClassDef::new(SAMPLE_JUNIT4)
            .with_method(MethodDef::test("testOne"))
            .with_method(MethodDef::test("testTwo")),
    );
    registry.register(ClassDef::new(SAMPLE_INNER).with_method(MethodDef::test("testInner")));
    registry.register(
        ClassDef::new(SAMPLE_SIZE)
            .with_method(MethodDef::test("testSmall").with_marker(SMALL_TEST))
            .with_method(MethodDef::test("testOther")),
    );
    registry.register(
        ClassDef::new(SAMPLE_CLASS_SIZE)
            .with_marker(MEDIUM_TEST)
            .with_method(MethodDef::test("testMethodSizeSmall").with_marker(PLATFORM_SMALL_TEST))
            .with_method(MethodDef::test("testMethodNoSize"))
            .with_method(
                MethodDef::test("testSuppressed")
                    .with_marker(SMALL_TEST)
                    .with_marker(SUPPRESS),
            ),
    );
    registry.register(
        ClassDef::new(SAMPLE_JUNIT3)
            .with_superclass(TEST_CASE)
            .with_method(MethodDef::new("setUp"))
            .with_method(MethodDef::new("testSmall").with_marker(SMALL_TEST))
            .with_method(MethodDef::new("testMedium").with_marker(MEDIUM_TEST))
            .with_method(MethodDef::new("testFoo")),
    );
    registry.register(
        ClassDef::new(SAMPLE_JUNIT3_SUITE_METHOD)
            .with_suite_method(SuiteSource::Direct(TestIdentifier::class(
                "androidx.test.SampleCustomTest",
            )))
            .with_superclass(TEST_CASE)
            .with_method(MethodDef::new("testFromSuite").failing("must not run")),
    );
    registry.register(
        ClassDef::new(SAMPLE_ALL_TESTS)
            .with_suite_method(SuiteSource::Suite(vec![SAMPLE_JUNIT3.to_owned()])),
    );
    registry.register(
        ClassDef::new(SAMPLE_RUN_WITH_SUITE).with_shape(ClassShape::RunWith(RunWith::Suite(
            vec![SAMPLE_JUNIT4.to_owned(), SAMPLE_SIZE.to_owned()],
        ))),
    );
    registry.register(
        ClassDef::new(SAMPLE_SDK_SUPPRESS)
            .with_method(
                MethodDef::test("testMin30")
                    .with_annotation(Annotation::SdkSuppress(SdkSuppress::min(30))),
            )
            .with_method(
                MethodDef::test("testMax28")
                    .with_annotation(Annotation::SdkSuppress(SdkSuppress::max(28))),
            )
            .with_method(MethodDef::test("testAnySdk")),
    );
    registry.register(
        ClassDef::new(SAMPLE_REQUIRES_DEVICE)
            .with_method(MethodDef::test("testRequiresDevice").with_marker(REQUIRES_DEVICE))
            .with_method(MethodDef::test("testAnyDevice")),
    );
    registry.register(
        ClassDef::new(SAMPLE_IGNORED_CLASS)
            .with_marker(IGNORE)
            .with_method(MethodDef::test("testIgnored").failing("must not run")),
    );
    registry.register(
        ClassDef::new(SAMPLE_ANNOTATED)
            .with_method(MethodDef::test("testMarked").with_marker(MY_ANNOTATION))
            .with_method(MethodDef::test("testUnmarked")),
    );
    registry.register(
        ClassDef::new(SAMPLE_PARAMETERIZED)
            .with_method(MethodDef::test("testParam[0]"))
            .with_method(MethodDef::test("testParam[1]"))
            .with_method(MethodDef::test("testOther")),
    );
    registry.register(
        ClassDef::new(SAMPLE_FAILING)
            .with_method(MethodDef::test("testPasses"))
            .with_method(MethodDef::test("testFails").failing("expected:<1> but was:<2>"))
            .with_method(
                MethodDef::test("testAssumption")
                    .with_body(|| Err(TestFailure::assumption("got: <false>, expected: is <true>"))),
            )
            .with_method(MethodDef::test("testIgnoredMethod").with_marker(IGNORE)),
    );
    registry.register(ClassDef::new(SAMPLE_NO_TESTS).with_method(MethodDef::new("helper")));
    registry.register(
        ClassDef::new(SAMPLE_INIT_ERROR)
            .with_init_error("java.lang.ExceptionInInitializerError")
            .with_method(MethodDef::test("testNeverRuns")),
    );
    registry.register(ClassDef::new(PKG1_TEST).with_method(MethodDef::test("testPkg1")));
    registry.register(ClassDef::new(PKG2_TEST).with_method(MethodDef::test("testPkg2")));
    registry.register(ClassDef::new(JUNIT_INTERNAL).with_method(MethodDef::test("testInternal")));

    registry
}

/// Writes a class index listing `class_names` to `dir`, returning its path.
pub(crate) fn write_class_index<'a>(
    dir: &Utf8Path,
    class_names: impl IntoIterator<Item = &'a str>,
) -> Utf8PathBuf {
    let path = dir.join("classes.txt");
    let mut contents = String::new();
    for name in class_names {
        contents.push_str(name);
        contents.push('\n');
    }
    fs::write(&path, contents).expect("wrote class index");
    path
}
