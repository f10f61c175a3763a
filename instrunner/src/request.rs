// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building a [`Request`] from a set of selection criteria.
//!
//! [`TestRequestBuilder`] accumulates inclusions, exclusions and filters, then resolves them into
//! a tree of runners plus a single composed filter. The candidate classes come either from the
//! explicitly included classes or, if there are none, from a class path scan.

use crate::{
    annotation::{PLATFORM_SUPPRESS, SUPPRESS},
    classpath::{
        ChainedClassNameFilter, ClassNameFilter, ClassPathScanner, ExcludeClassNamesFilter,
        ExcludePackageNameFilter, ExternalClassNameFilter, InclusivePackageNamesFilter,
    },
    description::Description,
    device::DeviceBuild,
    errors::TestRequestBuilderError,
    filter::{
        AllOfFilter, AnnotationExclusionFilter, AnnotationInclusionFilter, ClassAndMethodFilter,
        Filter, RequiresDeviceFilter, SdkSuppressFilter, ShardingFilter, SizeFilter,
        TestsRegexFilter,
    },
    loader::TestLoader,
    plugin::{PluginRegistry, RunnerBuilderClass},
    registry::TestRegistry,
    runner::{BlankRunner, Runner, SuiteRunner, apply_filter},
    runner_args::RunnerArgs,
    runner_builder::{AndroidRunnerBuilder, RunnerParams},
    test_size::TestSize,
};
use camino::Utf8PathBuf;
use indexmap::IndexSet;
use regex::Regex;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info};

/// Packages that are never scanned for tests unless explicitly included.
pub const DEFAULT_EXCLUDED_PACKAGES: &[&str] = &[
    "junit",
    "org.junit",
    "org.hamcrest",
    // Mockito and its dependencies cause class loading problems.
    "org.mockito",
    "androidx.test.internal.runner.junit3",
    "org.jacoco",
    "net.bytebuddy",
];

/// The display name of the suite at the root of every request.
pub const ROOT_SUITE_NAME: &str = "All tests";

/// Accumulates test selection criteria and builds a [`Request`].
#[derive(Debug)]
pub struct TestRequestBuilder<'a> {
    registry: &'a TestRegistry,
    plugins: &'a PluginRegistry,
    device: Arc<dyn DeviceBuild>,
    paths_to_scan: IndexSet<Utf8PathBuf>,
    included_packages: IndexSet<String>,
    excluded_packages: IndexSet<String>,
    // Every explicitly named class, in load order, including those named by a single method.
    included_classes: IndexSet<String>,
    // Classes included as a whole.
    whole_classes: IndexSet<String>,
    excluded_classes: IndexSet<String>,
    class_method_filter: ClassAndMethodFilter,
    tests_regex: Option<String>,
    size: Option<TestSize>,
    included_annotations: IndexSet<String>,
    excluded_annotations: IndexSet<String>,
    sharding: Option<(u64, u64)>,
    custom_filters: Vec<Box<dyn Filter>>,
    custom_runner_builders: Vec<RunnerBuilderClass>,
    skip_execution: bool,
    per_test_timeout: Option<Duration>,
    ignore_suite_methods: bool,
}

impl<'a> TestRequestBuilder<'a> {
    /// Creates a builder that loads classes from `registry`, resolves custom runners through
    /// `plugins`, and evaluates device-dependent filters against `device`.
    pub fn new(
        registry: &'a TestRegistry,
        plugins: &'a PluginRegistry,
        device: Arc<dyn DeviceBuild>,
    ) -> Self {
        Self {
            registry,
            plugins,
            device,
            paths_to_scan: IndexSet::new(),
            included_packages: IndexSet::new(),
            excluded_packages: IndexSet::new(),
            included_classes: IndexSet::new(),
            whole_classes: IndexSet::new(),
            excluded_classes: IndexSet::new(),
            class_method_filter: ClassAndMethodFilter::new(),
            tests_regex: None,
            size: None,
            included_annotations: IndexSet::new(),
            excluded_annotations: IndexSet::new(),
            sharding: None,
            custom_filters: Vec::new(),
            custom_runner_builders: Vec::new(),
            skip_execution: false,
            per_test_timeout: None,
            ignore_suite_methods: false,
        }
    }

    /// Adds a class path entry to scan for tests if no classes are explicitly included.
    pub fn add_path_to_scan(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.paths_to_scan.insert(path.into());
        self
    }

    /// Adds several class path entries to scan.
    pub fn add_paths_to_scan<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        self.paths_to_scan.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Runs every test in a class.
    pub fn add_test_class(&mut self, class_name: impl Into<String>) -> &mut Self {
        let class_name = class_name.into();
        self.included_classes.insert(class_name.clone());
        self.whole_classes.insert(class_name);
        self
    }

    /// Excludes every test in a class.
    pub fn remove_test_class(&mut self, class_name: impl Into<String>) -> &mut Self {
        self.excluded_classes.insert(class_name.into());
        self
    }

    /// Runs a single test method. Its class is loaded too.
    ///
    /// Removing the class as a whole is not ambiguous: it excludes this method as well.
    pub fn add_test_method(&mut self, class_name: &str, method_name: &str) -> &mut Self {
        self.included_classes.insert(class_name.to_owned());
        self.class_method_filter.add_method(class_name, method_name);
        self
    }

    /// Excludes a single test method.
    pub fn remove_test_method(&mut self, class_name: &str, method_name: &str) -> &mut Self {
        self.class_method_filter.remove_method(class_name, method_name);
        self
    }

    /// Runs only tests within a package.
    pub fn add_test_package(&mut self, package: impl Into<String>) -> &mut Self {
        self.included_packages.insert(package.into());
        self
    }

    /// Excludes every test within a package.
    pub fn remove_test_package(&mut self, package: impl Into<String>) -> &mut Self {
        self.excluded_packages.insert(package.into());
        self
    }

    /// Runs only tests of the given size.
    ///
    /// [`TestSize::None`] is not a valid filter, and is logged and ignored.
    pub fn add_test_size_filter(&mut self, size: TestSize) -> &mut Self {
        if size == TestSize::None {
            error!("ignoring test size filter with no size");
        } else {
            self.size = Some(size);
        }
        self
    }

    /// Runs only tests annotated with `annotation`, or with any other included annotation.
    pub fn add_annotation_inclusion_filter(&mut self, annotation: impl Into<String>) -> &mut Self {
        self.included_annotations.insert(annotation.into());
        self
    }

    /// Skips tests annotated with `annotation`.
    pub fn add_annotation_exclusion_filter(&mut self, annotation: impl Into<String>) -> &mut Self {
        self.excluded_annotations.insert(annotation.into());
        self
    }

    /// Runs only the tests that belong to shard `shard_index` out of `num_shards`.
    ///
    /// [`build`](Self::build) fails unless `shard_index < num_shards`.
    pub fn add_sharding_filter(&mut self, num_shards: u64, shard_index: u64) -> &mut Self {
        self.sharding = Some((num_shards, shard_index));
        self
    }

    /// Adds a custom filter, evaluated after every built-in filter.
    pub fn add_filter(&mut self, filter: Box<dyn Filter>) -> &mut Self {
        self.custom_filters.push(filter);
        self
    }

    /// Runs only tests whose `Class#method` name matches `pattern`.
    pub fn set_tests_regex(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.tests_regex = Some(pattern.into());
        self
    }

    /// Adds a runner builder consulted before the built-in rules.
    pub fn add_custom_runner_builder_class(&mut self, class: RunnerBuilderClass) -> &mut Self {
        self.custom_runner_builders.push(class);
        self
    }

    /// Reports tests as started and finished without running them.
    pub fn set_skip_execution(&mut self, skip_execution: bool) -> &mut Self {
        self.skip_execution = skip_execution;
        self
    }

    /// Fails any test that runs for longer than `timeout`.
    pub fn set_per_test_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.per_test_timeout = Some(timeout);
        self
    }

    /// Ignores JUnit3 `suite()` methods, building runners from each class's own shape instead.
    ///
    /// Suite methods are always ignored while scanning.
    pub fn ignore_suite_methods(&mut self, ignore_suite_methods: bool) -> &mut Self {
        self.ignore_suite_methods = ignore_suite_methods;
        self
    }

    /// Adds every selection criterion from `args`.
    pub fn add_from_runner_args(&mut self, args: &RunnerArgs) -> &mut Self {
        for test in &args.tests {
            match &test.method_name {
                Some(method_name) => self.add_test_method(&test.class_name, method_name),
                None => self.add_test_class(test.class_name.as_str()),
            };
        }
        for test in &args.not_tests {
            match &test.method_name {
                Some(method_name) => self.remove_test_method(&test.class_name, method_name),
                None => self.remove_test_class(test.class_name.as_str()),
            };
        }
        for package in &args.test_packages {
            self.add_test_package(package.as_str());
        }
        for package in &args.not_test_packages {
            self.remove_test_package(package.as_str());
        }
        if let Some(name) = &args.test_size {
            match TestSize::from_name(name) {
                TestSize::None => error!("unrecognized test size `{name}`"),
                size => {
                    self.add_test_size_filter(size);
                }
            }
        }
        for annotation in &args.annotations {
            self.add_annotation_inclusion_filter(annotation.as_str());
        }
        for annotation in &args.not_annotations {
            self.add_annotation_exclusion_filter(annotation.as_str());
        }
        for filter in &args.filters {
            self.add_filter(Box::new(Arc::clone(filter)));
        }
        if let Some(timeout) = args.test_timeout.filter(|&timeout| timeout > 0) {
            self.set_per_test_timeout(Duration::from_millis(timeout));
        }
        if let (Some(num_shards), Some(shard_index)) = (args.num_shards, args.shard_index) {
            if num_shards > 0 && shard_index < num_shards {
                self.add_sharding_filter(num_shards, shard_index);
            }
        }
        if args.log_only {
            self.set_skip_execution(true);
        }
        for class in &args.runner_builder_classes {
            self.add_custom_runner_builder_class(class.clone());
        }
        if let Some(pattern) = &args.tests_regex {
            self.set_tests_regex(pattern.as_str());
        }
        self.add_paths_to_scan(args.classpath_to_scan.iter().cloned());
        self
    }

    /// Builds the request.
    ///
    /// Fails if there is nothing to run or scan, if a class is both included and excluded, if
    /// the sharding filter is out of range, if the tests regex is invalid, if a custom runner builder can't be created, or if scanning
    /// fails. Classes that can't be loaded are not an error: see [`TestLoader`].
    pub fn build(self) -> Result<Request, TestRequestBuilderError> {
        self.validate()?;

        let scanning = self.included_classes.is_empty();
        let params = RunnerParams::new()
            .with_per_test_timeout(self.per_test_timeout)
            .with_ignore_suite_methods(self.ignore_suite_methods || scanning);

        let custom_builders = self
            .custom_runner_builders
            .iter()
            .map(|class| class.instantiate())
            .collect::<Result<Vec<_>, _>>()?;
        let builder = AndroidRunnerBuilder::new(self.registry, self.plugins, params, scanning)
            .with_custom_builders(custom_builders)
            .with_skip_execution(self.skip_execution);

        let class_names = if scanning {
            self.class_names_from_class_path()?
        } else {
            self.explicit_class_names()
        };
        debug!("building runners for {} classes", class_names.len());

        let runners = TestLoader::new(builder).get_runners_for(&class_names);
        let filter = self.compose_filter()?;
        debug!("composed filter: {}", filter.describe());

        Ok(Request {
            runner: Box::new(SuiteRunner::new(Description::suite(ROOT_SUITE_NAME), runners)),
            filter,
        })
    }

    fn validate(&self) -> Result<(), TestRequestBuilderError> {
        if self.included_classes.is_empty() && self.paths_to_scan.is_empty() {
            return Err(TestRequestBuilderError::MissingArguments);
        }
        let ambiguous: Vec<_> = self
            .whole_classes
            .intersection(&self.excluded_classes)
            .cloned()
            .collect();
        if !ambiguous.is_empty() {
            return Err(TestRequestBuilderError::AmbiguousArguments { classes: ambiguous });
        }
        if let Some((num_shards, shard_index)) = self.sharding
            && shard_index >= num_shards
        {
            return Err(TestRequestBuilderError::InvalidSharding {
                num_shards,
                shard_index,
            });
        }
        Ok(())
    }

    fn package_filters(&self, filter: &mut ChainedClassNameFilter) {
        let included: Vec<_> = self
            .included_packages
            .iter()
            .filter(|package| !self.excluded_packages.contains(*package))
            .cloned()
            .collect();
        if !included.is_empty() {
            filter.add(InclusivePackageNamesFilter::new(included));
        }
        for package in &self.excluded_packages {
            filter.add(ExcludePackageNameFilter::new(package));
        }
    }

    // Explicit classes are narrowed by package filters, which is a logical AND of the two.
    // Excluded classes can only overlap with classes named by one of their methods here.
    fn explicit_class_names(&self) -> Vec<String> {
        let mut filter = ChainedClassNameFilter::new();
        self.package_filters(&mut filter);
        filter.add(ExcludeClassNamesFilter::new(
            self.excluded_classes.iter().cloned(),
        ));
        self.included_classes
            .iter()
            .filter(|class_name| {
                let accepted = filter.accept(class_name);
                if !accepted {
                    debug!("class {class_name} is excluded by package or class filters");
                }
                accepted
            })
            .cloned()
            .collect()
    }

    fn class_names_from_class_path(&self) -> Result<Vec<String>, TestRequestBuilderError> {
        info!(
            "scanning class path to find tests in paths {:?}",
            self.paths_to_scan
        );
        let scanner = ClassPathScanner::new(self.paths_to_scan.iter().cloned());

        let mut filter = ChainedClassNameFilter::new();
        filter.add(ExternalClassNameFilter);
        self.package_filters(&mut filter);
        for package in DEFAULT_EXCLUDED_PACKAGES {
            if !self.included_packages.contains(*package) {
                filter.add(ExcludePackageNameFilter::new(package));
            }
        }
        filter.add(ExcludeClassNamesFilter::new(
            self.excluded_classes.iter().cloned(),
        ));

        Ok(scanner.class_path_entries(&filter)?.into_iter().collect())
    }

    fn compose_filter(self) -> Result<AllOfFilter, TestRequestBuilderError> {
        let mut filter = AllOfFilter::new();
        filter.push(Box::new(self.class_method_filter));
        if let Some(pattern) = self.tests_regex {
            let regex = Regex::new(&pattern)
                .map_err(|err| TestRequestBuilderError::InvalidTestsRegex { pattern, err })?;
            filter.push(Box::new(TestsRegexFilter::new(regex)));
        }
        if let Some(size) = self.size {
            filter.push(Box::new(SizeFilter::new(size)));
        }
        if !self.included_annotations.is_empty() {
            filter.push(Box::new(AnnotationInclusionFilter::new(
                self.included_annotations,
            )));
        }
        for annotation in self.excluded_annotations {
            filter.push(Box::new(AnnotationExclusionFilter::new(annotation)));
        }
        filter.push(Box::new(AnnotationExclusionFilter::new(SUPPRESS)));
        filter.push(Box::new(AnnotationExclusionFilter::new(PLATFORM_SUPPRESS)));
        filter.push(Box::new(SdkSuppressFilter::new(Arc::clone(&self.device))));
        filter.push(Box::new(RequiresDeviceFilter::new(self.device)));
        if let Some((num_shards, shard_index)) = self.sharding {
            filter.push(Box::new(ShardingFilter::new(num_shards, shard_index)));
        }
        for custom in self.custom_filters {
            filter.push(custom);
        }
        Ok(filter)
    }
}

/// A tree of runners, plus the filter selecting which of their tests run.
#[derive(Debug)]
pub struct Request {
    runner: Box<dyn Runner>,
    filter: AllOfFilter,
}

impl Request {
    /// Returns the composed filter.
    pub fn filter(&self) -> &AllOfFilter {
        &self.filter
    }

    /// Returns the description of every test before filtering.
    pub fn unfiltered_description(&self) -> Description {
        self.runner.description()
    }

    /// Applies the filter and returns the runner.
    ///
    /// If the filter removes every test, returns a [`BlankRunner`] rather than an error.
    pub fn into_runner(self) -> Box<dyn Runner> {
        let Self { mut runner, filter } = self;
        match apply_filter(runner.as_mut(), &filter) {
            Ok(()) => runner,
            Err(_) => {
                debug!("filter removed every test");
                Box::new(BlankRunner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::FixedDeviceBuild,
        errors::PluginLoadError,
        plugin::Plugin,
        registry::LoadedClass,
        runner::{NO_TESTS_FOUND, RunNotifier},
        runner_builder::RunnerBuilder,
        test_helpers::*,
    };
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use test_strategy::proptest;

    fn device() -> Arc<dyn DeviceBuild> {
        Arc::new(FixedDeviceBuild::new(29, "walleye"))
    }

    fn selected_tests(builder: TestRequestBuilder<'_>) -> Vec<String> {
        let runner = builder.build().expect("request built").into_runner();
        runner
            .description()
            .tests()
            .map(|test| test.display_name().to_owned())
            .collect()
    }

    #[test]
    fn missing_arguments() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let builder = TestRequestBuilder::new(&registry, &plugins, device());
        let err = builder.build().unwrap_err();
        assert!(
            matches!(err, TestRequestBuilderError::MissingArguments),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn add_and_remove_same_class_is_ambiguous() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_JUNIT4)
            .remove_test_class(SAMPLE_JUNIT4);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "Ambiguous arguments: cannot both include and exclude test class(es) \
                 {SAMPLE_JUNIT4}"
            )
        );
    }

    #[test]
    fn add_method_and_remove_class_selects_nothing() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_method(SAMPLE_JUNIT4, "testOne")
            .remove_test_class(SAMPLE_JUNIT4);
        assert_eq!(selected_tests(builder), [NO_TESTS_FOUND]);
    }

    #[test]
    fn add_method_and_remove_class_keeps_other_classes() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_method(SAMPLE_JUNIT4, "testOne")
            .add_test_method(SAMPLE_SIZE, "testSmall")
            .remove_test_class(SAMPLE_JUNIT4);
        assert_eq!(selected_tests(builder), [format!("testSmall({SAMPLE_SIZE})")]);
    }

    #[test]
    fn invalid_sharding() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        for (num_shards, shard_index) in [(0, 0), (2, 2)] {
            let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
            builder
                .add_test_class(SAMPLE_JUNIT4)
                .add_sharding_filter(num_shards, shard_index);
            let err = builder.build().unwrap_err();
            assert!(
                matches!(
                    err,
                    TestRequestBuilderError::InvalidSharding { num_shards: n, shard_index: i }
                        if n == num_shards && i == shard_index
                ),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn add_one_method_remove_another() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_method(SAMPLE_JUNIT4, "testOne")
            .remove_test_method(SAMPLE_JUNIT4, "testTwo");
        assert_eq!(selected_tests(builder), [format!("testOne({SAMPLE_JUNIT4})")]);
    }

    #[test]
    fn remove_method_from_included_class() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_JUNIT4)
            .remove_test_method(SAMPLE_JUNIT4, "testOne");
        assert_eq!(selected_tests(builder), [format!("testTwo({SAMPLE_JUNIT4})")]);
    }

    #[test]
    fn size_filter_selects_annotated_method() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_SIZE)
            .add_test_size_filter(TestSize::Small);
        assert_eq!(selected_tests(builder), [format!("testSmall({SAMPLE_SIZE})")]);
    }

    #[test]
    fn method_size_overrides_class_size() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_CLASS_SIZE)
            .add_test_size_filter(TestSize::Medium);
        assert_eq!(
            selected_tests(builder),
            [format!("testMethodNoSize({SAMPLE_CLASS_SIZE})")]
        );

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_CLASS_SIZE)
            .add_test_size_filter(TestSize::Small);
        assert_eq!(
            selected_tests(builder),
            [format!("testMethodSizeSmall({SAMPLE_CLASS_SIZE})")],
            "suppressed small test is never selected"
        );
    }

    #[test]
    fn unrecognized_size_is_ignored() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_SIZE)
            .add_test_size_filter(TestSize::from_name("huge"));
        assert_eq!(selected_tests(builder).len(), 2);
    }

    #[test]
    fn suppressed_tests_are_always_excluded() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_method(SAMPLE_CLASS_SIZE, "testSuppressed")
            .add_test_size_filter(TestSize::Small)
            .add_annotation_inclusion_filter(SMALL_TEST);
        let runner = builder.build().expect("request built").into_runner();
        assert_eq!(runner.description().display_name(), NO_TESTS_FOUND);
    }

    #[test]
    fn annotation_filters() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_ANNOTATED)
            .add_annotation_inclusion_filter(MY_ANNOTATION);
        assert_eq!(selected_tests(builder), [format!("testMarked({SAMPLE_ANNOTATED})")]);

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_ANNOTATED)
            .add_annotation_exclusion_filter(MY_ANNOTATION);
        assert_eq!(
            selected_tests(builder),
            [format!("testUnmarked({SAMPLE_ANNOTATED})")]
        );
    }

    #[test]
    fn device_filters() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let emulator: Arc<dyn DeviceBuild> = Arc::new(FixedDeviceBuild::new(30, "ranchu"));

        let mut builder = TestRequestBuilder::new(&registry, &plugins, emulator);
        builder
            .add_test_class(SAMPLE_SDK_SUPPRESS)
            .add_test_class(SAMPLE_REQUIRES_DEVICE);
        assert_eq!(
            selected_tests(builder),
            [
                format!("testMin30({SAMPLE_SDK_SUPPRESS})"),
                format!("testAnySdk({SAMPLE_SDK_SUPPRESS})"),
                format!("testAnyDevice({SAMPLE_REQUIRES_DEVICE})"),
            ]
        );
    }

    #[test]
    fn tests_regex() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_JUNIT4)
            .add_test_class(SAMPLE_SIZE)
            .set_tests_regex("Size.*#testO");
        assert_eq!(selected_tests(builder), [format!("testOther({SAMPLE_SIZE})")]);

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_test_class(SAMPLE_JUNIT4).set_tests_regex("(");
        assert!(matches!(
            builder.build(),
            Err(TestRequestBuilderError::InvalidTestsRegex { .. })
        ));
    }

    #[test]
    fn packages_narrow_explicit_classes() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(PKG1_TEST)
            .add_test_class(PKG2_TEST)
            .add_test_package("androidx.test.pkg1");
        assert_eq!(selected_tests(builder), [format!("testPkg1({PKG1_TEST})")]);
    }

    #[test]
    fn explicit_missing_class_fails_single_test() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_test_class("androidx.test.DoesNotExist");
        assert_eq!(
            selected_tests(builder),
            ["initializationError(androidx.test.DoesNotExist)"]
        );
    }

    #[test]
    fn direct_suite_method_fails_in_both_modes() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        for skip_execution in [false, true] {
            let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
            builder
                .add_test_class(SAMPLE_JUNIT3_SUITE_METHOD)
                .set_skip_execution(skip_execution);
            let runner = builder.build().expect("request built").into_runner();
            let mut notifier = RunNotifier::new();
            runner.run(&mut notifier);
            let result = notifier.result();
            assert_eq!(result.failure_count(), 1, "skip_execution={skip_execution}");
            assert!(
                result.failures[0]
                    .message()
                    .contains("did not return a TestSuite"),
                "unexpected message: {}",
                result.failures[0].message()
            );
        }
    }

    #[test]
    fn skip_execution_preserves_description() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let build = |skip_execution| {
            let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
            builder
                .add_test_class(SAMPLE_JUNIT4)
                .add_test_class(SAMPLE_JUNIT3)
                .add_test_class(SAMPLE_FAILING)
                .add_test_class(SAMPLE_RUN_WITH_SUITE)
                .set_skip_execution(skip_execution);
            builder.build().expect("request built").into_runner().description()
        };
        assert_eq!(build(true), build(false));
    }

    #[test]
    fn scan_applies_package_and_default_exclusions() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let dir = Utf8TempDir::new().expect("created temp dir");
        let index = write_class_index(
            dir.path(),
            [
                TEST_CASE,
                JUNIT_INTERNAL,
                SAMPLE_JUNIT4,
                SAMPLE_INNER,
                PKG1_TEST,
                PKG2_TEST,
                "androidx.test.pkg1.Missing",
            ],
        );

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_path_to_scan(&index);
        assert_eq!(
            selected_tests(builder),
            [
                format!("testOne({SAMPLE_JUNIT4})"),
                format!("testTwo({SAMPLE_JUNIT4})"),
                format!("testPkg1({PKG1_TEST})"),
                format!("testPkg2({PKG2_TEST})"),
            ]
        );

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_path_to_scan(&index)
            .add_test_package("androidx.test")
            .remove_test_package("androidx.test.pkg2")
            .remove_test_class(SAMPLE_JUNIT4);
        assert_eq!(selected_tests(builder), [format!("testPkg1({PKG1_TEST})")]);

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_path_to_scan(&index).add_test_package("org.junit");
        assert_eq!(
            selected_tests(builder),
            [format!("testInternal({JUNIT_INTERNAL})")]
        );
    }

    #[test]
    fn scan_error_propagates() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let dir = Utf8TempDir::new().expect("created temp dir");
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_path_to_scan(dir.path().join("missing.txt"));
        assert!(matches!(
            builder.build(),
            Err(TestRequestBuilderError::Scan(_))
        ));
    }

    #[test]
    fn scanning_ignores_suite_methods() {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let dir = Utf8TempDir::new().expect("created temp dir");
        let index = write_class_index(dir.path(), [SAMPLE_ALL_TESTS, SAMPLE_NO_TESTS]);

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_path_to_scan(&index);
        let runner = builder.build().expect("request built").into_runner();
        assert_eq!(runner.description().display_name(), NO_TESTS_FOUND);

        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder.add_test_class(SAMPLE_ALL_TESTS);
        assert_eq!(
            selected_tests(builder),
            [
                format!("testSmall({SAMPLE_JUNIT3})"),
                format!("testMedium({SAMPLE_JUNIT3})"),
                format!("testFoo({SAMPLE_JUNIT3})"),
            ]
        );
    }

    #[derive(Debug)]
    struct NoOpBuilder;

    impl RunnerBuilder for NoOpBuilder {
        fn runner_for_class(&self, _class: &LoadedClass) -> Option<Box<dyn Runner>> {
            None
        }
    }

    #[test]
    fn custom_runner_builder_errors_at_build() {
        let registry = fixture_registry();
        let mut plugins = PluginRegistry::new();
        plugins
            .register("com.example.NoOpBuilder", Plugin::runner_builder(|| NoOpBuilder))
            .register(
                "com.example.AbstractBuilder",
                Plugin::RunnerBuilder { constructor: None },
            );

        let ok = plugins
            .load_runner_builder("com.example.NoOpBuilder")
            .expect("builder loaded");
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_JUNIT4)
            .add_custom_runner_builder_class(ok);
        assert_eq!(selected_tests(builder).len(), 2);

        let broken = plugins
            .load_runner_builder("com.example.AbstractBuilder")
            .expect("builder class loaded");
        let mut builder = TestRequestBuilder::new(&registry, &plugins, device());
        builder
            .add_test_class(SAMPLE_JUNIT4)
            .add_custom_runner_builder_class(broken);
        assert!(matches!(
            builder.build(),
            Err(TestRequestBuilderError::PluginLoad(
                PluginLoadError::RunnerBuilderConstructor { .. }
            ))
        ));
    }

    const SHARDED_CLASSES: [&str; 5] = [
        SAMPLE_JUNIT4,
        SAMPLE_SIZE,
        SAMPLE_JUNIT3,
        SAMPLE_FAILING,
        SAMPLE_PARAMETERIZED,
    ];

    fn sharded_builder<'a>(
        registry: &'a TestRegistry,
        plugins: &'a PluginRegistry,
    ) -> TestRequestBuilder<'a> {
        let mut builder = TestRequestBuilder::new(registry, plugins, device());
        for class_name in SHARDED_CLASSES {
            builder.add_test_class(class_name);
        }
        builder
    }

    #[proptest(cases = 16)]
    fn shards_partition_tests(#[strategy(1u64..8)] num_shards: u64) {
        let registry = fixture_registry();
        let plugins = PluginRegistry::new();
        let all = selected_tests(sharded_builder(&registry, &plugins));

        let mut union = Vec::new();
        for shard_index in 0..num_shards {
            let mut builder = sharded_builder(&registry, &plugins);
            builder.add_sharding_filter(num_shards, shard_index);
            let runner = builder.build().expect("request built").into_runner();
            if runner.description().display_name() == NO_TESTS_FOUND {
                continue;
            }
            union.extend(
                runner
                    .description()
                    .tests()
                    .map(|test| test.display_name().to_owned()),
            );
        }

        let union_set: BTreeSet<_> = union.iter().cloned().collect();
        assert_eq!(union.len(), union_set.len(), "no test is in two shards");
        assert_eq!(union_set, all.into_iter().collect::<BTreeSet<_>>());
    }
}
