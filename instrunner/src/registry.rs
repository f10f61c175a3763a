// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The registry of test classes.
//!
//! A [`TestRegistry`] stands in for a class loader: classes are registered up front, with their
//! shape, annotations and methods, and runners are later built by looking classes up by name.

use crate::{
    annotation::{Annotation, AnnotationSet},
    errors::ClassLoadError,
};
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use instrunner_metadata::TestIdentifier;
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// The runner named by `@RunWith(org.junit.runners.Suite.class)`.
pub const SUITE_RUNNER: &str = "org.junit.runners.Suite";

/// The runner named by `@RunWith(org.junit.runners.JUnit4.class)`.
pub const JUNIT4_RUNNER: &str = "org.junit.runners.JUnit4";

/// The runner named by `@RunWith(AndroidJUnit4.class)`.
pub const ANDROID_JUNIT4_RUNNER: &str = "androidx.test.ext.junit.runners.AndroidJUnit4";

/// The deprecated location of [`ANDROID_JUNIT4_RUNNER`].
pub const LEGACY_ANDROID_JUNIT4_RUNNER: &str = "androidx.test.runner.AndroidJUnit4";

/// The body of a test method.
pub type TestBody = Arc<dyn Fn() -> Result<(), TestFailure> + Send + Sync>;

/// The reason a test body did not pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestFailure {
    kind: TestFailureKind,
    message: String,
}

/// The kind of a [`TestFailure`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestFailureKind {
    /// An assertion failed or the body returned an error.
    Failure,

    /// An assumption was violated. The test counts as neither passed nor failed.
    AssumptionViolated,
}

impl TestFailure {
    /// Creates a regular failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: TestFailureKind::Failure,
            message: message.into(),
        }
    }

    /// Creates an assumption failure.
    pub fn assumption(message: impl Into<String>) -> Self {
        Self {
            kind: TestFailureKind::AssumptionViolated,
            message: message.into(),
        }
    }

    /// Returns the kind of failure.
    pub fn kind(&self) -> TestFailureKind {
        self.kind
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A method declared on a test class.
#[derive(Clone, Debug)]
pub struct MethodDef {
    name: String,
    annotations: AnnotationSet,
    body: Option<DebugIgnore<TestBody>>,
}

impl MethodDef {
    /// Creates a method with no annotations and a body that passes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: AnnotationSet::new(),
            body: None,
        }
    }

    /// Creates a JUnit4 test method: one annotated with `@Test`.
    pub fn test(name: impl Into<String>) -> Self {
        Self::new(name).with_marker(crate::annotation::TEST)
    }

    /// Adds an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    /// Adds a marker annotation by name.
    pub fn with_marker(self, name: impl Into<String>) -> Self {
        self.with_annotation(Annotation::marker(name))
    }

    /// Sets the body of this method.
    pub fn with_body(
        mut self,
        body: impl Fn() -> Result<(), TestFailure> + Send + Sync + 'static,
    ) -> Self {
        self.body = Some(DebugIgnore(Arc::new(body)));
        self
    }

    /// Sets the body of this method to one that always fails with `message`.
    pub fn failing(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.with_body(move || Err(TestFailure::new(message.clone())))
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the method's annotations.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Runs the body on the current thread. A panic is reported as a failure.
    pub fn invoke(&self) -> Result<(), TestFailure> {
        let Some(body) = &self.body else {
            return Ok(());
        };
        match panic::catch_unwind(AssertUnwindSafe(|| (body.0)())) {
            Ok(result) => result,
            Err(payload) => Err(TestFailure::new(panic_message(payload.as_ref()))),
        }
    }

    /// Returns a thread-safe handle to this method's body, if it has one.
    pub(crate) fn body(&self) -> Option<TestBody> {
        self.body.as_ref().map(|body| Arc::clone(&body.0))
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_owned()
    }
}

/// How test methods are discovered within a class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ClassShape {
    /// A JUnit4-style class: test methods are annotated with `@Test`.
    #[default]
    Plain,

    /// A JUnit3 `TestCase` subclass: test methods are named `test*`.
    TestCase,

    /// The class names its own runner.
    RunWith(RunWith),
}

/// The runner named by a `@RunWith` annotation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunWith {
    /// `@RunWith(Suite.class)` with the listed `@SuiteClasses`.
    Suite(Vec<String>),

    /// `@RunWith(JUnit4.class)`.
    JUnit4,

    /// `@RunWith(AndroidJUnit4.class)`.
    AndroidJUnit4,

    /// Any other runner, resolved through the plugin registry.
    Custom(String),
}

impl RunWith {
    /// Maps a runner class name to a `RunWith`.
    pub fn from_runner_name(name: &str, suite_classes: Vec<String>) -> Self {
        match name {
            SUITE_RUNNER => Self::Suite(suite_classes),
            JUNIT4_RUNNER => Self::JUnit4,
            ANDROID_JUNIT4_RUNNER | LEGACY_ANDROID_JUNIT4_RUNNER => Self::AndroidJUnit4,
            other => Self::Custom(other.to_owned()),
        }
    }
}

/// What a JUnit3 static `suite()` method returns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SuiteSource {
    /// A `TestSuite` aggregating the given `TestCase` classes.
    Suite(Vec<String>),

    /// Some other `Test` implementation, which can't be run.
    Direct(TestIdentifier),
}

/// A registered test class.
#[derive(Clone, Debug)]
pub struct ClassDef {
    name: String,
    superclass: Option<String>,
    annotations: AnnotationSet,
    shape: ClassShape,
    suite_method: Option<SuiteSource>,
    methods: Vec<MethodDef>,
    init_error: Option<String>,
}

impl ClassDef {
    /// Creates a plain class with no annotations or methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            annotations: AnnotationSet::new(),
            shape: ClassShape::Plain,
            suite_method: None,
            methods: Vec::new(),
            init_error: None,
        }
    }

    /// Sets the superclass.
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Sets the shape.
    pub fn with_shape(mut self, shape: ClassShape) -> Self {
        self.shape = shape;
        self
    }

    /// Adds a static `suite()` method.
    pub fn with_suite_method(mut self, source: SuiteSource) -> Self {
        self.suite_method = Some(source);
        self
    }

    /// Adds a class-level annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    /// Adds a class-level marker annotation by name.
    pub fn with_marker(self, name: impl Into<String>) -> Self {
        self.with_annotation(Annotation::marker(name))
    }

    /// Adds a method.
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Marks the class as failing to initialize.
    pub fn with_init_error(mut self, message: impl Into<String>) -> Self {
        self.init_error = Some(message.into());
        self
    }

    /// Returns the fully-qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the superclass name.
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Returns the annotations declared on this class, not including inherited ones.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Returns the shape declared on this class.
    pub fn shape(&self) -> &ClassShape {
        &self.shape
    }

    /// Returns the static `suite()` method, if any.
    pub fn suite_method(&self) -> Option<&SuiteSource> {
        self.suite_method.as_ref()
    }

    /// Returns the methods declared on this class, not including inherited ones.
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }
}

/// A class resolved against its superclass chain.
#[derive(Clone, Debug)]
pub struct LoadedClass {
    def: Arc<ClassDef>,
    annotations: AnnotationSet,
    shape: ClassShape,
    methods: Vec<MethodDef>,
}

impl LoadedClass {
    /// Returns the fully-qualified class name.
    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Returns the class's own definition.
    pub fn def(&self) -> &ClassDef {
        &self.def
    }

    /// Returns the class's annotations, including those inherited from superclasses.
    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Returns the effective shape.
    ///
    /// `@RunWith` is inherited from the nearest class that declares it. Otherwise a class is a
    /// `TestCase` if any class in its chain is.
    pub fn shape(&self) -> &ClassShape {
        &self.shape
    }

    /// Returns the static `suite()` method declared on this class.
    pub fn suite_method(&self) -> Option<&SuiteSource> {
        self.def.suite_method()
    }

    /// Returns every method visible on this class. Superclass methods come first, and a method
    /// redeclared in a subclass replaces the superclass's in place.
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }
}

/// The set of classes available to a test run.
#[derive(Clone, Debug, Default)]
pub struct TestRegistry {
    classes: IndexMap<String, Arc<ClassDef>>,
}

impl TestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, returning the class it replaced, if any.
    pub fn register(&mut self, class: ClassDef) -> Option<Arc<ClassDef>> {
        self.classes.insert(class.name().to_owned(), Arc::new(class))
    }

    /// Returns true if a class with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns the definition of a class.
    pub fn get(&self, name: &str) -> Option<&Arc<ClassDef>> {
        self.classes.get(name)
    }

    /// Iterates over the names of all registered classes, in registration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(|name| name.as_str())
    }

    /// Returns the number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Loads a class, resolving its superclass chain.
    pub fn load(&self, name: &str) -> Result<LoadedClass, ClassLoadError> {
        let def = self.load_def(name)?;

        // Collect the chain from the class up to its root.
        let mut chain = vec![Arc::clone(&def)];
        let mut current = Arc::clone(&def);
        while let Some(superclass) = current.superclass() {
            if chain.iter().any(|c| c.name() == superclass) {
                return Err(ClassLoadError::SuperclassCycle {
                    name: name.to_owned(),
                });
            }
            let next = self.load_def(superclass)?;
            chain.push(Arc::clone(&next));
            current = next;
        }

        let mut annotations = AnnotationSet::new();
        for class in &chain {
            annotations.inherit_from(class.annotations());
        }

        let shape = chain
            .iter()
            .find_map(|class| match class.shape() {
                ClassShape::RunWith(run_with) => Some(ClassShape::RunWith(run_with.clone())),
                _ => None,
            })
            .unwrap_or_else(|| {
                if chain.iter().any(|c| *c.shape() == ClassShape::TestCase) {
                    ClassShape::TestCase
                } else {
                    ClassShape::Plain
                }
            });

        let mut methods: Vec<MethodDef> = Vec::new();
        for class in chain.iter().rev() {
            for method in class.methods() {
                match methods.iter_mut().find(|m| m.name() == method.name()) {
                    Some(existing) => *existing = method.clone(),
                    None => methods.push(method.clone()),
                }
            }
        }

        Ok(LoadedClass {
            def,
            annotations,
            shape,
            methods,
        })
    }

    fn load_def(&self, name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        let def = self
            .classes
            .get(name)
            .ok_or_else(|| ClassLoadError::NotFound {
                name: name.to_owned(),
            })?;
        if let Some(message) = &def.init_error {
            return Err(ClassLoadError::Initialization {
                name: name.to_owned(),
                message: message.clone(),
            });
        }
        Ok(Arc::clone(def))
    }
}
