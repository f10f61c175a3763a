// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The table of named extensions that instrumentation arguments can refer to.
//!
//! Arguments such as `filter`, `runnerBuilder` and `listener` name their extensions by string.
//! Those names are resolved against a [`PluginRegistry`] populated at startup.

use crate::{
    bundle::Bundle,
    errors::PluginLoadError,
    filter::Filter,
    registry::LoadedClass,
    runner::{RunListener, Runner},
    runner_builder::RunnerBuilder,
};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};
use tracing::debug;

/// Creates a filter with no arguments.
pub type FilterFactory = Arc<dyn Fn() -> Arc<dyn Filter> + Send + Sync>;

/// Creates a filter from the instrumentation arguments.
pub type BundleFilterFactory = Arc<dyn Fn(&Bundle) -> Arc<dyn Filter> + Send + Sync>;

/// Creates a runner builder.
pub type RunnerBuilderFactory = Arc<dyn Fn() -> Box<dyn RunnerBuilder> + Send + Sync>;

/// Creates a run listener.
pub type RunListenerFactory = Arc<dyn Fn() -> Box<dyn RunListener> + Send + Sync>;

/// Creates a runner for a class annotated with `@RunWith` naming this plugin.
pub type RunnerFactory = Arc<dyn Fn(&LoadedClass) -> Box<dyn Runner> + Send + Sync>;

/// The kind of a [`Plugin`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PluginKind {
    /// A test filter.
    Filter,

    /// A runner builder.
    RunnerBuilder,

    /// A run listener.
    RunListener,

    /// A runner named by `@RunWith`.
    Runner,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Filter => "org.junit.runner.manipulation.Filter",
            Self::RunnerBuilder => "org.junit.runners.model.RunnerBuilder",
            Self::RunListener => "org.junit.runner.notification.RunListener",
            Self::Runner => "org.junit.runner.Runner",
        };
        f.write_str(name)
    }
}

/// A named extension.
///
/// Constructors are optional so that a plugin can be registered in a form that can't be
/// instantiated, mirroring classes without a usable constructor.
#[derive(Clone)]
pub enum Plugin {
    /// A test filter.
    Filter {
        /// Creates the filter with no arguments.
        no_arg: Option<FilterFactory>,

        /// Creates the filter from the instrumentation arguments, if there is no `no_arg`.
        with_bundle: Option<BundleFilterFactory>,
    },

    /// A runner builder, consulted before the built-in rules.
    RunnerBuilder {
        /// Creates the builder.
        constructor: Option<RunnerBuilderFactory>,
    },

    /// A run listener.
    RunListener {
        /// Creates the listener.
        constructor: Option<RunListenerFactory>,
    },

    /// A runner named by `@RunWith`.
    Runner(RunnerFactory),
}

impl Plugin {
    /// Creates a filter plugin with a no-argument constructor.
    pub fn filter<F>(constructor: impl Fn() -> F + Send + Sync + 'static) -> Self
    where
        F: Filter + 'static,
    {
        Self::Filter {
            no_arg: Some(Arc::new(move || Arc::new(constructor()) as Arc<dyn Filter>)),
            with_bundle: None,
        }
    }

    /// Creates a filter plugin constructed from the instrumentation arguments.
    pub fn bundle_filter<F>(constructor: impl Fn(&Bundle) -> F + Send + Sync + 'static) -> Self
    where
        F: Filter + 'static,
    {
        Self::Filter {
            no_arg: None,
            with_bundle: Some(Arc::new(move |bundle: &Bundle| {
                Arc::new(constructor(bundle)) as Arc<dyn Filter>
            })),
        }
    }

    /// Creates a runner builder plugin.
    pub fn runner_builder<B>(constructor: impl Fn() -> B + Send + Sync + 'static) -> Self
    where
        B: RunnerBuilder + 'static,
    {
        Self::RunnerBuilder {
            constructor: Some(Arc::new(move || {
                Box::new(constructor()) as Box<dyn RunnerBuilder>
            })),
        }
    }

    /// Creates a run listener plugin.
    pub fn run_listener<L>(constructor: impl Fn() -> L + Send + Sync + 'static) -> Self
    where
        L: RunListener + 'static,
    {
        Self::RunListener {
            constructor: Some(Arc::new(move || Box::new(constructor()) as Box<dyn RunListener>)),
        }
    }

    /// Creates a runner plugin.
    pub fn runner<R>(constructor: impl Fn(&LoadedClass) -> R + Send + Sync + 'static) -> Self
    where
        R: Runner + 'static,
    {
        Self::Runner(Arc::new(move |class: &LoadedClass| {
            Box::new(constructor(class)) as Box<dyn Runner>
        }))
    }

    /// Returns the kind of this plugin.
    pub fn kind(&self) -> PluginKind {
        match self {
            Self::Filter { .. } => PluginKind::Filter,
            Self::RunnerBuilder { .. } => PluginKind::RunnerBuilder,
            Self::RunListener { .. } => PluginKind::RunListener,
            Self::Runner(_) => PluginKind::Runner,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// A runner builder plugin resolved by name.
///
/// The constructor isn't checked until the request is built.
#[derive(Clone)]
pub struct RunnerBuilderClass {
    name: String,
    constructor: Option<RunnerBuilderFactory>,
}

impl RunnerBuilderClass {
    /// Returns the plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiates the runner builder.
    pub fn instantiate(&self) -> Result<Box<dyn RunnerBuilder>, PluginLoadError> {
        let constructor =
            self.constructor
                .as_ref()
                .ok_or_else(|| PluginLoadError::RunnerBuilderConstructor {
                    name: self.name.clone(),
                })?;
        Ok(constructor())
    }
}

impl fmt::Debug for RunnerBuilderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerBuilderClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A run listener plugin resolved by name.
#[derive(Clone)]
pub struct RunListenerClass {
    name: String,
    constructor: RunListenerFactory,
}

impl RunListenerClass {
    /// Returns the plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new listener.
    pub fn instantiate(&self) -> Box<dyn RunListener> {
        (self.constructor)()
    }
}

impl fmt::Debug for RunListenerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunListenerClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Maps plugin names to plugins.
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Plugin>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, replacing any plugin previously registered under `name`.
    pub fn register(&mut self, name: impl Into<String>, plugin: Plugin) -> &mut Self {
        let name = name.into();
        debug!("registering {} plugin {name}", plugin.kind());
        self.plugins.insert(name, plugin);
        self
    }

    /// Returns the plugin registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    /// Instantiates a filter.
    ///
    /// A no-argument constructor is preferred over a bundle-aware one.
    pub fn load_filter(
        &self,
        name: &str,
        bundle: &Bundle,
    ) -> Result<Arc<dyn Filter>, PluginLoadError> {
        match self.lookup(name, PluginKind::Filter)? {
            Plugin::Filter {
                no_arg: Some(constructor),
                ..
            } => Ok(constructor()),
            Plugin::Filter {
                with_bundle: Some(constructor),
                ..
            } => Ok(constructor(bundle)),
            _ => Err(PluginLoadError::MissingConstructor {
                name: name.to_owned(),
            }),
        }
    }

    /// Resolves a runner builder. The builder is instantiated later, by
    /// [`RunnerBuilderClass::instantiate`].
    pub fn load_runner_builder(&self, name: &str) -> Result<RunnerBuilderClass, PluginLoadError> {
        match self.lookup(name, PluginKind::RunnerBuilder)? {
            Plugin::RunnerBuilder { constructor } => Ok(RunnerBuilderClass {
                name: name.to_owned(),
                constructor: constructor.clone(),
            }),
            _ => Err(wrong_kind(name, PluginKind::RunnerBuilder)),
        }
    }

    /// Resolves a run listener.
    pub fn load_run_listener(&self, name: &str) -> Result<RunListenerClass, PluginLoadError> {
        match self.lookup(name, PluginKind::RunListener)? {
            Plugin::RunListener {
                constructor: Some(constructor),
            } => Ok(RunListenerClass {
                name: name.to_owned(),
                constructor: Arc::clone(constructor),
            }),
            _ => Err(PluginLoadError::MissingConstructor {
                name: name.to_owned(),
            }),
        }
    }

    /// Resolves a runner named by `@RunWith`.
    pub fn load_runner(&self, name: &str) -> Result<RunnerFactory, PluginLoadError> {
        match self.lookup(name, PluginKind::Runner)? {
            Plugin::Runner(constructor) => Ok(Arc::clone(constructor)),
            _ => Err(wrong_kind(name, PluginKind::Runner)),
        }
    }

    fn lookup(&self, name: &str, expected: PluginKind) -> Result<&Plugin, PluginLoadError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| PluginLoadError::NotFound {
                name: name.to_owned(),
            })?;
        if plugin.kind() != expected {
            return Err(wrong_kind(name, expected));
        }
        Ok(plugin)
    }
}

fn wrong_kind(name: &str, expected: PluginKind) -> PluginLoadError {
    PluginLoadError::WrongKind {
        name: name.to_owned(),
        expected,
    }
}
