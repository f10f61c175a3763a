// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovering class names from class path entries.
//!
//! A class path entry is either:
//!
//! * a directory, which is walked for `.class` files, each mapped to a class name by its path
//!   relative to the directory; or
//! * a class index file, listing one fully-qualified class name per line. Blank lines and lines
//!   starting with `#` are ignored.

use crate::errors::ClassPathScanError;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::{collections::HashSet, fmt, fs};
use tracing::debug;
use walkdir::WalkDir;

/// A predicate over fully-qualified class names.
pub trait ClassNameFilter: fmt::Debug {
    /// Returns true if the class should be included.
    fn accept(&self, class_name: &str) -> bool;
}

/// Accepts every class.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllFilter;

impl ClassNameFilter for AcceptAllFilter {
    fn accept(&self, _class_name: &str) -> bool {
        true
    }
}

/// Accepts a class only if every contained filter does.
#[derive(Debug, Default)]
pub struct ChainedClassNameFilter {
    filters: Vec<Box<dyn ClassNameFilter>>,
}

impl ChainedClassNameFilter {
    /// Creates an empty chain, which accepts every class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl ClassNameFilter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl ClassNameFilter for ChainedClassNameFilter {
    fn accept(&self, class_name: &str) -> bool {
        self.filters.iter().all(|filter| filter.accept(class_name))
    }
}

/// Rejects nested and inner classes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternalClassNameFilter;

impl ClassNameFilter for ExternalClassNameFilter {
    fn accept(&self, class_name: &str) -> bool {
        !class_name.contains('$')
    }
}

/// Accepts only classes within one of the given packages.
#[derive(Clone, Debug)]
pub struct InclusivePackageNamesFilter {
    prefixes: Vec<String>,
}

impl InclusivePackageNamesFilter {
    /// Creates a new filter.
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: packages
                .into_iter()
                .map(|package| package_prefix(package.as_ref()))
                .collect(),
        }
    }
}

impl ClassNameFilter for InclusivePackageNamesFilter {
    fn accept(&self, class_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| class_name.starts_with(prefix.as_str()))
    }
}

/// Rejects classes within the given package.
#[derive(Clone, Debug)]
pub struct ExcludePackageNameFilter {
    prefix: String,
}

impl ExcludePackageNameFilter {
    /// Creates a new filter.
    pub fn new(package: &str) -> Self {
        Self {
            prefix: package_prefix(package),
        }
    }
}

impl ClassNameFilter for ExcludePackageNameFilter {
    fn accept(&self, class_name: &str) -> bool {
        !class_name.starts_with(self.prefix.as_str())
    }
}

/// Rejects the given classes.
#[derive(Clone, Debug)]
pub struct ExcludeClassNamesFilter {
    class_names: HashSet<String>,
}

impl ExcludeClassNamesFilter {
    /// Creates a new filter.
    pub fn new(class_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            class_names: class_names.into_iter().collect(),
        }
    }
}

impl ClassNameFilter for ExcludeClassNamesFilter {
    fn accept(&self, class_name: &str) -> bool {
        !self.class_names.contains(class_name)
    }
}

// `com.foo` must match `com.foo.Bar` but not `com.foobar.Baz`.
fn package_prefix(package: &str) -> String {
    if package.ends_with('.') {
        package.to_owned()
    } else {
        format!("{package}.")
    }
}

/// Enumerates class names from a set of class path entries.
#[derive(Clone, Debug)]
pub struct ClassPathScanner {
    paths: IndexSet<Utf8PathBuf>,
}

impl ClassPathScanner {
    /// Creates a scanner over the given entries. Duplicate entries are scanned once.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the entries this scanner reads.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> + '_ {
        self.paths.iter().map(|path| path.as_path())
    }

    /// Returns every class name accepted by `filter`, in discovery order.
    pub fn class_path_entries(
        &self,
        filter: &dyn ClassNameFilter,
    ) -> Result<IndexSet<String>, ClassPathScanError> {
        let mut entries = IndexSet::new();
        for path in &self.paths {
            let metadata = fs::metadata(path).map_err(|err| ClassPathScanError::Read {
                path: path.clone(),
                err,
            })?;
            let before = entries.len();
            if metadata.is_dir() {
                add_entries_from_dir(&mut entries, path, filter)?;
            } else {
                add_entries_from_index(&mut entries, path, filter)?;
            }
            debug!(
                "found {} classes in class path entry `{path}`",
                entries.len() - before
            );
        }
        Ok(entries)
    }
}

fn add_entries_from_dir(
    entries: &mut IndexSet<String>,
    dir: &Utf8Path,
    filter: &dyn ClassNameFilter,
) -> Result<(), ClassPathScanError> {
    // Sort for a stable order across file systems.
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| ClassPathScanError::Walk {
            path: dir.to_owned(),
            err,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            ClassPathScanError::NonUtf8Path {
                path: entry.path().to_owned(),
            }
        })?;
        let Some(class_name) = class_name_for_file(dir, path) else {
            continue;
        };
        if filter.accept(&class_name) {
            entries.insert(class_name);
        }
    }
    Ok(())
}

fn class_name_for_file(dir: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let without_ext = relative.as_str().strip_suffix(".class")?;
    Some(without_ext.replace(['/', '\\'], "."))
}

fn add_entries_from_index(
    entries: &mut IndexSet<String>,
    path: &Utf8Path,
    filter: &dyn ClassNameFilter,
) -> Result<(), ClassPathScanError> {
    let contents = fs::read_to_string(path).map_err(|err| ClassPathScanError::Read {
        path: path.to_owned(),
        err,
    })?;
    for line in contents.lines() {
        let class_name = line.trim();
        if class_name.is_empty() || class_name.starts_with('#') {
            continue;
        }
        if filter.accept(class_name) {
            entries.insert(class_name.to_owned());
        }
    }
    Ok(())
}
