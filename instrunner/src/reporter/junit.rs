// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    description::Description,
    errors::WriteJunitError,
    runner::{Failure, RunListener, RunResult},
};
use camino::Utf8Path;
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::{
    fs::File,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};
use tracing::debug;

/// Collects a JUnit XML report, with one test suite per test class.
///
/// The report becomes available through the [`JunitReport`] handle once the run finishes.
#[derive(Debug)]
pub struct JunitXmlListener {
    report_name: String,
    test_suites: DebugIgnore<IndexMap<String, TestSuite>>,
    current: Option<CurrentTest>,
    report: JunitReport,
}

#[derive(Debug)]
struct CurrentTest {
    start: Instant,
    status: DebugIgnore<TestCaseStatus>,
}

impl JunitXmlListener {
    /// Creates a listener, along with a handle to the report it produces.
    pub fn new(report_name: impl Into<String>) -> (Self, JunitReport) {
        let report = JunitReport::default();
        let listener = Self {
            report_name: report_name.into(),
            test_suites: DebugIgnore(IndexMap::new()),
            current: None,
            report: report.clone(),
        };
        (listener, report)
    }

    fn current(&mut self) -> &mut CurrentTest {
        self.current.get_or_insert_with(|| CurrentTest {
            start: Instant::now(),
            status: DebugIgnore(TestCaseStatus::success()),
        })
    }

    fn testsuite_for(&mut self, description: &Description) -> &mut TestSuite {
        let class_name = description.class_name().unwrap_or(description.display_name());
        self.test_suites
            .entry(class_name.to_owned())
            .or_insert_with(|| TestSuite::new(class_name))
    }

    fn add_test_case(&mut self, description: &Description, mut test_case: TestCase) {
        if let Some(class_name) = description.class_name() {
            test_case.set_classname(class_name);
        }
        self.testsuite_for(description).add_test_case(test_case);
    }
}

impl RunListener for JunitXmlListener {
    fn test_started(&mut self, _description: &Description) {
        self.current = Some(CurrentTest {
            start: Instant::now(),
            status: DebugIgnore(TestCaseStatus::success()),
        });
    }

    fn test_finished(&mut self, description: &Description) {
        let current = self.current.take().unwrap_or_else(|| CurrentTest {
            start: Instant::now(),
            status: DebugIgnore(TestCaseStatus::success()),
        });
        let name = description.method_name().unwrap_or(description.display_name());
        let mut test_case = TestCase::new(name, current.status.0);
        test_case.set_time(current.start.elapsed());
        self.add_test_case(description, test_case);
    }

    fn test_failure(&mut self, failure: &Failure) {
        let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
        status
            .set_message(failure.message())
            .set_description(failure.message());
        self.current().status = DebugIgnore(status);
    }

    fn test_assumption_failure(&mut self, failure: &Failure) {
        let mut status = TestCaseStatus::skipped();
        status.set_message(format!("assumption failed: {}", failure.message()));
        self.current().status = DebugIgnore(status);
    }

    fn test_ignored(&mut self, description: &Description) {
        let name = description.method_name().unwrap_or(description.display_name());
        let mut status = TestCaseStatus::skipped();
        status.set_message("ignored");
        self.add_test_case(description, TestCase::new(name, status));
    }

    fn test_run_finished(&mut self, result: &RunResult) {
        let mut report = Report::new(self.report_name.as_str());
        report
            .set_time(result.run_time)
            .add_test_suites(self.test_suites.drain(..).map(|(_, suite)| suite));
        self.report.set(report);
    }
}

/// A handle to the report produced by a [`JunitXmlListener`].
#[derive(Clone, Debug, Default)]
pub struct JunitReport {
    inner: Arc<Mutex<Option<Report>>>,
}

impl JunitReport {
    fn set(&self, report: Report) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
    }

    /// Returns true if the run has finished and the report is available.
    pub fn is_finished(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Writes the report to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Utf8Path) -> Result<(), WriteJunitError> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let report = guard.as_ref().ok_or(WriteJunitError::NotFinished)?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|error| WriteJunitError::Fs {
                file: dir.to_owned(),
                error,
            })?;
        }
        let f = File::create(path).map_err(|error| WriteJunitError::Fs {
            file: path.to_owned(),
            error,
        })?;
        report
            .serialize(f)
            .map_err(|error| WriteJunitError::Junit {
                file: path.to_owned(),
                error,
            })?;
        debug!("wrote JUnit report to `{path}`");
        Ok(())
    }
}
