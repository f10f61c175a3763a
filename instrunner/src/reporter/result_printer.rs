// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{REPORT_KEY_IDENTIFIER, REPORT_KEY_STREAMRESULT, StatusBundle, StatusWriter};
use crate::{
    description::Description,
    runner::{Failure, RunListener, RunResult},
};
use swrite::{SWrite, swrite, swriteln};

/// The value reported under [`REPORT_KEY_IDENTIFIER`].
pub const REPORT_VALUE_ID: &str = "AndroidJUnitRunner";

/// The status key holding the total number of tests.
pub const REPORT_KEY_NUM_TOTAL: &str = "numtests";

/// The status key holding the 1-based index of the current test.
pub const REPORT_KEY_NUM_CURRENT: &str = "current";

/// The status key holding the current test's class.
pub const REPORT_KEY_NAME_CLASS: &str = "class";

/// The status key holding the current test's method.
pub const REPORT_KEY_NAME_TEST: &str = "test";

/// The status key holding a failure message.
pub const REPORT_KEY_STACK: &str = "stack";

/// Reported when a test starts.
pub const REPORT_VALUE_RESULT_START: i32 = 1;

/// Reported when a test passes.
pub const REPORT_VALUE_RESULT_OK: i32 = 0;

/// Reported when a test fails.
pub const REPORT_VALUE_RESULT_FAILURE: i32 = -2;

/// Reported when a test is ignored.
pub const REPORT_VALUE_RESULT_IGNORED: i32 = -3;

/// Reported when a test's assumptions are violated.
pub const REPORT_VALUE_RESULT_ASSUMPTION_FAILURE: i32 = -4;

/// Writes an instrumentation status block as each test starts and finishes.
#[derive(Debug)]
pub struct InstrumentationResultPrinter {
    writer: StatusWriter,
    template: StatusBundle,
    test_result: StatusBundle,
    test_num: usize,
    result_code: i32,
    test_class: Option<String>,
    started: bool,
}

impl InstrumentationResultPrinter {
    /// Creates a printer writing to `writer`.
    pub fn new(writer: StatusWriter) -> Self {
        Self {
            writer,
            template: StatusBundle::new(),
            test_result: StatusBundle::new(),
            test_num: 0,
            result_code: REPORT_VALUE_RESULT_OK,
            test_class: None,
            started: false,
        }
    }

    fn report_failure(&mut self, failure: &Failure) {
        self.test_result
            .insert(REPORT_KEY_STACK, failure.message().to_owned());
        self.test_result.insert(
            REPORT_KEY_STREAMRESULT,
            format!(
                "\nError in {}:\n{}",
                failure.description().display_name(),
                failure.message()
            ),
        );
    }
}

impl RunListener for InstrumentationResultPrinter {
    fn test_run_started(&mut self, description: &Description) {
        self.template
            .insert(REPORT_KEY_IDENTIFIER, REPORT_VALUE_ID.to_owned());
        self.template
            .insert(REPORT_KEY_NUM_TOTAL, description.test_count().to_string());
    }

    fn test_started(&mut self, description: &Description) {
        self.started = true;
        self.test_num += 1;

        let class_name = description.class_name().unwrap_or_default();
        self.test_result = self.template.clone();
        self.test_result
            .insert(REPORT_KEY_NAME_CLASS, class_name.to_owned());
        self.test_result.insert(
            REPORT_KEY_NAME_TEST,
            description.method_name().unwrap_or_default().to_owned(),
        );
        self.test_result
            .insert(REPORT_KEY_NUM_CURRENT, self.test_num.to_string());

        let stream = if self.test_class.as_deref() != Some(class_name) {
            self.test_class = Some(class_name.to_owned());
            format!("\n{class_name}:")
        } else {
            String::new()
        };
        self.test_result.insert(REPORT_KEY_STREAMRESULT, stream);

        self.writer
            .send_status(REPORT_VALUE_RESULT_START, &self.test_result);
        self.result_code = REPORT_VALUE_RESULT_OK;
    }

    fn test_finished(&mut self, _description: &Description) {
        if self.result_code == REPORT_VALUE_RESULT_OK {
            self.test_result
                .insert(REPORT_KEY_STREAMRESULT, ".".to_owned());
        }
        self.writer.send_status(self.result_code, &self.test_result);
    }

    fn test_failure(&mut self, failure: &Failure) {
        // A failure before any test started means the run failed to initialize. Report it as a
        // test of its own so that it is visible to tools parsing the output.
        let synthesize = !self.started;
        if synthesize {
            self.test_started(failure.description());
        }
        self.result_code = REPORT_VALUE_RESULT_FAILURE;
        self.report_failure(failure);
        if synthesize {
            self.test_finished(failure.description());
        }
    }

    fn test_assumption_failure(&mut self, failure: &Failure) {
        self.result_code = REPORT_VALUE_RESULT_ASSUMPTION_FAILURE;
        self.test_result
            .insert(REPORT_KEY_STACK, failure.message().to_owned());
    }

    fn test_ignored(&mut self, description: &Description) {
        self.test_started(description);
        self.result_code = REPORT_VALUE_RESULT_IGNORED;
        self.test_finished(description);
    }

    fn instrumentation_run_finished(&mut self, out: &mut String, result: &RunResult) {
        write_summary(out, result);
    }
}

/// Writes a plain-text summary of `result`.
pub fn write_summary(out: &mut String, result: &RunResult) {
    swriteln!(out);
    swriteln!(out, "Time: {:.3}", result.run_time.as_secs_f64());

    match result.failures.len() {
        0 => {}
        1 => swriteln!(out, "There was 1 failure:"),
        n => swriteln!(out, "There were {n} failures:"),
    }
    for (index, failure) in result.failures.iter().enumerate() {
        swriteln!(out, "{}) {}", index + 1, failure.description().display_name());
        swriteln!(out, "{}", failure.message());
    }

    swriteln!(out);
    if result.was_successful() {
        let plural = if result.run_count == 1 { "" } else { "s" };
        swriteln!(out, "OK ({} test{plural})", result.run_count);
    } else {
        swriteln!(out, "FAILURES!!!");
        swrite!(out, "Tests run: {},  ", result.run_count);
        swriteln!(out, "Failures: {}", result.failure_count());
    }
    swriteln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        reporter::test_writer::status_writer,
        runner::RunNotifier,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_status_for_each_test() {
        let (writer, buffer) = status_writer();
        let mut notifier = RunNotifier::new();
        notifier.add_listener(Box::new(InstrumentationResultPrinter::new(writer)));

        let pass = Description::for_test("a.Foo", "testPass", None);
        let fail = Description::for_test("a.Foo", "testFail", None);
        let ignored = Description::for_test("a.Bar", "testIgnored", None);
        let mut root = Description::suite("root");
        for child in [&pass, &fail, &ignored] {
            root.add_child(child.clone());
        }

        notifier.fire_test_run_started(&root);
        notifier.fire_test_started(&pass);
        notifier.fire_test_finished(&pass);
        notifier.fire_failing_test(&fail, "boom");
        notifier.fire_test_ignored(&ignored);
        notifier.fire_test_run_finished();

        assert_eq!(
            buffer.contents(),
            indoc! {"
                INSTRUMENTATION_STATUS: class=a.Foo
                INSTRUMENTATION_STATUS: current=1
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stream=
                a.Foo:
                INSTRUMENTATION_STATUS: test=testPass
                INSTRUMENTATION_STATUS_CODE: 1
                INSTRUMENTATION_STATUS: class=a.Foo
                INSTRUMENTATION_STATUS: current=1
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stream=.
                INSTRUMENTATION_STATUS: test=testPass
                INSTRUMENTATION_STATUS_CODE: 0
                INSTRUMENTATION_STATUS: class=a.Foo
                INSTRUMENTATION_STATUS: current=2
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stream=
                INSTRUMENTATION_STATUS: test=testFail
                INSTRUMENTATION_STATUS_CODE: 1
                INSTRUMENTATION_STATUS: class=a.Foo
                INSTRUMENTATION_STATUS: current=2
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stack=boom
                INSTRUMENTATION_STATUS: stream=
                Error in testFail(a.Foo):
                boom
                INSTRUMENTATION_STATUS: test=testFail
                INSTRUMENTATION_STATUS_CODE: -2
                INSTRUMENTATION_STATUS: class=a.Bar
                INSTRUMENTATION_STATUS: current=3
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stream=
                a.Bar:
                INSTRUMENTATION_STATUS: test=testIgnored
                INSTRUMENTATION_STATUS_CODE: 1
                INSTRUMENTATION_STATUS: class=a.Bar
                INSTRUMENTATION_STATUS: current=3
                INSTRUMENTATION_STATUS: id=AndroidJUnitRunner
                INSTRUMENTATION_STATUS: numtests=3
                INSTRUMENTATION_STATUS: stream=
                a.Bar:
                INSTRUMENTATION_STATUS: test=testIgnored
                INSTRUMENTATION_STATUS_CODE: -3
            "}
        );
    }

    #[test]
    fn failure_before_any_test_is_reported_as_a_test() {
        let (writer, buffer) = status_writer();
        let mut printer = InstrumentationResultPrinter::new(writer);
        let description = Description::for_test("a.Foo", "initializationError", None);
        printer.test_failure(&Failure::new(description, "static init failed"));

        let contents = buffer.contents();
        assert!(contents.contains("INSTRUMENTATION_STATUS_CODE: 1\n"), "{contents}");
        assert!(contents.ends_with("INSTRUMENTATION_STATUS_CODE: -2\n"), "{contents}");
    }

    #[test]
    fn summary() {
        let mut result = RunResult {
            run_count: 1,
            ..Default::default()
        };
        let mut out = String::new();
        write_summary(&mut out, &result);
        assert_eq!(out, "\nTime: 0.000\n\nOK (1 test)\n\n");

        result.run_count = 3;
        result.failures.push(Failure::new(
            Description::for_test("a.Foo", "testFail", None),
            "expected:<1> but was:<2>",
        ));
        let mut out = String::new();
        write_summary(&mut out, &result);
        assert_eq!(
            out,
            indoc! {"

                Time: 0.000
                There was 1 failure:
                1) testFail(a.Foo)
                expected:<1> but was:<2>

                FAILURES!!!
                Tests run: 3,  Failures: 1

            "}
        );
    }
}
