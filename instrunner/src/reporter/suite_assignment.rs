// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::StatusWriter;
use crate::{
    description::Description,
    runner::{Failure, RunListener},
    test_size::TestSize,
};
use std::time::{Duration, Instant};

/// Times each test, and reports when a test's size doesn't match how long it took.
///
/// Tests whose timing is unreliable, because they failed or were skipped, are reported as `F`.
/// Tests whose size matches their run time are reported as `.`.
#[derive(Debug)]
pub struct SuiteAssignmentPrinter {
    writer: StatusWriter,
    start: Option<Instant>,
    timing_valid: bool,
}

impl SuiteAssignmentPrinter {
    /// Creates a printer writing to `writer`.
    pub fn new(writer: StatusWriter) -> Self {
        Self {
            writer,
            start: None,
            timing_valid: false,
        }
    }

    fn finish_with_run_time(&mut self, description: &Description, run_time: Duration) {
        let suggested = TestSize::for_run_time(run_time);
        let current = TestSize::from_description(description);
        if suggested == current {
            self.writer.send_string(".");
        } else {
            self.writer.send_string(format!(
                "\n{}#{}: current size: {}. suggested: {} runTime: {} ms\n",
                description.class_name().unwrap_or_default(),
                description.method_name().unwrap_or_default(),
                size_name(current),
                size_name(suggested),
                run_time.as_millis(),
            ));
        }
    }
}

impl RunListener for SuiteAssignmentPrinter {
    fn test_started(&mut self, _description: &Description) {
        self.timing_valid = true;
        self.start = Some(Instant::now());
    }

    fn test_finished(&mut self, description: &Description) {
        match self.start.take() {
            Some(start) if self.timing_valid => {
                self.finish_with_run_time(description, start.elapsed());
            }
            _ => self.writer.send_string("F"),
        }
    }

    fn test_failure(&mut self, _failure: &Failure) {
        self.timing_valid = false;
    }

    fn test_assumption_failure(&mut self, _failure: &Failure) {
        self.timing_valid = false;
    }

    fn test_ignored(&mut self, _description: &Description) {
        self.timing_valid = false;
    }
}

fn size_name(size: TestSize) -> &'static str {
    match size {
        TestSize::None => "none",
        size => size.qualifier_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::{Annotation, AnnotationSet},
        reporter::test_writer::status_writer,
        test_helpers::*,
    };
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn small_test() -> Description {
        let annotations: AnnotationSet = [Annotation::marker(SMALL_TEST)].into_iter().collect();
        Description::for_test("a.Foo", "testSmall", Some(annotations))
    }

    #[test_case(10, "INSTRUMENTATION_STATUS: stream=.\nINSTRUMENTATION_STATUS_CODE: 0\n" ; "matches")]
    #[test_case(
        1500,
        "INSTRUMENTATION_STATUS: stream=\n\
         a.Foo#testSmall: current size: small. suggested: large runTime: 1500 ms\n\
         \n\
         INSTRUMENTATION_STATUS_CODE: 0\n"
        ; "too slow"
    )]
    fn suggests_size(run_time_ms: u64, expected: &str) {
        let (writer, buffer) = status_writer();
        let mut printer = SuiteAssignmentPrinter::new(writer);
        printer.finish_with_run_time(&small_test(), Duration::from_millis(run_time_ms));
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn unsized_test() {
        let (writer, buffer) = status_writer();
        let mut printer = SuiteAssignmentPrinter::new(writer);
        let description = Description::for_test("a.Foo", "testOther", None);
        printer.finish_with_run_time(&description, Duration::from_millis(300));
        assert!(
            buffer
                .contents()
                .contains("a.Foo#testOther: current size: none. suggested: medium runTime: 300 ms"),
            "{}",
            buffer.contents()
        );
    }

    #[test]
    fn failed_and_unstarted_tests_report_f() {
        let (writer, buffer) = status_writer();
        let mut printer = SuiteAssignmentPrinter::new(writer);
        let description = small_test();

        printer.test_started(&description);
        printer.test_failure(&Failure::new(description.clone(), "boom"));
        printer.test_finished(&description);

        printer.test_finished(&description);

        assert_eq!(
            buffer.contents(),
            "INSTRUMENTATION_STATUS: stream=F\nINSTRUMENTATION_STATUS_CODE: 0\n".repeat(2)
        );
    }
}
