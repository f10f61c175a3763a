// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run listeners that report test progress and results.
//!
//! The listeners here mirror what an instrumentation run reports:
//!
//! * [`InstrumentationResultPrinter`] writes `INSTRUMENTATION_STATUS` blocks for each test, and a
//!   summary at the end of the run.
//! * [`SuiteAssignmentPrinter`] times each test and suggests the size it belongs to.
//! * [`DelayInjector`] sleeps between tests.
//! * [`LogRunListener`] logs each event through `tracing`.
//! * [`JunitXmlListener`] collects a JUnit XML report.

mod delay;
mod junit;
mod log;
mod result_printer;
mod suite_assignment;

pub use delay::*;
pub use junit::*;
pub use log::*;
pub use result_printer::*;
pub use suite_assignment::*;

use std::{
    collections::BTreeMap,
    fmt, io,
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::warn;

/// The status key holding human-readable output.
pub const REPORT_KEY_STREAMRESULT: &str = "stream";

/// The status key identifying the reporter.
pub const REPORT_KEY_IDENTIFIER: &str = "id";

/// A set of instrumentation status values, written in key order.
pub type StatusBundle = BTreeMap<&'static str, String>;

/// A shared sink for instrumentation status output.
///
/// Cloning a `StatusWriter` produces another handle to the same sink, so that several listeners
/// can interleave their output.
#[derive(Clone)]
pub struct StatusWriter {
    inner: Arc<Mutex<dyn Write + Send>>,
}

impl StatusWriter {
    /// Creates a status writer over `writer`.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Creates a status writer over standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writes a status block with the given result code.
    pub fn send_status(&self, code: i32, status: &StatusBundle) {
        let mut out = String::new();
        for (key, value) in status {
            out.push_str("INSTRUMENTATION_STATUS: ");
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out.push_str("INSTRUMENTATION_STATUS_CODE: ");
        out.push_str(&code.to_string());
        out.push('\n');
        self.write(&out);
    }

    /// Writes a status block holding only `message` as stream output.
    pub fn send_string(&self, message: impl Into<String>) {
        let mut status = StatusBundle::new();
        status.insert(REPORT_KEY_STREAMRESULT, message.into());
        self.send_status(0, &status);
    }

    /// Writes the final result of an instrumentation run.
    pub fn send_result(&self, code: i32, stream: &str) {
        self.write(&format!(
            "INSTRUMENTATION_RESULT: {REPORT_KEY_STREAMRESULT}={stream}\n\
             INSTRUMENTATION_CODE: {code}\n"
        ));
    }

    fn write(&self, out: &str) {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writer
            .write_all(out.as_bytes())
            .and_then(|()| writer.flush())
        {
            warn!("failed to write instrumentation status: {err}");
        }
    }
}

impl fmt::Debug for StatusWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusWriter").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::{test_writer::status_writer, *};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_blocks_are_sorted_by_key() {
        let (writer, buffer) = status_writer();
        let mut status = StatusBundle::new();
        status.insert("test", "testOne".to_owned());
        status.insert("class", "a.Foo".to_owned());
        writer.send_status(1, &status);
        writer.send_string(".");
        writer.send_result(-1, "\nOK (1 test)\n");
        assert_eq!(
            buffer.contents(),
            indoc! {"
                INSTRUMENTATION_STATUS: class=a.Foo
                INSTRUMENTATION_STATUS: test=testOne
                INSTRUMENTATION_STATUS_CODE: 1
                INSTRUMENTATION_STATUS: stream=.
                INSTRUMENTATION_STATUS_CODE: 0
                INSTRUMENTATION_RESULT: stream=
                OK (1 test)

                INSTRUMENTATION_CODE: -1
            "}
        );
    }
}
