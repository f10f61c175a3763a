// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invoking a single test method.

use super::{Failure, RunNotifier};
use crate::{
    description::Description,
    registry::{MethodDef, TestFailure, TestFailureKind, panic_message},
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::mpsc,
    thread,
    time::Duration,
};
use tracing::warn;

/// Runs one test method and reports its outcome.
pub(super) fn run_test_method(
    notifier: &mut RunNotifier,
    description: &Description,
    method: &MethodDef,
    timeout: Option<Duration>,
) {
    notifier.fire_test_started(description);
    let outcome = match timeout {
        Some(timeout) => invoke_with_timeout(method, timeout),
        None => method.invoke(),
    };
    if let Err(failure) = outcome {
        let reported = Failure::new(description.clone(), failure.message());
        match failure.kind() {
            TestFailureKind::AssumptionViolated => notifier.fire_test_assumption_failure(reported),
            TestFailureKind::Failure => notifier.fire_test_failure(reported),
        }
    }
    notifier.fire_test_finished(description);
}

/// Runs the method body on a helper thread, failing if it doesn't finish within `timeout`.
///
/// A body that times out is abandoned: the helper thread keeps running in the background.
fn invoke_with_timeout(method: &MethodDef, timeout: Duration) -> Result<(), TestFailure> {
    let Some(body) = method.body() else {
        return Ok(());
    };

    let (sender, receiver) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(format!("instrunner-{}", method.name()))
        .spawn(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| body())) {
                Ok(result) => result,
                Err(payload) => Err(TestFailure::new(panic_message(payload.as_ref()))),
            };
            // The receiver is gone if the test already timed out.
            _ = sender.send(result);
        });
    if let Err(err) = spawned {
        warn!("failed to spawn test thread, running {} inline: {err}", method.name());
        return method.invoke();
    }

    match receiver.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(TestFailure::new(format!(
            "test timed out after {} milliseconds",
            timeout.as_millis()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(TestFailure::new("test thread exited without a result"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::test_listener::{Event, RecordingListener};

    fn run(method: &MethodDef, timeout: Option<Duration>) -> Vec<Event> {
        let listener = RecordingListener::default();
        let mut notifier = RunNotifier::new();
        notifier.add_listener(Box::new(listener.clone()));
        let description = Description::for_test("a.Foo", method.name(), None);
        run_test_method(&mut notifier, &description, method, timeout);
        listener.events()
    }

    #[test]
    fn timeout_fails_slow_tests() {
        let method = MethodDef::test("testSlow").with_body(|| {
            thread::sleep(Duration::from_secs(5));
            Ok(())
        });
        let events = run(&method, Some(Duration::from_millis(20)));
        assert_eq!(
            events[1],
            Event::Failure(
                "testSlow(a.Foo)".to_owned(),
                "test timed out after 20 milliseconds".to_owned()
            )
        );
    }

    #[test]
    fn timeout_passes_fast_tests() {
        let method = MethodDef::test("testFast");
        let events = run(&method, Some(Duration::from_secs(5)));
        assert_eq!(
            events,
            [
                Event::Started("testFast(a.Foo)".to_owned()),
                Event::Finished("testFast(a.Foo)".to_owned()),
            ]
        );
    }

    #[test]
    fn assumption_failures_are_not_failures() {
        let method = MethodDef::test("testAssumes")
            .with_body(|| Err(TestFailure::assumption("not on this device")));
        for timeout in [None, Some(Duration::from_secs(5))] {
            let events = run(&method, timeout);
            assert_eq!(
                events[1],
                Event::AssumptionFailure("testAssumes(a.Foo)".to_owned())
            );
        }
    }
}
