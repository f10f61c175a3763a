// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `instrunner` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum InstrunnerExitCode {}

impl InstrunnerExitCode {
    /// No errors occurred and instrunner exited normally.
    ///
    /// A run that selects no tests also exits with this code.
    pub const OK: i32 = 0;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The test manifest could not be loaded.
    pub const MANIFEST_LOAD_FAILED: i32 = 104;

    /// Writing data to stdout, stderr or a report file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up an instrunner invocation: invalid instrumentation
    /// arguments, or a request that could not be built.
    pub const SETUP_ERROR: i32 = 96;
}
