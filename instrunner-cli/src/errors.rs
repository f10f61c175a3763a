// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use instrunner::errors::{
    ManifestError, RunnerArgsError, TestRequestBuilderError, WriteJunitError,
};
use instrunner_metadata::InstrunnerExitCode;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error: one caused by the user's input or environment rather than a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("test manifest load error")]
    ManifestLoadError {
        #[from]
        err: ManifestError,
    },
    #[error("runner args error")]
    RunnerArgsError {
        #[from]
        err: RunnerArgsError,
    },
    #[error("test request build error")]
    TestRequestBuildError {
        #[from]
        err: TestRequestBuilderError,
    },
    #[error("error writing JUnit report")]
    WriteJunitError {
        #[from]
        err: WriteJunitError,
    },
    #[error("error writing test list")]
    WriteTestListError {
        #[source]
        err: std::io::Error,
    },
    #[error("error serializing test list")]
    TestListSerializeError {
        #[source]
        err: serde_json::Error,
    },
    #[error("args file not found")]
    ArgsFileNotFound { path: Utf8PathBuf },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ManifestLoadError { .. } => InstrunnerExitCode::MANIFEST_LOAD_FAILED,
            Self::RunnerArgsError { .. }
            | Self::TestRequestBuildError { .. }
            | Self::ArgsFileNotFound { .. } => InstrunnerExitCode::SETUP_ERROR,
            Self::WriteJunitError { .. }
            | Self::WriteTestListError { .. }
            | Self::TestListSerializeError { .. } => InstrunnerExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ManifestLoadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::RunnerArgsError { err } => {
                error!("invalid instrumentation arguments: {err}");
                err.source()
            }
            Self::TestRequestBuildError { err } => {
                error!("failed to build test request: {err}");
                err.source()
            }
            Self::WriteJunitError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteTestListError { err } => {
                error!("failed to write test list");
                Some(err as &dyn Error)
            }
            Self::TestListSerializeError { err } => {
                error!("failed to serialize test list");
                Some(err as &dyn Error)
            }
            Self::ArgsFileNotFound { path } => {
                error!("args file `{}` not found", path.style(styles.bold));
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
