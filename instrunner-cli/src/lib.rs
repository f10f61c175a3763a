// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `instrunner` command-line interface.
//!
//! `instrunner` loads a JSON test manifest, parses instrumentation arguments passed with
//! `-e KEY VALUE` (optionally layered over a TOML args file) and either lists the selected tests
//! or runs them, reporting progress as instrumentation status output.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use output::{CapturedOutput, Color, OutputContext, OutputWriter, StderrStyles};
