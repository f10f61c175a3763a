// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured, machine-readable data for instrunner.
//!
//! This crate contains:
//!
//! * [`TestIdentifier`], the `Class#method` handle used on the instrumentation command line.
//! * [`TestManifest`], the registration-phase description of test classes that instrunner loads
//!   instead of reflecting over compiled classes.
//! * [`TestListSummary`], the output of `instrunner list --message-format json`.
//! * [`InstrunnerExitCode`], the documented exit codes of the `instrunner` binary.

mod exit_codes;
mod identifier;
mod list;
mod manifest;

pub use exit_codes::*;
pub use identifier::*;
pub use list::*;
pub use manifest::*;
