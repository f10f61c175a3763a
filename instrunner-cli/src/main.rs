// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use instrunner_cli::{InstrunnerApp, OutputWriter};

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = InstrunnerApp::parse();
    let output = opts.init_output();

    match opts.exec(output, &OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
