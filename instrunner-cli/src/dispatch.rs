// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{ListStyles, OutputContext, OutputOpts, OutputWriter},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use instrunner::{
    bundle::Bundle,
    device::HostDeviceBuild,
    instrumentation::InstrumentationRunner,
    plugin::PluginRegistry,
    registry::TestRegistry,
    reporter::{JunitXmlListener, StatusWriter},
    runner_args::{RunnerArgs, RunnerArgsBuilder},
};
use instrunner_metadata::{InstrunnerExitCode, TestListSummary};
use owo_colors::OwoColorize;
use std::{io::Write, sync::Arc};
use swrite::{SWrite, swriteln};
use tracing::{debug, info};

/// Discovers, filters and runs instrumentation tests.
#[derive(Debug, Parser)]
#[command(
    name = "instrunner",
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct InstrunnerApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl InstrunnerApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &OutputWriter) -> Result<i32> {
        match self.command {
            Command::List(opts) => opts.exec(output, output_writer),
            Command::Run(opts) => opts.exec(output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the tests that the instrumentation arguments select
    List(ListOpts),
    /// Run the tests that the instrumentation arguments select
    ///
    /// Progress is written to stdout as INSTRUMENTATION_STATUS blocks, followed by a summary.
    Run(RunOpts),
}

#[derive(Debug, Args)]
struct CommonOpts {
    /// Path to the JSON test manifest describing test classes
    #[arg(long, value_name = "PATH", env = "INSTRUNNER_MANIFEST")]
    manifest: Utf8PathBuf,

    /// Path to a TOML file with default instrumentation arguments
    ///
    /// Arguments are read from the `[instrumentation.args]` table, and are overridden by
    /// arguments passed with `-e`.
    #[arg(long, value_name = "PATH")]
    args_file: Option<Utf8PathBuf>,

    /// An instrumentation argument, such as `-e class com.example.FooTest`
    #[arg(
        short = 'e',
        long = "arg",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
    )]
    args: Vec<String>,
}

impl CommonOpts {
    fn bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        // clap guarantees that values come in pairs.
        for pair in self.args.chunks_exact(2) {
            bundle.insert(pair[0].as_str(), pair[1].as_str());
        }
        bundle
    }

    fn runner_args(&self, plugins: &PluginRegistry) -> Result<RunnerArgs> {
        let mut builder = RunnerArgsBuilder::new();
        if let Some(path) = &self.args_file {
            if !path.exists() {
                return Err(ExpectedError::ArgsFileNotFound { path: path.clone() });
            }
            builder = builder.with_args_file(plugins, path)?;
        }
        Ok(builder.with_bundle(plugins, &self.bundle())?.build())
    }

    fn load_registry(&self) -> Result<TestRegistry> {
        let registry = TestRegistry::from_manifest_path(&self.manifest)?;
        debug!("loaded {} classes from `{}`", registry.len(), self.manifest);
        Ok(registry)
    }
}

#[derive(Debug, Args)]
struct ListOpts {
    #[clap(flatten)]
    common: CommonOpts,

    /// Output format
    #[arg(long, value_enum, default_value_t, value_name = "FMT")]
    message_format: MessageFormat,
}

impl ListOpts {
    fn exec(self, output: OutputContext, output_writer: &OutputWriter) -> Result<i32> {
        let registry = self.common.load_registry()?;
        let plugins = PluginRegistry::new();
        let args = self.common.runner_args(&plugins)?;

        // Listing never writes status output.
        let runner = InstrumentationRunner::new(
            &registry,
            &plugins,
            Arc::new(HostDeviceBuild::from_env()),
            StatusWriter::new(std::io::sink()),
        );
        let summary = runner.list_tests(&args)?;

        let out = match self.message_format {
            MessageFormat::Human => format_human(&summary, &output.list_styles(output_writer)),
            MessageFormat::Json => {
                let mut json = serde_json::to_string_pretty(&summary)
                    .map_err(|err| ExpectedError::TestListSerializeError { err })?;
                json.push('\n');
                json
            }
        };

        let mut writer = output_writer.stdout_writer();
        writer
            .write_all(out.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|err| ExpectedError::WriteTestListError { err })?;
        Ok(InstrunnerExitCode::OK)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum MessageFormat {
    /// A human-readable list, grouped by class
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
}

fn format_human(summary: &TestListSummary, styles: &ListStyles) -> String {
    let mut out = String::new();
    let mut current_class: Option<&str> = None;
    for entry in &summary.tests {
        let class_name = entry.id.class_name.as_str();
        if current_class != Some(class_name) {
            swriteln!(out, "{}:", class_name.style(styles.class_name));
            current_class = Some(class_name);
        }
        let method_name = entry.id.method_name.as_deref().unwrap_or(class_name);
        if entry.ignored {
            swriteln!(out, "    {method_name} {}", "(ignored)".style(styles.ignored));
        } else {
            swriteln!(out, "    {method_name}");
        }
    }
    let plural = if summary.test_count == 1 { "" } else { "s" };
    swriteln!(
        out,
        "{} test{plural} selected",
        summary.test_count.style(styles.count)
    );
    out
}

#[derive(Debug, Args)]
struct RunOpts {
    #[clap(flatten)]
    common: CommonOpts,

    /// Write a JUnit XML report to this path
    #[arg(long, value_name = "PATH")]
    junit: Option<Utf8PathBuf>,
}

impl RunOpts {
    fn exec(self, output_writer: &OutputWriter) -> Result<i32> {
        let registry = self.common.load_registry()?;
        let plugins = PluginRegistry::new();
        let args = self.common.runner_args(&plugins)?;

        let mut runner = InstrumentationRunner::new(
            &registry,
            &plugins,
            Arc::new(HostDeviceBuild::from_env()),
            StatusWriter::new(output_writer.stdout_writer()),
        );
        let junit_report = self.junit.as_ref().map(|_| {
            let (listener, report) = JunitXmlListener::new("instrunner-run");
            runner.add_run_listener(Box::new(listener));
            report
        });

        let result = runner.run(&args)?;

        if let (Some(path), Some(report)) = (&self.junit, junit_report) {
            report.write(path)?;
            info!("wrote JUnit report to `{path}`");
        }

        if result.was_successful() {
            Ok(InstrunnerExitCode::OK)
        } else {
            Ok(InstrunnerExitCode::TEST_RUN_FAILED)
        }
    }
}
