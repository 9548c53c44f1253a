// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskcompose`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskcompose",
    version,
    about = "Run tasks composed in series, in parallel and from file streams.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the composefile (TOML).
    #[arg(long, short = 'f', value_name = "PATH", default_value = "Composefile.toml")]
    pub file: PathBuf,

    /// Tasks to run, one after another. Defaults to `[config].default_task`.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Print the task names and exit.
    #[arg(long)]
    pub list: bool,

    /// Parse and validate, print the plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Start the `[[watch]]` entries and keep running until Ctrl-C.
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKCOMPOSE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
