//! CLI argument definitions for the workflow assembler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "gantry",
    version,
    about = "Gantry - assemble data-pipeline workflow graphs",
    long_about = "Assemble declarative pipeline manifests into workflow graphs.\n\n\
                  Reads a YAML manifest describing connections and pipelines,\n\
                  validates every graph and prints task listings or the JSON\n\
                  handoff consumed by the orchestration engine."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build every workflow in a manifest and print the task plan.
    Plan(PlanArgs),

    /// Validate a manifest without printing the plan.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Path to the pipeline manifest (YAML).
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Emit the engine-facing JSON manifest instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Only plan the named workflow.
    #[arg(long = "workflow", value_name = "NAME")]
    pub workflow: Option<String>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the pipeline manifest (YAML).
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
