//! CLI argument definitions for the `edflow` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "edflow",
    version,
    about = "Emergency department flow - build patient pathway graphs from event extracts",
    long_about = "Clean per-visit emergency department event extracts and derive the\n\
                  process transition graph consumed by the flow simulator.\n\n\
                  Writes events, pathway, recurrence and wait-in-place tables per analysis."
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

    /// Allow visit identifiers and other row values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize the event extracts and run every configured analysis.
    Run(RunArgs),

    /// Validate a configuration file and print the effective values.
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Events extract (VisitId, EventName, EventTime, EventStaffId, EventLocation).
    #[arg(long = "events", value_name = "CSV")]
    pub events: PathBuf,

    /// Admission status extract used to relabel discharges.
    #[arg(long = "admissions", value_name = "CSV")]
    pub admissions: Option<PathBuf>,

    /// Observations chart extract merged as observation events.
    #[arg(long = "observations", value_name = "CSV")]
    pub observations: Option<PathBuf>,

    /// Diagnostics request extract merged as one event per request burst.
    #[arg(long = "diagnostics", value_name = "CSV")]
    pub diagnostics: Option<PathBuf>,

    /// TOML configuration (defaults apply when omitted).
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Output directory (default: <EVENTS_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run every stage and print the summary without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckConfigArgs {
    /// TOML configuration to validate (defaults are printed when omitted).
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
