// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::{parse_duration, OutputFormat};

/// Command-line arguments for `agentdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agentdag",
    version,
    about = "Run a DAG of agent tasks in dependency waves and save the final task's output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the graph definition (YAML, TOML or JSON, by extension).
    #[arg(long, value_name = "PATH", default_value = "agentdag.yml")]
    pub graph: PathBuf,

    /// Write the terminal task's output to this file instead of stdout.
    ///
    /// Overrides `config.output`.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Persist only this top-level field of the terminal output.
    #[arg(long, value_name = "NAME")]
    pub output_field: Option<String>,

    /// How the terminal output is rendered.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Fail a task whose worker does not answer in time (e.g. `30s`, `5m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub task_timeout: Option<Duration>,

    /// Treat a stalled run as an error and reject unknown agent kinds
    /// before running.
    #[arg(long)]
    pub strict: bool,

    /// Write the JSON run report to this file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AGENTDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the planned waves, but don't run any agent.
    #[arg(long)]
    pub dry_run: bool,
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = CliArgs::try_parse_from([
            "agentdag",
            "--graph",
            "demos/document_report.yml",
            "--format",
            "json",
            "--task-timeout",
            "90s",
            "--strict",
        ])
        .unwrap();

        assert_eq!(args.graph, PathBuf::from("demos/document_report.yml"));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.task_timeout, Some(Duration::from_secs(90)));
        assert!(args.strict);
        assert!(!args.dry_run);
    }

    #[test]
    fn rejects_bad_timeout() {
        assert!(CliArgs::try_parse_from(["agentdag", "--task-timeout", "soon"]).is_err());
    }
}
