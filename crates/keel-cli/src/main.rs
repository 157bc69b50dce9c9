//! Keel CLI - merge a declarative override file into the base configuration
//! record and print the result.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use keel_config::{MergePolicy, Record, ShowFormat};
use keel_telemetry::{LogConfig, LogFormat};

mod commands;

/// Keel - typed configuration with file overrides
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (path) to merge into the defaults
    #[arg(long, value_name = "PATH", env = "KEEL_CONF")]
    conf: Option<PathBuf>,

    /// What to do when an override has the wrong type
    #[arg(long, value_enum, default_value_t = PolicyArg::Atomic)]
    merge_policy: PolicyArg,

    /// Output format for the resulting configuration
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact)]
    log_format: LogFormatArg,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Validate every key before applying any
    Atomic,
    /// Apply keys in file order, keeping those applied before a failure
    Sequential,
}

impl From<PolicyArg> for MergePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Atomic => Self::Atomic,
            PolicyArg::Sequential => Self::Sequential,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Yaml,
}

impl From<FormatArg> for ShowFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
    Full,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Full => Self::Full,
        }
    }
}

/// Parse arguments; `--help` prints the record documentation after the flags.
fn parse_cli() -> Cli {
    let command = Cli::command().after_help(Record::base().doc());
    let matches = command.get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Logging settings for this run; colors only when stderr is a terminal.
fn log_config(cli: &Cli, color: bool) -> LogConfig {
    let level = if cli.verbose { "debug" } else { "warn" };
    let config = LogConfig::new(level).with_format(cli.log_format.into());
    if color { config } else { config.without_ansi() }
}

fn main() -> Result<()> {
    let cli = parse_cli();

    let logging = log_config(&cli, std::io::stderr().is_terminal());
    if let Err(e) = keel_telemetry::setup_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let output = commands::merge::run(
        cli.conf.as_deref(),
        cli.merge_policy.into(),
        cli.format.into(),
    )?;
    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["keel"]).unwrap();
        assert!(cli.conf.is_none());
        assert_eq!(cli.merge_policy, PolicyArg::Atomic);
        assert_eq!(cli.format, FormatArg::Text);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "keel",
            "--conf",
            "exp.yaml",
            "--merge-policy",
            "sequential",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.conf, Some(PathBuf::from("exp.yaml")));
        assert_eq!(MergePolicy::from(cli.merge_policy), MergePolicy::Sequential);
        assert_eq!(ShowFormat::from(cli.format), ShowFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_log_config_from_flags() {
        let cli = Cli::try_parse_from(["keel", "-v", "--log-format", "json"]).unwrap();

        let piped = log_config(&cli, false);
        assert_eq!(piped.level, "debug");
        assert_eq!(piped.format, LogFormat::Json);
        assert!(!piped.ansi);

        assert!(log_config(&cli, true).ansi);
    }

    #[test]
    fn test_help_lists_record_documentation() {
        let help = Cli::command()
            .after_help(Record::base().doc())
            .render_help()
            .to_string();
        assert!(help.contains("--conf"));
        assert!(help.contains(":param NAME:"));
    }
}
