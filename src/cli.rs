//! Command-line interface for schedkit.
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// Wrapper around `LevelFilter` so clap can parse log levels from either
/// string names ("info", "debug", etc.) or numeric shorthands (0-5).
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        if let Ok(number) = trimmed.parse::<u8>() {
            let level = match number {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5 => LevelFilter::TRACE,
                _ => {
                    return Err(format!(
                        "unsupported log level number '{number}' (expected 0-5)"
                    ));
                }
            };

            return Ok(LogLevelArg(level));
        }

        let lowercase = trimmed.to_ascii_lowercase();
        let level = match lowercase.as_str() {
            "off" => Some(LevelFilter::OFF),
            "error" | "err" => Some(LevelFilter::ERROR),
            "warn" | "warning" => Some(LevelFilter::WARN),
            "info" | "information" => Some(LevelFilter::INFO),
            "debug" => Some(LevelFilter::DEBUG),
            "trace" => Some(LevelFilter::TRACE),
            _ => None,
        }
        .ok_or_else(|| format!("invalid log level '{trimmed}'"))?;

        Ok(LogLevelArg(level))
    }
}

/// Parses a `KEY=VALUE` flag override.
fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid override '{raw}': expected KEY=VALUE")),
    }
}

/// Where the deployment configuration comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct DeploymentArgs {
    /// Path to the configuration file (defaults to `schedkit.yaml` when present).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override a scheduler flag, e.g. `--set leader-elect=false`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,
}

/// Command-line interface for schedkit.
#[derive(Parser)]
#[command(name = "schedkit", version, author)]
#[command(about = "Installs and runs kube-scheduler under systemd", long_about = None)]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for schedkit.
#[derive(Subcommand)]
pub enum Commands {
    /// Download and install the kube-scheduler binary.
    Create {
        #[command(flatten)]
        target: DeploymentArgs,
    },

    /// Provision the service account, install the unit and start the scheduler.
    Start {
        #[command(flatten)]
        target: DeploymentArgs,
    },

    /// Print the generated unit without changing the system.
    Render {
        #[command(flatten)]
        target: DeploymentArgs,

        /// Emit the unit sections as JSON instead of unit file syntax.
        #[arg(long)]
        json: bool,

        /// Print only the scheduler command line.
        #[arg(long, conflicts_with = "json")]
        exec: bool,
    },

    /// List the scheduler flags schedkit understands.
    Flags {
        /// Emit machine-readable JSON output instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
