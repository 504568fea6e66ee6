use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// proctl - process-group helpers for build and CI harnesses
///
/// Resolves Cargo binary paths, runs commands in their own process group with
/// graceful shutdown, and clears ports left occupied by stray servers.
#[derive(Parser, Debug)]
#[command(
    name = "proctl",
    version,
    about = "Process-group helpers for build and CI harnesses"
)]
pub struct Cli {
    /// Be verbose about what you're doing (repeat for more detail)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the path of a binary inside a Cargo target directory
    BinPath {
        /// Cargo target directory [default: $CARGO_TARGET_DIR or "target"]
        #[arg(long, value_name = "dir", env = "PROCTL_TARGET_DIR")]
        target_dir: Option<PathBuf>,

        /// Build profile directory name
        #[arg(long, value_name = "profile", default_value = "debug")]
        profile: String,

        /// Binary name without platform extension
        name: String,
    },

    /// Run a command in its own process group, stopping the whole group on
    /// SIGINT/SIGTERM/SIGHUP or when the deadline passes
    Run {
        /// Seconds to wait after the graceful signal before force-killing
        #[arg(long, value_name = "secs", env = "PROCTL_STOP_TIMEOUT", default_value_t = 15)]
        timeout: u64,

        /// Stop the command after this many seconds
        #[arg(long, value_name = "secs")]
        deadline: Option<u64>,

        /// Command and its arguments to execute
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Kill the processes listening on the given TCP ports
    KillPort {
        #[arg(required = true, value_name = "port")]
        ports: Vec<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Validate the parsed arguments
    pub fn validate(&self) -> Result<(), crate::error::ProctlError> {
        use crate::error::ProctlError;

        match &self.command {
            Command::BinPath { profile, name, .. } => {
                if name.is_empty() {
                    return Err(ProctlError::InvalidArguments(
                        "Binary name must not be empty".to_string(),
                    ));
                }
                if profile.is_empty() {
                    return Err(ProctlError::InvalidArguments(
                        "Profile must not be empty".to_string(),
                    ));
                }
            }
            Command::Run { command, .. } => {
                if command.first().map_or(true, |c| c.is_empty()) {
                    return Err(ProctlError::InvalidArguments(
                        "No command specified".to_string(),
                    ));
                }
            }
            Command::KillPort { ports } => {
                if ports.contains(&0) {
                    return Err(ProctlError::InvalidArguments(
                        "Port 0 cannot be evicted".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Log filter directive derived from the -v count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Command {
    /// Target directory from the flag, `$CARGO_TARGET_DIR`, or `target`
    pub fn resolve_target_dir(explicit: Option<&PathBuf>) -> PathBuf {
        explicit
            .cloned()
            .or_else(|| std::env::var_os("CARGO_TARGET_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("target"))
    }
}
