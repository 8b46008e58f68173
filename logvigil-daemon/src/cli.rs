//! CLI argument definitions for logvigil-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Logvigil monitoring daemon.
///
/// Polls a remote environment's log endpoint, counts trigger-string
/// occurrences among newly observed lines, and requests a service
/// restart when the threshold is exceeded.
#[derive(Parser, Debug)]
#[command(name = "logvigil-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logvigil.toml configuration file.
    ///
    /// A default file is created here on first run.
    #[arg(short, long, default_value = "logvigil.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
