//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Env override for the simulation speedup (used by tests).
pub const SIM_SPEEDUP_ENV: &str = "BOIL_SIM_SPEEDUP";

#[derive(Parser, Debug)]
#[command(name = "boil", version, about = "Boil-phase controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/boil_config.toml")]
    pub config: PathBuf,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the boil step until the countdown completes or an operator stops it
    Run {
        /// Simulation only: run virtual time N times faster than wall time
        #[arg(long, value_name = "N")]
        sim_speedup: Option<u32>,
        /// Ignore operator commands on stdin (start, extend [SECS], reset, stop)
        #[arg(long, action = ArgAction::SetTrue)]
        no_stdin: bool,
    },
    /// Validate the config and take one sensor reading
    SelfCheck,
}

impl Commands {
    /// Speedup from the flag, then the environment, defaulting to real time.
    pub fn sim_speedup(&self) -> u32 {
        let flag = match self {
            Commands::Run { sim_speedup, .. } => *sim_speedup,
            Commands::SelfCheck => None,
        };
        flag.or_else(|| {
            std::env::var(SIM_SPEEDUP_ENV)
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
        .unwrap_or(1)
        .max(1)
    }
}
