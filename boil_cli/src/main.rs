#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `boil` command line: config loading, logging setup, run and self-check.

mod cli;
mod error_fmt;
mod run;

use std::path::Path;

use boil_core::RunOutcome;
use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{EXIT_DONE, EXIT_STOPPED, exit_code_for_error, format_error_json, humanize};

fn main() {
    let code = match real_main() {
        Ok(code) => code,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main() -> eyre::Result<i32> {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    color_eyre::install()?;

    let cfg = boil_config::load_file(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match &cli.cmd {
        Commands::Run { no_stdin, .. } => {
            let report = run::run_boil(&cfg, cli.cmd.sim_speedup(), !no_stdin, cli.json)?;
            run::print_report(&report, cli.json);
            Ok(match report.outcome {
                RunOutcome::Done => EXIT_DONE,
                RunOutcome::Stopped => EXIT_STOPPED,
            })
        }
        Commands::SelfCheck => {
            let temp = run::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok", "temp": temp }));
            } else {
                println!("ok (sensor {} reads {temp:.1})", cfg.step.sensor);
            }
            Ok(EXIT_DONE)
        }
    }
}

fn init_tracing(json: bool, level: &str, logging: &boil_config::Logging) -> eyre::Result<()> {
    // RUST_LOG wins over --log-level.
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "boil.log".to_string());
            let rotation = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::Rotation::DAILY,
                Some("hourly") => tracing_appender::rolling::Rotation::HOURLY,
                _ => tracing_appender::rolling::Rotation::NEVER,
            };
            let appender = tracing_appender::rolling::RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(name)
                .build(dir)
                .wrap_err_with(|| format!("open log file in {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
                .wrap_err("invalid logging.level")?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}
