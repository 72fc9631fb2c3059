//! Backend assembly, operator command plumbing and boil execution.

use std::io::BufRead;
use std::time::Duration;

use boil_core::{BoilConfig, BoilStep, Command, RunOutcome, RunParams, RunReport};
use boil_traits::{Notifier, Severity, TempSensor};
use crossbeam_channel as xch;
use eyre::WrapErr;

/// Prints notifications for the operator; mirrors them to the log.
pub struct StdoutNotifier {
    json: bool,
}

impl StdoutNotifier {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Notifier for StdoutNotifier {
    fn notify(&mut self, title: &str, message: &str, severity: Severity) {
        tracing::debug!(title, message, severity = severity.as_str(), "notification");
        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "event": "notification",
                    "title": title,
                    "message": message,
                    "severity": severity.as_str(),
                })
            );
        } else {
            println!("[{}] {title}: {message}", severity.as_str());
        }
    }
}

/// Parse one operator line. `extend` without an argument uses the configured
/// increment (signalled as 0).
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let word = parts.next()?.to_ascii_lowercase();
    let arg = parts.next();
    match (word.as_str(), arg) {
        ("start", None) => Some(Command::Start),
        ("reset", None) => Some(Command::Reset),
        ("stop", None) => Some(Command::Stop),
        ("extend", None) => Some(Command::Extend(0)),
        ("extend", Some(secs)) => secs.parse().ok().filter(|s| *s > 0).map(Command::Extend),
        _ => None,
    }
}

/// Forward stdin lines to the run loop until EOF or the loop is gone.
fn spawn_stdin_reader(tx: xch::Sender<Command>) {
    let spawned = std::thread::Builder::new()
        .name("boil-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    None => tracing::warn!(
                        input = %line.trim(),
                        "unknown command (start|extend [SECS]|reset|stop)"
                    ),
                }
            }
            tracing::debug!("stdin closed");
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to spawn stdin reader; operator commands disabled");
    }
}

/// Simulation backend: probe linked to the simulated kettle, virtual clock.
#[cfg(not(feature = "hardware"))]
fn assemble(cfg: &boil_config::Config, speedup: u32, json: bool) -> eyre::Result<BoilStep> {
    use boil_hardware::{SimClock, SimulatedHopDropper, SimulatedKettle, SimulatedSensor};
    use boil_traits::Clock;
    use std::sync::Arc;

    let kettle = SimulatedKettle::new(cfg.sim.kettle_on);
    let sensor = SimulatedSensor::new(cfg.sim.start_temp, cfg.sim.rise_per_tick, cfg.sim.max_temp)
        .linked_to(kettle.clone());
    let clock: Arc<dyn Clock + Send + Sync> = SimClock::shared(speedup);
    tracing::info!(speedup, "simulation backend");

    let builder = BoilStep::builder()
        .with_sensor(sensor)
        .with_kettle(kettle)
        .with_config(BoilConfig::from(cfg))
        .with_notifier(StdoutNotifier::new(json))
        .with_clock(clock);
    let builder = if cfg.hop_dropper.is_some() {
        builder.with_hop_dropper(SimulatedHopDropper::new())
    } else {
        builder
    };
    builder.build()
}

#[cfg(feature = "hardware")]
fn assemble(cfg: &boil_config::Config, speedup: u32, json: bool) -> eyre::Result<BoilStep> {
    if speedup > 1 {
        tracing::warn!(speedup, "sim speedup ignored with hardware backend");
    }
    let sensor = probe(cfg);
    let builder = BoilStep::builder()
        .with_sensor(sensor)
        .with_config(BoilConfig::from(cfg))
        .with_notifier(StdoutNotifier::new(json));

    #[cfg(target_os = "linux")]
    let builder = match &cfg.hop_dropper {
        Some(d) => {
            let timeout = Duration::from_secs_f32(d.timeout_s);
            let dropper = boil_hardware::GpioHopDropper::new(d.gpio, timeout)
                .wrap_err_with(|| format!("open hop dropper gpio {}", d.gpio))?;
            builder.with_hop_dropper(dropper)
        }
        None => builder,
    };

    #[cfg(target_os = "linux")]
    let step = match cfg.hardware.kettle_relay_gpio {
        Some(pin) => {
            let relay = boil_hardware::GpioKettle::new(pin)
                .wrap_err_with(|| format!("open kettle relay gpio {pin}"))?;
            builder.with_kettle(relay).build()?
        }
        None => {
            tracing::warn!("no kettle relay configured; kettle logic is not driven");
            builder
                .with_kettle(boil_hardware::SimulatedKettle::new(false))
                .build()?
        }
    };
    #[cfg(not(target_os = "linux"))]
    let step = builder
        .with_kettle(boil_hardware::SimulatedKettle::new(false))
        .build()?;

    Ok(step)
}

#[cfg(not(feature = "hardware"))]
fn probe(cfg: &boil_config::Config) -> impl TempSensor + 'static {
    boil_hardware::SimulatedSensor::new(cfg.sim.start_temp, cfg.sim.rise_per_tick, cfg.sim.max_temp)
}

#[cfg(feature = "hardware")]
fn probe(cfg: &boil_config::Config) -> impl TempSensor + 'static {
    boil_hardware::W1Sensor::new(&cfg.hardware.w1_dir)
        .fahrenheit(cfg.units.temp_unit == boil_config::TempUnit::F)
}

/// Run the configured boil step to completion or stop.
pub fn run_boil(
    cfg: &boil_config::Config,
    speedup: u32,
    read_stdin: bool,
    json: bool,
) -> eyre::Result<RunReport> {
    let mut step = assemble(cfg, speedup, json)?;

    let (tx, rx) = xch::unbounded::<Command>();
    {
        let tx = tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = tx.send(Command::Stop);
        }) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }
    if read_stdin {
        spawn_stdin_reader(tx);
    } else {
        drop(tx);
    }

    let params = RunParams {
        tick: Duration::from_millis(cfg.runner.tick_ms),
        extend_s: cfg.runner.extend_s,
    };
    boil_core::run(&mut step, Some(&rx), params)
}

/// One sensor read against the configured probe.
pub fn self_check(cfg: &boil_config::Config) -> eyre::Result<f32> {
    let mut sensor = probe(cfg);
    sensor
        .read(&cfg.step.sensor)
        .map_err(|e| eyre::Report::new(boil_core::hw_error::map_sensor_error(e.as_ref())))
        .wrap_err("self-check sensor read")
}

pub fn outcome_name(o: RunOutcome) -> &'static str {
    match o {
        RunOutcome::Done => "done",
        RunOutcome::Stopped => "stopped",
    }
}

pub fn print_report(report: &RunReport, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "report",
                "outcome": outcome_name(report.outcome),
                "hops_fired": report.hops_fired,
                "lid_alerted": report.lid_alerted,
                "first_wort": report.first_wort,
                "ticks": report.ticks,
            })
        );
    } else {
        println!(
            "boil {}: hops fired {:?}, lid alert {}, first wort {}, {} ticks",
            outcome_name(report.outcome),
            report.hops_fired,
            report.lid_alerted,
            report.first_wort,
            report.ticks
        );
    }
}
