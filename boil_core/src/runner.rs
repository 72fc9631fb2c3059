use std::time::Duration;

use crossbeam_channel as xch;

use crate::error::Result as CoreResult;
use crate::step::{BoilStep, Command, StepStatus};

/// Default poll period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Countdown completed; the workflow may advance.
    Done,
    /// Stopped by an operator command.
    Stopped,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Hop slots that fired, ascending.
    pub hops_fired: Vec<u8>,
    pub lid_alerted: bool,
    pub first_wort: bool,
    /// Number of loop iterations.
    pub ticks: u64,
}

impl RunReport {
    fn from_step(step: &BoilStep, outcome: RunOutcome, ticks: u64) -> Self {
        let cfg = step.scheduler().config();
        let st = step.scheduler().state();
        Self {
            outcome,
            hops_fired: st.fired.indices(),
            lid_alerted: cfg.lid_alert && !st.lid_alert_pending,
            first_wort: st.first_wort_fired,
            ticks,
        }
    }
}

/// Parameters for `run`.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Sleep between iterations.
    pub tick: Duration,
    /// Seconds the `Extend` command adds when the caller passes 0.
    pub extend_s: u64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            extend_s: 300,
        }
    }
}

/// Drive a boil step until completion or stop.
///
/// Each iteration drains queued operator commands, waits one tick on the
/// step's clock, then polls (sensor check before countdown check). Commands
/// are therefore serialized with ticks. On error the countdown is halted
/// before the error is returned.
pub fn run(
    step: &mut BoilStep,
    commands: Option<&xch::Receiver<Command>>,
    params: RunParams,
) -> CoreResult<RunReport> {
    let clock = step.clock();
    let started = clock.now();
    step.on_start();
    step.on_run_start();
    tracing::info!(tick_ms = params.tick.as_millis() as u64, "boil run start");

    let mut ticks: u64 = 0;
    loop {
        if let Some(rx) = commands {
            for cmd in rx.try_iter() {
                let cmd = match cmd {
                    Command::Extend(0) => Command::Extend(params.extend_s),
                    other => other,
                };
                if step.command(cmd) == StepStatus::Stopped {
                    let elapsed_ms = clock.ms_since(started);
                    tracing::info!(ticks, elapsed_ms, "boil run stopped");
                    return Ok(RunReport::from_step(step, RunOutcome::Stopped, ticks));
                }
            }
        }

        clock.sleep(params.tick);
        ticks = ticks.saturating_add(1);

        match step.poll() {
            Ok(StepStatus::Running) => continue,
            Ok(StepStatus::Done) => {
                tracing::info!(ticks, elapsed_ms = clock.ms_since(started), "boil run done");
                return Ok(RunReport::from_step(step, RunOutcome::Done, ticks));
            }
            Ok(StepStatus::Stopped) => {
                return Ok(RunReport::from_step(step, RunOutcome::Stopped, ticks));
            }
            Err(e) => {
                step.halt();
                tracing::error!(
                    error = %e,
                    ticks,
                    elapsed_ms = clock.ms_since(started),
                    "boil run aborted"
                );
                return Err(e);
            }
        }
    }
}
