//! The boil scheduler (`BoilScheduler`).
//!
//! Decides, on every sensor and countdown tick, whether to start the
//! countdown, which hop additions are due, and when the run is complete. It
//! also owns the auto-mode correlation with the kettle logic. All outputs are
//! `Effect`s; the scheduler itself performs no I/O.

use std::sync::Arc;
use std::time::Duration;

use boil_traits::{Clock, Severity};

use crate::config::BoilConfig;
use crate::effect::{AutoMode, Effect};
use crate::hops::{FiredHops, due_hops};
use crate::util::{format_added, format_clock, format_time};

pub const WAITING_SUMMARY: &str = "Waiting for Target Temp";

/// Where the run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Heating up; the countdown has not been started.
    Waiting,
    /// Countdown running.
    Boiling,
    /// Countdown finished; terminal.
    Done,
    /// Halted by the operator; terminal.
    Stopped,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Stopped)
    }
}

/// Mutable state of one boil run.
#[derive(Debug, Clone)]
pub struct RunState {
    pub phase: Phase,
    pub countdown_running: bool,
    /// Last reported remaining time; None until the countdown first reports.
    pub remaining_s: Option<u64>,
    pub fired: FiredHops,
    pub lid_alert_pending: bool,
    pub first_wort_fired: bool,
    /// Commanded auto-mode state as last set by this scheduler.
    pub auto_mode_engaged: bool,
    pub summary: String,
}

impl RunState {
    fn fresh(cfg: &BoilConfig) -> Self {
        Self {
            phase: Phase::Waiting,
            countdown_running: false,
            remaining_s: None,
            fired: FiredHops::new(),
            lid_alert_pending: cfg.lid_alert,
            first_wort_fired: false,
            auto_mode_engaged: false,
            summary: String::new(),
        }
    }
}

pub struct BoilScheduler {
    cfg: BoilConfig,
    state: RunState,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for BoilScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoilScheduler")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .finish()
    }
}

impl BoilScheduler {
    pub fn new(cfg: BoilConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let state = RunState::fresh(&cfg);
        Self { cfg, state, clock }
    }

    pub fn config(&self) -> &BoilConfig {
        &self.cfg
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn summary(&self) -> &str {
        &self.state.summary
    }

    /// Reset per-run state and set up the kettle for a new run.
    pub fn initialize(&mut self) -> Vec<Effect> {
        self.state = RunState::fresh(&self.cfg);
        self.state.summary = WAITING_SUMMARY.to_string();
        let mut out = vec![Effect::SetTargetTemp(self.cfg.target_temp)];
        if self.cfg.auto_mode {
            out.push(self.engage_auto_mode());
        }
        tracing::info!(
            target_temp = self.cfg.target_temp,
            duration_s = self.cfg.total_duration_s,
            hops = self.cfg.hops.len(),
            auto_mode = self.cfg.auto_mode,
            "boil step initialized"
        );
        out
    }

    /// The host re-entered the step while the countdown kept running.
    pub fn on_resume(&mut self) {
        self.state.countdown_running = true;
        self.state.phase = Phase::Boiling;
        tracing::info!("countdown resumed");
    }

    /// First-wort addition, once, at the start of the run.
    pub fn on_run_start(&mut self) -> Vec<Effect> {
        if !self.cfg.first_wort || self.state.first_wort_fired {
            return Vec::new();
        }
        self.state.first_wort_fired = true;
        tracing::info!("first wort hop addition");
        vec![
            Effect::notify(
                "First Wort Hop Addition!",
                "Adding hops for first wort",
                Severity::Info,
            ),
            Effect::HopDrop,
        ]
    }

    /// One sensor reading. Starts the countdown the first time the target is
    /// reached; otherwise checks hop offsets against the last remaining time.
    pub fn on_sensor_tick(&mut self, temp: f32) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.state.phase.is_terminal() {
            return out;
        }

        if self.state.lid_alert_pending && temp >= self.cfg.lid_threshold {
            self.state.lid_alert_pending = false;
            tracing::info!(temp, threshold = self.cfg.lid_threshold, "lid alert");
            out.push(Effect::notify(
                "Please remove lid!",
                "Reached temp close to boiling",
                Severity::Info,
            ));
        }

        if temp >= self.cfg.target_temp && !self.state.countdown_running {
            let eta = self
                .clock
                .system_now()
                .checked_add(Duration::from_secs(self.cfg.total_duration_s));
            self.state.countdown_running = true;
            self.state.phase = Phase::Boiling;
            let message = match eta {
                Some(eta) => {
                    tracing::info!(
                        temp,
                        eta = %format_clock(eta),
                        "target reached, countdown started"
                    );
                    format!("Timer started. Estimated completion: {}", format_clock(eta))
                }
                None => {
                    tracing::info!(temp, "target reached, countdown started");
                    "Timer started".to_string()
                }
            };
            out.push(Effect::StartCountdown {
                estimated_completion: eta,
            });
            out.push(Effect::notify(&self.cfg.name, message, Severity::Info));
            return out;
        }

        self.fire_due_hops(&mut out);
        out
    }

    /// Periodic update from the countdown.
    pub fn on_remaining_time_tick(&mut self, remaining_s: u64) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.state.phase.is_terminal() {
            return out;
        }
        self.state.remaining_s = Some(remaining_s);
        self.state.summary = format_time(remaining_s);
        self.fire_due_hops(&mut out);
        out
    }

    /// The countdown reached zero.
    pub fn on_countdown_complete(&mut self) -> Vec<Effect> {
        if self.state.phase == Phase::Done {
            tracing::debug!("completion reported twice; ignoring");
            return Vec::new();
        }
        self.state.countdown_running = false;
        self.state.phase = Phase::Done;
        self.state.summary.clear();
        let mut out = vec![Effect::ClearTargetTemp];
        if self.state.auto_mode_engaged {
            out.push(self.disengage_auto_mode());
        }
        tracing::info!(hops_fired = self.state.fired.len(), "boil complete");
        out.push(Effect::notify(
            &self.cfg.name,
            "Boiling completed",
            Severity::Success,
        ));
        out.push(Effect::Done);
        out
    }

    /// Operator "start timer".
    pub fn on_explicit_start(&mut self) -> Vec<Effect> {
        if self.state.countdown_running {
            tracing::warn!("start requested while countdown already running");
            return vec![Effect::notify(
                &self.cfg.name,
                "Timer is already running",
                Severity::Warning,
            )];
        }
        self.state.countdown_running = true;
        self.state.phase = Phase::Boiling;
        tracing::info!("countdown started by operator");
        vec![
            Effect::notify(&self.cfg.name, "Timer started", Severity::Info),
            Effect::StartCountdown {
                estimated_completion: None,
            },
        ]
    }

    /// Operator "extend timer".
    pub fn on_explicit_extend(&mut self, secs: u64) -> Vec<Effect> {
        if !self.state.countdown_running {
            tracing::warn!(secs, "extend requested while countdown not running");
            return vec![Effect::notify(
                &self.cfg.name,
                "Timer must be running to add time",
                Severity::Warning,
            )];
        }
        tracing::info!(secs, "countdown extended");
        vec![
            Effect::notify(&self.cfg.name, format_added(secs), Severity::Info),
            Effect::ExtendCountdown(secs),
        ]
    }

    /// Halt the run. Safe from any phase.
    pub fn on_explicit_stop(&mut self) -> Vec<Effect> {
        self.state.countdown_running = false;
        if !self.state.phase.is_terminal() {
            self.state.phase = Phase::Stopped;
        }
        self.state.summary.clear();
        let mut out = vec![Effect::StopCountdown, Effect::ClearTargetTemp];
        if self.state.auto_mode_engaged {
            out.push(self.disengage_auto_mode());
        }
        tracing::info!("boil step stopped");
        out
    }

    /// Replace the countdown with a fresh one of the configured length.
    ///
    /// Fired hops and the last remaining time are kept. A finished or
    /// stopped run stays finished.
    pub fn on_explicit_reset(&mut self) -> Vec<Effect> {
        if self.state.phase.is_terminal() {
            tracing::warn!(phase = ?self.state.phase, "reset ignored; run already ended");
            return Vec::new();
        }
        self.state.countdown_running = false;
        self.state.phase = Phase::Waiting;
        tracing::info!(duration_s = self.cfg.total_duration_s, "countdown reset");
        vec![Effect::ResetCountdown {
            duration_s: self.cfg.total_duration_s,
        }]
    }

    fn fire_due_hops(&mut self, out: &mut Vec<Effect>) {
        let due: Vec<u8> = due_hops(&self.cfg.hops, &self.state.fired, self.state.remaining_s)
            .map(|h| h.index)
            .collect();
        for index in due {
            self.state.fired.insert(index);
            tracing::info!(hop = index, remaining_s = ?self.state.remaining_s, "hop addition");
            out.push(Effect::notify(
                "Hop Alert",
                format!("Adding Hop {index}"),
                Severity::Info,
            ));
            out.push(Effect::HopDrop);
        }
    }

    fn engage_auto_mode(&mut self) -> Effect {
        self.state.auto_mode_engaged = true;
        Effect::AutoMode(AutoMode::Engage)
    }

    fn disengage_auto_mode(&mut self) -> Effect {
        self.state.auto_mode_engaged = false;
        Effect::AutoMode(AutoMode::Disengage)
    }
}
