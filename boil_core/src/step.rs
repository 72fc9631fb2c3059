//! Boil step executor (`BoilStep`).
//!
//! Owns the scheduler and the injected collaborators, and applies the
//! scheduler's effects to them in order. Collaborator failures on the effect
//! path are logged and swallowed; only sensor failures leave this module as
//! errors.

use std::sync::Arc;

use boil_traits::{Actuator, Clock, Countdown, KettleLogic, Notifier, TempSensor};

use crate::effect::{AutoMode, Effect};
use crate::error::{BoilError, Report, Result};
use crate::hw_error::map_sensor_error;
use crate::scheduler::{BoilScheduler, Phase};

/// Builds a fresh countdown of the given length in seconds.
pub type CountdownFactory = Box<dyn Fn(u64) -> Box<dyn Countdown>>;

/// Status after one poll or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    /// Countdown finished; the workflow may advance.
    Done,
    /// Halted by the operator.
    Stopped,
}

impl From<Phase> for StepStatus {
    fn from(p: Phase) -> Self {
        match p {
            Phase::Waiting | Phase::Boiling => StepStatus::Running,
            Phase::Done => StepStatus::Done,
            Phase::Stopped => StepStatus::Stopped,
        }
    }
}

/// Operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Add this many seconds to a running countdown.
    Extend(u64),
    Reset,
    Stop,
}

pub struct BoilStep {
    pub(crate) scheduler: BoilScheduler,
    pub(crate) sensor: Box<dyn TempSensor>,
    pub(crate) kettle: Box<dyn KettleLogic>,
    pub(crate) notifier: Box<dyn Notifier>,
    pub(crate) dropper: Option<Box<dyn Actuator>>,
    pub(crate) countdown: Box<dyn Countdown>,
    pub(crate) new_countdown: CountdownFactory,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) last_temp: Option<f32>,
}

impl core::fmt::Debug for BoilStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoilStep")
            .field("phase", &self.scheduler.phase())
            .field("remaining_s", &self.countdown.remaining_secs())
            .field("countdown_running", &self.countdown.is_running())
            .field("last_temp", &self.last_temp)
            .field("has_dropper", &self.dropper.is_some())
            .finish()
    }
}

impl BoilStep {
    /// Start building a BoilStep.
    pub fn builder() -> crate::builder::BoilStepBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::BoilStepBuilder::default()
    }

    pub fn scheduler(&self) -> &BoilScheduler {
        &self.scheduler
    }

    pub fn summary(&self) -> &str {
        self.scheduler.summary()
    }

    pub fn status(&self) -> StepStatus {
        self.scheduler.phase().into()
    }

    /// Remaining countdown time as the countdown currently reports it.
    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    pub fn last_temp(&self) -> Option<f32> {
        self.last_temp
    }

    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        self.clock.clone()
    }

    /// Lifecycle hook: step (re)entered.
    pub fn on_start(&mut self) {
        let effects = self.scheduler.initialize();
        self.apply(effects);
        if self.countdown.is_running() {
            self.countdown.start();
            self.scheduler.on_resume();
        }
    }

    /// First-wort addition at the top of the run.
    pub fn on_run_start(&mut self) {
        let effects = self.scheduler.on_run_start();
        self.apply(effects);
    }

    /// Lifecycle hook: step stopped by the host.
    pub fn on_stop(&mut self) {
        let effects = self.scheduler.on_explicit_stop();
        self.apply(effects);
    }

    /// One iteration of the boil loop: sensor check, then countdown check.
    pub fn poll(&mut self) -> Result<StepStatus> {
        if self.scheduler.phase().is_terminal() {
            return Ok(self.status());
        }

        let sensor_id = self.scheduler.config().sensor_id.clone();
        let temp = self.sensor.read(&sensor_id).map_err(|e| {
            let mapped = map_sensor_error(e.as_ref());
            tracing::error!(sensor = %sensor_id, error = %mapped, "sensor read failed");
            Report::new(mapped)
        })?;
        self.last_temp = Some(temp);
        tracing::trace!(temp, "sensor tick");
        let effects = self.scheduler.on_sensor_tick(temp);
        self.apply(effects);

        if self.countdown.is_running() {
            let remaining = self.countdown.remaining_secs();
            let effects = self.scheduler.on_remaining_time_tick(remaining);
            self.apply(effects);
            if remaining == 0 {
                let effects = self.scheduler.on_countdown_complete();
                self.apply(effects);
            }
        }
        Ok(self.status())
    }

    /// Handle an operator command.
    pub fn command(&mut self, cmd: Command) -> StepStatus {
        tracing::debug!(?cmd, "operator command");
        let effects = match cmd {
            Command::Start => self.scheduler.on_explicit_start(),
            Command::Extend(secs) => self.scheduler.on_explicit_extend(secs),
            Command::Reset => self.scheduler.on_explicit_reset(),
            Command::Stop => self.scheduler.on_explicit_stop(),
        };
        self.apply(effects);
        self.status()
    }

    /// Stop the countdown without touching run state (error path).
    pub fn halt(&mut self) {
        self.countdown.stop();
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply_one(effect);
        }
    }

    fn apply_one(&mut self, effect: Effect) {
        let kettle_id = &self.scheduler.config().kettle_id;
        match effect {
            Effect::Notify {
                title,
                message,
                severity,
            } => self.notifier.notify(&title, &message, severity),
            Effect::SetTargetTemp(t) => {
                if let Err(e) = set_target_temp(self.kettle.as_mut(), kettle_id, t) {
                    tracing::warn!(kettle = %kettle_id, error = %e, "failed to set target temp");
                }
            }
            Effect::ClearTargetTemp => {
                if let Err(e) = set_target_temp(self.kettle.as_mut(), kettle_id, 0.0) {
                    tracing::warn!(kettle = %kettle_id, error = %e, "failed to clear target temp");
                }
            }
            Effect::StartCountdown {
                estimated_completion,
            } => {
                self.countdown.start();
                tracing::debug!(?estimated_completion, "countdown start");
            }
            Effect::StopCountdown => self.countdown.stop(),
            Effect::ExtendCountdown(secs) => self.countdown.add(secs),
            Effect::ResetCountdown { duration_s } => {
                self.countdown.stop();
                self.countdown = (self.new_countdown)(duration_s);
            }
            Effect::HopDrop => match self.dropper.as_mut() {
                Some(d) => {
                    if let Err(e) = drop_hops(d.as_mut()) {
                        tracing::error!(error = %e, "hop dropper failed");
                    }
                }
                None => tracing::debug!("no hop dropper configured"),
            },
            Effect::AutoMode(req) => {
                if let Err(e) = set_auto_mode(self.kettle.as_mut(), kettle_id, req) {
                    tracing::error!(
                        kettle = %kettle_id,
                        ?req,
                        error = %e,
                        "failed to switch kettle logic"
                    );
                }
            }
            Effect::Done => tracing::debug!("step done"),
        }
    }
}

fn kettle_error(e: boil_traits::BoxError) -> BoilError {
    BoilError::Kettle(e.to_string())
}

fn set_target_temp(
    kettle: &mut dyn KettleLogic,
    kettle_id: &str,
    temp: f32,
) -> std::result::Result<(), BoilError> {
    kettle.set_target_temp(kettle_id, temp).map_err(kettle_error)
}

fn drop_hops(dropper: &mut dyn Actuator) -> std::result::Result<(), BoilError> {
    dropper
        .turn_on()
        .map_err(|e| BoilError::Actuator(e.to_string()))
}

/// Command the kettle logic only when its current state differs.
fn set_auto_mode(
    kettle: &mut dyn KettleLogic,
    kettle_id: &str,
    req: AutoMode,
) -> std::result::Result<(), BoilError> {
    let on = kettle.is_on(kettle_id).map_err(kettle_error)?;
    match (req, on) {
        (AutoMode::Engage, false) => {
            tracing::info!(kettle = %kettle_id, "kettle logic on");
            kettle.toggle(kettle_id).map_err(kettle_error)
        }
        (AutoMode::Disengage, true) => {
            tracing::info!(kettle = %kettle_id, "kettle logic off");
            kettle.stop(kettle_id).map_err(kettle_error)
        }
        _ => {
            tracing::debug!(
                kettle = %kettle_id,
                ?req,
                on,
                "kettle logic already in requested state"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boil_traits::BoxError;

    struct OfflineKettle;

    impl KettleLogic for OfflineKettle {
        fn is_on(&self, _kettle_id: &str) -> std::result::Result<bool, BoxError> {
            Err("kettle offline".into())
        }
        fn toggle(&mut self, _kettle_id: &str) -> std::result::Result<(), BoxError> {
            Err("kettle offline".into())
        }
        fn stop(&mut self, _kettle_id: &str) -> std::result::Result<(), BoxError> {
            Err("kettle offline".into())
        }
        fn set_target_temp(
            &mut self,
            _kettle_id: &str,
            _temp: f32,
        ) -> std::result::Result<(), BoxError> {
            Err("kettle offline".into())
        }
    }

    struct StuckDropper;

    impl Actuator for StuckDropper {
        fn turn_on(&mut self) -> std::result::Result<(), BoxError> {
            Err("gpio busy".into())
        }
    }

    #[test]
    fn kettle_failures_are_typed() {
        let mut k = OfflineKettle;
        let err = set_auto_mode(&mut k, "k1", AutoMode::Engage).expect_err("offline");
        assert!(matches!(&err, BoilError::Kettle(m) if m == "kettle offline"));
        let err = set_target_temp(&mut k, "k1", 99.0).expect_err("offline");
        assert!(matches!(err, BoilError::Kettle(_)));
    }

    #[test]
    fn dropper_failures_are_typed() {
        let err = drop_hops(&mut StuckDropper).expect_err("busy");
        assert!(matches!(&err, BoilError::Actuator(m) if m == "gpio busy"));
    }
}
