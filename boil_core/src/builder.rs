//! Type-state builder for `BoilStep`.
//!
//! The builder enforces at compile time that a sensor, kettle logic and boil
//! config are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use boil_traits::clock::{Clock, MonotonicClock};
use boil_traits::{Actuator, Countdown, KettleLogic, Notifier, TempSensor};

use crate::config::{BoilConfig, MAX_DURATION_S, MAX_HOPS};
use crate::countdown::ClockCountdown;
use crate::error::{BuildError, Result};
use crate::notify::TracingNotifier;
use crate::scheduler::BoilScheduler;
use crate::step::{BoilStep, CountdownFactory};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `BoilStep`. All fields are validated on `build()`.
pub struct BoilStepBuilder<S, K, C> {
    sensor: Option<Box<dyn TempSensor>>,
    kettle: Option<Box<dyn KettleLogic>>,
    config: Option<BoilConfig>,
    notifier: Option<Box<dyn Notifier>>,
    dropper: Option<Box<dyn Actuator>>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    countdown_factory: Option<CountdownFactory>,
    _s: PhantomData<S>,
    _k: PhantomData<K>,
    _c: PhantomData<C>,
}

impl Default for BoilStepBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            kettle: None,
            config: None,
            notifier: None,
            dropper: None,
            clock: None,
            countdown_factory: None,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<S, K, C> BoilStepBuilder<S, K, C> {
    fn retype<S2, K2, C2>(self) -> BoilStepBuilder<S2, K2, C2> {
        BoilStepBuilder {
            sensor: self.sensor,
            kettle: self.kettle,
            config: self.config,
            notifier: self.notifier,
            dropper: self.dropper,
            clock: self.clock,
            countdown_factory: self.countdown_factory,
            _s: PhantomData,
            _k: PhantomData,
            _c: PhantomData,
        }
    }

    pub fn with_sensor(mut self, sensor: impl TempSensor + 'static) -> BoilStepBuilder<Set, K, C> {
        self.sensor = Some(Box::new(sensor));
        self.retype()
    }

    pub fn with_kettle(mut self, kettle: impl KettleLogic + 'static) -> BoilStepBuilder<S, Set, C> {
        self.kettle = Some(Box::new(kettle));
        self.retype()
    }

    pub fn with_config(mut self, config: BoilConfig) -> BoilStepBuilder<S, K, Set> {
        self.config = Some(config);
        self.retype()
    }

    /// Notification sink; defaults to the tracing log.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Hop dropper actuator; without one, hop additions only notify.
    pub fn with_hop_dropper(mut self, dropper: impl Actuator + 'static) -> Self {
        self.dropper = Some(Box::new(dropper));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Supply a custom countdown; called again on every reset.
    pub fn with_countdown_factory<F, D>(mut self, f: F) -> Self
    where
        F: Fn(u64) -> D + 'static,
        D: Countdown + 'static,
    {
        self.countdown_factory =
            Some(Box::new(move |secs| Box::new(f(secs)) as Box<dyn Countdown>));
        self
    }

    /// Build with dynamic checks, available in any state.
    pub fn try_build(self) -> Result<BoilStep> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let kettle = self
            .kettle
            .ok_or_else(|| eyre::Report::new(BuildError::MissingKettle))?;
        let config = self
            .config
            .ok_or_else(|| eyre::Report::new(BuildError::MissingConfig))?;
        validate(&config)?;

        let clock: Arc<dyn Clock + Send + Sync> =
            self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let new_countdown: CountdownFactory = match self.countdown_factory {
            Some(f) => f,
            None => {
                let c = clock.clone();
                Box::new(move |secs| {
                    Box::new(ClockCountdown::new(secs, c.clone())) as Box<dyn Countdown>
                })
            }
        };
        let countdown = new_countdown(config.total_duration_s);
        let notifier = self
            .notifier
            .unwrap_or_else(|| Box::new(TracingNotifier));

        Ok(BoilStep {
            scheduler: BoilScheduler::new(config, clock.clone()),
            sensor,
            kettle,
            notifier,
            dropper: self.dropper,
            countdown,
            new_countdown,
            clock,
            last_temp: None,
        })
    }
}

impl BoilStepBuilder<Set, Set, Set> {
    pub fn build(self) -> Result<BoilStep> {
        self.try_build()
    }
}

fn validate(cfg: &BoilConfig) -> Result<()> {
    if !cfg.target_temp.is_finite() || cfg.target_temp <= 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "target temperature must be > 0",
        )));
    }
    if cfg.total_duration_s == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "countdown duration must be > 0",
        )));
    }
    if cfg.total_duration_s > MAX_DURATION_S {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "countdown duration must be at most 24h",
        )));
    }
    if cfg.name.trim().is_empty() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "step name must not be empty",
        )));
    }
    if !cfg.lid_threshold.is_finite() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "lid threshold must be finite",
        )));
    }
    if cfg.hops.len() > MAX_HOPS {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "at most six hop actions",
        )));
    }
    let mut seen = crate::hops::FiredHops::new();
    let mut last = 0u8;
    for hop in &cfg.hops {
        if !(1..=MAX_HOPS as u8).contains(&hop.index) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "hop index must be in 1..=6",
            )));
        }
        if !seen.insert(hop.index) || hop.index < last {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "hop indices must be unique and ascending",
            )));
        }
        last = hop.index;
    }
    Ok(())
}
