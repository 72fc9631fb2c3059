//! Simulation backend: kettle, probe, hop dropper and a virtual-time clock.
//!
//! The simulated sensor heats faster while the simulated kettle logic is on,
//! so auto-mode has a visible effect in a simulated run.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use boil_traits::{Actuator, BoxError, Clock, KettleLogic, ManualClock, TempSensor};

/// Shared state of the simulated kettle.
#[derive(Debug, Default, Clone)]
pub struct KettleState {
    pub logic_on: bool,
    pub target_temp: f32,
    pub toggles: u32,
    pub stops: u32,
}

/// Simulated kettle logic. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct SimulatedKettle {
    state: Rc<RefCell<KettleState>>,
}

impl SimulatedKettle {
    pub fn new(logic_on: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(KettleState {
                logic_on,
                ..KettleState::default()
            })),
        }
    }

    pub fn snapshot(&self) -> KettleState {
        self.state.borrow().clone()
    }
}

impl KettleLogic for SimulatedKettle {
    fn is_on(&self, _kettle_id: &str) -> Result<bool, BoxError> {
        Ok(self.state.borrow().logic_on)
    }

    fn toggle(&mut self, kettle_id: &str) -> Result<(), BoxError> {
        let mut st = self.state.borrow_mut();
        st.logic_on = !st.logic_on;
        st.toggles += 1;
        tracing::info!(kettle = kettle_id, on = st.logic_on, "kettle logic toggled (simulated)");
        Ok(())
    }

    fn stop(&mut self, kettle_id: &str) -> Result<(), BoxError> {
        let mut st = self.state.borrow_mut();
        st.logic_on = false;
        st.stops += 1;
        tracing::info!(kettle = kettle_id, "kettle logic stopped (simulated)");
        Ok(())
    }

    fn set_target_temp(&mut self, kettle_id: &str, temp: f32) -> Result<(), BoxError> {
        self.state.borrow_mut().target_temp = temp;
        tracing::debug!(kettle = kettle_id, temp, "target temp (simulated)");
        Ok(())
    }
}

/// Simulated probe that warms up on every read and levels off at `max_temp`.
///
/// When linked to a kettle, it only heats at full rate while the kettle
/// logic is on and drifts at a quarter rate otherwise.
pub struct SimulatedSensor {
    temp: f32,
    rise_per_read: f32,
    max_temp: f32,
    kettle: Option<SimulatedKettle>,
}

impl SimulatedSensor {
    pub fn new(start_temp: f32, rise_per_read: f32, max_temp: f32) -> Self {
        Self {
            temp: start_temp,
            rise_per_read,
            max_temp,
            kettle: None,
        }
    }

    pub fn linked_to(mut self, kettle: SimulatedKettle) -> Self {
        self.kettle = Some(kettle);
        self
    }
}

impl TempSensor for SimulatedSensor {
    fn read(&mut self, sensor_id: &str) -> Result<f32, BoxError> {
        let heating = self
            .kettle
            .as_ref()
            .is_none_or(|k| k.state.borrow().logic_on);
        let rise = if heating {
            self.rise_per_read
        } else {
            self.rise_per_read / 4.0
        };
        self.temp = (self.temp + rise).min(self.max_temp);
        tracing::trace!(sensor = sensor_id, temp = self.temp, "sensor read (simulated)");
        Ok(self.temp)
    }
}

/// Simulated hop dropper; counts pulses.
#[derive(Debug, Default, Clone)]
pub struct SimulatedHopDropper {
    pulses: Rc<RefCell<u32>>,
}

impl SimulatedHopDropper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> u32 {
        *self.pulses.borrow()
    }
}

impl Actuator for SimulatedHopDropper {
    fn turn_on(&mut self) -> Result<(), BoxError> {
        *self.pulses.borrow_mut() += 1;
        tracing::info!(pulse = *self.pulses.borrow(), "hop dropper on (simulated)");
        Ok(())
    }
}

/// Virtual-time clock: `sleep(d)` advances time by `d` but only blocks for
/// `d / speedup`. A speedup of 1 behaves like a real clock.
#[derive(Debug, Clone)]
pub struct SimClock {
    inner: ManualClock,
    speedup: u32,
}

impl SimClock {
    pub fn new(speedup: u32) -> Self {
        Self {
            inner: ManualClock::new(),
            speedup: speedup.max(1),
        }
    }

    pub fn shared(speedup: u32) -> Arc<dyn Clock + Send + Sync> {
        Arc::new(Self::new(speedup))
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.inner.now()
    }

    fn system_now(&self) -> SystemTime {
        self.inner.system_now()
    }

    fn sleep(&self, d: Duration) {
        let real = d / self.speedup;
        if !real.is_zero() {
            std::thread::sleep(real);
        }
        self.inner.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_levels_off_at_max() {
        let mut s = SimulatedSensor::new(95.0, 2.0, 100.0);
        let readings: Vec<f32> = (0..4).map(|_| s.read("p").unwrap()).collect();
        assert_eq!(readings, vec![97.0, 99.0, 100.0, 100.0]);
    }

    #[test]
    fn linked_sensor_heats_slowly_while_logic_off() {
        let kettle = SimulatedKettle::new(false);
        let mut s = SimulatedSensor::new(20.0, 4.0, 100.0).linked_to(kettle.clone());
        assert_eq!(s.read("p").unwrap(), 21.0);
        kettle.clone().toggle("k").unwrap();
        assert_eq!(s.read("p").unwrap(), 25.0);
    }

    #[test]
    fn kettle_clones_share_state() {
        let k = SimulatedKettle::new(false);
        let mut handle = k.clone();
        handle.toggle("k").unwrap();
        handle.set_target_temp("k", 99.0).unwrap();
        let snap = k.snapshot();
        assert!(snap.logic_on);
        assert_eq!(snap.toggles, 1);
        assert_eq!(snap.target_temp, 99.0);
    }

    #[test]
    fn sim_clock_advances_virtual_time() {
        let c = SimClock::new(1000);
        let t0 = c.now();
        c.sleep(Duration::from_secs(2));
        assert_eq!(c.ms_since(t0), 2000);
    }

    #[test]
    fn dropper_counts_pulses() {
        let d = SimulatedHopDropper::new();
        let mut h = d.clone();
        h.turn_on().unwrap();
        h.turn_on().unwrap();
        assert_eq!(d.pulses(), 2);
    }
}
