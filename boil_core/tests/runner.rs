use std::sync::Arc;
use std::time::Duration;

use boil_core::{BoilConfig, BoilError, BoilStep, Command, RunOutcome, RunParams, run};
use boil_hardware::{HwError, SimulatedHopDropper, SimulatedKettle};
use boil_traits::{Actuator, BoxError, KettleLogic, ManualClock, TempSensor};
use crossbeam_channel as xch;
use rstest::rstest;

struct Constant(f32);

impl TempSensor for Constant {
    fn read(&mut self, _sensor_id: &str) -> Result<f32, BoxError> {
        Ok(self.0)
    }
}

/// Reads fine a fixed number of times, then times out.
struct FlakySensor {
    good_reads: u32,
}

impl TempSensor for FlakySensor {
    fn read(&mut self, _sensor_id: &str) -> Result<f32, BoxError> {
        if self.good_reads == 0 {
            return Err(Box::new(HwError::Timeout));
        }
        self.good_reads -= 1;
        Ok(100.0)
    }
}

struct BrokenKettle;

impl KettleLogic for BrokenKettle {
    fn is_on(&self, _kettle_id: &str) -> Result<bool, BoxError> {
        Err("kettle offline".into())
    }
    fn toggle(&mut self, _kettle_id: &str) -> Result<(), BoxError> {
        Err("kettle offline".into())
    }
    fn stop(&mut self, _kettle_id: &str) -> Result<(), BoxError> {
        Err("kettle offline".into())
    }
    fn set_target_temp(&mut self, _kettle_id: &str, _temp: f32) -> Result<(), BoxError> {
        Err("kettle offline".into())
    }
}

struct JammedDropper;

impl Actuator for JammedDropper {
    fn turn_on(&mut self) -> Result<(), BoxError> {
        Err("gpio busy".into())
    }
}

fn step_with(
    cfg: BoilConfig,
    sensor: impl TempSensor + 'static,
    kettle: impl KettleLogic + 'static,
    dropper: impl Actuator + 'static,
    clock: &ManualClock,
) -> BoilStep {
    BoilStep::builder()
        .with_sensor(sensor)
        .with_kettle(kettle)
        .with_config(cfg)
        .with_hop_dropper(dropper)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .expect("build step")
}

#[rstest]
fn runs_to_completion_on_manual_clock() {
    let clock = ManualClock::new();
    let dropper = SimulatedHopDropper::new();
    let cfg = BoilConfig::default().with_minutes(1).with_hop_minutes(&[0]);
    let mut step = step_with(
        cfg,
        Constant(99.0),
        SimulatedKettle::new(true),
        dropper.clone(),
        &clock,
    );

    let report = run(&mut step, None, RunParams::default()).expect("run");
    assert_eq!(report.outcome, RunOutcome::Done);
    assert_eq!(report.hops_fired, vec![1]);
    assert_eq!(dropper.pulses(), 1);
    assert_eq!(report.ticks, 61);
    assert_eq!(clock.elapsed(), Duration::from_secs(61));
}

#[rstest]
fn queued_start_and_extend_are_applied_before_first_tick() {
    let clock = ManualClock::new();
    let cfg = BoilConfig::default().with_minutes(1);
    let mut step = step_with(
        cfg,
        Constant(20.0),
        SimulatedKettle::new(false),
        SimulatedHopDropper::new(),
        &clock,
    );

    let (tx, rx) = xch::unbounded();
    tx.send(Command::Start).expect("send");
    // Zero means "the configured extension".
    tx.send(Command::Extend(0)).expect("send");

    let params = RunParams {
        extend_s: 300,
        ..RunParams::default()
    };
    let report = run(&mut step, Some(&rx), params).expect("run");
    assert_eq!(report.outcome, RunOutcome::Done);
    assert_eq!(report.ticks, 360);
}

#[rstest]
fn queued_stop_ends_run_without_ticking() {
    let clock = ManualClock::new();
    let kettle = SimulatedKettle::new(false);
    let cfg = BoilConfig {
        auto_mode: true,
        ..BoilConfig::default()
    };
    let mut step = step_with(
        cfg,
        Constant(20.0),
        kettle.clone(),
        SimulatedHopDropper::new(),
        &clock,
    );

    let (tx, rx) = xch::bounded(4);
    tx.send(Command::Stop).expect("send");
    let report = run(&mut step, Some(&rx), RunParams::default()).expect("run");
    assert_eq!(report.outcome, RunOutcome::Stopped);
    assert_eq!(report.ticks, 0);
    let k = kettle.snapshot();
    assert!(!k.logic_on);
    assert_eq!(k.target_temp, 0.0);
}

#[rstest]
fn sensor_timeout_halts_countdown_and_propagates() {
    let clock = ManualClock::new();
    let cfg = BoilConfig::default().with_minutes(10);
    let mut step = step_with(
        cfg,
        FlakySensor { good_reads: 5 },
        SimulatedKettle::new(true),
        SimulatedHopDropper::new(),
        &clock,
    );

    let err = run(&mut step, None, RunParams::default()).expect_err("sensor failure");
    assert!(matches!(err.downcast_ref::<BoilError>(), Some(BoilError::Timeout)));

    let frozen = step.remaining_secs();
    assert!(frozen < 600);
    clock.advance(Duration::from_secs(30));
    assert_eq!(step.remaining_secs(), frozen);
}

#[rstest]
fn collaborator_failures_do_not_stop_the_run() {
    let clock = ManualClock::new();
    let cfg = BoilConfig {
        auto_mode: true,
        first_wort: true,
        ..BoilConfig::default().with_minutes(2).with_hop_minutes(&[1])
    };
    let mut step = step_with(cfg, Constant(100.0), BrokenKettle, JammedDropper, &clock);

    let report = run(&mut step, None, RunParams::default()).expect("run");
    assert_eq!(report.outcome, RunOutcome::Done);
    assert_eq!(report.hops_fired, vec![1]);
    assert!(report.first_wort);
}

#[rstest]
fn report_marks_lid_alert() {
    let clock = ManualClock::new();
    let cfg = BoilConfig {
        lid_alert: true,
        ..BoilConfig::default().with_minutes(1)
    };
    let mut step = step_with(
        cfg,
        Constant(99.0),
        SimulatedKettle::new(true),
        SimulatedHopDropper::new(),
        &clock,
    );
    let report = run(&mut step, None, RunParams::default()).expect("run");
    assert!(report.lid_alerted);
    assert!(!report.first_wort);
}
