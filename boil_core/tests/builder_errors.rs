use boil_core::error::BuildError;
use boil_core::config::MAX_DURATION_S;
use boil_core::{BoilConfig, BoilStep, HopAction};
use boil_hardware::{SimulatedKettle, SimulatedSensor};
use rstest::rstest;

#[rstest]
fn builder_missing_sensor_yields_typed_build_error() {
    let err = BoilStep::builder()
        // missing with_sensor()
        .with_kettle(SimulatedKettle::new(false))
        .with_config(BoilConfig::default())
        .try_build()
        .expect_err("should fail with MissingSensor");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingSensor) => {}
        other => panic!("expected MissingSensor, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_config_yields_typed_build_error() {
    let err = BoilStep::builder()
        .with_sensor(SimulatedSensor::new(20.0, 1.0, 100.0))
        .with_kettle(SimulatedKettle::new(false))
        .try_build()
        .expect_err("should fail with MissingConfig");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingConfig)
    ));
}

fn build_with(cfg: BoilConfig) -> eyre::Result<BoilStep> {
    BoilStep::builder()
        .with_sensor(SimulatedSensor::new(20.0, 1.0, 100.0))
        .with_kettle(SimulatedKettle::new(false))
        .with_config(cfg)
        .build()
}

#[rstest]
#[case::zero_target(BoilConfig { target_temp: 0.0, ..BoilConfig::default() })]
#[case::nan_target(BoilConfig { target_temp: f32::NAN, ..BoilConfig::default() })]
#[case::zero_duration(BoilConfig { total_duration_s: 0, ..BoilConfig::default() })]
#[case::duration_past_one_day(BoilConfig {
    total_duration_s: MAX_DURATION_S + 1,
    ..BoilConfig::default()
})]
#[case::unbounded_duration(BoilConfig { total_duration_s: u64::MAX, ..BoilConfig::default() })]
#[case::blank_name(BoilConfig { name: " ".into(), ..BoilConfig::default() })]
#[case::seven_hops(BoilConfig {
    hops: (1..=7).map(|i| HopAction::new(i, 5)).collect(),
    ..BoilConfig::default()
})]
#[case::slot_out_of_range(BoilConfig {
    hops: vec![HopAction::new(7, 5)],
    ..BoilConfig::default()
})]
#[case::duplicate_slot(BoilConfig {
    hops: vec![HopAction::new(2, 10), HopAction::new(2, 5)],
    ..BoilConfig::default()
})]
fn invalid_config_is_rejected(#[case] cfg: BoilConfig) {
    let err = build_with(cfg).expect_err("config should be rejected");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn six_hops_with_gaps_are_accepted() {
    let cfg = BoilConfig {
        hops: vec![HopAction::new(1, 60), HopAction::new(3, 30), HopAction::new(6, 0)],
        ..BoilConfig::default()
    };
    let step = build_with(cfg).expect("valid config");
    assert_eq!(step.remaining_secs(), 3600);
}

#[rstest]
fn one_day_countdown_is_accepted() {
    let cfg = BoilConfig {
        total_duration_s: MAX_DURATION_S,
        ..BoilConfig::default()
    };
    let step = build_with(cfg).expect("24h is the limit, not past it");
    assert_eq!(step.remaining_secs(), MAX_DURATION_S);
}
