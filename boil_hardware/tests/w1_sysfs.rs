use boil_hardware::{HwError, W1Sensor};
use boil_traits::TempSensor;
use std::fs;

fn probe_dir(id: &str, body: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let dev = dir.path().join(id);
    fs::create_dir_all(&dev).unwrap();
    fs::write(dev.join("w1_slave"), body).unwrap();
    dir
}

#[test]
fn reads_probe_through_trait() {
    let dir = probe_dir(
        "28-0316a2795aff",
        "4b 01 4b 46 7f ff 05 10 e1 : crc=e1 YES\n4b 01 4b 46 7f ff 05 10 e1 t=99500\n",
    );
    let mut s = W1Sensor::new(dir.path());
    let t = s.read("28-0316a2795aff").unwrap();
    assert!((t - 99.5).abs() < 1e-4);
}

#[test]
fn converts_to_fahrenheit() {
    let dir = probe_dir("28-a", "x : crc=00 YES\nx t=100000\n");
    let s = W1Sensor::new(dir.path()).fahrenheit(true);
    assert!((s.read_probe("28-a").unwrap() - 212.0).abs() < 1e-3);
}

#[test]
fn missing_probe_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let s = W1Sensor::new(dir.path());
    match s.read_probe("28-missing") {
        Err(HwError::SensorUnavailable(id)) => assert_eq!(id, "28-missing"),
        other => panic!("expected SensorUnavailable, got {other:?}"),
    }
}
