//! 1-Wire (DS18B20) temperature probes through the Linux w1 sysfs driver.
//!
//! Each probe appears as `<dir>/<id>/w1_slave`, where `<id>` is the sensor id
//! from the config (e.g. `28-0316a2795aff`).

use std::path::PathBuf;

use boil_traits::{BoxError, TempSensor};
use tracing::trace;

use crate::error::{HwError, Result};

pub struct W1Sensor {
    dir: PathBuf,
    fahrenheit: bool,
}

impl W1Sensor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fahrenheit: false,
        }
    }

    /// Report readings in Fahrenheit instead of the driver's Celsius.
    pub fn fahrenheit(mut self, on: bool) -> Self {
        self.fahrenheit = on;
        self
    }

    pub fn read_probe(&self, id: &str) -> Result<f32> {
        let path = self.dir.join(id).join("w1_slave");
        if !path.exists() {
            return Err(HwError::SensorUnavailable(id.to_string()));
        }
        let text = std::fs::read_to_string(&path)?;
        let c = parse_w1_slave(&text)?;
        trace!(sensor = id, celsius = c, "w1 read");
        Ok(if self.fahrenheit { c * 9.0 / 5.0 + 32.0 } else { c })
    }
}

impl TempSensor for W1Sensor {
    fn read(&mut self, sensor_id: &str) -> std::result::Result<f32, BoxError> {
        Ok(self.read_probe(sensor_id)?)
    }
}

/// Parse the two-line `w1_slave` format; the first line must end in `YES`
/// (CRC ok), the second carries `t=<millidegrees>`.
pub fn parse_w1_slave(text: &str) -> Result<f32> {
    let mut lines = text.lines();
    let crc = lines
        .next()
        .ok_or_else(|| HwError::BadData("empty w1_slave".into()))?;
    if !crc.trim_end().ends_with("YES") {
        return Err(HwError::BadData("crc check failed".into()));
    }
    let data = lines
        .next()
        .ok_or_else(|| HwError::BadData("missing temperature line".into()))?;
    let raw = data
        .split("t=")
        .nth(1)
        .ok_or_else(|| HwError::BadData("missing t= field".into()))?
        .trim();
    let milli: i32 = raw
        .parse()
        .map_err(|_| HwError::BadData(format!("bad temperature value {raw:?}")))?;
    Ok(milli as f32 / 1000.0)
}
