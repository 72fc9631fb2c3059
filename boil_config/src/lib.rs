#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the boil controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Hop offsets may be given as a `hops` list or as the individual
//!   `hop_1` .. `hop_6` keys, not both.
use eyre::WrapErr;
use serde::Deserialize;
use std::path::Path;

/// Number of hop slots a boil step supports.
pub const MAX_HOPS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct StepCfg {
    /// Step name, used as the notification title
    #[serde(default = "default_step_name")]
    pub name: String,
    /// Countdown length in minutes
    pub timer_minutes: u32,
    /// Target temperature in device units
    pub temp: f32,
    /// Sensor id passed to the temperature sensor
    pub sensor: String,
    /// Kettle id passed to the kettle logic
    pub kettle: String,
    #[serde(default)]
    pub lid_alert: bool,
    #[serde(default)]
    pub auto_mode: bool,
    #[serde(default)]
    pub first_wort: bool,
    /// Minutes before finish, in slot order
    #[serde(default)]
    pub hops: Option<Vec<u32>>,
    #[serde(default)]
    pub hop_1: Option<u32>,
    #[serde(default)]
    pub hop_2: Option<u32>,
    #[serde(default)]
    pub hop_3: Option<u32>,
    #[serde(default)]
    pub hop_4: Option<u32>,
    #[serde(default)]
    pub hop_5: Option<u32>,
    #[serde(default)]
    pub hop_6: Option<u32>,
}

fn default_step_name() -> String {
    "Boil".to_string()
}

impl StepCfg {
    fn named_hops(&self) -> [Option<u32>; MAX_HOPS] {
        [
            self.hop_1, self.hop_2, self.hop_3, self.hop_4, self.hop_5, self.hop_6,
        ]
    }

    /// Hop offsets (minutes) by slot; slot `i` is hop number `i + 1`.
    pub fn hop_slots(&self) -> [Option<u32>; MAX_HOPS] {
        match &self.hops {
            Some(list) => {
                let mut out = [None; MAX_HOPS];
                for (slot, v) in out.iter_mut().zip(list.iter()) {
                    *slot = Some(*v);
                }
                out
            }
            None => self.named_hops(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum TempUnit {
    #[default]
    #[serde(alias = "c", alias = "celsius")]
    C,
    #[serde(alias = "f", alias = "fahrenheit")]
    F,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Units {
    pub temp_unit: TempUnit,
}

#[derive(Debug, Deserialize)]
pub struct HopDropperCfg {
    /// GPIO (BCM numbering) the dropper is wired to
    pub gpio: u8,
    /// Seconds until the dropper switches off again
    #[serde(default = "default_dropper_timeout")]
    pub timeout_s: f32,
}

fn default_dropper_timeout() -> f32 {
    2.0
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Poll period in milliseconds
    pub tick_ms: u64,
    /// Seconds added by the extend command
    pub extend_s: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            extend_s: 300,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Directory of the Linux 1-Wire sysfs devices
    pub w1_dir: String,
    /// Optional heater relay driven as kettle logic
    pub kettle_relay_gpio: Option<u8>,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            w1_dir: "/sys/bus/w1/devices".to_string(),
            kettle_relay_gpio: None,
        }
    }
}

/// Simulation backend knobs; ignored with real hardware.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    pub start_temp: f32,
    /// Degrees added per sensor read
    pub rise_per_tick: f32,
    /// Temperature the simulated kettle levels off at
    pub max_temp: f32,
    /// Whether the simulated kettle logic starts switched on
    pub kettle_on: bool,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            start_temp: 20.0,
            rise_per_tick: 1.5,
            max_temp: 100.5,
            kettle_on: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub step: StepCfg,
    #[serde(default)]
    pub units: Units,
    /// Optional hop dropper actuator
    #[serde(default)]
    pub hop_dropper: Option<HopDropperCfg>,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
///
/// Each stage adds its own context ("read config", "parse config",
/// "invalid configuration") on top of the underlying error.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Step
        if self.step.name.trim().is_empty() {
            eyre::bail!("step.name must not be empty");
        }
        if self.step.timer_minutes == 0 {
            eyre::bail!("step.timer_minutes must be >= 1");
        }
        if self.step.timer_minutes > 24 * 60 {
            eyre::bail!("step.timer_minutes is unreasonably large (>24h)");
        }
        if !self.step.temp.is_finite() || self.step.temp <= 0.0 {
            eyre::bail!("step.temp must be a finite value > 0");
        }
        if self.step.sensor.trim().is_empty() {
            eyre::bail!("step.sensor must not be empty");
        }
        if self.step.kettle.trim().is_empty() {
            eyre::bail!("step.kettle must not be empty");
        }
        if let Some(list) = &self.step.hops {
            if list.len() > MAX_HOPS {
                eyre::bail!("step.hops accepts at most {MAX_HOPS} entries, got {}", list.len());
            }
            if self.step.named_hops().iter().any(Option::is_some) {
                eyre::bail!("step.hops and step.hop_N are mutually exclusive");
            }
        }

        // Hop dropper
        if let Some(hd) = &self.hop_dropper {
            if hd.gpio > 27 {
                eyre::bail!("hop_dropper.gpio must be in 0..=27");
            }
            if !(hd.timeout_s.is_finite() && hd.timeout_s > 0.0) {
                eyre::bail!("hop_dropper.timeout_s must be > 0");
            }
        }

        // Hardware
        if let Some(pin) = self.hardware.kettle_relay_gpio {
            if pin > 27 {
                eyre::bail!("hardware.kettle_relay_gpio must be in 0..=27");
            }
            if self.hop_dropper.as_ref().is_some_and(|hd| hd.gpio == pin) {
                eyre::bail!("hardware.kettle_relay_gpio must differ from hop_dropper.gpio");
            }
        }

        // Runner
        if self.runner.tick_ms == 0 {
            eyre::bail!("runner.tick_ms must be >= 1");
        }
        if self.runner.tick_ms > 60_000 {
            eyre::bail!("runner.tick_ms is unreasonably large (>60s)");
        }
        if self.runner.extend_s == 0 {
            eyre::bail!("runner.extend_s must be >= 1");
        }

        // Logging
        if let Some(r) = &self.logging.rotation
            && !matches!(r.as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Sim
        if !(self.sim.start_temp.is_finite()
            && self.sim.rise_per_tick.is_finite()
            && self.sim.max_temp.is_finite())
        {
            eyre::bail!("sim values must be finite");
        }

        Ok(())
    }
}
