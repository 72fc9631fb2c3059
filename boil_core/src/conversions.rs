//! `From` implementations bridging `boil_config` types to `boil_core` types.

use crate::config::{BoilConfig, HopAction, TempUnit};

// ── TempUnit ─────────────────────────────────────────────────────────────────

impl From<boil_config::TempUnit> for TempUnit {
    fn from(u: boil_config::TempUnit) -> Self {
        match u {
            boil_config::TempUnit::C => TempUnit::Celsius,
            boil_config::TempUnit::F => TempUnit::Fahrenheit,
        }
    }
}

// ── BoilConfig ───────────────────────────────────────────────────────────────

impl From<&boil_config::Config> for BoilConfig {
    fn from(c: &boil_config::Config) -> Self {
        let hops = c
            .step
            .hop_slots()
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|m| HopAction::new(i as u8 + 1, m)))
            .collect();
        Self {
            name: c.step.name.clone(),
            target_temp: c.step.temp,
            total_duration_s: u64::from(c.step.timer_minutes) * 60,
            hops,
            first_wort: c.step.first_wort,
            lid_alert: c.step.lid_alert,
            lid_threshold: TempUnit::from(c.units.temp_unit).lid_threshold(),
            auto_mode: c.step.auto_mode,
            sensor_id: c.step.sensor.clone(),
            kettle_id: c.step.kettle.clone(),
        }
    }
}
