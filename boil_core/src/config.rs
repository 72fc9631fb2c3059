//! Core configuration types for a boil run.
//!
//! These are the validated, hardware-independent values the scheduler works
//! with. `conversions` builds them from the TOML schema in `boil_config`.

/// Number of hop slots a boil step supports.
pub const MAX_HOPS: usize = 6;

/// Longest countdown a step accepts (24 h).
pub const MAX_DURATION_S: u64 = 24 * 60 * 60;

/// Notification title used when a step has no name of its own.
pub const DEFAULT_STEP_NAME: &str = "Boil";

/// Lid alert threshold for Celsius devices.
pub const LID_ALERT_C: f32 = 95.0;
/// Lid alert threshold for Fahrenheit devices.
pub const LID_ALERT_F: f32 = 203.0;

/// Temperature unit of the device; only used to derive the lid threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn lid_threshold(self) -> f32 {
        match self {
            TempUnit::Celsius => LID_ALERT_C,
            TempUnit::Fahrenheit => LID_ALERT_F,
        }
    }
}

/// One-shot hop addition keyed to "N minutes remaining".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopAction {
    /// Slot number, 1..=6.
    pub index: u8,
    /// Minutes before the end of the boil.
    pub offset_min: u32,
    pub label: String,
}

impl HopAction {
    pub fn new(index: u8, offset_min: u32) -> Self {
        Self {
            index,
            offset_min,
            label: format!("Hop {index}"),
        }
    }

    /// Highest remaining-seconds value at which this hop is due. The extra
    /// second absorbs the 1 Hz polling granularity.
    #[inline]
    pub fn due_at_s(&self) -> u64 {
        u64::from(self.offset_min) * 60 + 1
    }
}

/// Immutable per-run configuration.
#[derive(Debug, Clone)]
pub struct BoilConfig {
    /// Step name; the title of every operator notification.
    pub name: String,
    pub target_temp: f32,
    /// Countdown length in seconds.
    pub total_duration_s: u64,
    /// Hop actions, ascending by index.
    pub hops: Vec<HopAction>,
    pub first_wort: bool,
    pub lid_alert: bool,
    pub lid_threshold: f32,
    pub auto_mode: bool,
    pub sensor_id: String,
    pub kettle_id: String,
}

impl Default for BoilConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STEP_NAME.into(),
            target_temp: 99.0,
            total_duration_s: 60 * 60,
            hops: Vec::new(),
            first_wort: false,
            lid_alert: false,
            lid_threshold: LID_ALERT_C,
            auto_mode: false,
            sensor_id: "sensor".into(),
            kettle_id: "kettle".into(),
        }
    }
}

impl BoilConfig {
    /// Countdown length from whole minutes.
    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.total_duration_s = u64::from(minutes) * 60;
        self
    }

    /// Hops from offsets in minutes; slot numbers follow list order.
    pub fn with_hop_minutes(mut self, offsets: &[u32]) -> Self {
        self.hops = offsets
            .iter()
            .take(MAX_HOPS)
            .enumerate()
            .map(|(i, m)| HopAction::new(i as u8 + 1, *m))
            .collect();
        self
    }

    pub fn with_unit(mut self, unit: TempUnit) -> Self {
        self.lid_threshold = unit.lid_threshold();
        self
    }
}
