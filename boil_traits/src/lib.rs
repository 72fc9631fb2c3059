//! Capability traits consumed by the boil controller.
//!
//! Hardware and host services sit behind these traits; the controller never
//! reaches into global registries. Errors cross the boundary as boxed
//! `dyn Error` and are mapped to typed errors in `boil_core`.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Temperature probe lookup by id.
pub trait TempSensor {
    fn read(&mut self, sensor_id: &str) -> Result<f32, BoxError>;
}

/// Fire-and-forget output that switches itself off after its own timeout.
pub trait Actuator {
    fn turn_on(&mut self) -> Result<(), BoxError>;
}

/// Kettle logic (heating element controller) correlated to the boil.
pub trait KettleLogic {
    /// Whether the kettle logic is currently running.
    fn is_on(&self, kettle_id: &str) -> Result<bool, BoxError>;
    fn toggle(&mut self, kettle_id: &str) -> Result<(), BoxError>;
    fn stop(&mut self, kettle_id: &str) -> Result<(), BoxError>;
    /// Set the kettle target temperature; 0 means "no target".
    fn set_target_temp(&mut self, kettle_id: &str, temp: f32) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Success,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Success => "SUCCESS",
        }
    }
}

/// User-facing notification channel.
pub trait Notifier {
    fn notify(&mut self, title: &str, message: &str, severity: Severity);
}

/// Countdown timer primitive.
///
/// The run loop polls `remaining_secs()` once per tick; a countdown that
/// reaches zero while running is complete.
pub trait Countdown {
    fn start(&mut self);
    fn stop(&mut self);
    fn add(&mut self, secs: u64);
    fn is_running(&self) -> bool;
    fn remaining_secs(&self) -> u64;
}
