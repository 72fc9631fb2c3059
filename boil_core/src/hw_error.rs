//! Maps `Box<dyn Error>` from trait boundaries to typed `BoilError`.
//!
//! The traits in `boil_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `boil_hardware::HwError` downcasting.

use crate::error::BoilError;

/// Map a sensor read failure to a typed `BoilError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_sensor_error(e: &(dyn std::error::Error + 'static)) -> BoilError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<boil_hardware::HwError>() {
            return match hw {
                boil_hardware::HwError::Timeout => BoilError::Timeout,
                boil_hardware::HwError::SensorUnavailable(id) => {
                    BoilError::Sensor(format!("sensor {id} unavailable"))
                }
                other => BoilError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        BoilError::Timeout
    } else {
        BoilError::Sensor(s)
    }
}
