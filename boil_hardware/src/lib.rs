//! Hardware backends for the boil controller.
//!
//! - `sim`: simulated kettle, probe, hop dropper and a virtual-time clock
//! - `w1`: DS18B20 probes through the Linux 1-Wire sysfs driver
//! - `gpio` (feature `hardware`, Linux): hop dropper and kettle relay outputs

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod sim;
pub mod w1;

pub use error::HwError;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::{GpioHopDropper, GpioKettle};
pub use sim::{KettleState, SimClock, SimulatedHopDropper, SimulatedKettle, SimulatedSensor};
pub use w1::W1Sensor;
