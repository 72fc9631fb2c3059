#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core boil-phase control (hardware-agnostic).
//!
//! All hardware and host interactions go through the capability traits in
//! `boil_traits`: `TempSensor`, `KettleLogic`, `Actuator`, `Notifier` and
//! `Countdown`.
//!
//! ## Architecture
//!
//! - **Scheduler**: threshold start, hop offsets, lid alert, auto-mode (`scheduler`)
//! - **Matcher**: write-once fired set and due checks (`hops`)
//! - **Effects**: what the scheduler asks the outside world to do (`effect`)
//! - **Executor**: applies effects to collaborators (`step`)
//! - **Runner**: the ~1 Hz poll loop with serialized operator commands (`runner`)

pub mod builder;
pub mod config;
pub mod conversions;
pub mod countdown;
pub mod effect;
pub mod error;
pub mod hops;
pub mod hw_error;
pub mod notify;
pub mod runner;
pub mod scheduler;
pub mod step;
pub mod util;

pub use boil_traits::Severity;
pub use builder::BoilStepBuilder;
pub use config::{BoilConfig, HopAction, TempUnit};
pub use countdown::ClockCountdown;
pub use effect::{AutoMode, Effect};
pub use error::{BoilError, BuildError};
pub use hops::FiredHops;
pub use runner::{RunOutcome, RunParams, RunReport, run};
pub use scheduler::{BoilScheduler, Phase, RunState};
pub use step::{BoilStep, Command, StepStatus};
