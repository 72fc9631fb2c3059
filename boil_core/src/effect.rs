//! Side effects requested by the scheduler.
//!
//! The scheduler never touches hardware; it returns a list of effects which
//! the step executor applies to the injected collaborators, in order.

use std::time::SystemTime;

use boil_traits::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMode {
    Engage,
    Disengage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify {
        title: String,
        message: String,
        severity: Severity,
    },
    /// Set the kettle target temperature.
    SetTargetTemp(f32),
    /// Clear the kettle target temperature ("turn off heat").
    ClearTargetTemp,
    StartCountdown {
        estimated_completion: Option<SystemTime>,
    },
    StopCountdown,
    ExtendCountdown(u64),
    /// Replace the countdown with a fresh one of this length.
    ResetCountdown { duration_s: u64 },
    /// Pulse the hop dropper once.
    HopDrop,
    AutoMode(AutoMode),
    /// The step is finished.
    Done,
}

impl Effect {
    pub fn notify(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Effect::Notify {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}
