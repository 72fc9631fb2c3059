//! Clock-driven countdown.
//!
//! Remaining time is derived from the injected clock, so a `ManualClock`
//! makes the countdown fully deterministic in tests. Remaining seconds round
//! up: a countdown reports 0 only once the whole duration has elapsed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use boil_traits::{Clock, Countdown};

pub struct ClockCountdown {
    clock: Arc<dyn Clock + Send + Sync>,
    /// Time left as of `started_at` (or as of the last stop).
    left: Duration,
    started_at: Option<Instant>,
}

impl core::fmt::Debug for ClockCountdown {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClockCountdown")
            .field("remaining_s", &self.remaining_secs())
            .field("running", &self.is_running())
            .finish()
    }
}

impl ClockCountdown {
    pub fn new(duration_s: u64, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            left: Duration::from_secs(duration_s),
            started_at: None,
        }
    }

    fn left_now(&self) -> Duration {
        match self.started_at {
            Some(t0) => self
                .left
                .saturating_sub(self.clock.now().saturating_duration_since(t0)),
            None => self.left,
        }
    }
}

impl Countdown for ClockCountdown {
    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    fn stop(&mut self) {
        self.left = self.left_now();
        self.started_at = None;
    }

    fn add(&mut self, secs: u64) {
        self.left = self.left.saturating_add(Duration::from_secs(secs));
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn remaining_secs(&self) -> u64 {
        let left = self.left_now();
        let whole = left.as_secs();
        if left.subsec_nanos() > 0 { whole + 1 } else { whole }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boil_traits::ManualClock;

    fn countdown(secs: u64) -> (ManualClock, ClockCountdown) {
        let clock = ManualClock::new();
        let cd = ClockCountdown::new(secs, Arc::new(clock.clone()));
        (clock, cd)
    }

    #[test]
    fn does_not_move_until_started() {
        let (clock, cd) = countdown(60);
        clock.advance(Duration::from_secs(10));
        assert_eq!(cd.remaining_secs(), 60);
        assert!(!cd.is_running());
    }

    #[test]
    fn counts_down_and_rounds_up() {
        let (clock, mut cd) = countdown(60);
        cd.start();
        clock.advance(Duration::from_millis(500));
        assert_eq!(cd.remaining_secs(), 60);
        clock.advance(Duration::from_millis(500));
        assert_eq!(cd.remaining_secs(), 59);
        clock.advance(Duration::from_secs(100));
        assert_eq!(cd.remaining_secs(), 0);
    }

    #[test]
    fn stop_freezes_and_start_resumes() {
        let (clock, mut cd) = countdown(60);
        cd.start();
        clock.advance(Duration::from_secs(20));
        cd.stop();
        clock.advance(Duration::from_secs(20));
        assert_eq!(cd.remaining_secs(), 40);
        cd.start();
        clock.advance(Duration::from_secs(5));
        assert_eq!(cd.remaining_secs(), 35);
    }

    #[test]
    fn add_extends_running_countdown() {
        let (clock, mut cd) = countdown(60);
        cd.start();
        clock.advance(Duration::from_secs(30));
        cd.add(300);
        assert_eq!(cd.remaining_secs(), 330);
    }

    #[test]
    fn start_twice_does_not_restart() {
        let (clock, mut cd) = countdown(60);
        cd.start();
        clock.advance(Duration::from_secs(10));
        cd.start();
        assert_eq!(cd.remaining_secs(), 50);
    }
}
