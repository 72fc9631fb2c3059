//! Time formatting helpers.

use std::time::SystemTime;

pub const SECS_PER_MIN: u64 = 60;
pub const SECS_PER_HOUR: u64 = 3_600;

/// Format remaining seconds as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_time(secs: u64) -> String {
    let h = secs / SECS_PER_HOUR;
    let m = (secs % SECS_PER_HOUR) / SECS_PER_MIN;
    let s = secs % SECS_PER_MIN;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Local wall-clock `HH:MM` for a point in time.
pub fn format_clock(t: SystemTime) -> String {
    let local: chrono::DateTime<chrono::Local> = t.into();
    local.format("%H:%M").to_string()
}

/// Human phrasing for an extension, e.g. `5 Minutes added`.
pub fn format_added(secs: u64) -> String {
    if secs % SECS_PER_MIN == 0 {
        format!("{} Minutes added", secs / SECS_PER_MIN)
    } else {
        format!("{secs} seconds added")
    }
}
