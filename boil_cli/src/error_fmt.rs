//! Human-readable error descriptions and structured JSON error formatting.

use boil_core::error::{BoilError, BuildError};

/// Exit code for a completed boil.
pub const EXIT_DONE: i32 = 0;
/// Exit code for anything not covered below.
pub const EXIT_ERROR: i32 = 1;
/// Exit code when the temperature sensor failed.
pub const EXIT_SENSOR: i32 = 2;
/// Exit code when an operator stopped the run.
pub const EXIT_STOPPED: i32 = 3;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No temperature sensor was provided to the boil step.\nLikely causes: The probe backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the sensor is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingKettle => {
                "What happened: No kettle logic was provided to the boil step.\nLikely causes: The kettle backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the kettle is created successfully and passed via with_kettle(...).".to_string()
            }
            BuildError::MissingConfig => {
                "What happened: The boil step has no configuration.\nLikely causes: The [step] section was not mapped into the builder.\nHow to fix: Pass the step config via with_config(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/boil_config.toml for a sample."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BoilError>() {
        return match be {
            BoilError::Timeout => "What happened: Temperature sensor read timed out.\nLikely causes: 1-Wire bus not loaded, probe unplugged, or a long cable without pull-up.\nHow to fix: Check that w1-gpio/w1-therm are loaded and the probe shows up under hardware.w1_dir.".to_string(),
            BoilError::Sensor(detail) => format!(
                "What happened: Temperature sensor failed ({detail}).\nLikely causes: Wrong step.sensor id, CRC errors on the bus, or a disconnected probe.\nHow to fix: Compare step.sensor with the device directories under hardware.w1_dir and check wiring."
            ),
            BoilError::HardwareFault(detail) => format!(
                "What happened: Hardware fault ({detail}).\nLikely causes: GPIO access denied or a pin already in use.\nHow to fix: Run with GPIO permissions and check [hop_dropper] / [hardware] pin numbers."
            ),
            // Fallback to generic for other domain errors
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file. Original: {msg}"
        );
    }

    if lower.contains("parse config") {
        let cause = err.source().map(|s| format!(" Cause: {s}")).unwrap_or_default();
        return format!(
            "What happened: The config file is not valid TOML for this tool.{cause}\nHow to fix: Compare against etc/boil_config.toml; [step] needs timer_minutes, temp, sensor and kettle."
        );
    }

    if lower.contains("invalid configuration") {
        let cause = err.source().map(|s| format!(" ({s})")).unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid{cause}.\nLikely causes: Out-of-range values or conflicting hop settings.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("gpio") {
        return "What happened: Failed to initialize GPIO outputs.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix hop_dropper.gpio / hardware.kettle_relay_gpio and ensure the process may access GPIO.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Sensor failures get their own exit code; everything else is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<BoilError>() {
        Some(BoilError::Sensor(_) | BoilError::Timeout) => EXIT_SENSOR,
        _ => EXIT_ERROR,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BoilError>() {
        return match be {
            BoilError::Sensor(_) => "Sensor",
            BoilError::Timeout => "Timeout",
            BoilError::HardwareFault(_) => "HardwareFault",
            BoilError::Kettle(_) => "Kettle",
            BoilError::Actuator(_) => "Actuator",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
