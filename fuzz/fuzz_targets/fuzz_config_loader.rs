#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic.
    let Ok(cfg) = boil_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A validated config must map cleanly into the core step config.
    let core = boil_core::BoilConfig::from(&cfg);
    assert!(core.hops.len() <= boil_config::MAX_HOPS);
    assert!(core.total_duration_s >= 60);
    assert!(core.total_duration_s <= boil_core::config::MAX_DURATION_S);
});
