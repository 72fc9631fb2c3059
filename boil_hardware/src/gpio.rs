//! GPIO-backed outputs (Raspberry Pi, rppal).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use boil_traits::{Actuator, BoxError, KettleLogic};
use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info, warn};

use crate::error::{HwError, Result};

fn open_output(pin: u8) -> Result<OutputPin> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
    let mut out = gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?
        .into_output();
    out.set_low();
    Ok(out)
}

/// Hop dropper on a GPIO output. `turn_on` drives the pin high and a helper
/// thread drives it low again after `timeout`; a newer pulse supersedes the
/// pending switch-off of an older one.
pub struct GpioHopDropper {
    pin: Arc<Mutex<OutputPin>>,
    timeout: Duration,
    generation: Arc<AtomicU64>,
}

impl GpioHopDropper {
    pub fn new(pin: u8, timeout: Duration) -> Result<Self> {
        Ok(Self {
            pin: Arc::new(Mutex::new(open_output(pin)?)),
            timeout,
            generation: Arc::new(AtomicU64::new(0)),
        })
    }
}

impl Actuator for GpioHopDropper {
    fn turn_on(&mut self) -> std::result::Result<(), BoxError> {
        {
            let mut pin = self
                .pin
                .lock()
                .map_err(|_| HwError::Gpio("hop dropper pin lock poisoned".into()))?;
            pin.set_high();
        }
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(pin_timeout_ms = self.timeout.as_millis() as u64, "hop dropper on");

        let pin = self.pin.clone();
        let generation = self.generation.clone();
        let timeout = self.timeout;
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            if generation.load(Ordering::SeqCst) != my_gen {
                debug!("newer pulse pending; leaving hop dropper on");
                return;
            }
            match pin.lock() {
                Ok(mut p) => {
                    p.set_low();
                    info!("hop dropper off");
                }
                Err(_) => warn!("hop dropper pin lock poisoned; could not switch off"),
            }
        });
        Ok(())
    }
}

/// Kettle logic as a plain heater relay: on while the pin is high.
pub struct GpioKettle {
    pin: OutputPin,
    target_temp: f32,
}

impl GpioKettle {
    pub fn new(pin: u8) -> Result<Self> {
        Ok(Self {
            pin: open_output(pin)?,
            target_temp: 0.0,
        })
    }
}

impl KettleLogic for GpioKettle {
    fn is_on(&self, _kettle_id: &str) -> std::result::Result<bool, BoxError> {
        Ok(self.pin.is_set_high())
    }

    fn toggle(&mut self, kettle_id: &str) -> std::result::Result<(), BoxError> {
        self.pin.toggle();
        info!(kettle = kettle_id, on = self.pin.is_set_high(), "kettle relay toggled");
        Ok(())
    }

    fn stop(&mut self, kettle_id: &str) -> std::result::Result<(), BoxError> {
        self.pin.set_low();
        info!(kettle = kettle_id, "kettle relay off");
        Ok(())
    }

    fn set_target_temp(&mut self, kettle_id: &str, temp: f32) -> std::result::Result<(), BoxError> {
        self.target_temp = temp;
        debug!(kettle = kettle_id, temp, "kettle target temp");
        Ok(())
    }
}
