use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BoilError {
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("kettle logic error: {0}")]
    Kettle(String),
    #[error("actuator error: {0}")]
    Actuator(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing temperature sensor")]
    MissingSensor,
    #[error("missing kettle logic")]
    MissingKettle,
    #[error("missing boil config")]
    MissingConfig,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
