//! Construction-time errors.
//!
//! Only constructors and the loop driver setup return `ControlError`.
//! Tick-time faults (out of bounds, sensor faults) never surface here:
//! they are contained in the controller and reported through the warning
//! sink.

use strafe_common::config::ConfigError;
use thiserror::Error;

/// Invalid construction parameters. Fail fast, before the first tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("tick period must be positive and finite, got {0} s")]
    InvalidTickPeriod(f64),

    #[error("cycle time {0} µs out of range [{min}, {max}]", min = strafe_common::consts::CYCLE_TIME_US_MIN, max = strafe_common::consts::CYCLE_TIME_US_MAX)]
    InvalidCycleTime(u32),

    #[error("safety bounds [{min}, {max}] must be finite with min < max")]
    InvalidBounds { min: f64, max: f64 },

    #[error("slew rates must satisfy positive > 0 > negative, got (+{positive}, {negative})")]
    InvalidSlewRate { positive: f64, negative: f64 },

    #[error("PID gain {name} must be finite and non-negative, got {value}")]
    InvalidGain { name: &'static str, value: f64 },

    #[error("continuous input range [{min}, {max}] must be finite with min < max")]
    InvalidContinuousRange { min: f64, max: f64 },

    #[error("sensor scale must be finite and non-zero, got {0}")]
    InvalidScale(f64),

    #[error("max physical speed must be positive, got {0} m/s")]
    InvalidMaxSpeed(f64),

    #[error("swerve drive requires at least one module")]
    NoModules,

    #[error("swerve drive supports at most {max} modules")]
    TooManyModules { max: usize },

    #[error("expected {expected} module states, got {actual}")]
    StateCountMismatch { expected: usize, actual: usize },

    #[error("{configured} modules configured but hardware provided for {provided}")]
    ModuleCountMismatch { configured: usize, provided: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
