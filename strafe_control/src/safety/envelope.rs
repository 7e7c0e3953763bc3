//! Per-joint safety envelope.
//!
//! Both the measured value and the setpoint must lie inside the joint's
//! `[min, max]` interval (inclusive) and be finite. Any violation yields
//! [`Verdict::Zero`] regardless of what the feedback loop would command.

use strafe_common::robot::config::BoundsConfig;
use strafe_common::robot::faults::JointFaults;

use crate::error::ControlError;

/// Immutable `[min, max]` envelope for one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyBounds {
    min: f64,
    max: f64,
}

impl SafetyBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, ControlError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ControlError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl TryFrom<&BoundsConfig> for SafetyBounds {
    type Error = ControlError;

    fn try_from(c: &BoundsConfig) -> Result<Self, Self::Error> {
        Self::new(c.min, c.max)
    }
}

/// Outcome of one envelope evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Feedback output may be applied.
    Allow,
    /// Motor command must be zero this tick.
    Zero(JointFaults),
}

impl Verdict {
    #[inline]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Faults behind a `Zero` verdict, empty for `Allow`.
    #[inline]
    pub fn faults(&self) -> JointFaults {
        match self {
            Self::Allow => JointFaults::empty(),
            Self::Zero(f) => *f,
        }
    }
}

/// Evaluate `measured` and `setpoint` against `bounds`.
#[inline]
pub fn evaluate(measured: f64, setpoint: f64, bounds: &SafetyBounds) -> Verdict {
    let mut faults = JointFaults::empty();

    if !measured.is_finite() {
        faults |= JointFaults::SENSOR_FAULT;
    } else if measured < bounds.min {
        faults |= JointFaults::MEASURED_BELOW_MIN;
    } else if measured > bounds.max {
        faults |= JointFaults::MEASURED_ABOVE_MAX;
    }

    if !setpoint.is_finite() {
        faults |= JointFaults::SETPOINT_INVALID;
    } else if setpoint < bounds.min {
        faults |= JointFaults::SETPOINT_BELOW_MIN;
    } else if setpoint > bounds.max {
        faults |= JointFaults::SETPOINT_ABOVE_MAX;
    }

    if faults.is_empty() {
        Verdict::Allow
    } else {
        Verdict::Zero(faults)
    }
}
