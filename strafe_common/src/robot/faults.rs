//! Per-joint fault flags.
//!
//! Raised by the safety envelope and recorded by the joint controller for
//! the tick on which they were observed. Any set flag forces a zero motor
//! command for that tick.

use bitflags::bitflags;

bitflags! {
    /// Faults observed during a single joint tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JointFaults: u8 {
        /// Measured value below the envelope minimum.
        const MEASURED_BELOW_MIN = 0x01;
        /// Measured value above the envelope maximum.
        const MEASURED_ABOVE_MAX = 0x02;
        /// Setpoint below the envelope minimum.
        const SETPOINT_BELOW_MIN = 0x04;
        /// Setpoint above the envelope maximum.
        const SETPOINT_ABOVE_MAX = 0x08;
        /// Sensor produced a non-finite reading.
        const SENSOR_FAULT       = 0x10;
        /// Setpoint is not a finite number.
        const SETPOINT_INVALID   = 0x20;
    }
}

impl Default for JointFaults {
    fn default() -> Self {
        Self::empty()
    }
}

impl JointFaults {
    /// All out-of-range flags.
    pub const OUT_OF_BOUNDS: Self = Self::from_bits_truncate(
        Self::MEASURED_BELOW_MIN.bits()
            | Self::MEASURED_ABOVE_MAX.bits()
            | Self::SETPOINT_BELOW_MIN.bits()
            | Self::SETPOINT_ABOVE_MAX.bits(),
    );

    /// Flags reporting an implausible value rather than a range violation.
    pub const IMPLAUSIBLE: Self =
        Self::from_bits_truncate(Self::SENSOR_FAULT.bits() | Self::SETPOINT_INVALID.bits());

    /// True if any range violation is set.
    #[inline]
    pub const fn is_out_of_bounds(&self) -> bool {
        self.intersects(Self::OUT_OF_BOUNDS)
    }

    /// True if a sensor or setpoint value was not a finite number.
    #[inline]
    pub const fn is_implausible(&self) -> bool {
        self.intersects(Self::IMPLAUSIBLE)
    }
}
