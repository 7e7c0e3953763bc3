//! Swerve module snapshot and command types.

use serde::{Deserialize, Serialize};

/// Velocity state of one swerve module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Wheel ground speed [m/s].
    pub speed_mps: f64,
    /// Wheel heading [rad], robot frame.
    pub angle_rad: f64,
}

impl ModuleState {
    #[inline]
    pub const fn new(speed_mps: f64, angle_rad: f64) -> Self {
        Self {
            speed_mps,
            angle_rad,
        }
    }
}

/// Odometry snapshot of one swerve module.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Distance driven since startup alignment [m].
    pub distance_m: f64,
    /// Wheel heading [rad], robot frame.
    pub angle_rad: f64,
}

/// Motor command pair produced by one module tick. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModuleCommand {
    /// Drive motor percent output in [-1, 1].
    pub drive: f64,
    /// Turn motor percent output in [-1, 1].
    pub turn: f64,
}

impl ModuleCommand {
    /// Both motors idle.
    pub const STOPPED: Self = Self {
        drive: 0.0,
        turn: 0.0,
    };
}
