//! Prelude module for common re-exports.
//!
//! ```rust
//! use strafe_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, load_robot_config};
pub use crate::robot::config::{
    ArmConfig, BoundsConfig, DriveConfig, JointConfig, ModuleConfig, PidConfig, RobotConfig,
    SlewConfig,
};

// ─── Faults & Snapshots ─────────────────────────────────────────────
pub use crate::robot::faults::JointFaults;
pub use crate::robot::types::{ModuleCommand, ModulePosition, ModuleState};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, MAX_MODULES};

/// Default tick period as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(CYCLE_TIME_US as u64);
