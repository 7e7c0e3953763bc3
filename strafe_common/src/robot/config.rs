//! Robot configuration structures.
//!
//! All config types use `serde::Deserialize` for TOML loading. Numeric
//! fields default to the calibration values in [`crate::consts`], so a file
//! only has to name what differs from the reference robot.
//!
//! ```toml
//! cycle_time_us = 20000
//!
//! [shared]
//! service_name = "strafe-bench"
//!
//! [arm.rotation]
//! name = "Arm Rotation"
//! scale = 0.0015339807878856412
//! bounds = { min = -1.5707963, max = 1.5707963 }
//! pid = { kp = 0.8 }
//!
//! [[drive.modules]]
//! name = "FL"
//! absolute_offset_rad = 0.42
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    ARM_SLEW_NEGATIVE, ARM_SLEW_POSITIVE, CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN,
    DRIVE_DEADBAND_MPS, DRIVE_M_PER_COUNT, DRIVE_MAX_SPEED_MPS, DRIVE_MPS_PER_COUNT_RATE,
    EXTENSION_M_PER_ROTATION, EXTENSION_MAX_M, EXTENSION_MIN_M, MAX_MODULES,
    MODULE_SETTLE_DELAY_MS, ROTATION_MAX_RAD, ROTATION_MIN_RAD, ROTATION_RAD_PER_COUNT, TURN_KP,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete robot configuration. Immutable once controllers are built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Service identity and log level.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Tick period in microseconds (default: 20 000 = 50 Hz).
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Arm joints.
    #[serde(default)]
    pub arm: ArmConfig,

    /// Swerve drive.
    #[serde(default)]
    pub drive: DriveConfig,
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle_time_us: CYCLE_TIME_US,
            arm: ArmConfig::default(),
            drive: DriveConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Tick period in seconds.
    #[inline]
    pub fn tick_period_s(&self) -> f64 {
        f64::from(self.cycle_time_us) * 1e-6
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.cycle_time_us < CYCLE_TIME_US_MIN || self.cycle_time_us > CYCLE_TIME_US_MAX {
            return Err(invalid(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        self.arm.rotation.validate()?;
        self.arm.extension.validate()?;
        self.drive.validate()
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

fn require_finite(what: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{what} must be finite, got {value}")))
    }
}

// ─── Controller Building Blocks ─────────────────────────────────────

/// PID gains as written in TOML.
///
/// Zero `ki`/`kd` disables the term; zero `tf`/`tt`/`out_max` disables the
/// derivative filter and anti-windup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f64,
    #[serde(default)]
    pub ki: f64,
    #[serde(default)]
    pub kd: f64,
    /// Derivative filter time constant [s].
    #[serde(default)]
    pub tf: f64,
    /// Anti-windup tracking time constant [s].
    #[serde(default)]
    pub tt: f64,
    /// Output limit used by anti-windup.
    #[serde(default)]
    pub out_max: f64,
}

impl PidConfig {
    /// Proportional-only gains.
    pub const fn p(kp: f64) -> Self {
        Self {
            kp,
            ki: 0.0,
            kd: 0.0,
            tf: 0.0,
            tt: 0.0,
            out_max: 0.0,
        }
    }

    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        for (name, v) in [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("tf", self.tf),
            ("tt", self.tt),
            ("out_max", self.out_max),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!(
                    "{owner}: pid.{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Slew limiter rates [output units per second].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlewConfig {
    /// Maximum rate of increase (> 0).
    #[serde(default = "default_slew_positive")]
    pub positive_rate: f64,
    /// Maximum rate of decrease (< 0).
    #[serde(default = "default_slew_negative")]
    pub negative_rate: f64,
    /// Output value before the first tick.
    #[serde(default)]
    pub initial: f64,
}

fn default_slew_positive() -> f64 {
    ARM_SLEW_POSITIVE
}
fn default_slew_negative() -> f64 {
    ARM_SLEW_NEGATIVE
}

impl Default for SlewConfig {
    fn default() -> Self {
        Self {
            positive_rate: ARM_SLEW_POSITIVE,
            negative_rate: ARM_SLEW_NEGATIVE,
            initial: 0.0,
        }
    }
}

/// Closed interval a joint's measured value and setpoint must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub min: f64,
    pub max: f64,
}

// ─── Arm ────────────────────────────────────────────────────────────

/// One closed-loop arm joint (rotation or extension).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    /// Telemetry and warning prefix, e.g. "Arm Rotation".
    pub name: String,
    /// Engineering units per raw sensor unit.
    pub scale: f64,
    /// Engineering-unit offset added after scaling.
    #[serde(default)]
    pub offset: f64,
    pub bounds: BoundsConfig,
    pub pid: PidConfig,
    #[serde(default)]
    pub slew: SlewConfig,
}

impl JointConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(invalid("joint name cannot be empty".to_string()));
        }
        let name = self.name.as_str();
        require_finite(&format!("{name}: scale"), self.scale)?;
        if self.scale == 0.0 {
            return Err(invalid(format!("{name}: scale cannot be zero")));
        }
        require_finite(&format!("{name}: offset"), self.offset)?;
        require_finite(&format!("{name}: bounds.min"), self.bounds.min)?;
        require_finite(&format!("{name}: bounds.max"), self.bounds.max)?;
        if self.bounds.min >= self.bounds.max {
            return Err(invalid(format!(
                "{name}: bounds.min {} must be below bounds.max {}",
                self.bounds.min, self.bounds.max
            )));
        }
        self.pid.validate(name)?;
        if !(self.slew.positive_rate.is_finite() && self.slew.positive_rate > 0.0) {
            return Err(invalid(format!(
                "{name}: slew.positive_rate must be positive, got {}",
                self.slew.positive_rate
            )));
        }
        if !(self.slew.negative_rate.is_finite() && self.slew.negative_rate < 0.0) {
            return Err(invalid(format!(
                "{name}: slew.negative_rate must be negative, got {}",
                self.slew.negative_rate
            )));
        }
        require_finite(&format!("{name}: slew.initial"), self.slew.initial)
    }
}

/// Both arm joints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmConfig {
    #[serde(default = "default_rotation")]
    pub rotation: JointConfig,
    #[serde(default = "default_extension")]
    pub extension: JointConfig,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            extension: default_extension(),
        }
    }
}

fn default_rotation() -> JointConfig {
    JointConfig {
        name: "Arm Rotation".to_string(),
        scale: ROTATION_RAD_PER_COUNT,
        offset: 0.0,
        bounds: BoundsConfig {
            min: ROTATION_MIN_RAD,
            max: ROTATION_MAX_RAD,
        },
        pid: PidConfig::p(0.8),
        slew: SlewConfig::default(),
    }
}

fn default_extension() -> JointConfig {
    JointConfig {
        name: "Arm Extension".to_string(),
        scale: EXTENSION_M_PER_ROTATION,
        offset: 0.0,
        bounds: BoundsConfig {
            min: EXTENSION_MIN_M,
            max: EXTENSION_MAX_M,
        },
        pid: PidConfig::p(2.0),
        slew: SlewConfig::default(),
    }
}

// ─── Swerve Drive ───────────────────────────────────────────────────

/// Calibration for one swerve module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Module identifier used in telemetry, e.g. "FL".
    pub name: String,
    /// Absolute sensor reading [rad] when the wheel points forward.
    #[serde(default)]
    pub absolute_offset_rad: f64,
    /// Invert the absolute sensor direction.
    #[serde(default)]
    pub absolute_reversed: bool,
}

impl ModuleConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            absolute_offset_rad: 0.0,
            absolute_reversed: false,
        }
    }
}

/// Swerve drive configuration shared by all modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Physical top wheel speed [m/s]; drive output is speed / this.
    #[serde(default = "default_max_speed")]
    pub max_speed_mps: f64,
    /// Speeds below this magnitude stop the module [m/s].
    #[serde(default = "default_deadband")]
    pub deadband_mps: f64,
    /// Metres per raw drive position unit.
    #[serde(default = "default_position_factor")]
    pub position_factor: f64,
    /// Metres per second per raw drive velocity unit.
    #[serde(default = "default_velocity_factor")]
    pub velocity_factor: f64,
    /// Delay before the one-time encoder alignment [ms].
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Turn loop gains (continuous input over [-π, π]).
    #[serde(default = "default_turn_pid")]
    pub turn_pid: PidConfig,
    /// Modules in kinematics order.
    #[serde(default = "default_modules")]
    pub modules: Vec<ModuleConfig>,
}

fn default_max_speed() -> f64 {
    DRIVE_MAX_SPEED_MPS
}
fn default_deadband() -> f64 {
    DRIVE_DEADBAND_MPS
}
fn default_position_factor() -> f64 {
    DRIVE_M_PER_COUNT
}
fn default_velocity_factor() -> f64 {
    DRIVE_MPS_PER_COUNT_RATE
}
fn default_settle_delay_ms() -> u64 {
    MODULE_SETTLE_DELAY_MS
}
fn default_turn_pid() -> PidConfig {
    PidConfig::p(TURN_KP)
}
fn default_modules() -> Vec<ModuleConfig> {
    ["FL", "FR", "BL", "BR"]
        .into_iter()
        .map(ModuleConfig::new)
        .collect()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_speed_mps: DRIVE_MAX_SPEED_MPS,
            deadband_mps: DRIVE_DEADBAND_MPS,
            position_factor: DRIVE_M_PER_COUNT,
            velocity_factor: DRIVE_MPS_PER_COUNT_RATE,
            settle_delay_ms: MODULE_SETTLE_DELAY_MS,
            turn_pid: default_turn_pid(),
            modules: default_modules(),
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed_mps.is_finite() && self.max_speed_mps > 0.0) {
            return Err(invalid(format!(
                "drive.max_speed_mps must be positive, got {}",
                self.max_speed_mps
            )));
        }
        if !(self.deadband_mps.is_finite() && self.deadband_mps >= 0.0) {
            return Err(invalid(format!(
                "drive.deadband_mps must be non-negative, got {}",
                self.deadband_mps
            )));
        }
        require_finite("drive.position_factor", self.position_factor)?;
        require_finite("drive.velocity_factor", self.velocity_factor)?;
        self.turn_pid.validate("drive.turn_pid")?;

        if self.modules.is_empty() || self.modules.len() > MAX_MODULES {
            return Err(invalid(format!(
                "drive.modules count {} out of range [1, {}]",
                self.modules.len(),
                MAX_MODULES
            )));
        }
        for (i, m) in self.modules.iter().enumerate() {
            if m.name.trim().is_empty() {
                return Err(invalid(format!("drive.modules[{i}]: name cannot be empty")));
            }
            require_finite(&format!("{}: absolute_offset_rad", m.name), m.absolute_offset_rad)?;
            if self.modules[..i].iter().any(|other| other.name == m.name) {
                return Err(invalid(format!("duplicate module name {}", m.name)));
            }
        }
        Ok(())
    }
}
