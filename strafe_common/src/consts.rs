//! System-wide constants for the Strafe workspace.
//!
//! Single source of truth for limits, defaults and calibration values.
//! Imported by all crates — no duplication permitted.

use core::f64::consts::PI;

use static_assertions::const_assert;

// ─── Scheduling ─────────────────────────────────────────────────────

/// Default tick period in microseconds (50 Hz = 20 000 µs).
pub const CYCLE_TIME_US: u32 = 20_000;

/// Shortest accepted tick period [µs].
pub const CYCLE_TIME_US_MIN: u32 = 1_000;

/// Longest accepted tick period [µs].
pub const CYCLE_TIME_US_MAX: u32 = 100_000;

/// Maximum number of swerve modules on one drive.
pub const MAX_MODULES: usize = 8;

// ─── Arm rotation ───────────────────────────────────────────────────

/// Counts per revolution of the arm rotation absolute encoder.
pub const ROTATION_ENCODER_COUNTS: f64 = 4096.0;

/// Radians per rotation encoder count.
pub const ROTATION_RAD_PER_COUNT: f64 = 2.0 * PI / ROTATION_ENCODER_COUNTS;

/// Rotation joint envelope [rad].
pub const ROTATION_MIN_RAD: f64 = -PI / 2.0;
pub const ROTATION_MAX_RAD: f64 = PI / 2.0;

// ─── Arm extension ──────────────────────────────────────────────────

/// Metres of extension per motor rotation.
pub const EXTENSION_M_PER_ROTATION: f64 = 0.02513274;

/// Extension joint envelope [m].
pub const EXTENSION_MIN_M: f64 = 0.0;
pub const EXTENSION_MAX_M: f64 = 1.4;

// ─── Arm slew limits ────────────────────────────────────────────────

/// Default rising slew rate [output/s].
pub const ARM_SLEW_POSITIVE: f64 = 5.0;

/// Default falling slew rate [output/s].
pub const ARM_SLEW_NEGATIVE: f64 = -5.0;

// ─── Rotation homing ────────────────────────────────────────────────

/// Above this |angle| [rad] homing takes coarse steps.
pub const HOMING_COARSE_THRESHOLD: f64 = 0.39;

/// Above this |angle| [rad] homing takes fine steps.
pub const HOMING_FINE_THRESHOLD: f64 = 0.196;

/// Coarse homing step [rad].
pub const HOMING_COARSE_STEP: f64 = 0.25;

/// Fine homing step [rad].
pub const HOMING_FINE_STEP: f64 = 0.1;

// ─── Swerve ─────────────────────────────────────────────────────────

/// Wheel speeds below this magnitude [m/s] stop the module.
pub const DRIVE_DEADBAND_MPS: f64 = 0.001;

/// Physical top speed of a drive wheel [m/s].
pub const DRIVE_MAX_SPEED_MPS: f64 = 4.5;

/// Drive wheel diameter [m].
pub const WHEEL_DIAMETER_M: f64 = 0.1016;

/// Motor rotations per wheel rotation.
pub const DRIVE_GEAR_RATIO: f64 = 6.75;

/// Integrated drive encoder counts per motor rotation.
pub const DRIVE_ENCODER_COUNTS: f64 = 2048.0;

/// Metres travelled per drive encoder count.
pub const DRIVE_M_PER_COUNT: f64 = PI * WHEEL_DIAMETER_M / (DRIVE_GEAR_RATIO * DRIVE_ENCODER_COUNTS);

/// Metres per second per drive velocity unit (counts per 100 ms).
pub const DRIVE_MPS_PER_COUNT_RATE: f64 = DRIVE_M_PER_COUNT * 10.0;

/// Turn PID proportional gain.
pub const TURN_KP: f64 = 0.5;

/// Delay before the startup encoder alignment [ms].
pub const MODULE_SETTLE_DELAY_MS: u64 = 1000;

const_assert!(CYCLE_TIME_US_MIN <= CYCLE_TIME_US && CYCLE_TIME_US <= CYCLE_TIME_US_MAX);
const_assert!(MAX_MODULES >= 4);
const_assert!(HOMING_FINE_STEP < HOMING_COARSE_STEP);
