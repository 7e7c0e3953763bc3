//! Swerve drive aggregator.
//!
//! Owns the modules in a fixed order (FL, FR, BL, BR by convention) plus
//! the heading sensor. Per-module states are applied by index.

use heapless::Vec;
use strafe_common::consts::MAX_MODULES;
use strafe_common::robot::types::{ModulePosition, ModuleState};
use tracing::info;

use crate::control::angle::wrap_angle;
use crate::cycle::Periodic;
use crate::error::ControlError;
use crate::hw::HeadingSensor;
use crate::swerve::module::SwerveModule;

/// Module storage; fixed capacity so snapshots never allocate.
pub type Modules = Vec<SwerveModule, MAX_MODULES>;

pub struct SwerveDrive {
    modules: Modules,
    gyro: Box<dyn HeadingSensor>,
    max_speed: f64,
}

impl SwerveDrive {
    /// Take ownership of `modules` in iteration order.
    pub fn new(
        modules: impl IntoIterator<Item = SwerveModule>,
        gyro: Box<dyn HeadingSensor>,
        max_speed: f64,
    ) -> Result<Self, ControlError> {
        if !(max_speed.is_finite() && max_speed > 0.0) {
            return Err(ControlError::InvalidMaxSpeed(max_speed));
        }
        let mut stored = Modules::new();
        for module in modules {
            if stored.push(module).is_err() {
                return Err(ControlError::TooManyModules { max: MAX_MODULES });
            }
        }
        if stored.is_empty() {
            return Err(ControlError::NoModules);
        }
        info!(modules = stored.len(), max_speed, "swerve drive ready");
        Ok(Self {
            modules: stored,
            gyro,
            max_speed,
        })
    }

    /// Apply one state per module, by index.
    ///
    /// Speeds are first scaled down together if any exceeds the max
    /// physical speed. A length mismatch is rejected before any motor is
    /// touched.
    pub fn set_desired_states(&mut self, states: &[ModuleState]) -> Result<(), ControlError> {
        if states.len() != self.modules.len() {
            return Err(ControlError::StateCountMismatch {
                expected: self.modules.len(),
                actual: states.len(),
            });
        }
        let scale = desaturation_scale(states, self.max_speed);
        for (module, state) in self.modules.iter_mut().zip(states) {
            module.set_desired_state(ModuleState::new(state.speed_mps * scale, state.angle_rad));
        }
        Ok(())
    }

    /// Measured states in module order.
    pub fn states(&self) -> Vec<ModuleState, MAX_MODULES> {
        self.modules.iter().map(SwerveModule::state).collect()
    }

    /// Odometry positions in module order.
    pub fn positions(&self) -> Vec<ModulePosition, MAX_MODULES> {
        self.modules.iter().map(SwerveModule::position).collect()
    }

    pub fn stop(&mut self) {
        for module in self.modules.iter_mut() {
            module.stop();
        }
    }

    /// Declare the current orientation to be heading zero.
    pub fn reset_heading(&mut self) {
        self.gyro.reset();
        info!("heading reset");
    }

    /// Robot heading from the gyro, in `(-π, π]`.
    #[inline]
    pub fn heading(&self) -> f64 {
        wrap_angle(self.gyro.heading_degrees().to_radians())
    }

    /// Publish per-module telemetry.
    pub fn update(&self) {
        for module in self.modules.iter() {
            module.update();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    #[inline]
    pub fn modules(&self) -> &[SwerveModule] {
        &self.modules
    }

    #[inline]
    pub fn module(&self, index: usize) -> Option<&SwerveModule> {
        self.modules.get(index)
    }

    #[inline]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}

impl Periodic for SwerveDrive {
    fn name(&self) -> &str {
        "swerve"
    }

    fn tick(&mut self) {
        self.update();
    }
}

/// Common factor that brings the fastest wheel down to `max_speed`.
///
/// Returns 1.0 when no wheel exceeds it. Non-finite speeds are ignored
/// here; the module rejects them itself.
pub fn desaturation_scale(states: &[ModuleState], max_speed: f64) -> f64 {
    let fastest = states
        .iter()
        .map(|s| s.speed_mps.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if fastest > max_speed {
        max_speed / fastest
    } else {
        1.0
    }
}
