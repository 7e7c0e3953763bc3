//! Arm routines: sequential steps of parallel joint targets.
//!
//! A step issues its targets once, then waits until every targeted joint
//! is within tolerance before the next step starts. A step that does not
//! settle within the timeout ends the routine as `TimedOut`; the joints keep
//! holding their last targets.
//!
//! ```text
//!   Idle ─poll─▶ Running{0} ─settled─▶ Running{1} ─ … ─▶ Complete
//!                     │
//!                     └─timeout─▶ TimedOut{0}
//! ```

use tracing::{debug, info, warn};

use crate::robot::Robot;

/// Default rotation tolerance [rad].
pub const ROTATION_TOLERANCE_RAD: f64 = 0.05;
/// Default extension tolerance [m].
pub const EXTENSION_TOLERANCE_M: f64 = 0.02;
/// Default per-step timeout (10 s at 50 Hz).
pub const STEP_TIMEOUT_TICKS: u64 = 500;

/// Scoring height for the middle node [m] (13 in).
const SCORE_MID_EXTENSION_M: f64 = 0.3302;
/// Arm angle for the middle node [rad] (60°).
const SCORE_MID_ROTATION_RAD: f64 = 1.0471975511965976;

/// Targets applied together. `None` leaves that joint alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutineStep {
    pub label: &'static str,
    pub rotation_rad: Option<f64>,
    pub extension_m: Option<f64>,
}

impl RoutineStep {
    pub const fn both(label: &'static str, rotation_rad: f64, extension_m: f64) -> Self {
        Self {
            label,
            rotation_rad: Some(rotation_rad),
            extension_m: Some(extension_m),
        }
    }

    pub const fn rotation(label: &'static str, rotation_rad: f64) -> Self {
        Self {
            label,
            rotation_rad: Some(rotation_rad),
            extension_m: None,
        }
    }

    pub const fn extension(label: &'static str, extension_m: f64) -> Self {
        Self {
            label,
            rotation_rad: None,
            extension_m: Some(extension_m),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineStatus {
    Idle,
    Running { step: usize },
    Complete,
    TimedOut { step: usize },
}

impl RoutineStatus {
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Complete | Self::TimedOut { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Routine {
    name: &'static str,
    steps: Vec<RoutineStep>,
    status: RoutineStatus,
    issued: bool,
    ticks_in_step: u64,
    timeout_ticks: u64,
    rotation_tolerance: f64,
    extension_tolerance: f64,
}

impl Routine {
    pub fn new(name: &'static str, steps: Vec<RoutineStep>) -> Self {
        Self {
            name,
            steps,
            status: RoutineStatus::Idle,
            issued: false,
            ticks_in_step: 0,
            timeout_ticks: STEP_TIMEOUT_TICKS,
            rotation_tolerance: ROTATION_TOLERANCE_RAD,
            extension_tolerance: EXTENSION_TOLERANCE_M,
        }
    }

    pub fn with_tolerances(mut self, rotation_rad: f64, extension_m: f64) -> Self {
        self.rotation_tolerance = rotation_rad.abs();
        self.extension_tolerance = extension_m.abs();
        self
    }

    pub fn with_timeout_ticks(mut self, ticks: u64) -> Self {
        self.timeout_ticks = ticks.max(1);
        self
    }

    // ─── Presets ────────────────────────────────────────────────────

    /// Extend to the middle node height and raise the arm.
    pub fn score_mid() -> Self {
        Self::new(
            "score-mid",
            vec![RoutineStep::both(
                "mid pose",
                SCORE_MID_ROTATION_RAD,
                SCORE_MID_EXTENSION_M,
            )],
        )
    }

    pub fn score_low() -> Self {
        Self::new("score-low", vec![RoutineStep::both("low pose", 0.0, 0.0)])
    }

    /// Single substation pickup pose.
    pub fn substation() -> Self {
        Self::new(
            "substation",
            vec![RoutineStep::both("substation pose", 0.0, 0.0)],
        )
    }

    /// Retract fully, then level the arm.
    pub fn stow() -> Self {
        Self::new(
            "stow",
            vec![
                RoutineStep::extension("retract", 0.0),
                RoutineStep::rotation("level", 0.0),
            ],
        )
    }

    // ─── Execution ──────────────────────────────────────────────────

    #[inline]
    pub fn name(&self) -> &str {
        self.name
    }

    #[inline]
    pub fn status(&self) -> RoutineStatus {
        self.status
    }

    #[inline]
    pub fn steps(&self) -> &[RoutineStep] {
        &self.steps
    }

    /// Return to `Idle` so the routine can run again.
    pub fn restart(&mut self) {
        self.status = RoutineStatus::Idle;
        self.issued = false;
        self.ticks_in_step = 0;
    }

    /// Advance the routine; call once per tick before the robot ticks.
    pub fn poll(&mut self, robot: &mut Robot) -> RoutineStatus {
        let step = match self.status {
            RoutineStatus::Idle => {
                info!(routine = self.name, steps = self.steps.len(), "routine started");
                self.enter(0)
            }
            RoutineStatus::Running { step } => step,
            finished => return finished,
        };
        let Some(current) = self.steps.get(step).copied() else {
            self.status = RoutineStatus::Complete;
            return self.status;
        };

        if !self.issued {
            if let Some(r) = current.rotation_rad {
                robot.rotation.set_setpoint(r);
            }
            if let Some(e) = current.extension_m {
                robot.extension.set_setpoint(e);
            }
            self.issued = true;
            debug!(routine = self.name, step, label = current.label, "step issued");
            return self.status;
        }

        self.ticks_in_step += 1;
        if self.settled(robot, &current) {
            debug!(
                routine = self.name,
                step,
                ticks = self.ticks_in_step,
                "step settled"
            );
            if step + 1 < self.steps.len() {
                self.enter(step + 1);
            } else {
                self.status = RoutineStatus::Complete;
                info!(routine = self.name, "routine complete");
            }
        } else if self.ticks_in_step >= self.timeout_ticks {
            self.status = RoutineStatus::TimedOut { step };
            warn!(
                routine = self.name,
                step,
                label = current.label,
                rotation = robot.rotation.measured(),
                extension = robot.extension.measured(),
                "routine step timed out"
            );
        }
        self.status
    }

    fn enter(&mut self, step: usize) -> usize {
        self.status = RoutineStatus::Running { step };
        self.issued = false;
        self.ticks_in_step = 0;
        step
    }

    fn settled(&self, robot: &Robot, step: &RoutineStep) -> bool {
        let near = |target: Option<f64>, measured: f64, tol: f64| {
            target.is_none_or(|t| (measured - t).abs() <= tol)
        };
        near(
            step.rotation_rad,
            robot.rotation.measured(),
            self.rotation_tolerance,
        ) && near(
            step.extension_m,
            robot.extension.measured(),
            self.extension_tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_arm_poses() {
        let mid = Routine::score_mid();
        assert_eq!(mid.steps().len(), 1);
        assert!((mid.steps()[0].rotation_rad.unwrap() - 60f64.to_radians()).abs() < 1e-12);
        assert!((mid.steps()[0].extension_m.unwrap() - 13.0 * 0.0254).abs() < 1e-12);

        let stow = Routine::stow();
        assert_eq!(stow.steps()[0].rotation_rad, None);
        assert_eq!(stow.steps()[1].extension_m, None);
        assert_eq!(Routine::substation().status(), RoutineStatus::Idle);
    }

    #[test]
    fn builders_sanitize() {
        let r = Routine::score_low()
            .with_tolerances(-0.1, 0.3)
            .with_timeout_ticks(0);
        assert_eq!(r.rotation_tolerance, 0.1);
        assert_eq!(r.extension_tolerance, 0.3);
        assert_eq!(r.timeout_ticks, 1);
    }

    #[test]
    fn finished_states() {
        assert!(RoutineStatus::Complete.is_finished());
        assert!(RoutineStatus::TimedOut { step: 0 }.is_finished());
        assert!(!RoutineStatus::Running { step: 0 }.is_finished());
        assert!(!RoutineStatus::Idle.is_finished());
    }
}
