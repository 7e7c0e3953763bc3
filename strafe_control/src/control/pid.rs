//! PID controller with backward Euler integration, optional derivative
//! filter (Tf) and anti-windup via back-calculation (Tt).
//!
//! Zero Ki disables integral; zero Kd disables derivative. The continuous
//! variant folds `setpoint − measured` into the symmetric half of its input
//! range before use, so an angular loop never takes the long way round.

use strafe_common::robot::config::PidConfig;

use super::angle::fold;
use crate::error::ControlError;

/// Internal state of the PID controller.
///
/// Persists across ticks; mutated only by the owning controller's tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    /// Integral accumulator.
    integral: f64,
    /// Previous error (for derivative).
    prev_error: f64,
    /// False until the first sample after construction or reset.
    has_prev: bool,
    /// Filtered derivative term (low-pass via Tf).
    derivative_filtered: f64,
    /// Previous raw (unsaturated) output, read by back-calculation.
    prev_raw_output: f64,
}

impl PidState {
    /// Reset all internal state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Advance the integral one tick and return it.
    ///
    /// With `tt` and `out_max` set, the amount by which the previous output
    /// overshot `±out_max` is bled back out of the accumulator at rate
    /// `1/tt` (back-calculation). A zero `ki` holds the accumulator at 0.
    fn integrate(&mut self, gains: &PidGains, error: f64, dt: f64) -> f64 {
        if gains.ki == 0.0 {
            self.integral = 0.0;
            return 0.0;
        }
        let unwind = if gains.tt > 0.0 && gains.out_max > 0.0 {
            let excess = self.prev_raw_output
                - self.prev_raw_output.clamp(-gains.out_max, gains.out_max);
            excess / gains.tt
        } else {
            0.0
        };
        // Backward Euler.
        self.integral += (gains.ki * error - unwind) * dt;
        self.integral
    }

    /// Derivative of the error, low-passed when `tf > 0`.
    ///
    /// Returns 0 on the first sample after construction or reset, so a
    /// fresh controller does not kick on a step error.
    fn differentiate(&mut self, gains: &PidGains, error: f64, dt: f64) -> f64 {
        let slope = (error - self.prev_error) / dt;
        let had_prev = core::mem::replace(&mut self.has_prev, true);
        self.prev_error = error;

        if gains.kd == 0.0 || !had_prev {
            self.derivative_filtered = 0.0;
            return 0.0;
        }
        if gains.tf > 0.0 {
            // First-order lag, alpha = dt / (tf + dt).
            let alpha = dt / (gains.tf + dt);
            self.derivative_filtered += alpha * (slope - self.derivative_filtered);
            self.derivative_filtered
        } else {
            slope
        }
    }
}

/// PID gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (0 = disabled).
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
    /// Derivative filter time constant [s] (0 = unfiltered).
    pub tf: f64,
    /// Anti-windup tracking time constant [s] (0 = disabled).
    pub tt: f64,
    /// Output saturation limit for anti-windup (0 = disabled).
    pub out_max: f64,
}

impl PidGains {
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

    pub const fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            tf: 0.0,
            tt: 0.0,
            out_max: 0.0,
        }
    }

    fn validate(&self) -> Result<(), ControlError> {
        for (name, value) in [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("tf", self.tf),
            ("tt", self.tt),
            ("out_max", self.out_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ControlError::InvalidGain { name, value });
            }
        }
        Ok(())
    }
}

impl From<&PidConfig> for PidGains {
    fn from(c: &PidConfig) -> Self {
        Self {
            kp: c.kp,
            ki: c.ki,
            kd: c.kd,
            tf: c.tf,
            tt: c.tt,
            out_max: c.out_max,
        }
    }
}

/// One PID step: `kp·e + ∫ki·e dt + kd·de/dt`.
///
/// `error` is `setpoint − measured`, already folded for continuous inputs.
/// The result is unsaturated; callers clamp to their actuator range. A
/// non-positive `dt` yields 0 and leaves `state` untouched.
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidGains, error: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    let output = gains.kp * error
        + state.integrate(gains, error, dt)
        + gains.kd * state.differentiate(gains, error, dt);
    state.prev_raw_output = output;
    output
}

/// Stateful PID controller running at a fixed tick period.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    state: PidState,
    dt: f64,
    /// Input period for continuous mode (`max − min`).
    continuous_range: Option<f64>,
    last_error: f64,
}

impl PidController {
    /// Create a standard (non-wrapping) controller.
    pub fn new(gains: PidGains, dt: f64) -> Result<Self, ControlError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidTickPeriod(dt));
        }
        gains.validate()?;
        Ok(Self {
            gains,
            state: PidState::default(),
            dt,
            continuous_range: None,
            last_error: 0.0,
        })
    }

    /// Treat `min` and `max` as the same point (e.g. `-π` and `π`).
    pub fn with_continuous_input(mut self, min: f64, max: f64) -> Result<Self, ControlError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ControlError::InvalidContinuousRange { min, max });
        }
        self.continuous_range = Some(max - min);
        Ok(self)
    }

    /// One tick: returns the unsaturated command for `measured` → `setpoint`.
    pub fn calculate(&mut self, measured: f64, setpoint: f64) -> f64 {
        let mut error = setpoint - measured;
        if let Some(range) = self.continuous_range {
            error = fold(error, range);
        }
        self.last_error = error;
        pid_compute(&mut self.state, &self.gains, error, self.dt)
    }

    /// Forget integral and derivative history.
    #[inline]
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_error = 0.0;
    }

    /// Error used by the most recent `calculate` (folded if continuous).
    #[inline]
    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    #[inline]
    pub fn at_setpoint(&self, tolerance: f64) -> bool {
        self.last_error.abs() <= tolerance
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.continuous_range.is_some()
    }

    #[inline]
    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    #[inline]
    pub fn state(&self) -> &PidState {
        &self.state
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.dt
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
