//! Slew-rate limiter.
//!
//! Bounds how fast a command may change per tick. Rising changes are
//! limited to `positive_rate · dt`, falling changes to `|negative_rate| · dt`.
//! The resulting lag is deliberate: it bounds actuator jerk and current.

use strafe_common::robot::config::SlewConfig;

use crate::error::ControlError;

#[derive(Debug, Clone, Copy)]
pub struct SlewRateLimiter {
    /// Max increase per second (> 0).
    positive_rate: f64,
    /// Max decrease per second (< 0).
    negative_rate: f64,
    /// Last output.
    prev: f64,
    /// Tick period [s].
    dt: f64,
}

impl SlewRateLimiter {
    pub fn new(
        positive_rate: f64,
        negative_rate: f64,
        initial: f64,
        dt: f64,
    ) -> Result<Self, ControlError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidTickPeriod(dt));
        }
        let rates_ok = positive_rate.is_finite()
            && negative_rate.is_finite()
            && positive_rate > 0.0
            && negative_rate < 0.0;
        if !rates_ok {
            return Err(ControlError::InvalidSlewRate {
                positive: positive_rate,
                negative: negative_rate,
            });
        }
        Ok(Self {
            positive_rate,
            negative_rate,
            prev: if initial.is_finite() { initial } else { 0.0 },
            dt,
        })
    }

    pub fn from_config(config: &SlewConfig, dt: f64) -> Result<Self, ControlError> {
        Self::new(config.positive_rate, config.negative_rate, config.initial, dt)
    }

    /// Move toward `input` by at most one tick's worth of rate.
    ///
    /// A non-finite input holds the previous output.
    #[inline]
    pub fn calculate(&mut self, input: f64) -> f64 {
        if input.is_finite() {
            let step = (input - self.prev)
                .clamp(self.negative_rate * self.dt, self.positive_rate * self.dt);
            self.prev += step;
        }
        self.prev
    }

    /// Re-seed the output, e.g. after the actuator was forced to zero.
    #[inline]
    pub fn reset(&mut self, value: f64) {
        self.prev = value;
    }

    #[inline]
    pub fn last(&self) -> f64 {
        self.prev
    }

    /// Largest change permitted in one tick, either direction.
    #[inline]
    pub fn max_step(&self) -> f64 {
        self.positive_rate.max(-self.negative_rate) * self.dt
    }
}
