//! Angle folding and swerve heading optimization.

use core::f64::consts::{FRAC_PI_2, PI};

/// Fold `value` into the half-open interval `(-half, half]` of a domain
/// whose period is `range`.
///
/// Used for continuous-input PID error where the two ends of the domain
/// are the same physical point.
#[inline]
pub fn fold(value: f64, range: f64) -> f64 {
    let half = range * 0.5;
    half - (half - value).rem_euclid(range)
}

/// Fold an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    fold(angle, 2.0 * PI)
}

/// Pick the (speed, heading) pair equivalent to the request that needs the
/// least wheel rotation from `current`.
///
/// If the desired heading is more than 90° away, the wheel is pointed the
/// opposite way and driven backwards instead. The returned heading is
/// wrapped to `(-π, π]` and is never more than 90° from `current`.
#[inline]
pub fn optimize(speed: f64, desired: f64, current: f64) -> (f64, f64) {
    let delta = wrap_angle(desired - current);
    if delta.abs() > FRAC_PI_2 {
        (-speed, wrap_angle(desired + PI))
    } else {
        (speed, wrap_angle(desired))
    }
}
