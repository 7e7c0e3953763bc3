//! Integration test: arm rotation homing and joint tracking.
//!
//! The rotation joint starts away from zero; `zero_rotation()` is called
//! once per tick until it reports completion.

use strafe_common::consts::{HOMING_FINE_THRESHOLD, ROTATION_RAD_PER_COUNT};
use strafe_control::cycle::Periodic;

use super::{harness, test_config};

// ── Helpers ─────────────────────────────────────────────────────────

/// Run homing from `start_rad`; returns the measured trace and whether
/// homing completed.
fn home_from(start_rad: f64) -> (Vec<f64>, bool, super::Harness) {
    let mut h = harness(&test_config());
    h.sim
        .rotation_plant()
        .position()
        .set(start_rad / ROTATION_RAD_PER_COUNT);
    // First tick picks up the new position.
    h.sim.tick();

    let mut trace = vec![h.sim.robot.rotation.measured()];
    let mut done = false;
    for _ in 0..500 {
        if h.sim.robot.rotation.zero_rotation() {
            done = true;
            break;
        }
        h.sim.tick();
        trace.push(h.sim.robot.rotation.measured());
    }
    (trace, done, h)
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn homing_from_positive_angle_is_monotonic() {
    let (trace, done, h) = home_from(0.5);
    assert!(done, "homing did not finish");
    assert!((trace[0] - 0.5).abs() < 1e-9);
    assert!(
        trace.windows(2).all(|w| w[1].abs() <= w[0].abs()),
        "|measured| increased during homing"
    );
    assert!(trace.last().unwrap().abs() <= HOMING_FINE_THRESHOLD);
    assert_eq!(h.sim.robot.rotation.setpoint(), 0.0);
    assert_eq!(h.warnings.count(), 0);
}

#[test]
fn homing_from_negative_angle_is_symmetric() {
    let (trace, done, _) = home_from(-0.5);
    assert!(done);
    assert!(trace.windows(2).all(|w| w[1].abs() <= w[0].abs()));
    assert!(trace.iter().all(|m| *m <= 0.0));
}

#[test]
fn homing_inside_fine_threshold_finishes_immediately() {
    let (trace, done, _) = home_from(0.1);
    assert!(done);
    assert_eq!(trace.len(), 1);
}

#[test]
fn rotation_settles_at_zero_after_homing() {
    let (_, done, mut h) = home_from(0.5);
    assert!(done);
    for _ in 0..250 {
        h.sim.tick();
    }
    assert!(h.sim.robot.rotation.measured().abs() < 0.01);
}

#[test]
fn extension_tracks_setpoint_with_bounded_slew() {
    let mut h = harness(&test_config());
    h.sim.robot.extension.set_setpoint(0.5);

    let mut prev = 0.0;
    for _ in 0..400 {
        h.sim.tick();
        let out = h.sim.robot.extension.last_output();
        assert!(out.abs() <= 1.0);
        assert!((out - prev).abs() <= 0.1 + 1e-9, "slew bound violated");
        prev = out;
    }
    assert!((h.sim.robot.extension.measured() - 0.5).abs() < 0.01);
    assert!(h.sim.robot.extension.faults().is_empty());
    assert!(h.telemetry.number("Arm Extension Measured").is_some());
}
