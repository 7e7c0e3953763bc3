//! Integration test: arm routines on the simulated robot.

use strafe_common::consts::EXTENSION_M_PER_ROTATION;
use strafe_control::cycle::Periodic;
use strafe_control::routine::{Routine, RoutineStatus, RoutineStep};

use super::{Harness, harness, test_config};

// ── Helpers ─────────────────────────────────────────────────────────

/// Poll + tick until the routine finishes; returns ticks used.
fn run_routine(h: &mut Harness, routine: &mut Routine, limit: usize) -> usize {
    for n in 0..limit {
        if routine.poll(&mut h.sim.robot).is_finished() {
            return n;
        }
        h.sim.tick();
    }
    limit
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn score_mid_reaches_both_targets() {
    let mut h = harness(&test_config());
    let mut routine = Routine::score_mid();
    let ticks = run_routine(&mut h, &mut routine, 1000);

    assert_eq!(routine.status(), RoutineStatus::Complete, "after {ticks} ticks");
    let robot = &h.sim.robot;
    assert!((robot.rotation.measured() - 60f64.to_radians()).abs() <= 0.05);
    assert!((robot.extension.measured() - 0.3302).abs() <= 0.02);
    assert_eq!(h.warnings.count(), 0);
}

#[test]
fn stow_retracts_before_levelling() {
    let mut h = harness(&test_config());
    // Park the arm raised and extended.
    h.sim.robot.rotation.set_setpoint(0.5);
    h.sim.robot.extension.set_setpoint(0.8);
    for _ in 0..500 {
        h.sim.tick();
    }
    assert!((h.sim.robot.extension.measured() - 0.8).abs() < 0.01);

    let mut routine = Routine::stow();
    let mut saw_second_step = false;
    for _ in 0..1000 {
        let status = routine.poll(&mut h.sim.robot);
        match status {
            RoutineStatus::Running { step: 0 } => {
                // Rotation keeps its old target while retracting.
                assert_eq!(h.sim.robot.rotation.setpoint(), 0.5);
            }
            RoutineStatus::Running { step: 1 } if !saw_second_step => {
                saw_second_step = true;
                assert!(h.sim.robot.extension.measured().abs() <= 0.02);
                assert!(h.sim.robot.rotation.measured() > 0.4);
            }
            _ => {}
        }
        if status.is_finished() {
            break;
        }
        h.sim.tick();
    }
    assert!(saw_second_step);
    assert_eq!(routine.status(), RoutineStatus::Complete);
    assert!(h.sim.robot.rotation.measured().abs() <= 0.05);
}

#[test]
fn unreachable_target_times_out_and_fails_closed() {
    let mut h = harness(&test_config());
    // Past the 1.4 m limit: the joint refuses to move.
    let mut routine = Routine::new("overreach", vec![RoutineStep::extension("reach", 2.0)])
        .with_timeout_ticks(25);
    run_routine(&mut h, &mut routine, 100);

    assert_eq!(routine.status(), RoutineStatus::TimedOut { step: 0 });
    assert_eq!(h.sim.robot.extension.last_output(), 0.0);
    assert_eq!(h.sim.robot.extension.measured(), 0.0);
    assert!(h.warnings.count() >= 25);
}

#[test]
fn restart_reissues_targets() {
    let mut h = harness(&test_config());
    let mut routine = Routine::score_low();
    run_routine(&mut h, &mut routine, 10);
    assert_eq!(routine.status(), RoutineStatus::Complete);

    h.sim.robot.extension.set_setpoint(0.4);
    routine.restart();
    assert_eq!(routine.status(), RoutineStatus::Idle);
    routine.poll(&mut h.sim.robot);
    assert_eq!(h.sim.robot.extension.setpoint(), 0.0);
}

#[test]
fn substation_pose_from_extended_arm() {
    let mut h = harness(&test_config());
    h.sim
        .extension_plant()
        .position()
        .set(0.5 / EXTENSION_M_PER_ROTATION);
    h.sim.robot.extension.set_setpoint(0.5);
    let mut routine = Routine::substation();
    run_routine(&mut h, &mut routine, 1000);
    assert_eq!(routine.status(), RoutineStatus::Complete);
    assert!(h.sim.robot.extension.measured() <= 0.02);
}
