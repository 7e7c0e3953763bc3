//! Integration test: fail-closed behaviour.
//!
//! Any out-of-range measured value or setpoint, and any non-finite sensor
//! reading, forces exactly zero motor output on that tick and reports a
//! warning every tick the condition persists.

use strafe_common::consts::ROTATION_RAD_PER_COUNT;
use strafe_common::robot::faults::JointFaults;
use strafe_common::robot::types::{ModuleCommand, ModuleState};
use strafe_control::cycle::Periodic;
use strafe_control::error::ControlError;

use super::{harness, test_config};

#[test]
fn setpoint_above_max_never_drives_the_motor() {
    let mut h = harness(&test_config());
    h.sim.robot.extension.set_setpoint(1.5);

    for _ in 0..20 {
        h.sim.tick();
        assert_eq!(h.sim.robot.extension.last_output(), 0.0);
    }
    assert!(
        h.sim
            .robot
            .extension
            .faults()
            .contains(JointFaults::SETPOINT_ABOVE_MAX)
    );
    assert_eq!(h.warnings.count(), 20);
    assert_eq!(h.telemetry.number("Arm Extension Motor Output"), Some(0.0));
    // Plant never moved.
    assert_eq!(h.sim.robot.extension.measured(), 0.0);
}

#[test]
fn measured_out_of_bounds_zeroes_regardless_of_setpoint() {
    let mut h = harness(&test_config());
    // 1.6 rad is past the +π/2 stop.
    h.sim
        .rotation_plant()
        .position()
        .set(1.6 / ROTATION_RAD_PER_COUNT);

    for setpoint in [-1.0, 0.0, 1.0, 1.5] {
        h.sim.robot.rotation.set_setpoint(setpoint);
        h.sim.tick();
        assert_eq!(h.sim.robot.rotation.last_output(), 0.0);
        assert!(
            h.sim
                .robot
                .rotation
                .faults()
                .contains(JointFaults::MEASURED_ABOVE_MAX)
        );
    }
    assert!(
        h.warnings
            .messages()
            .iter()
            .all(|m| m == "Arm Rotation out of bounds")
    );
}

#[test]
fn sensor_fault_mid_motion_then_recovery() {
    let mut h = harness(&test_config());
    h.sim.robot.extension.set_setpoint(0.6);
    for _ in 0..10 {
        h.sim.tick();
    }
    assert!(h.sim.robot.extension.last_output() > 0.0);

    let raw = h.sim.extension_plant().position().get();
    h.sim.extension_plant().position().set(f64::NAN);
    h.sim.robot.tick();
    assert_eq!(h.sim.robot.extension.last_output(), 0.0);
    assert!(
        h.sim
            .robot
            .extension
            .faults()
            .contains(JointFaults::SENSOR_FAULT)
    );
    assert_eq!(h.warnings.count(), 1);

    h.sim.extension_plant().position().set(raw);
    h.sim.tick();
    assert!(h.sim.robot.extension.faults().is_empty());
    // Restarts from rest, so the first command is one slew step.
    let out = h.sim.robot.extension.last_output();
    assert!(out > 0.0 && out <= 0.1 + 1e-12);
}

#[test]
fn edges_of_the_envelope_are_allowed() {
    let mut h = harness(&test_config());
    // Extension rests at exactly 0.0 m (lower edge); target the upper edge.
    h.sim.robot.extension.set_setpoint(1.4);
    h.sim.robot.tick();
    assert!(h.sim.robot.extension.faults().is_empty());
    assert!(h.sim.robot.extension.last_output() > 0.0);
    assert_eq!(h.warnings.count(), 0);
}

#[test]
fn stop_is_immediate_and_idempotent() {
    let mut h = harness(&test_config());
    h.sim.robot.extension.set_setpoint(1.0);
    h.sim.robot.rotation.set_setpoint(0.7);
    let states = [ModuleState::new(2.0, 0.3); 4];
    h.sim.robot.drive.set_desired_states(&states).unwrap();
    for _ in 0..15 {
        h.sim.tick();
    }

    for _ in 0..3 {
        h.sim.robot.stop();
        assert_eq!(h.sim.robot.extension.last_output(), 0.0);
        assert_eq!(h.sim.robot.rotation.last_output(), 0.0);
        for m in h.sim.robot.drive.modules() {
            assert_eq!(m.last_command(), ModuleCommand::STOPPED);
        }
    }
    assert_eq!(h.warnings.count(), 0);
}

#[test]
fn wrong_state_count_touches_no_motor() {
    let mut h = harness(&test_config());
    let good = [ModuleState::new(1.0, 0.2); 4];
    h.sim.robot.drive.set_desired_states(&good).unwrap();
    let before: Vec<_> = h
        .sim
        .robot
        .drive
        .modules()
        .iter()
        .map(|m| m.last_command())
        .collect();

    let err = h
        .sim
        .robot
        .drive
        .set_desired_states(&[ModuleState::new(3.0, -1.0); 3])
        .unwrap_err();
    assert_eq!(
        err,
        ControlError::StateCountMismatch {
            expected: 4,
            actual: 3
        }
    );
    let after: Vec<_> = h
        .sim
        .robot
        .drive
        .modules()
        .iter()
        .map(|m| m.last_command())
        .collect();
    assert_eq!(before, after);
}
