//! Integration test: swerve drive against the simulated chassis.

use std::f64::consts::{FRAC_PI_2, PI};

use strafe_common::robot::types::ModuleState;
use strafe_control::control::angle::wrap_angle;
use strafe_control::cycle::Periodic;

use super::{Harness, harness, test_config};

// ── Helpers ─────────────────────────────────────────────────────────

fn drive_for(h: &mut Harness, states: &[ModuleState], ticks: usize) {
    for _ in 0..ticks {
        h.sim.robot.drive.set_desired_states(states).unwrap();
        h.sim.tick();
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn modules_start_aligned_with_calibrated_offsets() {
    let mut config = test_config();
    config.drive.modules[0].absolute_offset_rad = 0.8;
    config.drive.modules[1].absolute_offset_rad = -2.0;
    config.drive.modules[2].absolute_reversed = true;
    config.drive.modules[2].absolute_offset_rad = 0.3;
    let h = harness(&config);

    for module in h.sim.robot.drive.modules() {
        assert!(module.heading().abs() < 1e-9, "{} not aligned", module.name());
        // Turn counter is seeded unwrapped; only its direction must agree.
        assert!(wrap_angle(module.turn_position_rad()).abs() < 1e-9);
        assert_eq!(module.position().distance_m, 0.0);
    }
}

#[test]
fn open_loop_drive_reaches_commanded_speed() {
    let mut h = harness(&test_config());
    drive_for(&mut h, &[ModuleState::new(2.25, 0.0); 4], 5);

    for (module, state) in h
        .sim
        .robot
        .drive
        .modules()
        .iter()
        .zip(h.sim.robot.drive.states())
    {
        assert!((module.last_command().drive - 0.5).abs() < 1e-12);
        assert!((state.speed_mps - 2.25).abs() < 1e-9);
    }
}

#[test]
fn steering_converges_on_target_heading() {
    let mut h = harness(&test_config());
    drive_for(&mut h, &[ModuleState::new(1.0, 0.6); 4], 100);

    for state in h.sim.robot.drive.states() {
        assert!((state.angle_rad - 0.6).abs() < 0.02, "heading {}", state.angle_rad);
    }
    assert!(h.telemetry.number("Swerve[BR] angle").is_some());
}

#[test]
fn steering_takes_the_short_way_across_pi() {
    let mut h = harness(&test_config());
    for plant in h.sim.module_plants() {
        plant.absolute_degrees().set(170.0);
    }

    // From 170° to -170° the short way is +20° through π.
    let target = -170f64.to_radians();
    for _ in 0..100 {
        h.sim
            .robot
            .drive
            .set_desired_states(&[ModuleState::new(1.0, target); 4])
            .unwrap();
        h.sim.tick();
        let heading = h.sim.robot.drive.states()[0].angle_rad;
        // Never swings back through zero.
        assert!(heading.abs() > FRAC_PI_2, "heading {heading}");
    }
    let heading = h.sim.robot.drive.states()[0].angle_rad;
    assert!((heading - target).abs() < 0.02);
    assert!(h.sim.robot.drive.modules()[0].last_command().drive > 0.0);
}

#[test]
fn reversal_instead_of_half_turn() {
    let mut h = harness(&test_config());
    h.sim
        .robot
        .drive
        .set_desired_states(&[ModuleState::new(1.0, PI); 4])
        .unwrap();
    for module in h.sim.robot.drive.modules() {
        let cmd = module.last_command();
        assert!(cmd.drive < 0.0);
        assert!(cmd.turn.abs() < 1e-9);
    }
}

#[test]
fn desaturation_keeps_wheel_speed_ratios() {
    let mut h = harness(&test_config());
    let states = [
        ModuleState::new(9.0, 0.0),
        ModuleState::new(4.5, 0.0),
        ModuleState::new(-4.5, 0.0),
        ModuleState::new(2.25, 0.0),
    ];
    h.sim.robot.drive.set_desired_states(&states).unwrap();
    let drive: Vec<f64> = h
        .sim
        .robot
        .drive
        .modules()
        .iter()
        .map(|m| m.last_command().drive)
        .collect();
    let expected = [1.0, 0.5, -0.5, 0.25];
    for (got, want) in drive.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{drive:?}");
    }
}

#[test]
fn odometry_accumulates_distance() {
    let mut h = harness(&test_config());
    let max = h.sim.robot.drive.max_speed();
    drive_for(&mut h, &[ModuleState::new(max, 0.0); 4], 50);

    for p in h.sim.robot.drive.positions() {
        assert!((p.distance_m - max).abs() < 1e-6, "distance {}", p.distance_m);
    }
}

#[test]
fn deadband_request_stops_modules() {
    let mut h = harness(&test_config());
    drive_for(&mut h, &[ModuleState::new(1.0, 0.4); 4], 5);
    drive_for(&mut h, &[ModuleState::new(0.0005, -1.0); 4], 1);
    for module in h.sim.robot.drive.modules() {
        assert_eq!(module.last_command().drive, 0.0);
        assert_eq!(module.last_command().turn, 0.0);
    }
}

#[test]
fn heading_reset_and_module_telemetry() {
    let mut h = harness(&test_config());
    h.sim.gyro().set(90.0);
    assert!((h.sim.robot.drive.heading() - FRAC_PI_2).abs() < 1e-12);
    h.sim.robot.drive.reset_heading();
    assert_eq!(h.sim.robot.drive.heading(), 0.0);

    h.sim.tick();
    for name in ["FL", "FR", "BL", "BR"] {
        let key = format!("{name} Absolute-Position");
        assert!(h.telemetry.number(&key).is_some(), "missing {key}");
    }
}
