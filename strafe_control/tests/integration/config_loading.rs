//! Integration test: TOML configuration through to a running robot.

use std::io::Write;
use std::sync::atomic::AtomicBool;

use strafe_common::config::{ConfigError, load_robot_config};
use strafe_control::cycle::{CycleRunner, Periodic};

use super::harness;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn three_module_robot_from_file() {
    let file = write_config(
        r#"
cycle_time_us = 10000

[shared]
service_name = "bench-rig"
log_level = "debug"

[drive]
settle_delay_ms = 0
max_speed_mps = 3.0

[[drive.modules]]
name = "A"
absolute_offset_rad = 0.25

[[drive.modules]]
name = "B"
absolute_reversed = true

[[drive.modules]]
name = "C"
"#,
    );
    let config = load_robot_config(file.path()).unwrap();
    let mut h = harness(&config);

    assert_eq!(h.sim.robot.drive.len(), 3);
    assert_eq!(h.sim.robot.drive.max_speed(), 3.0);
    let names: Vec<_> = h.sim.robot.drive.modules().iter().map(|m| m.name()).collect();
    assert_eq!(names, ["A", "B", "C"]);

    let mut runner = CycleRunner::new(config.cycle_time_us, false).unwrap();
    let running = AtomicBool::new(true);
    assert_eq!(runner.run(&mut h.sim, Some(20), &running), 20);
    assert_eq!(h.sim.robot.ticks(), 20);
    assert_eq!(runner.stats().cycle_count, 20);
    assert_eq!(h.sim.name(), "sim");
}

#[test]
fn invalid_file_is_rejected() {
    let file = write_config(
        r#"
[arm.extension]
name = "Arm Extension"
scale = 0.02513274
bounds = { min = 1.4, max = 0.0 }
pid = { kp = 2.0 }
"#,
    );
    let err = load_robot_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn malformed_and_missing_files() {
    let file = write_config("cycle_time_us = \"fast\"");
    assert!(matches!(
        load_robot_config(file.path()),
        Err(ConfigError::ParseError(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        load_robot_config(&dir.path().join("absent.toml")).unwrap_err(),
        ConfigError::FileNotFound
    );
}

#[test]
fn shipped_sample_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/robot.toml");
    let config = load_robot_config(&path).unwrap();
    assert_eq!(config.drive.modules.len(), 4);
    assert_eq!(config.cycle_time_us, 20_000);
    assert_eq!(config.arm.extension.bounds.max, 1.4);
}
