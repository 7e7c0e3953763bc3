use std::sync::Arc;

use strafe_common::robot::config::RobotConfig;
use strafe_control::hw::Sinks;
use strafe_control::sim::{RecordingTelemetry, RecordingWarnings, SimRobot};

mod arm_homing;
mod config_loading;
mod fail_closed;
mod routine;
mod swerve_drive;

/// Reference robot without the alignment delay.
pub fn test_config() -> RobotConfig {
    let mut c = RobotConfig::default();
    c.drive.settle_delay_ms = 0;
    c
}

/// Simulated robot plus the recording sinks it reports into.
pub struct Harness {
    pub sim: SimRobot,
    pub telemetry: Arc<RecordingTelemetry>,
    pub warnings: Arc<RecordingWarnings>,
}

pub fn harness(config: &RobotConfig) -> Harness {
    let telemetry = Arc::new(RecordingTelemetry::default());
    let warnings = Arc::new(RecordingWarnings::default());
    let sinks = Sinks::new(telemetry.clone(), warnings.clone());
    Harness {
        sim: SimRobot::from_config(config, sinks).expect("valid test config"),
        telemetry,
        warnings,
    }
}
