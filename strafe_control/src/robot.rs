//! Whole-robot assembly: two arm joints plus the swerve drive.

use std::f64::consts::PI;

use strafe_common::robot::config::RobotConfig;
use tracing::info;

use crate::cycle::Periodic;
use crate::error::ControlError;
use crate::hw::{HeadingSensor, MotorOutput, PositionSensor, Sinks};
use crate::joint::JointController;
use crate::swerve::drive::SwerveDrive;
use crate::swerve::module::{ModuleHardware, SwerveModule};

/// Sensor and motor for one arm joint.
pub struct JointHardware {
    pub sensor: Box<dyn PositionSensor>,
    pub motor: Box<dyn MotorOutput>,
}

/// Every device the robot owns. `modules` follows the configured order.
pub struct RobotHardware {
    pub rotation: JointHardware,
    pub extension: JointHardware,
    pub modules: Vec<ModuleHardware>,
    pub gyro: Box<dyn HeadingSensor>,
}

pub struct Robot {
    pub rotation: JointController,
    pub extension: JointController,
    pub drive: SwerveDrive,
    ticks: u64,
}

impl Robot {
    pub fn new(rotation: JointController, extension: JointController, drive: SwerveDrive) -> Self {
        Self {
            rotation,
            extension,
            drive,
            ticks: 0,
        }
    }

    /// Validate `config` and build every controller on `hw`.
    pub fn from_config(
        config: &RobotConfig,
        hw: RobotHardware,
        sinks: Sinks,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        if hw.modules.len() != config.drive.modules.len() {
            return Err(ControlError::ModuleCountMismatch {
                configured: config.drive.modules.len(),
                provided: hw.modules.len(),
            });
        }
        let dt = config.tick_period_s();

        let rotation = JointController::new(
            &config.arm.rotation,
            dt,
            hw.rotation.sensor,
            hw.rotation.motor,
            sinks.clone(),
        )?;
        let extension = JointController::new(
            &config.arm.extension,
            dt,
            hw.extension.sensor,
            hw.extension.motor,
            sinks.clone(),
        )?;

        let mut modules = Vec::with_capacity(hw.modules.len());
        for (module_config, module_hw) in config.drive.modules.iter().zip(hw.modules) {
            modules.push(SwerveModule::new(
                module_config,
                &config.drive,
                dt,
                module_hw,
                sinks.clone(),
            )?);
        }
        let drive = SwerveDrive::new(modules, hw.gyro, config.drive.max_speed_mps)?;

        info!(
            service = %config.shared.service_name,
            cycle_time_us = config.cycle_time_us,
            modules = drive.len(),
            "robot assembled"
        );
        Ok(Self::new(rotation, extension, drive))
    }

    /// Set the rotation target as a fraction of π (1.0 = π rad).
    #[inline]
    pub fn set_rotation_fraction(&mut self, fraction: f64) {
        self.rotation.set_setpoint(fraction * PI);
    }

    pub fn stop_arm(&mut self) {
        self.rotation.stop();
        self.extension.stop();
    }

    /// Zero every motor.
    pub fn stop(&mut self) {
        self.stop_arm();
        self.drive.stop();
    }

    /// Ticks executed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Periodic for Robot {
    fn name(&self) -> &str {
        "robot"
    }

    fn tick(&mut self) {
        self.rotation.tick();
        self.extension.tick();
        Periodic::tick(&mut self.drive);
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimAbsoluteEncoder, SimEncoder, SimGyro, SimMotor};

    fn joint_hw() -> JointHardware {
        JointHardware {
            sensor: Box::new(SimEncoder::new()),
            motor: Box::new(SimMotor::new()),
        }
    }

    fn module_hw() -> ModuleHardware {
        ModuleHardware {
            drive_motor: Box::new(SimMotor::new()),
            turn_motor: Box::new(SimMotor::new()),
            drive_encoder: Box::new(SimEncoder::new()),
            turn_encoder: Box::new(SimEncoder::new()),
            absolute: Box::new(SimAbsoluteEncoder::new()),
        }
    }

    fn hardware(modules: usize) -> RobotHardware {
        RobotHardware {
            rotation: joint_hw(),
            extension: joint_hw(),
            modules: (0..modules).map(|_| module_hw()).collect(),
            gyro: Box::new(SimGyro::new()),
        }
    }

    fn config() -> RobotConfig {
        let mut c = RobotConfig::default();
        c.drive.settle_delay_ms = 0;
        c
    }

    #[test]
    fn builds_from_default_config() {
        let robot = Robot::from_config(&config(), hardware(4), Sinks::default()).unwrap();
        assert_eq!(robot.drive.len(), 4);
        assert_eq!(robot.rotation.name(), "Arm Rotation");
        assert_eq!(robot.extension.name(), "Arm Extension");
        let names: Vec<_> = robot.drive.modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["FL", "FR", "BL", "BR"]);
    }

    #[test]
    fn module_hardware_count_must_match() {
        let err = Robot::from_config(&config(), hardware(3), Sinks::default()).err();
        assert_eq!(
            err,
            Some(ControlError::ModuleCountMismatch {
                configured: 4,
                provided: 3
            })
        );
    }

    #[test]
    fn invalid_config_rejected_before_build() {
        let mut c = config();
        c.cycle_time_us = 0;
        assert!(matches!(
            Robot::from_config(&c, hardware(4), Sinks::default()),
            Err(ControlError::Config(_))
        ));
    }

    #[test]
    fn rotation_fraction_scales_by_pi() {
        let mut robot = Robot::from_config(&config(), hardware(4), Sinks::default()).unwrap();
        robot.set_rotation_fraction(0.25);
        assert!((robot.rotation.setpoint() - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn tick_counts_and_stop_zeroes() {
        let mut robot = Robot::from_config(&config(), hardware(4), Sinks::default()).unwrap();
        robot.rotation.set_setpoint(0.5);
        robot.tick();
        robot.tick();
        assert_eq!(robot.ticks(), 2);
        assert!(robot.rotation.last_output() != 0.0);
        robot.stop();
        assert_eq!(robot.rotation.last_output(), 0.0);
    }
}
