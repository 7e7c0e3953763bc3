//! Single swerve module controller.
//!
//! Drive is open loop (`speed / max_speed`); steering is a continuous-input
//! PID over `[-π, π]` on the module heading derived from the absolute
//! sensor.

use std::f64::consts::PI;
use std::time::Duration;

use strafe_common::config::ConfigError;
use strafe_common::robot::config::{DriveConfig, ModuleConfig};
use strafe_common::robot::types::{ModuleCommand, ModulePosition, ModuleState};
use tracing::info;

use crate::control::angle::{optimize, wrap_angle};
use crate::control::pid::{PidController, PidGains};
use crate::error::ControlError;
use crate::hw::{AbsoluteAngleSensor, MotorOutput, PositionSensor, Sinks};

/// Devices owned by one module.
pub struct ModuleHardware {
    pub drive_motor: Box<dyn MotorOutput>,
    pub turn_motor: Box<dyn MotorOutput>,
    /// Drive wheel counter (position and velocity).
    pub drive_encoder: Box<dyn PositionSensor>,
    /// Turn motor's integrated counter, in radians after alignment.
    pub turn_encoder: Box<dyn PositionSensor>,
    pub absolute: Box<dyn AbsoluteAngleSensor>,
}

/// Immutable calibration of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleGeometry {
    name: String,
    absolute_offset_rad: f64,
    /// +1.0, or -1.0 when the absolute sensor is reversed.
    sign: f64,
}

impl ModuleGeometry {
    pub fn from_config(config: &ModuleConfig) -> Result<Self, ControlError> {
        if config.name.trim().is_empty() {
            return Err(ConfigError::ValidationError("module name cannot be empty".into()).into());
        }
        if !config.absolute_offset_rad.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "{}: absolute_offset_rad must be finite",
                config.name
            ))
            .into());
        }
        Ok(Self {
            name: config.name.clone(),
            absolute_offset_rad: config.absolute_offset_rad,
            sign: if config.absolute_reversed { -1.0 } else { 1.0 },
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn absolute_offset_rad(&self) -> f64 {
        self.absolute_offset_rad
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.sign < 0.0
    }
}

struct ModuleKeys {
    speed: String,
    angle: String,
    absolute: String,
    invalid_request: String,
    sensor_fault: String,
}

impl ModuleKeys {
    fn new(name: &str) -> Self {
        Self {
            speed: format!("Swerve[{name}] speed"),
            angle: format!("Swerve[{name}] angle"),
            absolute: format!("{name} Absolute-Position"),
            invalid_request: format!("Swerve[{name}] non-finite request, module stopped"),
            sensor_fault: format!("Swerve[{name}] absolute sensor fault, module stopped"),
        }
    }
}

pub struct SwerveModule {
    geometry: ModuleGeometry,
    hw: ModuleHardware,
    turn_pid: PidController,
    max_speed: f64,
    deadband: f64,
    position_factor: f64,
    velocity_factor: f64,
    sinks: Sinks,
    keys: ModuleKeys,
    command: ModuleCommand,
}

impl SwerveModule {
    /// Build and align a module.
    ///
    /// Blocks for `drive.settle_delay_ms` so the absolute sensor can settle,
    /// then runs [`reset_encoders`](Self::reset_encoders) once.
    pub fn new(
        config: &ModuleConfig,
        drive: &DriveConfig,
        dt: f64,
        hw: ModuleHardware,
        sinks: Sinks,
    ) -> Result<Self, ControlError> {
        let geometry = ModuleGeometry::from_config(config)?;
        if !(drive.max_speed_mps.is_finite() && drive.max_speed_mps > 0.0) {
            return Err(ControlError::InvalidMaxSpeed(drive.max_speed_mps));
        }
        for factor in [drive.position_factor, drive.velocity_factor] {
            if !(factor.is_finite() && factor != 0.0) {
                return Err(ControlError::InvalidScale(factor));
            }
        }
        let turn_pid = PidController::new(PidGains::from(&drive.turn_pid), dt)?
            .with_continuous_input(-PI, PI)?;

        let mut module = Self {
            keys: ModuleKeys::new(geometry.name()),
            geometry,
            hw,
            turn_pid,
            max_speed: drive.max_speed_mps,
            deadband: drive.deadband_mps.max(0.0),
            position_factor: drive.position_factor,
            velocity_factor: drive.velocity_factor,
            sinks,
            command: ModuleCommand::STOPPED,
        };

        if drive.settle_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(drive.settle_delay_ms));
        }
        module.reset_encoders();
        info!(
            module = module.name(),
            heading_rad = module.heading(),
            reversed = module.geometry.is_reversed(),
            "swerve module aligned"
        );
        Ok(module)
    }

    /// Zero the drive counter and seed the turn counter from the absolute
    /// sensor.
    pub fn reset_encoders(&mut self) {
        self.hw.drive_encoder.set_position_raw(0.0);
        let turn = self.absolute_angle_rad() - self.geometry.absolute_offset_rad;
        if turn.is_finite() {
            self.hw.turn_encoder.set_position_raw(turn);
        } else {
            self.sinks.warnings.report(&self.keys.sensor_fault);
        }
    }

    /// Absolute sensor reading in radians, direction-corrected, no offset.
    #[inline]
    pub fn absolute_angle_rad(&self) -> f64 {
        self.geometry.sign * self.hw.absolute.absolute_degrees().to_radians()
    }

    /// Current wheel heading in `(-π, π]`.
    #[inline]
    pub fn heading(&self) -> f64 {
        wrap_angle(self.absolute_angle_rad() - self.geometry.absolute_offset_rad)
    }

    /// Drive the module toward `desired`.
    pub fn set_desired_state(&mut self, desired: ModuleState) {
        let ModuleState {
            speed_mps,
            angle_rad,
        } = desired;

        if !(speed_mps.is_finite() && angle_rad.is_finite()) {
            self.stop();
            self.sinks.warnings.report(&self.keys.invalid_request);
            return;
        }
        if speed_mps.abs() < self.deadband {
            self.stop();
            return;
        }

        let current = self.heading();
        if !current.is_finite() {
            self.stop();
            self.sinks.warnings.report(&self.keys.sensor_fault);
            return;
        }

        let (speed, target) = optimize(speed_mps, angle_rad, current);
        let drive = (speed / self.max_speed).clamp(-1.0, 1.0);
        let turn = self.turn_pid.calculate(current, target).clamp(-1.0, 1.0);
        self.write(ModuleCommand { drive, turn });

        let t = &self.sinks.telemetry;
        t.put_number(&self.keys.speed, speed);
        t.put_number(&self.keys.angle, target);
    }

    /// Zero both motors.
    pub fn stop(&mut self) {
        self.write(ModuleCommand::STOPPED);
    }

    fn write(&mut self, command: ModuleCommand) {
        self.hw.drive_motor.set_percent(command.drive);
        self.hw.turn_motor.set_percent(command.turn);
        self.command = command;
    }

    /// Measured wheel speed and heading.
    pub fn state(&self) -> ModuleState {
        ModuleState::new(
            self.hw.drive_encoder.velocity_raw() * self.velocity_factor,
            self.heading(),
        )
    }

    /// Distance driven since alignment and heading.
    pub fn position(&self) -> ModulePosition {
        ModulePosition {
            distance_m: self.hw.drive_encoder.position_raw() * self.position_factor,
            angle_rad: self.heading(),
        }
    }

    /// Turn motor counter [rad], seeded by alignment.
    #[inline]
    pub fn turn_position_rad(&self) -> f64 {
        self.hw.turn_encoder.position_raw()
    }

    /// Publish the absolute sensor reading.
    pub fn update(&self) {
        self.sinks
            .telemetry
            .put_number(&self.keys.absolute, self.hw.absolute.absolute_degrees());
    }

    /// Last motor command pair written.
    #[inline]
    pub fn last_command(&self) -> ModuleCommand {
        self.command
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.geometry.name()
    }

    #[inline]
    pub fn geometry(&self) -> &ModuleGeometry {
        &self.geometry
    }

    #[inline]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
}
