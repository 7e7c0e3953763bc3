//! Simulated hardware.
//!
//! Device handles share their value through [`SharedValue`] so a test or a
//! plant model can read what a controller wrote (and inject readings)
//! after the device itself has been boxed into the controller.
//!
//! The plants are deliberately crude: joint velocity is proportional to
//! motor output, steering rate is proportional to turn output, wheel speed
//! is `drive · max_speed`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use strafe_common::robot::config::RobotConfig;

use crate::cycle::Periodic;
use crate::error::ControlError;
use crate::hw::{
    AbsoluteAngleSensor, HeadingSensor, MotorOutput, PositionSensor, Sinks, Telemetry,
    WarningSink,
};
use crate::robot::{JointHardware, Robot, RobotHardware};
use crate::swerve::module::ModuleHardware;

/// Rotation joint speed at full output [rad/s].
pub const SIM_ROTATION_RATE_RAD_S: f64 = 2.0;
/// Extension joint speed at full output [m/s].
pub const SIM_EXTENSION_RATE_M_S: f64 = 0.5;
/// Steering rate at full turn output [deg/s].
pub const SIM_TURN_RATE_DEG_S: f64 = 720.0;

// ─── Shared Value ───────────────────────────────────────────────────

/// Lock-free `f64` cell shared between a device and its observers.
#[derive(Debug, Clone, Default)]
pub struct SharedValue(Arc<AtomicU64>);

impl SharedValue {
    pub fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(value.to_bits())))
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn add(&self, delta: f64) {
        self.set(self.get() + delta);
    }
}

// ─── Devices ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    output: SharedValue,
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle observing the commanded output.
    pub fn probe(&self) -> SharedValue {
        self.output.clone()
    }
}

impl MotorOutput for SimMotor {
    fn set_percent(&mut self, percent: f64) {
        self.output.set(percent);
    }

    fn percent(&self) -> f64 {
        self.output.get()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimEncoder {
    position: SharedValue,
    velocity: SharedValue,
}

impl SimEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position_handle(&self) -> SharedValue {
        self.position.clone()
    }

    pub fn velocity_handle(&self) -> SharedValue {
        self.velocity.clone()
    }
}

impl PositionSensor for SimEncoder {
    fn position_raw(&self) -> f64 {
        self.position.get()
    }

    fn velocity_raw(&self) -> f64 {
        self.velocity.get()
    }

    fn set_position_raw(&mut self, raw: f64) {
        self.position.set(raw);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimAbsoluteEncoder {
    degrees: SharedValue,
}

impl SimAbsoluteEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn degrees_handle(&self) -> SharedValue {
        self.degrees.clone()
    }
}

impl AbsoluteAngleSensor for SimAbsoluteEncoder {
    fn absolute_degrees(&self) -> f64 {
        self.degrees.get()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    heading: SharedValue,
    resets: Arc<AtomicU32>,
}

impl SimGyro {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading_handle(&self) -> SharedValue {
        self.heading.clone()
    }

    /// Number of `reset()` calls so far.
    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::Relaxed)
    }
}

impl HeadingSensor for SimGyro {
    fn heading_degrees(&self) -> f64 {
        self.heading.get()
    }

    fn reset(&mut self) {
        self.heading.set(0.0);
        self.resets.fetch_add(1, Ordering::Relaxed);
    }
}

// ─── Recording Sinks ────────────────────────────────────────────────

/// Keeps the latest value published under each key.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    numbers: Mutex<HashMap<String, f64>>,
    strings: Mutex<HashMap<String, String>>,
}

impl RecordingTelemetry {
    pub fn number(&self, key: &str) -> Option<f64> {
        self.numbers.lock().ok()?.get(key).copied()
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.strings.lock().ok()?.get(key).cloned()
    }
}

impl Telemetry for RecordingTelemetry {
    fn put_number(&self, key: &str, value: f64) {
        if let Ok(mut map) = self.numbers.lock() {
            match map.get_mut(key) {
                Some(slot) => *slot = value,
                None => {
                    map.insert(key.to_string(), value);
                }
            }
        }
    }

    fn put_string(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.strings.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }
}

/// Keeps every reported warning in order.
#[derive(Debug, Default)]
pub struct RecordingWarnings {
    messages: Mutex<Vec<String>>,
}

impl RecordingWarnings {
    pub fn count(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut m) = self.messages.lock() {
            m.clear();
        }
    }
}

impl WarningSink for RecordingWarnings {
    fn report(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}

// ─── Plants ─────────────────────────────────────────────────────────

/// Joint whose velocity is proportional to motor output.
#[derive(Debug, Clone)]
pub struct JointPlant {
    motor: SharedValue,
    position: SharedValue,
    velocity: SharedValue,
    /// Raw units per second at full output.
    raw_rate: f64,
}

impl JointPlant {
    /// `full_speed` is in engineering units per second; `scale` converts
    /// raw sensor units to engineering units.
    pub fn new(motor: &SimMotor, encoder: &SimEncoder, full_speed: f64, scale: f64) -> Self {
        Self {
            motor: motor.probe(),
            position: encoder.position_handle(),
            velocity: encoder.velocity_handle(),
            raw_rate: full_speed / scale,
        }
    }

    pub fn step(&self, dt: f64) {
        let v = self.motor.get().clamp(-1.0, 1.0) * self.raw_rate;
        self.velocity.set(v);
        self.position.add(v * dt);
    }

    /// Raw sensor position handle.
    pub fn position(&self) -> &SharedValue {
        &self.position
    }
}

/// One swerve module's wheel and steering.
#[derive(Debug, Clone)]
pub struct ModulePlant {
    drive_motor: SharedValue,
    turn_motor: SharedValue,
    drive_position: SharedValue,
    drive_velocity: SharedValue,
    turn_position: SharedValue,
    absolute_deg: SharedValue,
    max_speed: f64,
    position_factor: f64,
    velocity_factor: f64,
    /// Direction of the absolute sensor relative to the heading.
    sign: f64,
}

impl ModulePlant {
    pub fn step(&self, dt: f64) {
        let speed = self.drive_motor.get().clamp(-1.0, 1.0) * self.max_speed;
        self.drive_velocity.set(speed / self.velocity_factor);
        self.drive_position.add(speed * dt / self.position_factor);

        let turn_deg = self.turn_motor.get().clamp(-1.0, 1.0) * SIM_TURN_RATE_DEG_S * dt;
        self.turn_position.add(turn_deg.to_radians());
        let abs = self.absolute_deg.get() + self.sign * turn_deg;
        self.absolute_deg.set(abs.rem_euclid(360.0));
    }

    /// Absolute sensor handle [deg].
    pub fn absolute_degrees(&self) -> &SharedValue {
        &self.absolute_deg
    }
}

// ─── Simulated Robot ────────────────────────────────────────────────

/// A [`Robot`] wired to simulated devices and plants.
pub struct SimRobot {
    pub robot: Robot,
    rotation: JointPlant,
    extension: JointPlant,
    modules: Vec<ModulePlant>,
    gyro: SharedValue,
    dt: f64,
}

impl SimRobot {
    /// Build every device from `config`, then the robot on top of them.
    ///
    /// Module alignment (and its settle delay) runs here.
    pub fn from_config(config: &RobotConfig, sinks: Sinks) -> Result<Self, ControlError> {
        config.validate()?;
        let dt = config.tick_period_s();

        let (rotation_hw, rotation) = sim_joint(config.arm.rotation.scale, SIM_ROTATION_RATE_RAD_S);
        let (extension_hw, extension) =
            sim_joint(config.arm.extension.scale, SIM_EXTENSION_RATE_M_S);

        let drive = &config.drive;
        let mut module_hw = Vec::with_capacity(drive.modules.len());
        let mut plants = Vec::with_capacity(drive.modules.len());
        for m in &drive.modules {
            let drive_motor = SimMotor::new();
            let turn_motor = SimMotor::new();
            let drive_encoder = SimEncoder::new();
            let turn_encoder = SimEncoder::new();
            let absolute = SimAbsoluteEncoder::new();
            // Wheel starts pointing forward.
            let sign = if m.absolute_reversed { -1.0 } else { 1.0 };
            absolute
                .degrees_handle()
                .set((sign * m.absolute_offset_rad.to_degrees()).rem_euclid(360.0));

            plants.push(ModulePlant {
                drive_motor: drive_motor.probe(),
                turn_motor: turn_motor.probe(),
                drive_position: drive_encoder.position_handle(),
                drive_velocity: drive_encoder.velocity_handle(),
                turn_position: turn_encoder.position_handle(),
                absolute_deg: absolute.degrees_handle(),
                max_speed: drive.max_speed_mps,
                position_factor: drive.position_factor,
                velocity_factor: drive.velocity_factor,
                sign,
            });
            module_hw.push(ModuleHardware {
                drive_motor: Box::new(drive_motor),
                turn_motor: Box::new(turn_motor),
                drive_encoder: Box::new(drive_encoder),
                turn_encoder: Box::new(turn_encoder),
                absolute: Box::new(absolute),
            });
        }

        let gyro = SimGyro::new();
        let gyro_heading = gyro.heading_handle();
        let hardware = RobotHardware {
            rotation: rotation_hw,
            extension: extension_hw,
            modules: module_hw,
            gyro: Box::new(gyro),
        };

        Ok(Self {
            robot: Robot::from_config(config, hardware, sinks)?,
            rotation,
            extension,
            modules: plants,
            gyro: gyro_heading,
            dt,
        })
    }

    /// Advance the plants by one tick period.
    pub fn step(&mut self) {
        self.rotation.step(self.dt);
        self.extension.step(self.dt);
        for m in &self.modules {
            m.step(self.dt);
        }
    }

    #[inline]
    pub fn rotation_plant(&self) -> &JointPlant {
        &self.rotation
    }

    #[inline]
    pub fn extension_plant(&self) -> &JointPlant {
        &self.extension
    }

    #[inline]
    pub fn module_plants(&self) -> &[ModulePlant] {
        &self.modules
    }

    /// Gyro heading handle [deg].
    #[inline]
    pub fn gyro(&self) -> &SharedValue {
        &self.gyro
    }
}

impl Periodic for SimRobot {
    fn name(&self) -> &str {
        "sim"
    }

    /// Robot tick followed by one plant step.
    fn tick(&mut self) {
        self.robot.tick();
        self.step();
    }
}

fn sim_joint(scale: f64, full_speed: f64) -> (JointHardware, JointPlant) {
    let motor = SimMotor::new();
    let encoder = SimEncoder::new();
    let plant = JointPlant::new(&motor, &encoder, full_speed, scale);
    let hw = JointHardware {
        sensor: Box::new(encoder),
        motor: Box::new(motor),
    };
    (hw, plant)
}
