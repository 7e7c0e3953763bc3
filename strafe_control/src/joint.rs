//! Closed-loop arm joint controller.
//!
//! One implementation serves both the rotation joint (radians) and the
//! extension joint (metres). Per tick:
//!
//! 1. Read the sensor, convert `raw * scale + offset`.
//! 2. Evaluate the safety envelope; on `Zero` write 0, warn, and stop.
//! 3. PID(measured, setpoint), clamped to [-1, 1].
//! 4. Slew limiter.
//! 5. Write the motor command.
//!
//! The clamp comes before the limiter so its state never leaves the motor
//! range; a reversed correction starts unwinding on the very next tick.
//!
//! Setpoint writes are deferred: they land in a single slot that the next
//! tick consumes. The last write before a tick wins.

use strafe_common::consts::{
    HOMING_COARSE_STEP, HOMING_COARSE_THRESHOLD, HOMING_FINE_STEP, HOMING_FINE_THRESHOLD,
};
use strafe_common::robot::config::JointConfig;
use strafe_common::robot::faults::JointFaults;
use tracing::debug;

use crate::control::pid::{PidController, PidGains};
use crate::control::slew::SlewRateLimiter;
use crate::cycle::Periodic;
use crate::error::ControlError;
use crate::hw::{MotorOutput, PositionSensor, Sinks};
use crate::safety::envelope::{SafetyBounds, Verdict, evaluate};

/// Pre-built telemetry keys so the tick never formats strings.
struct JointKeys {
    setpoint: String,
    measured: String,
    output: String,
    out_of_bounds: String,
    implausible: String,
}

impl JointKeys {
    fn new(name: &str) -> Self {
        Self {
            setpoint: format!("{name} Setpoint"),
            measured: format!("{name} Measured"),
            output: format!("{name} Motor Output"),
            out_of_bounds: format!("{name} out of bounds"),
            implausible: format!("{name} sensor or setpoint fault"),
        }
    }
}

pub struct JointController {
    name: String,
    scale: f64,
    offset: f64,
    bounds: SafetyBounds,
    pid: PidController,
    slew: SlewRateLimiter,
    sensor: Box<dyn PositionSensor>,
    motor: Box<dyn MotorOutput>,
    sinks: Sinks,
    keys: JointKeys,
    /// Written by the command layer, read by the tick.
    setpoint: f64,
    measured: f64,
    measured_velocity: f64,
    output: f64,
    faults: JointFaults,
}

impl JointController {
    /// Build a joint from validated configuration.
    ///
    /// The initial setpoint is 0. The sensor is read once so that
    /// [`measured`](Self::measured) is meaningful before the first tick.
    pub fn new(
        config: &JointConfig,
        dt: f64,
        sensor: Box<dyn PositionSensor>,
        motor: Box<dyn MotorOutput>,
        sinks: Sinks,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        let bounds = SafetyBounds::try_from(&config.bounds)?;
        let pid = PidController::new(PidGains::from(&config.pid), dt)?;
        let slew = SlewRateLimiter::from_config(&config.slew, dt)?;

        let mut joint = Self {
            name: config.name.clone(),
            scale: config.scale,
            offset: config.offset,
            bounds,
            pid,
            slew,
            sensor,
            motor,
            sinks,
            keys: JointKeys::new(&config.name),
            setpoint: 0.0,
            measured: 0.0,
            measured_velocity: 0.0,
            output: 0.0,
            faults: JointFaults::empty(),
        };
        joint.read_sensor();
        debug!(joint = %joint.name, measured = joint.measured, "joint controller ready");
        Ok(joint)
    }

    fn read_sensor(&mut self) {
        self.measured = self.sensor.position_raw() * self.scale + self.offset;
        self.measured_velocity = self.sensor.velocity_raw() * self.scale;
    }

    fn write(&mut self, percent: f64) {
        let cmd = percent.clamp(-1.0, 1.0);
        self.motor.set_percent(cmd);
        self.output = cmd;
    }

    fn publish(&self) {
        let t = &self.sinks.telemetry;
        t.put_number(&self.keys.setpoint, self.setpoint);
        t.put_number(&self.keys.measured, self.measured);
        t.put_number(&self.keys.output, self.output);
    }

    /// One control tick. Never fails; faults zero the motor and warn.
    pub fn tick(&mut self) {
        self.read_sensor();

        match evaluate(self.measured, self.setpoint, &self.bounds) {
            Verdict::Zero(faults) => {
                self.faults = faults;
                self.write(0.0);
                self.pid.reset();
                self.slew.reset(0.0);
                let msg = if faults.is_implausible() {
                    &self.keys.implausible
                } else {
                    &self.keys.out_of_bounds
                };
                self.sinks.warnings.report(msg);
            }
            Verdict::Allow => {
                self.faults = JointFaults::empty();
                let correction = self
                    .pid
                    .calculate(self.measured, self.setpoint)
                    .clamp(-1.0, 1.0);
                let limited = self.slew.calculate(correction);
                self.write(limited);
            }
        }

        self.publish();
    }

    /// Replace the target; applied on the next tick.
    #[inline]
    pub fn set_setpoint(&mut self, value: f64) {
        self.setpoint = value;
    }

    /// Jog the target up by `delta`.
    #[inline]
    pub fn add_setpoint(&mut self, delta: f64) {
        self.setpoint += delta;
    }

    /// Jog the target down by `delta`.
    #[inline]
    pub fn subtract_setpoint(&mut self, delta: f64) {
        self.setpoint -= delta;
    }

    /// Write 0 to the motor immediately, bypassing PID and slew.
    ///
    /// PID history is dropped and the limiter restarts from rest on the
    /// next tick.
    pub fn stop(&mut self) {
        self.write(0.0);
        self.pid.reset();
        self.slew.reset(0.0);
    }

    /// One step of the rotation homing routine.
    ///
    /// The caller invokes this once per tick until it returns `true`. Far
    /// from zero the target moves a coarse step toward zero, closer in a
    /// fine step; inside the fine threshold the target becomes exactly 0
    /// and homing is complete. A non-finite reading leaves the target alone.
    pub fn zero_rotation(&mut self) -> bool {
        let m = self.measured;
        if !m.is_finite() {
            return false;
        }
        let step = if m.abs() > HOMING_COARSE_THRESHOLD {
            HOMING_COARSE_STEP
        } else if m.abs() > HOMING_FINE_THRESHOLD {
            HOMING_FINE_STEP
        } else {
            self.setpoint = 0.0;
            return true;
        };
        self.setpoint = m - step.copysign(m);
        false
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Measured position from the last tick [rad or m].
    #[inline]
    pub fn measured(&self) -> f64 {
        self.measured
    }

    #[inline]
    pub fn measured_velocity(&self) -> f64 {
        self.measured_velocity
    }

    /// Motor command written by the last tick or `stop()`.
    #[inline]
    pub fn last_output(&self) -> f64 {
        self.output
    }

    /// Faults seen on the last tick (empty when output was allowed).
    #[inline]
    pub fn faults(&self) -> JointFaults {
        self.faults
    }

    #[inline]
    pub fn bounds(&self) -> &SafetyBounds {
        &self.bounds
    }
}

impl Periodic for JointController {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) {
        JointController::tick(self);
    }
}
