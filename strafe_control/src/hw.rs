//! Hardware capability traits and output sinks.
//!
//! Controllers receive their hardware at construction through these traits;
//! there are no process-wide device handles. Implementations must return
//! promptly: every method is called from inside a tick.
//!
//! | Trait                  | Units                       |
//! |------------------------|-----------------------------|
//! | [`MotorOutput`]        | percent output in [-1, 1]   |
//! | [`PositionSensor`]     | raw device units            |
//! | [`AbsoluteAngleSensor`]| degrees, device frame       |
//! | [`HeadingSensor`]      | degrees, CCW positive       |

use std::sync::Arc;

use tracing::{trace, warn};

/// Percent-output motor controller.
pub trait MotorOutput: Send {
    /// Command a duty cycle. Callers keep `percent` within [-1, 1].
    fn set_percent(&mut self, percent: f64);

    /// Last commanded duty cycle.
    fn percent(&self) -> f64;
}

/// Relative position sensor with a resettable counter.
pub trait PositionSensor: Send {
    fn position_raw(&self) -> f64;

    fn velocity_raw(&self) -> f64;

    /// Overwrite the counter (startup alignment).
    fn set_position_raw(&mut self, raw: f64);
}

/// Absolute angle sensor (e.g. a magnetic encoder on the steering axis).
pub trait AbsoluteAngleSensor: Send {
    fn absolute_degrees(&self) -> f64;
}

/// Robot heading source (gyro).
pub trait HeadingSensor: Send {
    fn heading_degrees(&self) -> f64;

    /// Declare the current orientation to be heading zero.
    fn reset(&mut self);
}

/// Fire-and-forget name/value publisher.
pub trait Telemetry: Send + Sync {
    fn put_number(&self, key: &str, value: f64);

    fn put_string(&self, key: &str, value: &str);
}

/// Non-fatal warning reporter.
pub trait WarningSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Publishes telemetry as `trace`-level tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn put_number(&self, key: &str, value: f64) {
        trace!(target: "strafe::telemetry", key = key, value = value, "telemetry");
    }

    fn put_string(&self, key: &str, value: &str) {
        trace!(target: "strafe::telemetry", key = key, value = value, "telemetry");
    }
}

/// Reports warnings as `warn`-level tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarnings;

impl WarningSink for TracingWarnings {
    fn report(&self, message: &str) {
        warn!(target: "strafe::safety", "{message}");
    }
}

/// Telemetry and warning sinks shared by every controller.
#[derive(Clone)]
pub struct Sinks {
    pub telemetry: Arc<dyn Telemetry>,
    pub warnings: Arc<dyn WarningSink>,
}

impl Sinks {
    pub fn new(telemetry: Arc<dyn Telemetry>, warnings: Arc<dyn WarningSink>) -> Self {
        Self {
            telemetry,
            warnings,
        }
    }

    /// Route everything through `tracing`.
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingTelemetry), Arc::new(TracingWarnings))
    }
}

impl Default for Sinks {
    fn default() -> Self {
        Self::tracing()
    }
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks").finish_non_exhaustive()
    }
}
