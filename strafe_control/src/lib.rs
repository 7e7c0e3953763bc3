//! # Strafe Control Library
//!
//! Closed-loop actuator control for a swerve-drive robot with a rotating,
//! extending arm. Every tick turns a setpoint into a bounded motor command:
//!
//! 1. **Sensors** — raw readings converted to engineering units
//! 2. **Safety envelope** — fail-closed range and plausibility check
//! 3. **PID** — standard or continuous-input (angular) feedback
//! 4. **Slew limiter** — bounds per-tick change of the command
//! 5. **Motor output** — percent command clamped to [-1, 1]
//!
//! ## Tick Model
//!
//! Controllers implement [`cycle::Periodic`] and are driven by an external
//! loop at a fixed period. Ticks never block and never return errors; faults
//! are contained and surfaced through the [`hw::WarningSink`]. Setpoints are
//! single last-write-wins slots written between ticks.
//!
//! Hardware is injected at construction through the capability traits in
//! [`hw`]; [`sim`] provides simulated implementations.

pub mod control;
pub mod cycle;
pub mod error;
pub mod hw;
pub mod joint;
pub mod robot;
pub mod routine;
pub mod safety;
pub mod sim;
pub mod swerve;
