//! Control engine root.
//!
//! Scalar feedback primitives shared by the joint and swerve controllers:
//! PID (standard and continuous-input), slew-rate limiting, and angle
//! folding for wraparound domains.

pub mod angle;
pub mod pid;
pub mod slew;
