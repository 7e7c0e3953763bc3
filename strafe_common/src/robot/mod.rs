//! Robot-level shared types.
//!
//! Configuration structures for the arm joints and the swerve drive, the
//! per-joint fault bitflags, and the per-module snapshot types exchanged
//! with the (external) kinematics layer.

pub mod config;
pub mod faults;
pub mod types;
