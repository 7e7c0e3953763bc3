//! Strafe Common Library
//!
//! Shared constants, configuration loading and fault types used by the
//! Strafe actuator control crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Calibration constants and system-wide limits
//! - [`config`] - Configuration loading trait and shared config types
//! - [`robot`] - Robot configuration, fault flags and module snapshots
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use strafe_common::prelude::*;
//!
//! let config = RobotConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod robot;
