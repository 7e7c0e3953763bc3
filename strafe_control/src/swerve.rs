//! Swerve drive module root.
//!
//! A [`module::SwerveModule`] owns one wheel's drive and turn motors; the
//! [`drive::SwerveDrive`] aggregator owns the modules in kinematics order.
//! Chassis kinematics (chassis speeds → per-module states) live upstream.

pub mod drive;
pub mod module;
