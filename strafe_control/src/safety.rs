//! Safety module root.
//!
//! Fail-closed range and plausibility checks evaluated every tick before
//! any feedback output is produced.

pub mod envelope;
