//! # Longitudinal control library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the longitudinal control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Longitudinal control module - converts speed and acceleration targets into gas and brake
/// demands
pub mod long_ctrl;

/// Scenario reader - loads recorded or scripted cycles for offline replay
pub mod scenario;
