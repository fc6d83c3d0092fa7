//! # Communications interface crate.
//!
//! Provides the per-cycle interface types exchanged between the vehicle,
//! the planner, perception and the longitudinal controller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator commands produced by the controller
pub mod actuators;

/// Vehicle state as reported by the car
pub mod car;

/// Longitudinal plan produced by the planner
pub mod plan;

/// Lead and track data produced by perception
pub mod radar;
