//! # Actuator commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One cycle's longitudinal actuation command.
///
/// Gas and brake are the two halves of one signed quantity, so at most one of them is nonzero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCmd {
    /// Normalised gas demand, between 0 and the current gas ceiling.
    pub gas: f64,

    /// Normalised brake demand, between 0 and the current brake ceiling.
    pub brake: f64
}
