//! Gain schedule selection
//!
//! While the cruise planner is slowing down for a turn the PI gains are suppressed, so only the
//! feedforward acts. Rather than editing the gain curves in place the controller selects one of
//! two schedules, so the configured curves are always what is restored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::plan::PlanSource;
use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which gains the PI controller uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GainSchedule {
    /// The configured gain curves.
    Baseline,

    /// Zero proportional and integral gain.
    Suppressed
}

/// Result of a turn deceleration edge check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnDecelEdge {
    /// Turn deceleration just started, the integrator must be cleared.
    Rising,

    /// Turn deceleration just ended.
    Falling,

    None
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Update the turn deceleration flag for this cycle.
///
/// Only the cruise planner's turn deceleration is honoured. Any other planner clears the flag.
/// Returns the new flag value and the edge that was seen.
pub fn update_turn_decel(
    source: PlanSource,
    decel_for_turn: bool,
    turn_decel_active: bool
) -> (bool, TurnDecelEdge) {
    if source != PlanSource::Cruise {
        return (false, TurnDecelEdge::None)
    }

    match (turn_decel_active, decel_for_turn) {
        (false, true) => (true, TurnDecelEdge::Rising),
        (true, false) => (false, TurnDecelEdge::Falling),
        (active, _) => (active, TurnDecelEdge::None)
    }
}

impl GainSchedule {
    /// The schedule for the given turn deceleration flag.
    pub fn select(turn_decel_active: bool) -> Self {
        if turn_decel_active {
            GainSchedule::Suppressed
        }
        else {
            GainSchedule::Baseline
        }
    }
}

impl Default for GainSchedule {
    fn default() -> Self {
        GainSchedule::Baseline
    }
}
