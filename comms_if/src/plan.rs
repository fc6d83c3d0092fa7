//! # Longitudinal plan

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The planner which produced the current longitudinal targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    None,

    /// Targets derived from the set cruise speed
    Cruise,

    /// Targets from the lead-following MPCs
    Mpc1,
    Mpc2,
    Mpc3,

    /// Targets from the driving model
    Model
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Speed and acceleration targets for one cycle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPlan {
    /// The driver's set cruise speed in meters/second.
    pub v_cruise_ms: f64,

    /// Target speed for this cycle in meters/second.
    pub v_target_ms: f64,

    /// Target speed a short horizon ahead in meters/second.
    pub v_target_future_ms: f64,

    /// Target acceleration in meters/second^2, used as the feedforward term.
    pub a_target_mss: f64,

    /// True if the planner is following a lead vehicle.
    pub has_lead: bool,

    /// Distance to the planner's lead vehicle in meters. Only meaningful if `has_lead` is set.
    pub lead_d_rel_m: f64,

    /// True if the planner is slowing down for an upcoming turn.
    pub decel_for_turn: bool,

    /// Which planner produced the targets.
    pub source: PlanSource
}

impl Default for PlanSource {
    fn default() -> Self {
        PlanSource::None
    }
}

impl Default for LongPlan {
    fn default() -> Self {
        Self {
            v_cruise_ms: 0.0,
            v_target_ms: 0.0,
            v_target_future_ms: 0.0,
            a_target_mss: 0.0,
            has_lead: false,
            lead_d_rel_m: 0.0,
            decel_for_turn: false,
            source: PlanSource::None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plan_source_names() {
        let plan: LongPlan = serde_json::from_str(
            r#"{"v_target_ms": 12.5, "source": "cruise"}"#
        ).unwrap();

        assert_eq!(plan.source, PlanSource::Cruise);
        assert_eq!(plan.v_target_ms, 12.5);
        assert!(!plan.has_lead);

        assert_eq!(serde_json::to_string(&PlanSource::Mpc2).unwrap(), "\"mpc2\"");
    }
}
