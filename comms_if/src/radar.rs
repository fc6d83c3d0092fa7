//! # Radar state
//!
//! Lead vehicle and track data as fused by perception.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The closest in-path lead vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadData {
    /// Velocity of the lead relative to ego in meters/second.
    pub v_rel_ms: f64,

    /// Filtered acceleration of the lead in meters/second^2.
    pub a_lead_mss: f64,

    /// Longitudinal distance to the lead in meters.
    pub d_rel_m: f64
}

/// A single radar track.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveTrack {
    /// Longitudinal distance in meters.
    pub d_rel_m: f64,

    /// Lateral offset in meters, positive to the left.
    pub y_rel_m: f64,

    /// Velocity relative to ego in meters/second.
    pub v_rel_ms: f64
}

/// Perception output for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarState {
    /// True if perception is confident there is a lead. The radar always reports a `lead_one`, so
    /// this flag decides whether it is used.
    pub has_lead: bool,

    /// The closest lead.
    pub lead_one: LeadData,

    /// All tracks currently seen.
    pub live_tracks: Vec<LiveTrack>,

    /// The following time headway currently in use in seconds.
    pub time_headway_s: f64
}
