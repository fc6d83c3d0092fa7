//! Lead and track snapshots
//!
//! Perception data is copied into fixed-shape structures once per cycle. Snapshots are rebuilt
//! from scratch every cycle, so nothing is carried over from a cycle where perception reported
//! nothing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::radar::RadarState;
use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of tracks kept per cycle.
pub const MAX_TRACKS: usize = 32;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The lead vehicle as seen this cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct LeadSnapshot {
    /// True if there is a lead. All other fields are zero if not.
    pub present: bool,

    /// Velocity relative to ego.
    ///
    /// Units: meters/second
    pub v_rel_ms: f64,

    /// Acceleration of the lead.
    ///
    /// Units: meters/second^2
    pub a_lead_mss: f64,

    /// Distance to the lead.
    ///
    /// Units: meters
    pub d_rel_m: f64
}

/// A single nearby track.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Absolute velocity of the tracked object.
    ///
    /// Units: meters/second
    pub v_lead_ms: f64,

    /// Lateral offset, positive left.
    ///
    /// Units: meters
    pub y_rel_m: f64,

    /// Distance ahead.
    ///
    /// Units: meters
    pub d_rel_m: f64
}

/// All tracks seen this cycle, in the order perception reported them.
#[derive(Debug, Copy, Clone)]
pub struct TrackSnapshot {
    tracks: [TrackPoint; MAX_TRACKS],
    len: usize,

    /// Number of tracks which did not fit.
    dropped: usize
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LeadSnapshot {
    /// Build the lead snapshot from this cycle's radar state.
    pub fn from_radar(radar: Option<&RadarState>) -> Self {
        match radar {
            Some(r) if r.has_lead => Self {
                present: true,
                v_rel_ms: r.lead_one.v_rel_ms,
                a_lead_mss: r.lead_one.a_lead_mss,
                d_rel_m: r.lead_one.d_rel_m
            },
            _ => Self::default()
        }
    }
}

impl TrackSnapshot {
    /// Rebuild the snapshot from this cycle's radar state.
    ///
    /// Track velocities are made absolute using the ego speed.
    pub fn refresh(&mut self, radar: Option<&RadarState>, v_ego_ms: f64) {
        self.len = 0;
        self.dropped = 0;

        let live_tracks = match radar {
            Some(r) => &r.live_tracks,
            None => return
        };

        for track in live_tracks {
            if self.len == MAX_TRACKS {
                self.dropped += 1;
                continue;
            }

            self.tracks[self.len] = TrackPoint {
                v_lead_ms: v_ego_ms + track.v_rel_ms,
                y_rel_m: track.y_rel_m,
                d_rel_m: track.d_rel_m
            };
            self.len += 1;
        }
    }

    /// The tracks in this snapshot.
    pub fn tracks(&self) -> &[TrackPoint] {
        &self.tracks[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of tracks dropped because the snapshot was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for TrackSnapshot {
    fn default() -> Self {
        Self {
            tracks: [TrackPoint::default(); MAX_TRACKS],
            len: 0,
            dropped: 0
        }
    }
}
