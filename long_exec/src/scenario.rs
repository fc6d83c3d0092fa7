//! # Replay scenario reader
//!
//! A scenario is a JSON Lines file with one controller tick per line, for example:
//!
//! ```text
//! # Pull away from a standstill
//! {"active": true, "car": {"v_ego_ms": 0.0, "standstill": true}, "plan": {"v_target_ms": 1.0}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::long_ctrl::InputData;
use comms_if::{car::CarState, plan::LongPlan, radar::RadarState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One recorded controller tick.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tick {
    pub active: bool,
    pub car: CarState,
    pub plan: LongPlan,
    pub radar: Option<RadarState>
}

/// A loaded scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    path: Option<PathBuf>,
    ticks: Vec<Tick>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Could not find the scenario at {0}")]
    ScenarioNotFound(String),

    #[error("Could not load the scenario: {0}")]
    ScenarioLoadError(std::io::Error),

    #[error("The scenario contains no ticks")]
    ScenarioEmpty,

    #[error("Invalid tick on line {0}: {1}")]
    InvalidTick(usize, serde_json::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Scenario {
    /// Load a scenario from the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = PathBuf::from(path.as_ref());

        if !path.exists() {
            return Err(ScenarioError::ScenarioNotFound(path.display().to_string()))
        }

        let text = fs::read_to_string(&path)
            .map_err(ScenarioError::ScenarioLoadError)?;

        let mut scenario = Self::parse(&text)?;
        scenario.path = Some(path);

        Ok(scenario)
    }

    /// Parse a scenario from a string.
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let mut ticks = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Line numbers start at 1 so they match what an editor shows
            let tick: Tick = serde_json::from_str(line)
                .map_err(|e| ScenarioError::InvalidTick(i + 1, e))?;

            ticks.push(tick);
        }

        if ticks.is_empty() {
            return Err(ScenarioError::ScenarioEmpty)
        }

        Ok(Self {
            path: None,
            ticks
        })
    }

    /// The path the scenario was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the number of ticks in the scenario
    pub fn num_ticks(&self) -> usize {
        self.ticks.len()
    }

    /// Get the duration of the scenario in seconds at the given rate
    pub fn duration_s(&self, rate_hz: f64) -> f64 {
        self.ticks.len() as f64 / rate_hz
    }

    /// Iterate over the ticks as controller inputs, in file order.
    pub fn inputs(&self) -> impl Iterator<Item = InputData> + '_ {
        self.ticks.iter().cloned().map(InputData::from)
    }
}

impl From<Tick> for InputData {
    fn from(tick: Tick) -> Self {
        Self {
            active: tick.active,
            car: tick.car,
            plan: tick.plan,
            radar: tick.radar
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::plan::PlanSource;

    const SCENARIO: &str = r#"
# Engage at a standstill
{"active": true, "car": {"v_ego_ms": 0.0, "standstill": true}, "plan": {"v_target_ms": 0.0}}

{"active": true, "car": {"v_ego_ms": 0.0}, "plan": {"v_target_ms": 1.0, "source": "cruise"}, "radar": {"has_lead": true, "lead_one": {"v_rel_ms": 0.5, "a_lead_mss": 0.0, "d_rel_m": 8.0}, "live_tracks": [], "time_headway_s": 1.8}}
    # Disengage
{"active": false}
"#;

    #[test]
    fn test_parse() {
        let scenario = Scenario::parse(SCENARIO).unwrap();

        assert_eq!(scenario.num_ticks(), 3);
        assert!((scenario.duration_s(100.0) - 0.03).abs() < 1e-12);
        assert!(scenario.path().is_none());

        let inputs: Vec<InputData> = scenario.inputs().collect();

        assert!(inputs[0].active);
        assert!(inputs[0].car.standstill);
        assert!(inputs[0].radar.is_none());

        assert_eq!(inputs[1].plan.v_target_ms, 1.0);
        assert_eq!(inputs[1].plan.source, PlanSource::Cruise);
        let radar = inputs[1].radar.as_ref().unwrap();
        assert!(radar.has_lead);
        assert_eq!(radar.lead_one.d_rel_m, 8.0);

        assert!(!inputs[2].active);
        assert_eq!(inputs[2].car, CarState::default());
    }

    #[test]
    fn test_bad_line_reported() {
        let text = "# header\n{\"active\": true}\n\n{\"active\": tru}\n";

        match Scenario::parse(text) {
            Err(ScenarioError::InvalidTick(line, _)) => assert_eq!(line, 4),
            other => panic!("Expected an invalid tick error, got {:?}", other)
        }
    }

    #[test]
    fn test_empty_scenario() {
        assert!(matches!(
            Scenario::parse("# nothing here\n\n"),
            Err(ScenarioError::ScenarioEmpty)
        ));
    }

    #[test]
    fn test_load() {
        let mut path = std::env::temp_dir();
        path.push(format!("long_exec_scenario_test_{}.jsonl", std::process::id()));
        fs::write(&path, SCENARIO).unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.num_ticks(), 3);
        assert_eq!(scenario.path(), Some(path.as_path()));

        fs::remove_file(&path).unwrap();

        assert!(matches!(
            Scenario::load(&path),
            Err(ScenarioError::ScenarioNotFound(_))
        ));
    }
}
