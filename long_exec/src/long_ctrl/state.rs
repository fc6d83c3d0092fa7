//! Implementations for the LongCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::*;
use comms_if::{
    actuators::ActuatorCmd,
    car::CarState,
    plan::LongPlan,
    radar::RadarState
};
use util::{
    archive::{Archived, Archiver},
    maths::interp,
    module::State,
    params,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Longitudinal control module state
pub struct LongCtrl {
    pub(crate) params: Params,

    /// If true live perception and the driver gas override are ignored, so that recorded cycles
    /// replay deterministically.
    replay: bool,

    /// Executing mode
    mode: LongCtrlMode,

    /// Speed the PI controller is tracking
    v_pid_ms: f64,

    /// Signed output of the last cycle, gas positive and brake negative
    last_output_gb: f64,

    /// True while the cruise planner is slowing for a turn
    turn_decel_active: bool,

    /// Following time headway reported by perception
    time_headway_s: f64,

    pid: PiController,

    lead: LeadSnapshot,
    tracks: TrackSnapshot,

    gas_limiter: Option<Box<dyn GasLimiter>>,

    report: StatusReport,
    arch_report: Archiver,

    output: ActuatorCmd,
    arch_output: Archiver
}

/// Data required to initialise LongCtrl.
#[derive(Debug, Clone)]
pub struct LongCtrlInit {
    /// Parameter file path, relative to the params directory
    pub params_path: String,

    /// Run in deterministic replay mode
    pub replay: bool
}

/// Input data to Longitudinal Control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// True if the controller is engaged. The caller must clear this if any input is stale.
    pub active: bool,

    /// The state of the car
    pub car: CarState,

    /// The planner's targets
    pub plan: LongPlan,

    /// Perception output, or `None` if there is none this cycle
    pub radar: Option<RadarState>
}

/// Status report for LongCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub mode: LongCtrlMode,

    /// Setpoint of the PI controller
    pub v_pid_ms: f64,

    /// Signed output, gas positive and brake negative
    pub output_gb: f64,

    /// Gas ceiling this cycle
    pub gas_max: f64,

    /// Brake ceiling this cycle
    pub brake_max: f64,

    /// The lead is close enough that a stop was requested
    pub stop_requested: bool,

    /// Positive output and integration were blocked near standstill
    pub prevent_overshoot: bool,

    /// The PI output has been saturated for a sustained period
    pub pid_saturated: bool,

    /// PI gains suppressed for turn deceleration
    pub turn_decel_active: bool,

    /// The driver's gas press overrode the controller
    pub gas_override: bool,

    /// A non-finite input was received and the controller was disengaged for the cycle
    pub inputs_degraded: bool,

    /// Perception reported a lead
    pub lead_present: bool,

    /// Number of tracks in the snapshot
    pub num_tracks: usize,

    /// Number of tracks which did not fit in the snapshot
    pub tracks_dropped: usize
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LongCtrl {
    /// Create a new controller from the given parameters.
    ///
    /// The controller starts in `Off`. If `replay` is set live perception and the driver gas
    /// override are ignored.
    pub fn new(params: Params, replay: bool) -> Self {
        let pid = PiController::new(
            params.kp.clone(),
            params.ki.clone(),
            params.k_f,
            params.sat_limit
        );

        Self {
            replay,
            mode: LongCtrlMode::Off,
            v_pid_ms: 0.0,
            last_output_gb: 0.0,
            turn_decel_active: false,
            time_headway_s: params.default_time_headway_s,
            pid,
            lead: LeadSnapshot::default(),
            tracks: TrackSnapshot::default(),
            gas_limiter: None,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: ActuatorCmd::default(),
            arch_output: Archiver::default(),
            params
        }
    }

    /// Install the dynamic gas collaborator. It is only used if `enable_dynamic_gas` is set in
    /// the parameters and the controller is not in replay mode.
    pub fn set_gas_limiter(&mut self, gas_limiter: Box<dyn GasLimiter>) {
        self.gas_limiter = Some(gas_limiter);
    }

    /// Install a car specific conversion from the PI output to signed pedal travel, given the
    /// output and the ego speed. It is applied before the output is limited.
    pub fn set_output_convert(&mut self, convert: fn(f64, f64) -> f64) {
        self.pid.set_convert(Some(convert));
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn replay(&self) -> bool {
        self.replay
    }

    pub fn mode(&self) -> LongCtrlMode {
        self.mode
    }

    pub fn v_pid(&self) -> f64 {
        self.v_pid_ms
    }

    pub fn last_output(&self) -> f64 {
        self.last_output_gb
    }

    pub fn lead(&self) -> &LeadSnapshot {
        &self.lead
    }

    pub fn tracks(&self) -> &TrackSnapshot {
        &self.tracks
    }

    pub fn time_headway_s(&self) -> f64 {
        self.time_headway_s
    }

    /// Refresh the perception snapshots from this cycle's input.
    fn refresh_perception(&mut self, radar: Option<&RadarState>, v_ego_ms: f64) {
        self.lead = LeadSnapshot::from_radar(radar);
        self.tracks.refresh(radar, v_ego_ms);

        // The headway is a setting, so it is kept when perception is missing
        if let Some(r) = radar {
            if r.time_headway_s.is_finite() && r.time_headway_s > 0.0 {
                self.time_headway_s = r.time_headway_s;
            }
        }

        self.report.lead_present = self.lead.present;
        self.report.num_tracks = self.tracks.len();
        self.report.tracks_dropped = self.tracks.dropped();
    }

    /// Update the gain schedule for turn deceleration.
    fn update_gain_schedule(&mut self, plan: &LongPlan) {
        let (turn_decel_active, edge) = update_turn_decel(
            plan.source,
            plan.decel_for_turn,
            self.turn_decel_active
        );

        match edge {
            TurnDecelEdge::Rising => {
                debug!("Turn deceleration started, suppressing PI gains");
                self.pid.clear_integrator();
            },
            TurnDecelEdge::Falling => {
                debug!("Turn deceleration ended, restoring PI gains");
            },
            TurnDecelEdge::None => ()
        }

        self.turn_decel_active = turn_decel_active;
        self.pid.set_schedule(GainSchedule::select(turn_decel_active));
    }

    /// Mode off.
    ///
    /// Also used while the driver presses the gas. The setpoint follows the car and the PI
    /// controller is held in reset.
    fn mode_off(&mut self, v_ego_pid_ms: f64) -> f64 {
        self.v_pid_ms = v_ego_pid_ms;
        self.pid.reset();

        0.0
    }

    /// Mode tracking.
    ///
    /// The PI controller tracks the target speed with the target acceleration as feedforward.
    fn mode_tracking(
        &mut self,
        plan: &LongPlan,
        v_ego_ms: f64,
        v_ego_pid_ms: f64,
        gas_max: f64,
        brake_max: f64
    ) -> f64 {
        self.v_pid_ms = plan.v_target_ms;
        self.pid.set_limits(gas_max, -brake_max);

        // Some cars brake harder when they think the driver wants to stop, so near standstill
        // freeze the integrator and don't allow any gas, otherwise the car creeps forward.
        let prevent_overshoot = !self.params.stopping_control
            && v_ego_ms < PREVENT_OVERSHOOT_EGO_MS
            && plan.v_target_future_ms < PREVENT_OVERSHOOT_TARGET_MS;

        let deadzone = self.params.deadzone.interp(v_ego_pid_ms);

        self.update_gain_schedule(plan);

        let mut output_gb = self.pid.update(
            self.v_pid_ms,
            v_ego_pid_ms,
            v_ego_pid_ms,
            plan.a_target_mss,
            deadzone,
            prevent_overshoot
        );

        if prevent_overshoot {
            output_gb = output_gb.min(0.0);
        }

        self.report.prevent_overshoot = prevent_overshoot;
        self.report.pid_saturated = self.pid.saturated();

        output_gb
    }

    /// Mode stopping.
    ///
    /// Ramp the brake on until the car is held at a standstill. The ramp is faster the closer the
    /// lead is, and reverses if the lead is far away.
    fn mode_stopping(
        &mut self,
        car: &CarState,
        plan: &LongPlan,
        gas_max: f64,
        brake_max: f64
    ) -> f64 {
        let factor = if plan.has_lead {
            interp(plan.lead_d_rel_m, &STOP_RAMP_BP, &STOP_RAMP_V)
        }
        else {
            1.0
        };

        let mut output_gb = self.last_output_gb;

        if !car.standstill || output_gb > -BRAKE_STOPPING_TARGET {
            output_gb -= STOPPING_BRAKE_RATE / RATE_HZ * factor;
        }
        output_gb = output_gb.max(-brake_max).min(gas_max);

        self.v_pid_ms = car.v_ego_ms;
        self.pid.reset();

        output_gb
    }

    /// Mode starting.
    ///
    /// Release the brake quickly before handing over to the PI controller. The release is slower
    /// the closer the lead is.
    fn mode_starting(&mut self, car: &CarState, plan: &LongPlan) -> f64 {
        let factor = if plan.has_lead {
            interp(plan.lead_d_rel_m, &START_RAMP_BP, &START_RAMP_V)
        }
        else {
            1.0
        };

        let mut output_gb = self.last_output_gb;

        if output_gb < -BRAKE_THRESHOLD_TO_PID {
            output_gb += STARTING_BRAKE_RATE / RATE_HZ * factor;
        }

        self.v_pid_ms = car.v_ego_ms;
        self.pid.reset();

        output_gb
    }
}

impl Default for LongCtrl {
    /// An uninitialised controller, which has zero actuation ceilings until `init` is called.
    fn default() -> Self {
        Self::new(Params::default(), false)
    }
}

impl State for LongCtrl {
    type InitData = LongCtrlInit;
    type InitError = LongCtrlError;

    type InputData = InputData;
    type OutputData = ActuatorCmd;
    type StatusReport = StatusReport;
    type ProcError = LongCtrlError;

    /// Initialise the LongCtrl module.
    ///
    /// Loads the parameter file and opens the archives. Any gas limiter or output conversion
    /// already installed is kept.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params: Params = params::load(&init_data.params_path)
            .map_err(LongCtrlError::ParamLoadError)?;

        let gas_limiter = self.gas_limiter.take();
        let convert = self.pid.convert();
        *self = Self::new(params, init_data.replay);
        self.gas_limiter = gas_limiter;
        self.pid.set_convert(convert);

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "long_ctrl/status_report.csv"
        ).map_err(|e| LongCtrlError::ArchiveInitError(e.to_string()))?;
        self.arch_output = Archiver::from_path(
            session, "long_ctrl/output.csv"
        ).map_err(|e| LongCtrlError::ArchiveInitError(e.to_string()))?;

        info!(
            "LongCtrl initialised from {} (replay: {}, dynamic gas: {})",
            init_data.params_path,
            self.replay,
            self.params.enable_dynamic_gas
        );

        Ok(())
    }

    /// Perform cyclic processing of Longitudinal Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let car = &input_data.car;
        let plan = &input_data.plan;

        // Non-finite inputs disengage the controller for this cycle rather than propagating into
        // the PI state.
        let mut active = input_data.active;
        if active && !inputs_finite(car, plan) {
            warn!("LongCtrl received non-finite inputs, disengaging for this cycle");
            active = false;
            self.report.inputs_degraded = true;
        }
        let v_ego_ms = if car.v_ego_ms.is_finite() {
            car.v_ego_ms
        }
        else {
            0.0
        };

        // ---- ACTUATION LIMITS ----

        let mut gas_max = self.params.gas_max.interp(v_ego_ms).max(0.0);
        let brake_max = self.params.brake_max.interp(v_ego_ms).max(0.0);

        // ---- PERCEPTION ----

        if !self.replay {
            self.refresh_perception(input_data.radar.as_ref(), v_ego_ms);

            if self.params.enable_dynamic_gas {
                if let Some(ref mut limiter) = self.gas_limiter {
                    gas_max = limiter.update(
                        v_ego_ms,
                        &self.lead,
                        &self.tracks,
                        self.time_headway_s,
                        car.blinker_on()
                    ).max(0.0);
                }
            }
        }

        // ---- MODE TRANSITION ----

        let stop_requested = plan.has_lead && plan.lead_d_rel_m < STOP_REQUEST_LEAD_DIST_M;

        let prev_mode = self.mode;
        self.mode = next_mode(self.mode, &TransInputs {
            active,
            v_ego_ms,
            v_target_future_ms: plan.v_target_future_ms,
            v_pid_ms: self.v_pid_ms,
            output_gb: self.last_output_gb,
            brake_pressed: car.brake_pressed,
            cruise_standstill: car.cruise_standstill,
            stop_requested
        });

        if self.mode != prev_mode {
            debug!("LongCtrl mode change: {:?} -> {:?}", prev_mode, self.mode);
        }

        // ---- CONTROL ----

        // The CAN bus reports 0 below this speed, which would otherwise cause jumps
        let v_ego_pid_ms = v_ego_ms.max(MIN_CAN_SPEED_MS);

        let gas_override = car.gas_pressed && !self.replay;

        let output_gb = match self.mode {
            LongCtrlMode::Off => self.mode_off(v_ego_pid_ms),
            _ if gas_override => self.mode_off(v_ego_pid_ms),
            LongCtrlMode::Tracking => self.mode_tracking(
                plan, v_ego_ms, v_ego_pid_ms, gas_max, brake_max
            ),
            LongCtrlMode::Stopping => self.mode_stopping(car, plan, gas_max, brake_max),
            LongCtrlMode::Starting => self.mode_starting(car, plan)
        };

        self.last_output_gb = output_gb;

        let output = split_output(output_gb, gas_max, brake_max);

        trace!(
            "LongCtrl output: gas {:.4}, brake {:.4} ({:?}, v_pid {:.2} m/s)",
            output.gas,
            output.brake,
            self.mode,
            self.v_pid_ms
        );

        // Fill in the report
        self.report.mode = self.mode;
        self.report.v_pid_ms = self.v_pid_ms;
        self.report.output_gb = output_gb;
        self.report.gas_max = gas_max;
        self.report.brake_max = brake_max;
        self.report.stop_requested = stop_requested;
        self.report.turn_decel_active = self.turn_decel_active;
        self.report.gas_override = gas_override && self.mode != LongCtrlMode::Off;

        self.output = output;

        Ok((output, self.report))
    }
}

impl Archived for LongCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Split a signed output into gas and brake demands within their ceilings.
pub fn split_output(output_gb: f64, gas_max: f64, brake_max: f64) -> ActuatorCmd {
    if output_gb >= 0.0 {
        ActuatorCmd {
            gas: output_gb.min(gas_max),
            brake: 0.0
        }
    }
    else {
        ActuatorCmd {
            gas: 0.0,
            brake: (-output_gb).min(brake_max)
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that every number the control laws use is finite.
fn inputs_finite(car: &CarState, plan: &LongPlan) -> bool {
    car.v_ego_ms.is_finite()
        && plan.v_target_ms.is_finite()
        && plan.v_target_future_ms.is_finite()
        && plan.a_target_mss.is_finite()
        && (!plan.has_lead || plan.lead_d_rel_m.is_finite())
}
