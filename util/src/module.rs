//! Cyclic module interface
//!
//! A cyclic module is built with `Default`, set up once with `init`, then stepped once per control
//! cycle with `proc`. Modules which archive their data also implement `archive::Archived`, and
//! the executable calls `write` after each `proc`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The internal state of a cyclic module.
pub trait State {
    /// Data needed to set the module up, usually including a parameter file path
    type InitData;
    type InitError;

    /// Inputs for one cycle
    type InputData;
    /// Outputs of one cycle
    type OutputData;
    /// Diagnostics for one cycle, which are archived alongside the outputs
    type StatusReport;
    type ProcError;

    /// Set the module up, loading its parameters and opening its archives in `session`.
    ///
    /// Calling `init` again replaces the module's state.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Step the module by one cycle.
    ///
    /// Cycles must be processed in order, and `proc` must return within the cycle period.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
