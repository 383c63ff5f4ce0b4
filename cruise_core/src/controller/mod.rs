//! Feedback controllers
//!
//! A controller is a pure update rule over an explicit state value that the
//! simulation driver owns and threads from step to step. Nothing is hidden
//! in the controller itself, so independent simulations never share state.

mod pi;

pub use pi::{ActuatorLimits, ControllerState, PiController, PiGains};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which actuator bound, if any, clamped the command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Saturation {
    #[default]
    None,
    Upper,
    Lower,
}

impl Saturation {
    pub fn is_saturated(&self) -> bool {
        !matches!(self, Saturation::None)
    }
}

impl std::fmt::Display for Saturation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Saturation::None => write!(f, "none"),
            Saturation::Upper => write!(f, "upper"),
            Saturation::Lower => write!(f, "lower"),
        }
    }
}

/// Result of one controller invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    /// `setpoint - measured`
    pub error: f64,
    /// Command before clamping
    pub raw_command: f64,
    /// Command after clamping, the value that reaches the plant
    pub command: f64,
    /// Integral accumulator after this step (committed or rolled back)
    pub integral: f64,
    pub saturation: Saturation,
}

/// Discrete-time feedback law
pub trait Controller: Send + Sync {
    /// Persistent register carried across steps
    type State: Clone + Send;

    /// State at the start of a run
    fn initial_state(&self) -> Self::State;

    /// Integral accumulator held in `state`, for recording
    fn integral(&self, state: &Self::State) -> f64;

    /// Compute the command for one step and update `state`
    fn update(&self, state: &mut Self::State, setpoint: f64, measured: f64, dt: f64)
        -> ControlOutput;

    /// Check tuning before a run
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}
