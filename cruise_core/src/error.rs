//! Error types for scenario setup and simulation runs
//!
//! Configuration problems are rejected before the first step executes.
//! Numerical failures abort the run they occur in; saturation is not an error.

use thiserror::Error;

/// Setup-time rejections
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("step count must be at least 2 (got {0})")]
    TooFewSteps(usize),

    #[error("simulation horizon must be finite and positive (got {0})")]
    InvalidHorizon(f64),

    #[error("time grid is not strictly increasing at index {0}")]
    NonMonotonicTime(usize),

    #[error("time grid is not uniform at index {index}: step {found} differs from {expected}")]
    NonUniformTime {
        index: usize,
        expected: f64,
        found: f64,
    },

    #[error("actuator lower bound {min} exceeds upper bound {max}")]
    InvertedLimits { min: f64, max: f64 },

    #[error("parameter '{name}' is invalid: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("setpoint change at step {step} is out of order (previous change at step {previous})")]
    UnorderedSchedule { step: usize, previous: usize },

    #[error("setpoint change at step {step} lies beyond the last simulated step {last}")]
    ScheduleOutOfRange { step: usize, last: usize },
}

/// Numerical failures inside a single integration interval
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("solver did not converge within {max_steps} steps")]
    NotConverged { max_steps: usize },

    #[error("step size {step_size:e} underflowed at t = {time}")]
    StepSizeUnderflow { time: f64, step_size: f64 },

    #[error("non-finite value {value} encountered at t = {time}")]
    NonFinite { time: f64, value: f64 },
}

/// Top-level error for the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("numerical failure at step {step} (t = {time}s): {source}")]
    Numerical {
        step: usize,
        time: f64,
        #[source]
        source: SolverError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;

/// Rejects NaN and infinities for a named parameter.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

/// Rejects values that are not finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            value,
            reason: "must be finite and positive",
        })
    }
}
