//! ODE integrators
//!
//! Advance a scalar state across one controller step while the actuator
//! command is held constant. The right-hand side is an opaque closure, so the
//! integrators know nothing about vehicle physics.
//!
//! # Available Solvers
//!
//! - **rk4**: classic fixed-step 4th-order Runge-Kutta with optional substeps
//! - **dormand_prince**: adaptive embedded RK5(4) with error control (default)
//!
//! # Example
//!
//! ```rust
//! use cruise_core::{DormandPrince, Integrator};
//!
//! // dy/dt = -y, y(0) = 1
//! let y = DormandPrince::default().advance(|y, _t| -y, 1.0, 0.0, 1.0).unwrap();
//! assert!((y - (-1.0f64).exp()).abs() < 1e-6);
//! ```

mod dormand_prince;
mod rk4;

pub use dormand_prince::DormandPrince;
pub use rk4::Rk4;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SolverError};

/// Advances `dy/dt = rhs(y, t)` from `t0` to `t0 + dt`
pub trait Integrator: Send + Sync {
    /// Integrate across one interval and return only the final state
    ///
    /// # Arguments
    /// * `rhs` - Right-hand side `(state, time) -> derivative`
    /// * `y0` - State at `t0`
    /// * `t0` - Interval start time
    /// * `dt` - Interval length (positive)
    fn advance<F>(&self, rhs: F, y0: f64, t0: f64, dt: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64, f64) -> f64;

    /// Check solver settings before a run
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Solver selectable from a scenario file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Solver {
    Rk4(Rk4),
    DormandPrince(DormandPrince),
}

impl Default for Solver {
    fn default() -> Self {
        Solver::DormandPrince(DormandPrince::default())
    }
}

impl Integrator for Solver {
    fn advance<F>(&self, rhs: F, y0: f64, t0: f64, dt: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64, f64) -> f64,
    {
        match self {
            Solver::Rk4(solver) => solver.advance(rhs, y0, t0, dt),
            Solver::DormandPrince(solver) => solver.advance(rhs, y0, t0, dt),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Solver::Rk4(solver) => solver.validate(),
            Solver::DormandPrince(solver) => solver.validate(),
        }
    }
}

/// Fails on NaN or infinite intermediate values.
pub(crate) fn check_finite(value: f64, time: f64) -> Result<f64, SolverError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::NonFinite { time, value })
    }
}
