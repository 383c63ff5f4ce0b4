//! Adaptive Dormand-Prince RK5(4)
//!
//! Seven-stage embedded pair: the 5th-order solution is propagated and the
//! difference to the embedded 4th-order solution drives step-size control.

use serde::{Deserialize, Serialize};

use super::{check_finite, Integrator};
use crate::error::{require_positive, ConfigError, SolverError};

// Butcher tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also the last stage's row, FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// 5th minus embedded 4th-order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Adaptive RK5(4) solver with mixed absolute/relative error control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DormandPrince {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Attempted steps (accepted or rejected) allowed per interval
    pub max_steps: usize,
    /// First trial step as a fraction of the interval
    pub initial_step: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 500,
            initial_step: 0.1,
        }
    }
}

impl DormandPrince {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Default::default()
        }
    }

    /// Set the attempted-step budget per interval
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// One trial step: returns the 5th-order state, the error estimate and
    /// the derivative at the new point (reusable as the next first stage).
    fn trial<F>(
        &self,
        rhs: &F,
        y: f64,
        t: f64,
        h: f64,
        k1: f64,
    ) -> Result<(f64, f64, f64), SolverError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let k2 = check_finite(rhs(y + h * A21 * k1, t + C2 * h), t)?;
        let k3 = check_finite(rhs(y + h * (A31 * k1 + A32 * k2), t + C3 * h), t)?;
        let k4 = check_finite(rhs(y + h * (A41 * k1 + A42 * k2 + A43 * k3), t + C4 * h), t)?;
        let k5 = check_finite(
            rhs(y + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4), t + C5 * h),
            t,
        )?;
        let k6 = check_finite(
            rhs(y + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5), t + h),
            t,
        )?;

        let y_new = check_finite(
            y + h * (B1 * k1 + B3 * k3 + B4 * k4 + B5 * k5 + B6 * k6),
            t + h,
        )?;
        let k7 = check_finite(rhs(y_new, t + h), t + h)?;

        let error = h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
        Ok((y_new, error, k7))
    }
}

impl Integrator for DormandPrince {
    fn advance<F>(&self, rhs: F, y0: f64, t0: f64, dt: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let t_end = t0 + dt;
        let mut t = t0;
        let mut y = y0;
        let mut h = dt * self.initial_step;
        let mut k1 = check_finite(rhs(y, t), t)?;

        for _ in 0..self.max_steps {
            let remaining = t_end - t;
            if remaining <= 0.0 {
                return Ok(y);
            }

            let last = h >= remaining;
            if last {
                h = remaining;
            }
            if h <= f64::EPSILON * t.abs().max(dt) {
                return Err(SolverError::StepSizeUnderflow { time: t, step_size: h });
            }

            let (y_new, error, k_next) = self.trial(&rhs, y, t, h, k1)?;
            let scale = self.atol + self.rtol * y.abs().max(y_new.abs());
            let norm = (error / scale).abs();

            if norm <= 1.0 {
                t = if last { t_end } else { t + h };
                y = y_new;
                k1 = k_next;
            }

            let factor = if norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
            };
            h *= factor;
        }

        if t_end - t <= 0.0 {
            Ok(y)
        } else {
            Err(SolverError::NotConverged {
                max_steps: self.max_steps,
            })
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_positive("rtol", self.rtol)?;
        require_positive("atol", self.atol)?;
        require_positive("initial_step", self.initial_step)?;
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_steps",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
