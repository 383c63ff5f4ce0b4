//! Fixed-step 4th-order Runge-Kutta

use serde::{Deserialize, Serialize};

use super::{check_finite, Integrator};
use crate::error::{ConfigError, SolverError};

/// Classic RK4 with `substeps` equal sub-intervals per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rk4 {
    pub substeps: usize,
}

impl Default for Rk4 {
    fn default() -> Self {
        Self { substeps: 10 }
    }
}

impl Rk4 {
    pub fn new(substeps: usize) -> Self {
        Self { substeps }
    }
}

impl Integrator for Rk4 {
    fn advance<F>(&self, rhs: F, y0: f64, t0: f64, dt: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let h = dt / self.substeps as f64;
        let mut y = y0;

        for i in 0..self.substeps {
            let t = t0 + h * i as f64;

            let k1 = check_finite(rhs(y, t), t)?;
            let k2 = check_finite(rhs(y + 0.5 * h * k1, t + 0.5 * h), t)?;
            let k3 = check_finite(rhs(y + 0.5 * h * k2, t + 0.5 * h), t)?;
            let k4 = check_finite(rhs(y + h * k3, t + h), t)?;

            y = check_finite(y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4), t + h)?;
        }

        Ok(y)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.substeps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "substeps",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_decay() {
        let y = Rk4::new(10).advance(|y, _t| -y, 1.0, 0.0, 1.0).unwrap();
        assert_relative_eq!(y, (-1.0f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_exact_for_quadratic_rate() {
        // reduces to Simpson's rule when rhs ignores y
        let y = Rk4::new(1)
            .advance(|_y, t| 3.0 * t * t, 0.0, 1.0, 1.0)
            .unwrap();
        assert_relative_eq!(y, 8.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_substeps_improve_accuracy() {
        let exact = (-5.0f64).exp();
        let coarse = Rk4::new(1).advance(|y, _t| -y, 1.0, 0.0, 5.0).unwrap();
        let fine = Rk4::new(50).advance(|y, _t| -y, 1.0, 0.0, 5.0).unwrap();
        assert!((fine - exact).abs() < (coarse - exact).abs());
    }

    #[test]
    fn test_non_finite_rhs_fails() {
        let result = Rk4::new(4).advance(|_y, _t| f64::NAN, 0.0, 0.0, 1.0);
        assert!(matches!(result, Err(SolverError::NonFinite { .. })));
    }

    #[test]
    fn test_zero_substeps_rejected() {
        assert!(Rk4::new(0).validate().is_err());
        assert!(Rk4::default().validate().is_ok());
    }
}
