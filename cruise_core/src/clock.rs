//! Fixed, uniform simulation time grid

use crate::error::{require_positive, ConfigError};

/// Relative tolerance when checking an explicit grid for uniform spacing
const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Ordered time points `t_0..t_N` with constant spacing `dt`
///
/// Immutable once constructed. A clock with `len()` points drives
/// `steps() = len() - 1` controller steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    times: Vec<f64>,
    dt: f64,
}

impl SimulationClock {
    /// `nsteps` points evenly spanning `[0, tf]`, endpoints included
    ///
    /// # Example
    ///
    /// ```rust
    /// use cruise_core::SimulationClock;
    ///
    /// let clock = SimulationClock::new(300.0, 301).unwrap();
    /// assert_eq!(clock.dt(), 1.0);
    /// assert_eq!(clock.steps(), 300);
    /// ```
    pub fn new(tf: f64, nsteps: usize) -> Result<Self, ConfigError> {
        if nsteps < 2 {
            return Err(ConfigError::TooFewSteps(nsteps));
        }
        if !(tf.is_finite() && tf > 0.0) {
            return Err(ConfigError::InvalidHorizon(tf));
        }

        let dt = tf / (nsteps - 1) as f64;
        let mut times: Vec<f64> = (0..nsteps).map(|i| i as f64 * dt).collect();
        // pin the endpoint against accumulated rounding
        times[nsteps - 1] = tf;

        Ok(Self { times, dt })
    }

    /// Adopt an explicit grid, which must be strictly increasing and uniform
    pub fn from_times(times: Vec<f64>) -> Result<Self, ConfigError> {
        if times.len() < 2 {
            return Err(ConfigError::TooFewSteps(times.len()));
        }
        for (index, &time) in times.iter().enumerate() {
            if !time.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "time point",
                    value: time,
                    reason: "must be finite",
                });
            }
            if index > 0 && time <= times[index - 1] {
                return Err(ConfigError::NonMonotonicTime(index));
            }
        }

        let dt = require_positive("dt", times[1] - times[0])?;
        for index in 2..times.len() {
            let found = times[index] - times[index - 1];
            if (found - dt).abs() > UNIFORM_TOLERANCE * dt.max(1.0) {
                return Err(ConfigError::NonUniformTime {
                    index,
                    expected: dt,
                    found,
                });
            }
        }

        Ok(Self { times, dt })
    }

    /// Step size (s)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of time points
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of controller steps between the time points
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Time at grid index `index`
    pub fn time(&self, index: usize) -> f64 {
        self.times[index]
    }

    /// Final time point
    pub fn horizon(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}
